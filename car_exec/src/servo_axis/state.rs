//! Implementations for the servo axis state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use super::Params;
use crate::eqpt::{AnalogMux, ServoPwm};
use util::sched::Tickable;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering servo axis state machine.
///
/// Reads the stick's horizontal channel through the shared analog mux and
/// maps each sample linearly onto the servo's pulse-width compare register.
/// The axis owns its settling counter; its cycle state is owned by the
/// scheduler task and passed through [`Tickable::tick`].
pub struct ServoAxis<A: AnalogMux, S: ServoPwm> {
    params: Params,

    /// Ticks spent in the wait state since the last sample.
    settle_count: u8,

    adc: Rc<RefCell<A>>,
    servo: Rc<RefCell<S>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the axis sampling cycle.
///
/// `Start` is transient: it is the state installed at boot and is left on
/// the first tick, never to be re-entered. The machine then cycles
/// `SetChannel -> Wait (xN) -> ProcessSample -> SetChannel -> ...` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisState {
    Start,
    SetChannel,
    Wait,
    ProcessSample,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: AnalogMux, S: ServoPwm> ServoAxis<A, S> {
    /// Create a new servo axis over the given equipment handles.
    pub fn new(params: Params, adc: Rc<RefCell<A>>, servo: Rc<RefCell<S>>) -> Self {
        ServoAxis {
            settle_count: params.initial_settle_count,
            params,
            adc,
            servo,
        }
    }
}

impl<A: AnalogMux, S: ServoPwm> Tickable for ServoAxis<A, S> {
    type State = AxisState;

    fn tick(&mut self, state: AxisState) -> AxisState {
        // Transitions. The wait state is held until the settling counter
        // reaches the settling window, checked before this tick's increment.
        let next = match state {
            AxisState::Start => AxisState::SetChannel,
            AxisState::SetChannel => AxisState::Wait,
            AxisState::Wait => {
                if self.settle_count < self.params.settle_ticks {
                    AxisState::Wait
                }
                else {
                    AxisState::ProcessSample
                }
            }
            AxisState::ProcessSample => AxisState::SetChannel,
        };

        // Actions, keyed to the state just entered
        match next {
            AxisState::Start => (),
            AxisState::SetChannel => {
                self.adc.borrow_mut().select_channel(self.params.channel);
            }
            AxisState::Wait => {
                self.settle_count += 1;
            }
            AxisState::ProcessSample => {
                self.settle_count = 0;

                let sample = self.adc.borrow().latest_sample();

                let mut servo = self.servo.borrow_mut();
                let reload = servo.reload();
                let compare = reload - self.params.center_offset + sample as i32;

                // The mapping is deliberately unclamped, an out of range
                // compare is written as computed and only noted in the log.
                if compare < 0 || compare > reload {
                    debug!(
                        "Servo compare {} outside [0, {}]",
                        compare, reload
                    );
                }

                servo.set_compare(compare);

                trace!("Servo axis: sample {} -> compare {}", sample, compare);
            }
        }

        next
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::bench::{BenchAdc, BenchServo};

    /// Reload value of the bench PWM timer.
    const RELOAD: i32 = 19999;

    fn rig() -> (
        Rc<RefCell<BenchAdc>>,
        Rc<RefCell<BenchServo>>,
        ServoAxis<BenchAdc, BenchServo>,
    ) {
        let adc = Rc::new(RefCell::new(BenchAdc::new()));
        let servo = Rc::new(RefCell::new(BenchServo::new(RELOAD)));
        let axis = ServoAxis::new(Params::default(), Rc::clone(&adc), Rc::clone(&servo));
        (adc, servo, axis)
    }

    fn advance(
        axis: &mut ServoAxis<BenchAdc, BenchServo>,
        state: AxisState,
        num_ticks: u32,
    ) -> AxisState {
        let mut state = state;
        for _ in 0..num_ticks {
            state = axis.tick(state);
        }
        state
    }

    #[test]
    fn test_state_sequence_from_boot() {
        let (_adc, _servo, mut axis) = rig();

        let mut state = AxisState::Start;
        let mut seq = vec![];

        for _ in 0..8 {
            state = axis.tick(state);
            seq.push(state);
        }

        assert_eq!(
            seq,
            vec![
                AxisState::SetChannel,
                AxisState::Wait,
                AxisState::Wait,
                AxisState::Wait,
                AxisState::Wait,
                AxisState::Wait,
                AxisState::ProcessSample,
                AxisState::SetChannel,
            ]
        );
    }

    #[test]
    fn test_selects_own_channel_on_first_tick() {
        let (adc, _servo, mut axis) = rig();

        // Pre-select another channel so the selection is observable
        adc.borrow_mut().select_channel(5);

        advance(&mut axis, AxisState::Start, 1);
        assert_eq!(adc.borrow().selected_channel(), 0);
    }

    #[test]
    fn test_first_sample_on_seventh_tick() {
        let (adc, servo, mut axis) = rig();
        adc.borrow_mut().set_sample(0, 0);

        let state = advance(&mut axis, AxisState::Start, 6);
        assert_eq!(servo.borrow().last_compare(), None);

        advance(&mut axis, state, 1);
        assert_eq!(servo.borrow().last_compare(), Some(18369));
    }

    #[test]
    fn test_steady_seven_tick_cycle() {
        let (_adc, servo, mut axis) = rig();

        // Samples land on ticks 7, 14, 21 and 28
        advance(&mut axis, AxisState::Start, 28);
        assert_eq!(servo.borrow().num_writes(), 4);
    }

    #[test]
    fn test_compare_mapping() {
        let (adc, servo, mut axis) = rig();

        adc.borrow_mut().set_sample(0, 512);
        let state = advance(&mut axis, AxisState::Start, 7);
        assert_eq!(servo.borrow().last_compare(), Some(18881));

        adc.borrow_mut().set_sample(0, -512);
        advance(&mut axis, state, 7);
        assert_eq!(servo.borrow().last_compare(), Some(17857));
    }

    #[test]
    fn test_out_of_range_compare_not_clamped() {
        let (adc, servo, mut axis) = rig();

        adc.borrow_mut().set_sample(0, 5000);
        advance(&mut axis, AxisState::Start, 7);

        let compare = servo.borrow().last_compare().unwrap();
        assert_eq!(compare, 23369);
        assert!(compare > RELOAD);
    }
}
