//! Implementations for the motor axis state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use super::Params;
use crate::eqpt::{AnalogMux, MotorBus, MotorDir};
use util::sched::Tickable;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive motor axis state machine.
///
/// Reads the stick's vertical channel through the shared analog mux and
/// demands a direction from the motor bus: forward above the dead band,
/// backward below it, idle within it. The decision is recomputed fresh from
/// every sample, there is no latching.
pub struct MotorAxis<A: AnalogMux, B: MotorBus> {
    params: Params,

    /// Ticks spent in the wait state since the last sample.
    ///
    /// Starts full (see `Params::initial_settle_count`) so the axis takes
    /// its first sample before the servo axis does, staggering the two
    /// axes' mux windows at boot.
    settle_count: u8,

    adc: Rc<RefCell<A>>,
    bus: Rc<RefCell<B>>,
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

impl<A: AnalogMux, B: MotorBus> MotorAxis<A, B> {
    /// Create a new motor axis over the given equipment handles.
    pub fn new(params: Params, adc: Rc<RefCell<A>>, bus: Rc<RefCell<B>>) -> Self {
        MotorAxis {
            settle_count: params.initial_settle_count,
            params,
            adc,
            bus,
        }
    }

    /// Decide the direction demand for a raw sample.
    fn direction_for(&self, sample: i16) -> MotorDir {
        let sample = sample as i32;
        let center = self.params.center as i32;
        let filter = self.params.filter as i32;

        // Strict inequalities, the band edges themselves are idle
        if sample > center + filter {
            MotorDir::Forward
        }
        else if sample < center - filter {
            MotorDir::Backward
        }
        else {
            MotorDir::Idle
        }
    }
}

impl<A: AnalogMux, B: MotorBus> Tickable for MotorAxis<A, B> {
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
                let dir = self.direction_for(sample);

                self.bus.borrow_mut().set_direction(dir);

                trace!("Motor axis: sample {} -> {:?}", sample, dir);
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
    use crate::eqpt::bench::{BenchAdc, BenchMotorBus};

    fn rig() -> (
        Rc<RefCell<BenchAdc>>,
        Rc<RefCell<BenchMotorBus>>,
        MotorAxis<BenchAdc, BenchMotorBus>,
    ) {
        let adc = Rc::new(RefCell::new(BenchAdc::new()));
        let bus = Rc::new(RefCell::new(BenchMotorBus::new()));
        let axis = MotorAxis::new(Params::default(), Rc::clone(&adc), Rc::clone(&bus));
        (adc, bus, axis)
    }

    fn advance(
        axis: &mut MotorAxis<BenchAdc, BenchMotorBus>,
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
        let (_adc, _bus, mut axis) = rig();

        // The full starting counter makes the first wait a single tick
        let mut state = AxisState::Start;
        let mut seq = vec![];

        for _ in 0..4 {
            state = axis.tick(state);
            seq.push(state);
        }

        assert_eq!(
            seq,
            vec![
                AxisState::SetChannel,
                AxisState::Wait,
                AxisState::ProcessSample,
                AxisState::SetChannel,
            ]
        );
    }

    #[test]
    fn test_selects_own_channel_on_first_tick() {
        let (adc, _bus, mut axis) = rig();

        advance(&mut axis, AxisState::Start, 1);
        assert_eq!(adc.borrow().selected_channel(), 1);
    }

    #[test]
    fn test_first_sample_on_third_tick() {
        let (adc, bus, mut axis) = rig();
        adc.borrow_mut().set_sample(1, 600);

        let state = advance(&mut axis, AxisState::Start, 2);
        assert_eq!(bus.borrow().num_writes(), 0);

        advance(&mut axis, state, 1);
        assert_eq!(bus.borrow().num_writes(), 1);
        assert_eq!(bus.borrow().last_direction(), MotorDir::Forward);
    }

    #[test]
    fn test_steady_seven_tick_cycle() {
        let (_adc, bus, mut axis) = rig();

        // Samples land on ticks 3, 10, 17 and 24
        advance(&mut axis, AxisState::Start, 24);
        assert_eq!(bus.borrow().num_writes(), 4);
    }

    #[test]
    fn test_direction_thresholds() {
        let (adc, bus, mut axis) = rig();

        // Reach the first sample, then feed one value per full cycle
        adc.borrow_mut().set_sample(1, 600);
        let mut state = advance(&mut axis, AxisState::Start, 3);
        assert_eq!(bus.borrow().last_direction(), MotorDir::Forward);

        for (sample, expected) in &[
            (400, MotorDir::Backward),
            (512, MotorDir::Idle),
            // Band edges are idle, the inequalities are strict
            (562, MotorDir::Idle),
            (462, MotorDir::Idle),
            (563, MotorDir::Forward),
            (461, MotorDir::Backward),
        ] {
            adc.borrow_mut().set_sample(1, *sample);
            state = advance(&mut axis, state, 7);
            assert_eq!(bus.borrow().last_direction(), *expected);
        }
    }
}
