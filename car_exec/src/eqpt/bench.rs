//! # Bench equipment
//!
//! In-memory implementations of the equipment contracts, standing in for the
//! real peripherals when running on a host machine. Samples are injected
//! into the bench ADC (by a stick profile or by a test), and the bench
//! outputs record the last write so the exec and the tests can observe what
//! the axes demanded.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};

// Internal
use super::{AnalogMux, MotorBus, MotorDir, ServoPwm, NUM_MUX_CHANNELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bench analog sampling peripheral.
///
/// Holds one injectable sample register per mux channel and a selected
/// channel register honouring the mux channel bound.
pub struct BenchAdc {
    /// Injected sample registers, one per channel.
    channels: [i16; NUM_MUX_CHANNELS as usize],

    /// Currently selected channel.
    selected: u8,

    /// Whether the converter has been enabled.
    enabled: bool,
}

/// Bench servo pulse-width output.
///
/// Records the reload value it was built with and every compare write made
/// against it.
pub struct BenchServo {
    reload: i32,
    last_compare: Option<i32>,
    num_writes: u32,
}

/// Bench motor direction bus.
pub struct BenchMotorBus {
    last_dir: MotorDir,
    num_writes: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BenchAdc {
    /// Create a new bench ADC with all sample registers zeroed and channel 0
    /// selected.
    pub fn new() -> Self {
        BenchAdc {
            channels: [0; NUM_MUX_CHANNELS as usize],
            selected: 0,
            enabled: false,
        }
    }

    /// Inject a sample into the given channel's register.
    ///
    /// Out-of-range channels are ignored, matching the selection rule.
    pub fn set_sample(&mut self, channel: u8, value: i16) {
        if channel < NUM_MUX_CHANNELS {
            self.channels[channel as usize] = value;
        }
    }

    /// The currently selected channel.
    pub fn selected_channel(&self) -> u8 {
        self.selected
    }

    /// Whether `enable` has been called.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for BenchAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogMux for BenchAdc {
    fn enable(&mut self) {
        self.enabled = true;
        debug!("Bench ADC enabled");
    }

    fn select_channel(&mut self, channel: u8) {
        if channel < NUM_MUX_CHANNELS {
            self.selected = channel;
            trace!("Bench ADC channel {} selected", channel);
        }
        else {
            debug!("Bench ADC channel {} out of range, selection unchanged", channel);
        }
    }

    fn latest_sample(&self) -> i16 {
        self.channels[self.selected as usize]
    }
}

impl BenchServo {
    /// Create a new bench servo output over a PWM timer with the given
    /// reload value.
    pub fn new(reload: i32) -> Self {
        BenchServo {
            reload,
            last_compare: None,
            num_writes: 0,
        }
    }

    /// The last compare value written, or `None` if none has been yet.
    pub fn last_compare(&self) -> Option<i32> {
        self.last_compare
    }

    /// Number of compare writes made so far.
    pub fn num_writes(&self) -> u32 {
        self.num_writes
    }
}

impl ServoPwm for BenchServo {
    fn reload(&self) -> i32 {
        self.reload
    }

    fn set_compare(&mut self, compare: i32) {
        self.last_compare = Some(compare);
        self.num_writes += 1;
    }
}

impl BenchMotorBus {
    /// Create a new bench motor bus, idle until written.
    pub fn new() -> Self {
        BenchMotorBus {
            last_dir: MotorDir::Idle,
            num_writes: 0,
        }
    }

    /// The last direction demanded.
    pub fn last_direction(&self) -> MotorDir {
        self.last_dir
    }

    /// Number of direction writes made so far.
    pub fn num_writes(&self) -> u32 {
        self.num_writes
    }
}

impl Default for BenchMotorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorBus for BenchMotorBus {
    fn set_direction(&mut self, dir: MotorDir) {
        self.last_dir = dir;
        self.num_writes += 1;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adc_in_range_selection() {
        let mut adc = BenchAdc::new();

        for ch in 0..NUM_MUX_CHANNELS {
            adc.select_channel(ch);
            assert_eq!(adc.selected_channel(), ch);
        }
    }

    #[test]
    fn test_adc_out_of_range_selection_ignored() {
        let mut adc = BenchAdc::new();

        adc.select_channel(3);
        adc.select_channel(8);
        assert_eq!(adc.selected_channel(), 3);

        adc.select_channel(0xFF);
        assert_eq!(adc.selected_channel(), 3);
    }

    #[test]
    fn test_adc_samples_follow_selection() {
        let mut adc = BenchAdc::new();

        adc.set_sample(0, 100);
        adc.set_sample(1, 700);

        adc.select_channel(0);
        assert_eq!(adc.latest_sample(), 100);

        adc.select_channel(1);
        assert_eq!(adc.latest_sample(), 700);
    }

    #[test]
    fn test_servo_records_writes() {
        let mut servo = BenchServo::new(19999);

        assert_eq!(servo.reload(), 19999);
        assert_eq!(servo.last_compare(), None);

        servo.set_compare(18369);
        assert_eq!(servo.last_compare(), Some(18369));
        assert_eq!(servo.num_writes(), 1);
    }

    #[test]
    fn test_motor_bus_starts_idle() {
        let bus = BenchMotorBus::new();

        assert_eq!(bus.last_direction(), MotorDir::Idle);
        assert_eq!(bus.num_writes(), 0);
    }
}
