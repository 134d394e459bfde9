//! # Equipment module
//!
//! Contracts for the equipment the control loop drives: the analog sampling
//! peripheral shared by both axes, the steering servo's pulse-width output
//! and the drive motor's direction bus. The axis modules are generic over
//! these traits, so the exec and the tests can run against the in-memory
//! bench implementations in [`bench`] while real peripheral drivers stay out
//! of scope.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod bench;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of channels behind the analog input multiplexer.
pub const NUM_MUX_CHANNELS: u8 = 8;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Demandable drive motor directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDir {
    /// Both wheels driving forwards.
    Forward,

    /// Both wheels driving backwards.
    Backward,

    /// Motor driver disengaged, wheels coasting.
    Idle,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The analog sampling peripheral: a free-running converter behind an input
/// multiplexer.
///
/// Both axes share one instance of this equipment, time-multiplexing the
/// channel selection between them. Selections are expected to settle before
/// the sample is trusted, which is what the axis settling windows are for.
pub trait AnalogMux {
    /// One-time enable of the converter. Conversions free-run afterwards.
    fn enable(&mut self);

    /// Route the given channel to the converter.
    ///
    /// Channels `0` to `NUM_MUX_CHANNELS - 1` update the selection. An
    /// out-of-range channel is ignored, leaving the previous selection in
    /// place.
    fn select_channel(&mut self, channel: u8);

    /// The most recent conversion result on the selected channel.
    fn latest_sample(&self) -> i16;
}

/// The steering servo's pulse-width output.
pub trait ServoPwm {
    /// The reload (top) value of the underlying PWM timer.
    fn reload(&self) -> i32;

    /// Set the active pulse width via the compare register.
    ///
    /// The value is written as given, there is no clamping to `[0, reload]`.
    fn set_compare(&mut self, compare: i32);
}

/// The drive motor's direction bus.
pub trait MotorBus {
    /// Demand the given direction from the motor driver.
    fn set_direction(&mut self, dir: MotorDir);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorDir {
    /// The two-bit code this direction puts on the bus.
    pub fn bus_code(&self) -> u8 {
        match self {
            MotorDir::Forward => 0x01,
            MotorDir::Backward => 0x02,
            MotorDir::Idle => 0x00,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
