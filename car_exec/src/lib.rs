//! # Car library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the car crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Equipment module - contracts for the shared analog mux, the servo output
/// and the motor direction bus, plus the bench implementations
pub mod eqpt;

/// Drive motor axis module - converts vertical stick samples into motor
/// direction demands
pub mod motor_axis;

/// Executable-level parameters
pub mod params;

/// Steering servo axis module - converts horizontal stick samples into servo
/// pulse widths
pub mod servo_axis;

/// Stick profile interpreter - timed joystick sample sequences for bench
/// runs
pub mod stick_profile;

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
