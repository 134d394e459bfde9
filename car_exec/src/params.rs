//! Parameters structure for the car executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Executable-level parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SCHEDULING ----

    /// Scheduler base period, the greatest common divisor of the task
    /// periods below.
    ///
    /// Units: milliseconds
    pub base_period_ms: u64,

    /// Servo (steering) axis task period.
    ///
    /// Units: milliseconds
    pub servo_period_ms: u64,

    /// Motor (drive) axis task period.
    ///
    /// Units: milliseconds
    pub motor_period_ms: u64,

    // ---- BENCH EQUIPMENT ----

    /// Reload (top) value of the bench servo PWM timer.
    ///
    /// Units: timer counts
    pub servo_pwm_reload: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Defaults reproduce the bench calibration: both axes ticking at the
    /// 10 ms base period and a 50 Hz servo PWM with a 19999 count reload.
    fn default() -> Self {
        Params {
            base_period_ms: 10,
            servo_period_ms: 10,
            motor_period_ms: 10,
            servo_pwm_reload: 19999,
        }
    }
}
