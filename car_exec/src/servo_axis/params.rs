//! Parameters structure for the servo axis

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the steering servo axis.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SAMPLING ----

    /// Analog mux channel carrying the stick's horizontal potentiometer.
    pub channel: u8,

    /// Number of ticks to hold in the wait state after a channel selection
    /// before the sample is trusted.
    pub settle_ticks: u8,

    /// Value the settling counter starts from at boot. The counter is reset
    /// to zero after every sample, so this only shapes the first cycle.
    pub initial_settle_count: u8,

    // ---- SERVO MAPPING ----

    /// Offset subtracted from the PWM reload value when mapping a raw sample
    /// to the compare register, so that a centred stick gives the straight
    /// ahead pulse width.
    ///
    /// Units: timer counts
    pub center_offset: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Defaults reproduce the bench calibration: channel 0, a five tick
    /// settling window entered with a zeroed counter, and the offset which
    /// centres the servo at 90 degrees.
    fn default() -> Self {
        Params {
            channel: 0,
            settle_ticks: 5,
            initial_settle_count: 0,
            center_offset: 1630,
        }
    }
}
