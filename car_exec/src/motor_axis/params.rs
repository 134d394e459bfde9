//! Parameters structure for the motor axis

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive motor axis.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SAMPLING ----

    /// Analog mux channel carrying the stick's vertical potentiometer.
    pub channel: u8,

    /// Number of ticks to hold in the wait state after a channel selection
    /// before the sample is trusted.
    pub settle_ticks: u8,

    /// Value the settling counter starts from at boot. The counter is reset
    /// to zero after every sample, so this only shapes the first cycle.
    pub initial_settle_count: u8,

    // ---- DIRECTION DECISION ----

    /// Raw sample value of a centred stick.
    pub center: i16,

    /// Half-width of the dead band around the centre within which the motor
    /// is held idle.
    pub filter: i16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Defaults reproduce the bench calibration: channel 1, a five tick
    /// settling window entered with a full counter so the first wait exits
    /// immediately, and a 50 count dead band about the 512 centre.
    fn default() -> Self {
        Params {
            channel: 1,
            settle_ticks: 5,
            initial_settle_count: 5,
            center: 512,
            filter: 50,
        }
    }
}
