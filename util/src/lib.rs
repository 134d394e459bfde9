//! Utility library for the joycar control software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
pub mod logger;
pub mod params;
pub mod sched;
pub mod session;
pub mod time;
