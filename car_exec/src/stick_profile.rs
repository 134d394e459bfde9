//! # Stick profile interpreter
//!
//! This module provides timed joystick sample profiles, allowing bench runs
//! of the exec to be driven from a file rather than a physical stick. A
//! profile is a sequence of `(time, x, y)` steps; as session time passes the
//! pending steps are handed to the exec, which injects them into the bench
//! ADC's sample registers.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Interval between steps of the built-in sweep profile.
const SWEEP_STEP_S: f64 = 0.5;

/// Centred stick sample, used by the sweep to hold the quiet axis still.
const SWEEP_CENTER: i16 = 512;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single timed stick sample.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProfileStep {
    /// Session-elapsed time at which the sample applies.
    pub time_s: f64,

    /// Raw sample for the horizontal (steering) channel.
    pub x: i16,

    /// Raw sample for the vertical (drive) channel.
    pub y: i16,
}

/// A stick profile.
///
/// After loading, call `.get_pending` once per cycle with the current
/// session time to acquire the steps that apply now. Steps are consumed in
/// authoring order.
pub struct StickProfile {
    _profile_path: Option<PathBuf>,
    steps: VecDeque<ProfileStep>,
}

/// On-disk profile layout: a TOML document of `[[step]]` tables.
#[derive(Deserialize)]
struct ProfileFile {
    step: Vec<ProfileStep>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Could not find the profile at {0}")]
    ProfileNotFound(String),

    #[error("Could not load the profile: {0}")]
    ProfileLoadError(std::io::Error),

    #[error("Could not parse the profile: {0}")]
    ProfileParseError(toml::de::Error),

    #[error("The profile contains no steps")]
    ProfileEmpty,
}

pub enum PendingSamples {
    None,
    Some(Vec<ProfileStep>),
    EndOfProfile,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StickProfile {
    /// Load a profile from the given TOML file path.
    pub fn from_file<P: AsRef<Path>>(profile_path: P) -> Result<Self, ProfileError> {
        // Get the path in a buffer
        let path = PathBuf::from(profile_path.as_ref());

        // Check that the profile file exists.
        if !path.exists() {
            return Err(ProfileError::ProfileNotFound(
                path.to_string_lossy().into_owned(),
            ));
        }

        // Load the profile into a string
        let profile_str = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ProfileError::ProfileLoadError(e)),
        };

        let steps = Self::parse(&profile_str)?;

        Ok(StickProfile {
            _profile_path: Some(path),
            steps,
        })
    }

    /// The built-in demonstration profile: a full steering sweep with the
    /// drive idle, then forward/backward drive demands with the steering
    /// centred.
    pub fn sweep() -> Self {
        let mut steps = VecDeque::new();
        let mut time_s = 0.0;

        for x in &[512, 256, 0, 256, 512, 768, 1023, 768, 512] {
            steps.push_back(ProfileStep {
                time_s,
                x: *x,
                y: SWEEP_CENTER,
            });
            time_s += SWEEP_STEP_S;
        }

        for y in &[700, 512, 300, 512, 600, 400, 512] {
            steps.push_back(ProfileStep {
                time_s,
                x: SWEEP_CENTER,
                y: *y,
            });
            time_s += SWEEP_STEP_S;
        }

        StickProfile {
            _profile_path: None,
            steps,
        }
    }

    /// Parse a profile from its TOML source.
    fn parse(profile_str: &str) -> Result<VecDeque<ProfileStep>, ProfileError> {
        let file: ProfileFile = match toml::from_str(profile_str) {
            Ok(f) => f,
            Err(e) => return Err(ProfileError::ProfileParseError(e)),
        };

        if file.step.is_empty() {
            return Err(ProfileError::ProfileEmpty);
        }

        Ok(file.step.into_iter().collect())
    }

    /// Return the steps that apply at the given session time, or `None` if
    /// no step is due yet.
    ///
    /// Once every step has been consumed this returns `EndOfProfile`.
    pub fn get_pending(&mut self, current_time_s: f64) -> PendingSamples {
        // If the queue is empty the profile is over and we return the end of
        // profile variant
        if self.steps.is_empty() {
            return PendingSamples::EndOfProfile;
        }

        let mut step_vec: Vec<ProfileStep> = vec![];

        // Peek items from the queue, if the head's time is lower than the
        // current time add it to the vector, and keep adding steps until the
        // times are larger than the current time.
        while let Some(step) = self.steps.front() {
            if step.time_s < current_time_s {
                step_vec.push(*step);
                self.steps.pop_front();
            }
            else {
                break;
            }
        }

        // If the vector is longer than 0 return Some, otherwise None
        if !step_vec.is_empty() {
            PendingSamples::Some(step_vec)
        }
        else {
            PendingSamples::None
        }
    }

    /// Get the number of steps remaining in the profile
    pub fn get_num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Get the length of the profile in seconds
    pub fn get_duration(&self) -> f64 {
        match self.steps.back() {
            Some(s) => s.time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_profile() {
        let steps = StickProfile::parse(
            r#"
            [[step]]
            time_s = 0.0
            x = 512
            y = 512

            [[step]]
            time_s = 1.5
            x = 1023
            y = 300
            "#,
        )
        .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].x, 512);
        assert_eq!(steps[1].time_s, 1.5);
        assert_eq!(steps[1].y, 300);
    }

    #[test]
    fn test_empty_profile_errors() {
        match StickProfile::parse("step = []") {
            Err(ProfileError::ProfileEmpty) => (),
            _ => panic!("expected an empty profile error"),
        }
    }

    #[test]
    fn test_pending_semantics() {
        let mut profile = StickProfile::sweep();
        let num_steps = profile.get_num_steps();

        // Nothing is due at the very start, the first step's time is not
        // yet in the past
        match profile.get_pending(0.0) {
            PendingSamples::None => (),
            _ => panic!("expected no pending steps at 0.0 s"),
        }

        // The steps at 0.0 and 0.5 s are due at 0.6 s
        match profile.get_pending(0.6) {
            PendingSamples::Some(steps) => assert_eq!(steps.len(), 2),
            _ => panic!("expected two pending steps at 0.6 s"),
        }

        // Everything else is due far in the future
        match profile.get_pending(1000.0) {
            PendingSamples::Some(steps) => assert_eq!(steps.len(), num_steps - 2),
            _ => panic!("expected the remaining steps"),
        }

        // And once drained the profile reports its end
        match profile.get_pending(1000.0) {
            PendingSamples::EndOfProfile => (),
            _ => panic!("expected end of profile"),
        }
    }

    #[test]
    fn test_sweep_duration() {
        let profile = StickProfile::sweep();

        assert_eq!(profile.get_num_steps(), 16);
        assert!((profile.get_duration() - 7.5).abs() < 1e-9);
    }
}
