//! Error types for the fallible edges of the crate.
//!
//! The note pipeline itself never fails: out-of-range input is masked or
//! ignored. Errors only come from rejected parameters, configuration
//! loading and LED hardware.

use thiserror::Error;

/// A parameter value was rejected and the previous value kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("soften factor must be in (0, 1], got {0}")]
    SoftenFactor(f32),

    #[error("sustain level must be in [0, 1], got {0}")]
    SustainLevel(f32),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid note range {min}..={max}")]
    NoteRange { min: u8, max: u8 },

    #[error("note {midi} maps to LEDs {start}..{end}, outside the strip of {count}")]
    LedRange {
        midi: u8,
        start: usize,
        end: usize,
        count: usize,
    },

    #[error("tick interval must be at least 1 ms")]
    TickInterval,

    #[error("layout needs {leds_per_note} LEDs for each of {notes} notes, more than {max}")]
    LedsPerNote {
        leds_per_note: usize,
        notes: usize,
        max: usize,
    },

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to initialise LED strip: {0}")]
    Init(String),

    #[error("failed to render LED strip: {0}")]
    Render(String),
}
