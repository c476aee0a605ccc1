use thiserror::Error;

use crate::schedule::overlay::OccurrenceState;

/// Error type that captures scheduling and projection failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Invalid frequency text: {0}")]
    FrequencyFormat(String),
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),
    #[error("Occurrence is already {state:?} and cannot change state")]
    StateConflict { state: OccurrenceState },
    #[error("No occurrence at index {0}")]
    OccurrenceNotFound(u32),
}
