//! Error types for meeting-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::conflict::Conflict;
use crate::interval::TimeInterval;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error(
        "Unresolvable conflict after {restarts} restarts: {} conflict(s) remain for candidate {last_candidate}",
        .unresolved.len()
    )]
    UnresolvableConflict {
        /// The last candidate interval evaluated for the new meeting.
        last_candidate: TimeInterval,
        /// Conflicts that blocked the last candidate.
        unresolved: Vec<Conflict>,
        restarts: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
