//! Model validation errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid time range: end ({end}) is before start ({start})")]
    InvalidTimeRange { start: u32, end: u32 },

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}
