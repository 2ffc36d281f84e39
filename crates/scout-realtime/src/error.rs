//! Realtime error types.

use thiserror::Error;

use crate::hub::ConnectionId;

pub type RealtimeResult<T> = Result<T, RealtimeError>;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
