//! Bus error model.

use thiserror::Error;

/// Result type used across the bus crates.
pub type BusResult<T> = Result<T, BusError>;

/// Bus-level error.
///
/// Writes and subscriptions succeed for any structurally valid input and reads
/// degrade out-of-range access to an empty result, so the variants here only
/// cover infrastructure failures around those operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A ledger or registry lock was poisoned by a panicking thread.
    #[error("internal lock poisoned: {0}")]
    Poisoned(&'static str),

    /// The bus has been shut down and no longer accepts subscribers.
    #[error("event bus is closed")]
    Closed,

    /// An event body could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A write task ended before reporting its outcome (panic or runtime
    /// shutdown).
    #[error("write did not complete: {0}")]
    WriteAborted(String),
}

impl BusError {
    pub fn poisoned(what: &'static str) -> Self {
        Self::Poisoned(what)
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for BusError {
    fn from(value: serde_json::Error) -> Self {
        Self::serialization(value.to_string())
    }
}
