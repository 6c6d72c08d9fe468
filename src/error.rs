//! Error types for the two failure kinds the widget recognizes.
//!
//! ERROR HANDLING
//! ==============
//! Neither kind is fatal. `ChatError` is turned into a generic bot message by
//! the controller; `StorageError` is only ever logged to the console.

/// Failure of the single request/response exchange with the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The request never produced a response (network down, CORS, abort).
    #[error("chat request failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    /// `detail` carries the endpoint's `error` field when the body had one.
    #[error("chat endpoint responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    /// The response body was not a valid reply payload.
    #[error("chat response could not be decoded: {0}")]
    Decode(String),
}

/// Rejected widget configuration override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Failure reading or writing the persisted conversation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No storage backend is reachable (private mode, disabled storage).
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    /// A value exists under the key but is not a conversation log.
    #[error("stored conversation is corrupt: {0}")]
    Corrupt(String),
}
