//! JSON payloads exchanged with the chat endpoint.
//!
//! DESIGN
//! ======
//! Decoding lives here, on plain strings, so response classification can be
//! tested natively without a browser fetch.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message as typed (trimmed).
    pub message: String,
}

/// Successful reply from the endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text shown as the bot message.
    pub response: String,
    /// Classification label, used only for styling.
    #[serde(default)]
    pub intent: Option<String>,
    /// Disaster category the endpoint detected, if any. Logged, not stored.
    #[serde(default)]
    pub disaster_type: Option<String>,
    /// Location the endpoint extracted from the message, if any. Logged, not stored.
    #[serde(default)]
    pub location: Option<String>,
}

/// Error body the endpoint sends with 4xx/5xx statuses.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a finished HTTP exchange into a reply or a [`ChatError`].
///
/// # Errors
///
/// Returns [`ChatError::Status`] for any status outside `200..300` and
/// [`ChatError::Decode`] when a success body is not a reply.
pub fn classify_response(status: u16, body: &str) -> Result<ChatReply, ChatError> {
    if !(200..300).contains(&status) {
        return Err(ChatError::Status { status, detail: error_detail(body) });
    }
    serde_json::from_str(body).map_err(|e| ChatError::Decode(e.to_string()))
}

/// The `error` field of an error body, if the body has one.
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error)
}
