//! Conversation history and its persisted JSON shape.
//!
//! DESIGN
//! ======
//! Field names on the wire (`message`, `sender`, `intent`, `time`) are the
//! ones already sitting in users' `localStorage`, so the serde renames here
//! must not change. Timestamps are stored as RFC 3339 text in UTC.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Who authored a chat entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// A single exchanged message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(rename = "message")]
    pub text: String,
    pub sender: Sender,
    /// Classification label from the endpoint. Bot entries only.
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    #[must_use]
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { text: text.into(), sender: Sender::User, intent: None, timestamp }
    }

    /// Blank intents are dropped so they never reach styling.
    #[must_use]
    pub fn bot(text: impl Into<String>, intent: Option<String>, timestamp: DateTime<Utc>) -> Self {
        let intent = intent.filter(|i| !i.trim().is_empty());
        Self { text: text.into(), sender: Sender::Bot, intent, timestamp }
    }

    /// Styling key for this entry's intent, if it carries a non-blank one.
    /// Stored entries bypass [`ChatEntry::bot`], so blanks are filtered here too.
    #[must_use]
    pub fn intent_class(&self) -> Option<String> {
        if self.sender != Sender::Bot {
            return None;
        }
        self.intent
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .map(intent_class)
    }
}

/// Convert an intent label into a CSS class name (`shelter_info` -> `shelter-info`).
#[must_use]
pub fn intent_class(intent: &str) -> String {
    intent.replace('_', "-")
}

/// Ordered conversation history; insertion order is display order.
///
/// Never empty: every constructor guarantees a first (welcome) entry, and
/// clearing truncates back to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationLog {
    entries: Vec<ChatEntry>,
}

impl ConversationLog {
    /// Fresh log holding only the synthesized welcome entry.
    #[must_use]
    pub fn with_welcome(text: &str, timestamp: DateTime<Utc>) -> Self {
        Self { entries: vec![ChatEntry::bot(text, None, timestamp)] }
    }

    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_entries(entries: Vec<ChatEntry>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self { entries })
    }

    /// Parse a persisted log.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] when `raw` is not a JSON array of
    /// entries or the array is empty.
    pub fn decode(raw: &str) -> Result<Self, StorageError> {
        let entries: Vec<ChatEntry> =
            serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        Self::from_entries(entries).ok_or_else(|| StorageError::Corrupt("empty history".to_owned()))
    }

    /// Serialize the whole log for storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if a timestamp cannot be formatted.
    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string(&self.entries).map_err(|e| StorageError::Write(e.to_string()))
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Entries rendered by the widget itself; the welcome is part of the markup.
    #[must_use]
    pub fn after_welcome(&self) -> &[ChatEntry] {
        &self.entries[1..]
    }

    #[must_use]
    pub fn welcome(&self) -> &ChatEntry {
        &self.entries[0]
    }

    #[must_use]
    pub fn last(&self) -> &ChatEntry {
        &self.entries[self.entries.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything beyond the welcome entry has been exchanged.
    #[must_use]
    pub fn has_history(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn truncate_to_welcome(&mut self) {
        self.entries.truncate(1);
    }
}
