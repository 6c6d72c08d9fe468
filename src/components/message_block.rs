//! One rendered chat message.
//!
//! SYSTEM CONTEXT
//! ==============
//! Class names must line up with the page stylesheet: `message`,
//! `user-message`/`bot-message`, `message-content` plus an optional intent
//! class, and `message-time`.

#[cfg(test)]
#[path = "message_block_test.rs"]
mod message_block_test;

use chrono::FixedOffset;
use leptos::prelude::*;

use crate::state::chat::ChatEntry;
use crate::util::time_label::time_label;

/// Display data for a message, resolved from a [`ChatEntry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBlock {
    pub wrapper_class: String,
    pub content_class: String,
    pub text: String,
    pub time_label: String,
}

impl MessageBlock {
    /// Resolve classes and the time label for `entry` as seen at `offset`.
    #[must_use]
    pub fn from_entry(entry: &ChatEntry, offset: FixedOffset) -> Self {
        let content_class = match entry.intent_class() {
            Some(intent) => format!("message-content {intent}"),
            None => "message-content".to_owned(),
        };
        Self {
            wrapper_class: format!("message {}-message", entry.sender.as_str()),
            content_class,
            text: entry.text.clone(),
            time_label: time_label(entry.timestamp, offset),
        }
    }
}

/// Message block: text bubble plus time label.
#[component]
pub fn MessageView(block: MessageBlock) -> impl IntoView {
    let MessageBlock { wrapper_class, content_class, text, time_label } = block;
    view! {
        <div class=wrapper_class>
            <div class=content_class>
                <p>{text}</p>
            </div>
            <div class="message-time">{time_label}</div>
        </div>
    }
}
