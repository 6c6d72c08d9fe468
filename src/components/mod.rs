//! Leptos views appended into the page's message container.

pub mod message_block;
pub mod typing_indicator;
