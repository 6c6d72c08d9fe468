//! Networking modules for the chat endpoint.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the JSON exchanged with `/api/chat`; `api` holds the
//! transport seam and its browser implementation.

pub mod api;
pub mod types;
