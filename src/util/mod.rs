//! Utility helpers shared across widget modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, clock and
//! locale formatting) from controller logic to improve reuse and testability.

pub mod storage;
pub mod time_label;
