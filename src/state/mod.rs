//! Widget state modules.
//!
//! DESIGN
//! ======
//! State is split by concern (`chat` history, `session` busy flag, `tabs`
//! layout) so the controller composes small models that can each be tested
//! without a page.

pub mod chat;
pub mod session;
pub mod tabs;
