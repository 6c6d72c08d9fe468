//! # relief-chat
//!
//! Browser chat widget for the Disaster Relief Assistant.
//!
//! The crate owns the client-side conversation: it renders messages into the
//! page's existing chat markup, mirrors the history to `localStorage`, shows a
//! typing indicator while the `/api/chat` endpoint works, and switches the
//! informational tabs next to the chat.
//!
//! ARCHITECTURE
//! ============
//! `controller::ChatController` holds all behavior and talks to the outside
//! world only through three injected seams: `surface::ChatSurface` (the
//! page), `util::storage::KeyValueStore` (persistence) and
//! `net::api::ChatTransport` (the endpoint). Browser implementations of the
//! seams live behind the `hydrate` feature; without it the crate builds as a
//! plain library and the controller is exercised natively in tests.

pub mod components;
pub mod config;
pub mod controller;
#[cfg(feature = "hydrate")]
pub mod dom;
pub mod error;
pub mod net;
pub mod state;
pub mod surface;
pub mod util;

pub use config::WidgetConfig;
pub use controller::ChatController;
pub use error::{ChatError, ConfigError, StorageError};

/// WASM entry point: install console logging and mount the widget once the
/// document is ready.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    dom::start_when_ready();
}

/// Detach the mounted widget from the page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn dispose() {
    dom::dispose_mounted();
}
