//! Chat controller: owns the conversation and drives the page through the
//! injected seams.
//!
//! DESIGN
//! ======
//! Submission is split into [`ChatController::begin_submit`] and
//! [`ChatController::finish_submit`] so the browser binding can hold the
//! controller in an `Rc<RefCell<_>>` without keeping it borrowed across the
//! request await. [`ChatController::submit`] chains both for callers that own
//! the controller outright.
//!
//! The busy flag in [`SessionState`] is the only concurrency control: a
//! second submit while one is in flight is dropped, and the flag is released
//! on every outcome.
//!
//! ERROR HANDLING
//! ==============
//! This is the boundary where errors stop. Request failures become the
//! configured bot error message; storage failures are logged and otherwise
//! ignored.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use chrono::{DateTime, Utc};

use crate::config::WidgetConfig;
use crate::error::ChatError;
use crate::net::api::ChatTransport;
use crate::net::types::{ChatReply, ChatRequest};
use crate::state::chat::{ChatEntry, ConversationLog};
use crate::state::session::SessionState;
use crate::state::tabs::TabSet;
use crate::surface::ChatSurface;
use crate::util::storage::KeyValueStore;
use crate::util::time_label;

/// Where the controller is in its page lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; the log is a placeholder until `initialize`.
    #[default]
    Created,
    Active,
    /// Torn down; events and late replies are ignored.
    Disposed,
}

/// What a keydown in the input field should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Enter without Shift: submit, suppressing the default.
    Submit,
    /// Anything else, including Shift+Enter.
    PassThrough,
}

/// Map a keydown in the input field to an action.
#[must_use]
pub fn key_action(key: &str, shift: bool) -> KeyAction {
    if key == "Enter" && !shift {
        KeyAction::Submit
    } else {
        KeyAction::PassThrough
    }
}

#[derive(Debug)]
pub struct ChatController<S, U> {
    config: WidgetConfig,
    store: S,
    surface: U,
    tabs: TabSet,
    log: ConversationLog,
    session: SessionState,
    lifecycle: Lifecycle,
    clock: fn() -> DateTime<Utc>,
}

impl<S, U> ChatController<S, U>
where
    S: KeyValueStore,
    U: ChatSurface,
{
    pub fn new(config: WidgetConfig, store: S, surface: U) -> Self {
        let clock: fn() -> DateTime<Utc> = time_label::now_utc;
        let log = ConversationLog::with_welcome(&config.welcome_text, clock());
        Self {
            config,
            store,
            surface,
            tabs: TabSet::default(),
            log,
            session: SessionState::default(),
            lifecycle: Lifecycle::Created,
            clock,
        }
    }

    /// Tab buttons and panels the page offers.
    #[must_use]
    pub fn with_tabs(mut self, tabs: TabSet) -> Self {
        self.tabs = tabs;
        self
    }

    /// Replace the timestamp source for new entries.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Restore the persisted conversation, render it and focus the input.
    ///
    /// Only the first call has any effect.
    pub fn initialize(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        self.log = self.restore_log();
        for entry in self.log.after_welcome() {
            self.surface.render_entry(entry);
        }
        self.lifecycle = Lifecycle::Active;
        self.surface.focus_input();
        log::info!("chat widget ready with {} message(s)", self.log.len());
    }

    /// Validate the input and start an exchange.
    ///
    /// Returns the request to send, or `None` when the input is blank, a
    /// request is already in flight, or the controller is not active.
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        if self.lifecycle != Lifecycle::Active {
            return None;
        }
        let message = self.surface.read_input().trim().to_owned();
        if message.is_empty() || !self.session.begin_request() {
            return None;
        }

        let entry = ChatEntry::user(message.clone(), (self.clock)());
        self.surface.render_entry(&entry);
        self.log.push(entry);
        self.surface.clear_input();
        self.surface.show_typing();

        Some(ChatRequest { message })
    }

    /// Settle the in-flight exchange with its outcome.
    pub fn finish_submit(&mut self, outcome: Result<ChatReply, ChatError>) {
        if !self.session.awaiting_response() {
            log::warn!("chat reply arrived with no request in flight; dropped");
            return;
        }
        if self.lifecycle == Lifecycle::Disposed {
            self.session.settle();
            log::debug!("chat reply arrived after dispose; dropped");
            return;
        }

        self.surface.hide_typing();
        match outcome {
            Ok(reply) => {
                log::debug!(
                    "chat reply intent={:?} disaster_type={:?} location={:?}",
                    reply.intent,
                    reply.disaster_type,
                    reply.location
                );
                let entry = ChatEntry::bot(reply.response, reply.intent, (self.clock)());
                self.append(entry);
                self.persist();
            }
            Err(e) => {
                if let ChatError::Status { detail: Some(detail), .. } = &e {
                    log::error!("{e}: {detail}");
                } else {
                    log::error!("{e}");
                }
                let entry = ChatEntry::bot(self.config.error_text.clone(), None, (self.clock)());
                self.append(entry);
            }
        }

        self.session.settle();
        self.surface.focus_input();
    }

    /// Run a full exchange against `transport`.
    ///
    /// Returns `false` when the submit was rejected and nothing was sent.
    pub async fn submit<T>(&mut self, transport: &T) -> bool
    where
        T: ChatTransport + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let outcome = transport.send(&request).await;
        self.finish_submit(outcome);
        true
    }

    /// Reset the conversation to the welcome entry.
    ///
    /// Asks for confirmation when there is history to lose. Returns whether
    /// the conversation was cleared.
    pub fn clear(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        if self.log.has_history() && !self.surface.confirm(&self.config.clear_prompt) {
            return false;
        }

        self.surface.clear_rendered();
        self.log.truncate_to_welcome();
        if let Err(e) = self.store.delete(&self.config.storage_key) {
            log::error!("removing chat history failed: {e}");
        }
        log::info!("chat history cleared");
        true
    }

    /// Show the tab `tab_id` and its `<tab_id>-content` panel, hiding the rest.
    pub fn switch_tab(&mut self, tab_id: &str) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        let activation = self.tabs.activation(tab_id);
        for (index, active) in activation.buttons.into_iter().enumerate() {
            self.surface.set_tab_button_active(index, active);
        }
        for (index, active) in activation.panels.into_iter().enumerate() {
            self.surface.set_tab_panel_active(index, active);
        }
    }

    /// Tear down: hide a pending typing indicator and ignore further events.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        if self.session.awaiting_response() {
            self.surface.hide_typing();
        }
        self.lifecycle = Lifecycle::Disposed;
        log::debug!("chat widget disposed");
    }

    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    #[must_use]
    pub fn is_awaiting_response(&self) -> bool {
        self.session.awaiting_response()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    fn append(&mut self, entry: ChatEntry) {
        self.surface.render_entry(&entry);
        self.log.push(entry);
    }

    fn persist(&mut self) {
        let saved = self
            .log
            .encode()
            .and_then(|raw| self.store.set(&self.config.storage_key, &raw));
        if let Err(e) = saved {
            log::error!("saving chat history failed: {e}");
        }
    }

    fn restore_log(&self) -> ConversationLog {
        let key = &self.config.storage_key;
        match self.store.get(key) {
            Ok(Some(raw)) => match ConversationLog::decode(&raw) {
                Ok(log) => {
                    log::debug!("restored {} chat message(s) from {key}", log.len());
                    log
                }
                Err(e) => {
                    log::error!("loading chat history failed: {e}");
                    self.welcome_log()
                }
            },
            Ok(None) => self.welcome_log(),
            Err(e) => {
                log::error!("loading chat history failed: {e}");
                self.welcome_log()
            }
        }
    }

    fn welcome_log(&self) -> ConversationLog {
        ConversationLog::with_welcome(&self.config.welcome_text, (self.clock)())
    }
}
