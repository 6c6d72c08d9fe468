use super::*;

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::TimeZone;
use futures::executor::block_on;

use crate::error::StorageError;
use crate::state::chat::Sender;
use crate::util::storage::{MemoryStore, UnavailableStore};

const KEY: &str = "chatHistory";

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 14, 15, 7, 0).unwrap()
}

// =============================================================
// Fakes
// =============================================================

/// Records everything the controller asks of the page.
#[derive(Debug, Default)]
struct RecordingSurface {
    rendered: Vec<ChatEntry>,
    typing_visible: bool,
    typing_shown: usize,
    input: String,
    focus_count: usize,
    confirm_answer: bool,
    confirm_prompts: Vec<String>,
    clear_calls: usize,
    buttons: Vec<bool>,
    panels: Vec<bool>,
}

impl RecordingSurface {
    fn with_tabs(buttons: usize, panels: usize) -> Self {
        Self { buttons: vec![false; buttons], panels: vec![false; panels], ..Self::default() }
    }
}

impl ChatSurface for RecordingSurface {
    fn render_entry(&mut self, entry: &ChatEntry) {
        self.rendered.push(entry.clone());
    }

    fn show_typing(&mut self) {
        self.typing_visible = true;
        self.typing_shown += 1;
    }

    fn hide_typing(&mut self) {
        self.typing_visible = false;
    }

    fn read_input(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        self.focus_count += 1;
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.confirm_prompts.push(prompt.to_owned());
        self.confirm_answer
    }

    fn clear_rendered(&mut self) {
        self.clear_calls += 1;
        self.rendered.clear();
        self.typing_visible = false;
    }

    fn set_tab_button_active(&mut self, index: usize, active: bool) {
        self.buttons[index] = active;
    }

    fn set_tab_panel_active(&mut self, index: usize, active: bool) {
        self.panels[index] = active;
    }
}

/// Replays canned outcomes and records every request it is given.
#[derive(Debug, Default)]
struct ScriptedTransport {
    outcomes: RefCell<VecDeque<Result<ChatReply, ChatError>>>,
    requests: RefCell<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn replying(response: &str, intent: Option<&str>) -> Self {
        let transport = Self::default();
        transport.outcomes.borrow_mut().push_back(Ok(reply(response, intent)));
        transport
    }

    fn failing(err: ChatError) -> Self {
        let transport = Self::default();
        transport.outcomes.borrow_mut().push_back(Err(err));
        transport
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.requests.borrow_mut().push(request.clone());
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("no scripted outcome".to_owned())))
    }
}

/// Reads succeed (nothing stored); every write and delete is rejected.
#[derive(Debug, Default)]
struct FailingWriteStore {
    write_attempts: usize,
}

impl KeyValueStore for FailingWriteStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.write_attempts += 1;
        Err(StorageError::Write("quota exceeded".to_owned()))
    }

    fn delete(&mut self, _key: &str) -> Result<(), StorageError> {
        self.write_attempts += 1;
        Err(StorageError::Write("storage disabled".to_owned()))
    }
}

fn reply(response: &str, intent: Option<&str>) -> ChatReply {
    ChatReply {
        response: response.to_owned(),
        intent: intent.map(str::to_owned),
        disaster_type: None,
        location: None,
    }
}

fn controller_with(store: MemoryStore) -> ChatController<MemoryStore, RecordingSurface> {
    let mut ctrl = ChatController::new(WidgetConfig::default(), store, RecordingSurface::default())
        .with_clock(fixed_clock);
    ctrl.initialize();
    ctrl
}

fn fresh_controller() -> ChatController<MemoryStore, RecordingSurface> {
    controller_with(MemoryStore::new())
}

fn type_input(ctrl: &mut ChatController<MemoryStore, RecordingSurface>, text: &str) {
    ctrl.surface_mut().input = text.to_owned();
}

fn persisted_log(ctrl: &ChatController<MemoryStore, RecordingSurface>) -> Option<ConversationLog> {
    ctrl.store()
        .get(KEY)
        .unwrap()
        .map(|raw| ConversationLog::decode(&raw).unwrap())
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_without_history_synthesizes_welcome() {
    let ctrl = fresh_controller();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Active);
    assert_eq!(ctrl.log().len(), 1);
    let welcome = ctrl.log().welcome();
    assert_eq!(welcome.sender, Sender::Bot);
    assert_eq!(welcome.text, crate::config::DEFAULT_WELCOME_TEXT);
    assert!(welcome.intent.is_none());
    assert!(ctrl.surface().rendered.is_empty());
    assert_eq!(ctrl.surface().focus_count, 1);
    assert!(!ctrl.is_awaiting_response());
}

#[test]
fn initialize_restores_history_and_renders_all_but_welcome() {
    let mut saved = ConversationLog::with_welcome("Hello!", fixed_clock());
    saved.push(ChatEntry::user("flood in my street", fixed_clock()));
    saved.push(ChatEntry::bot("Evacuation teams are being mobilized.", Some("evacuation_request".to_owned()), fixed_clock()));
    let store = MemoryStore::with_item(KEY, &saved.encode().unwrap());

    let ctrl = controller_with(store);
    assert_eq!(ctrl.log(), &saved);
    assert_eq!(ctrl.surface().rendered, saved.after_welcome().to_vec());
}

#[test]
fn initialize_with_corrupt_history_falls_back_to_welcome() {
    let ctrl = controller_with(MemoryStore::with_item(KEY, "{not json"));
    assert_eq!(ctrl.log().len(), 1);
    assert_eq!(ctrl.log().welcome().text, crate::config::DEFAULT_WELCOME_TEXT);
    assert!(ctrl.surface().rendered.is_empty());
}

#[test]
fn initialize_with_unavailable_storage_still_starts() {
    let mut ctrl = ChatController::new(WidgetConfig::default(), UnavailableStore, RecordingSurface::default());
    ctrl.initialize();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Active);
    assert_eq!(ctrl.log().len(), 1);
}

#[test]
fn initialize_twice_does_not_render_again() {
    let mut saved = ConversationLog::with_welcome("Hello!", fixed_clock());
    saved.push(ChatEntry::user("hi", fixed_clock()));
    let mut ctrl = controller_with(MemoryStore::with_item(KEY, &saved.encode().unwrap()));
    ctrl.initialize();
    assert_eq!(ctrl.surface().rendered.len(), 1);
}

#[test]
fn events_before_initialize_are_ignored() {
    let mut ctrl = ChatController::new(WidgetConfig::default(), MemoryStore::new(), RecordingSurface::default());
    ctrl.surface_mut().input = "hello".to_owned();
    assert!(ctrl.begin_submit().is_none());
    assert!(!ctrl.clear());
}

// =============================================================
// submit
// =============================================================

#[test]
fn submit_success_appends_user_then_bot_and_persists() {
    let mut ctrl = fresh_controller();
    let transport = ScriptedTransport::replying("Shelters are located at...", Some("shelter_info"));
    type_input(&mut ctrl, "Where is the nearest shelter?");

    assert!(block_on(ctrl.submit(&transport)));

    let entries = ctrl.log().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].sender, Sender::User);
    assert_eq!(entries[1].text, "Where is the nearest shelter?");
    assert!(entries[1].intent.is_none());
    assert_eq!(entries[2].sender, Sender::Bot);
    assert_eq!(entries[2].text, "Shelters are located at...");
    assert_eq!(entries[2].intent.as_deref(), Some("shelter_info"));

    assert_eq!(transport.requests.borrow()[0].message, "Where is the nearest shelter?");
    assert_eq!(persisted_log(&ctrl).as_ref(), Some(ctrl.log()));
    assert_eq!(ctrl.surface().rendered.len(), 2);
    assert!(!ctrl.surface().typing_visible);
}

#[test]
fn begin_submit_appends_user_entry_before_request_and_shows_typing() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "  need water  ");

    let request = ctrl.begin_submit().expect("request should start");
    assert_eq!(request.message, "need water");
    assert_eq!(ctrl.log().len(), 2);
    assert_eq!(ctrl.log().last().sender, Sender::User);
    assert!(ctrl.surface().input.is_empty());
    assert!(ctrl.surface().typing_visible);
    assert!(ctrl.is_awaiting_response());
    assert!(persisted_log(&ctrl).is_none());
}

#[test]
fn submit_failure_appends_generic_error_without_intent() {
    let mut ctrl = fresh_controller();
    let transport = ScriptedTransport::failing(ChatError::Status { status: 500, detail: None });
    type_input(&mut ctrl, "help");

    assert!(block_on(ctrl.submit(&transport)));

    let last = ctrl.log().last();
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.text, "Sorry, I encountered an error. Please try again.");
    assert!(last.intent.is_none());
    assert_eq!(ctrl.log().len(), 3);
    assert!(!ctrl.surface().typing_visible);
}

#[test]
fn submit_failure_does_not_persist_error_entry() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "first");
    block_on(ctrl.submit(&ScriptedTransport::replying("ok", None)));
    let saved = persisted_log(&ctrl).unwrap();

    type_input(&mut ctrl, "second");
    block_on(ctrl.submit(&ScriptedTransport::failing(ChatError::Transport("offline".to_owned()))));

    assert_eq!(persisted_log(&ctrl).unwrap(), saved);
    assert_eq!(ctrl.log().len(), saved.len() + 2);
}

#[test]
fn busy_flag_released_and_focus_returned_on_every_outcome() {
    let mut ctrl = fresh_controller();
    assert!(!ctrl.is_awaiting_response());

    type_input(&mut ctrl, "a");
    block_on(ctrl.submit(&ScriptedTransport::replying("ok", None)));
    assert!(!ctrl.is_awaiting_response());
    let focus_after_success = ctrl.surface().focus_count;

    type_input(&mut ctrl, "b");
    block_on(ctrl.submit(&ScriptedTransport::failing(ChatError::Decode("bad".to_owned()))));
    assert!(!ctrl.is_awaiting_response());
    assert_eq!(ctrl.surface().focus_count, focus_after_success + 1);
}

#[test]
fn blank_input_is_a_noop() {
    let mut ctrl = fresh_controller();
    let transport = ScriptedTransport::replying("unused", None);

    for text in ["", "   ", "\n\t"] {
        type_input(&mut ctrl, text);
        assert!(!block_on(ctrl.submit(&transport)));
    }

    assert_eq!(ctrl.log().len(), 1);
    assert_eq!(transport.request_count(), 0);
    assert_eq!(ctrl.surface().typing_shown, 0);
}

#[test]
fn submit_while_in_flight_is_dropped() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "first");
    let first = ctrl.begin_submit();
    assert!(first.is_some());

    type_input(&mut ctrl, "second");
    assert!(ctrl.begin_submit().is_none());
    assert_eq!(ctrl.log().len(), 2);
    assert_eq!(ctrl.surface().typing_shown, 1);
    assert_eq!(ctrl.surface().input, "second");

    ctrl.finish_submit(Ok(reply("done", None)));
    assert_eq!(ctrl.log().len(), 3);
    assert!(!ctrl.is_awaiting_response());
}

#[test]
fn finish_without_request_in_flight_is_ignored() {
    let mut ctrl = fresh_controller();
    ctrl.finish_submit(Ok(reply("stray", None)));
    assert_eq!(ctrl.log().len(), 1);
    assert!(ctrl.surface().rendered.is_empty());
}

#[test]
fn sequential_submissions_each_add_exactly_two_entries() {
    let mut ctrl = fresh_controller();
    for i in 0..3 {
        type_input(&mut ctrl, &format!("message {i}"));
        block_on(ctrl.submit(&ScriptedTransport::replying("ack", Some("request_information"))));
        assert_eq!(ctrl.log().len(), 1 + 2 * (i + 1));
    }
    assert_eq!(persisted_log(&ctrl).unwrap().len(), 7);
}

// =============================================================
// key_action
// =============================================================

#[test]
fn enter_without_shift_submits() {
    assert_eq!(key_action("Enter", false), KeyAction::Submit);
}

#[test]
fn shift_enter_and_other_keys_pass_through() {
    assert_eq!(key_action("Enter", true), KeyAction::PassThrough);
    assert_eq!(key_action("a", false), KeyAction::PassThrough);
    assert_eq!(key_action("Escape", false), KeyAction::PassThrough);
}

// =============================================================
// clear
// =============================================================

#[test]
fn clear_with_only_welcome_skips_confirmation() {
    let mut ctrl = controller_with(MemoryStore::with_item(KEY, "stale"));
    assert!(ctrl.clear());
    assert!(ctrl.surface().confirm_prompts.is_empty());
    assert_eq!(ctrl.surface().clear_calls, 1);
    assert!(!ctrl.store().contains_key(KEY));
}

#[test]
fn clear_with_history_asks_and_declining_changes_nothing() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "hello");
    block_on(ctrl.submit(&ScriptedTransport::replying("hi", None)));
    let before = ctrl.log().clone();

    ctrl.surface_mut().confirm_answer = false;
    assert!(!ctrl.clear());

    assert_eq!(ctrl.surface().confirm_prompts, vec![crate::config::DEFAULT_CLEAR_PROMPT.to_owned()]);
    assert_eq!(ctrl.log(), &before);
    assert_eq!(ctrl.surface().rendered.len(), 2);
    assert_eq!(ctrl.surface().clear_calls, 0);
    assert!(ctrl.store().contains_key(KEY));
}

#[test]
fn confirmed_clear_keeps_first_entry_and_removes_persisted_key() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "hello");
    block_on(ctrl.submit(&ScriptedTransport::replying("hi", None)));
    let welcome = ctrl.log().welcome().clone();

    ctrl.surface_mut().confirm_answer = true;
    assert!(ctrl.clear());

    assert_eq!(ctrl.log().len(), 1);
    assert_eq!(ctrl.log().welcome(), &welcome);
    assert!(ctrl.surface().rendered.is_empty());
    assert!(!ctrl.store().contains_key(KEY));
    assert!(ctrl.store().is_empty());
}

#[test]
fn rejected_writes_do_not_stop_submit_or_clear() {
    let mut ctrl = ChatController::new(WidgetConfig::default(), FailingWriteStore::default(), RecordingSurface::default())
        .with_clock(fixed_clock);
    ctrl.initialize();

    ctrl.surface_mut().input = "is the bridge open?".to_owned();
    assert!(block_on(ctrl.submit(&ScriptedTransport::replying("The bridge is closed.", None))));
    assert_eq!(ctrl.log().len(), 3);
    assert!(!ctrl.is_awaiting_response());
    assert!(!ctrl.surface().typing_visible);
    assert_eq!(ctrl.store().write_attempts, 1);

    ctrl.surface_mut().confirm_answer = true;
    assert!(ctrl.clear());
    assert_eq!(ctrl.log().len(), 1);
    assert_eq!(ctrl.log().welcome().text, crate::config::DEFAULT_WELCOME_TEXT);
    assert!(ctrl.surface().rendered.is_empty());
    assert_eq!(ctrl.store().write_attempts, 2);
}

// =============================================================
// Persistence round-trip
// =============================================================

#[test]
fn persisted_log_reloads_identically_in_fresh_controller() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "Where is the nearest shelter?");
    block_on(ctrl.submit(&ScriptedTransport::replying("Shelters are located at...", Some("shelter_info"))));
    type_input(&mut ctrl, "Is the water safe?");
    block_on(ctrl.submit(&ScriptedTransport::replying("Boil water before use.", None)));
    let original = ctrl.log().clone();

    let store = ctrl.store().clone();
    let reloaded = controller_with(store);

    assert_eq!(reloaded.log().len(), original.len());
    for (a, b) in reloaded.log().entries().iter().zip(original.entries()) {
        assert_eq!(a.text, b.text);
        assert_eq!(a.sender, b.sender);
        assert_eq!(a.intent, b.intent);
    }
    assert_eq!(reloaded.surface().rendered.len(), original.len() - 1);
}

// =============================================================
// switch_tab
// =============================================================

fn tabbed_controller() -> ChatController<MemoryStore, RecordingSurface> {
    let tabs = TabSet::new(
        vec!["earthquake".to_owned(), "flood".to_owned(), "cyclone".to_owned()],
        vec!["earthquake-content".to_owned(), "flood-content".to_owned(), "cyclone-content".to_owned()],
    );
    let mut ctrl = ChatController::new(WidgetConfig::default(), MemoryStore::new(), RecordingSurface::with_tabs(3, 3))
        .with_tabs(tabs);
    ctrl.initialize();
    ctrl
}

#[test]
fn switch_tab_activates_matching_button_and_panel_only() {
    let mut ctrl = tabbed_controller();
    ctrl.switch_tab("flood");
    assert_eq!(ctrl.surface().buttons, vec![false, true, false]);
    assert_eq!(ctrl.surface().panels, vec![false, true, false]);

    ctrl.switch_tab("cyclone");
    assert_eq!(ctrl.surface().buttons, vec![false, false, true]);
    assert_eq!(ctrl.surface().panels, vec![false, false, true]);
}

#[test]
fn switch_tab_is_idempotent_and_leaves_chat_untouched() {
    let mut ctrl = tabbed_controller();
    ctrl.switch_tab("earthquake");
    ctrl.switch_tab("earthquake");
    assert_eq!(ctrl.surface().buttons, vec![true, false, false]);
    assert_eq!(ctrl.surface().panels, vec![true, false, false]);
    assert_eq!(ctrl.log().len(), 1);
}

// =============================================================
// dispose
// =============================================================

#[test]
fn dispose_hides_typing_and_drops_late_reply() {
    let mut ctrl = fresh_controller();
    type_input(&mut ctrl, "hello");
    ctrl.begin_submit().unwrap();

    ctrl.dispose();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Disposed);
    assert!(!ctrl.surface().typing_visible);

    ctrl.finish_submit(Ok(reply("late", None)));
    assert_eq!(ctrl.log().len(), 2);
    assert!(!ctrl.is_awaiting_response());
    assert!(persisted_log(&ctrl).is_none());
}

#[test]
fn disposed_controller_ignores_events() {
    let mut ctrl = tabbed_controller();
    ctrl.dispose();

    ctrl.surface_mut().input = "hello".to_owned();
    assert!(ctrl.begin_submit().is_none());
    assert!(!ctrl.clear());
    ctrl.switch_tab("flood");
    assert_eq!(ctrl.surface().buttons, vec![false, false, false]);
}
