//! [`ChatSurface`] over the page's existing chat markup.

use std::any::Any;

use leptos::prelude::*;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

use crate::components::message_block::{MessageBlock, MessageView};
use crate::components::typing_indicator::TypingIndicator;
use crate::state::chat::ChatEntry;
use crate::surface::ChatSurface;
use crate::util::time_label::local_offset_at;

const ACTIVE_CLASS: &str = "active";

/// The message field; pages use either a single-line input or a textarea.
#[derive(Clone, Debug)]
pub enum InputField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl InputField {
    fn value(&self) -> String {
        match self {
            Self::Input(el) => el.value(),
            Self::TextArea(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Self::Input(el) => el.set_value(value),
            Self::TextArea(el) => el.set_value(value),
        }
    }

    fn focus(&self) {
        let _ = match self {
            Self::Input(el) => el.focus(),
            Self::TextArea(el) => el.focus(),
        };
    }
}

pub struct DomSurface {
    input: InputField,
    messages: HtmlElement,
    tab_buttons: Vec<Element>,
    tab_panels: Vec<Element>,
    /// Mount handles of appended message blocks; dropping one unmounts it.
    rendered: Vec<Box<dyn Any>>,
    typing: Option<Box<dyn Any>>,
}

impl DomSurface {
    pub fn new(input: InputField, messages: HtmlElement, tab_buttons: Vec<Element>, tab_panels: Vec<Element>) -> Self {
        Self {
            input,
            messages,
            tab_buttons,
            tab_panels,
            rendered: Vec::new(),
            typing: None,
        }
    }

    /// Scroll the newest message into view once layout has settled.
    fn scroll_to_bottom(&self) {
        let messages = self.messages.clone();
        request_animation_frame(move || {
            messages.set_scroll_top(messages.scroll_height());
        });
    }
}

impl ChatSurface for DomSurface {
    fn render_entry(&mut self, entry: &ChatEntry) {
        let block = MessageBlock::from_entry(entry, local_offset_at(entry.timestamp));
        let handle = leptos::mount::mount_to(self.messages.clone(), move || view! { <MessageView block=block/> });
        self.rendered.push(Box::new(handle));
        self.scroll_to_bottom();
    }

    fn show_typing(&mut self) {
        let handle = leptos::mount::mount_to(self.messages.clone(), || view! { <TypingIndicator/> });
        self.typing = Some(Box::new(handle));
        self.scroll_to_bottom();
    }

    fn hide_typing(&mut self) {
        self.typing.take();
    }

    fn read_input(&self) -> String {
        self.input.value()
    }

    fn clear_input(&mut self) {
        self.input.set_value("");
    }

    fn focus_input(&mut self) {
        self.input.focus();
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }

    fn clear_rendered(&mut self) {
        self.typing.take();
        self.rendered.clear();
        // Anything else after the welcome block (server-rendered leftovers).
        while self.messages.child_element_count() > 1 {
            let Some(last) = self.messages.last_element_child() else {
                break;
            };
            last.remove();
        }
    }

    fn set_tab_button_active(&mut self, index: usize, active: bool) {
        if let Some(button) = self.tab_buttons.get(index) {
            let _ = button.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }

    fn set_tab_panel_active(&mut self, index: usize, active: bool) {
        if let Some(panel) = self.tab_panels.get(index) {
            let _ = panel.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }
}
