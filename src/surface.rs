//! The page as seen by the controller.
//!
//! DESIGN
//! ======
//! `ChatSurface` is the whole capability set the controller needs from the
//! UI: render an entry, toggle the typing indicator, read/clear/focus the
//! input, ask for confirmation, drop rendered history, and flip tab markers.
//! Event delivery runs the other way: the binding layer (`dom`) calls the
//! controller when the form submits, a key is pressed, or a button is clicked.

use crate::state::chat::ChatEntry;

pub trait ChatSurface {
    /// Append a message block for `entry` and scroll it into view.
    fn render_entry(&mut self, entry: &ChatEntry);

    /// Append the typing indicator after the last message.
    fn show_typing(&mut self);

    /// Remove the typing indicator. Must be a no-op when none is showing.
    fn hide_typing(&mut self);

    /// Current raw text of the input field.
    fn read_input(&self) -> String;

    fn clear_input(&mut self);

    fn focus_input(&mut self);

    /// Ask the user a yes/no question; `true` means confirmed.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Remove every rendered message except the first (welcome) one.
    fn clear_rendered(&mut self);

    /// Set the active marker of the tab button at `index` (document order).
    fn set_tab_button_active(&mut self, index: usize, active: bool);

    /// Set the active marker of the tab panel at `index` (document order).
    fn set_tab_panel_active(&mut self, index: usize, active: bool);
}
