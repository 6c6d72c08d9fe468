//! Informational tab strip ("Do's and Don'ts") layout and switch rule.
//!
//! DESIGN
//! ======
//! Tabs hold no state of their own; the page's `active` class markers are the
//! only record of which tab is showing. `TabSet` just remembers which buttons
//! and panels exist so a switch can compute the full set of markers at once.

#[cfg(test)]
#[path = "tabs_test.rs"]
mod tabs_test;

/// Suffix appended to a tab id to form its panel's element id.
pub const PANEL_SUFFIX: &str = "-content";

/// Element id of the panel belonging to `tab_id`.
#[must_use]
pub fn panel_id(tab_id: &str) -> String {
    format!("{tab_id}{PANEL_SUFFIX}")
}

/// The fixed buttons and panels discovered on the page, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabSet {
    /// Tab id of each button (its `data-tab` attribute).
    buttons: Vec<String>,
    /// Element id of each panel.
    panels: Vec<String>,
}

/// Active marker for every button and panel after a switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabActivation {
    pub buttons: Vec<bool>,
    pub panels: Vec<bool>,
}

impl TabSet {
    #[must_use]
    pub fn new(buttons: Vec<String>, panels: Vec<String>) -> Self {
        Self { buttons, panels }
    }

    #[must_use]
    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    #[must_use]
    pub fn panels(&self) -> &[String] {
        &self.panels
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty() && self.panels.is_empty()
    }

    /// Markers for switching to `tab_id`. An unknown id deactivates everything.
    #[must_use]
    pub fn activation(&self, tab_id: &str) -> TabActivation {
        let target_panel = panel_id(tab_id);
        TabActivation {
            buttons: self.buttons.iter().map(|b| b == tab_id).collect(),
            panels: self.panels.iter().map(|p| *p == target_panel).collect(),
        }
    }
}
