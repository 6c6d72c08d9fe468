//! Widget configuration: endpoint, storage key, element ids and fixed texts.
//!
//! Defaults match the page markup shipped with the assistant. A host page may
//! override a few of them with `data-*` attributes on the message container,
//! which `dom` feeds through [`WidgetConfig::from_lookup`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use log::LevelFilter;

use crate::error::ConfigError;

pub const DEFAULT_CHAT_ENDPOINT: &str = "/api/chat";
pub const DEFAULT_STORAGE_KEY: &str = "chatHistory";
pub const DEFAULT_WELCOME_TEXT: &str = "Hello! I'm the Disaster Relief Assistant. How can I help you today?";
pub const DEFAULT_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";
pub const DEFAULT_CLEAR_PROMPT: &str = "Are you sure you want to clear the chat history?";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Ids and class names of the page elements the widget drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub form: String,
    pub input: String,
    pub messages: String,
    pub clear_button: String,
    /// Class shared by every tab button; the tab id sits in `data-tab`.
    pub tab_button_class: String,
    /// Class shared by every tab panel; a panel's id is `<tab>-content`.
    pub tab_panel_class: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form: "message-form".to_owned(),
            input: "user-input".to_owned(),
            messages: "chat-messages".to_owned(),
            clear_button: "clear-chat".to_owned(),
            tab_button_class: "tab-btn".to_owned(),
            tab_panel_class: "tab-content".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub endpoint: String,
    pub storage_key: String,
    pub welcome_text: String,
    pub error_text: String,
    pub clear_prompt: String,
    pub elements: ElementIds,
    pub log_level: LevelFilter,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            welcome_text: DEFAULT_WELCOME_TEXT.to_owned(),
            error_text: DEFAULT_ERROR_TEXT.to_owned(),
            clear_prompt: DEFAULT_CLEAR_PROMPT.to_owned(),
            elements: ElementIds::default(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl WidgetConfig {
    /// Build config from a key lookup, falling back to defaults.
    ///
    /// Optional keys:
    /// - `chat-endpoint`: absolute path or `http(s)://` URL
    /// - `storage-key`: non-blank storage key
    /// - `log-level`: `off`, `error`, `warn`, `info`, `debug` or `trace`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first override that does not
    /// parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("chat-endpoint") {
            config.endpoint = parse_endpoint(&raw)?;
        }
        if let Some(raw) = lookup("storage-key") {
            let key = raw.trim();
            if key.is_empty() {
                return Err(ConfigError::Invalid { key: "storage-key", value: raw });
            }
            config.storage_key = key.to_owned();
        }
        if let Some(raw) = lookup("log-level") {
            config.log_level = raw
                .trim()
                .parse::<LevelFilter>()
                .map_err(|_| ConfigError::Invalid { key: "log-level", value: raw.clone() })?;
        }

        Ok(config)
    }
}

fn parse_endpoint(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let valid = trimmed.starts_with('/') || trimmed.starts_with("http://") || trimmed.starts_with("https://");
    if !valid {
        return Err(ConfigError::Invalid { key: "chat-endpoint", value: raw.to_owned() });
    }
    Ok(trimmed.to_owned())
}
