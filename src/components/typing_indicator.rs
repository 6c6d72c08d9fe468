//! Bot-styled "typing" placeholder shown while a reply is pending.

use leptos::prelude::*;

/// Three animated dots in a bot message bubble. Never part of the history.
#[component]
pub fn TypingIndicator() -> impl IntoView {
    view! {
        <div class="message bot-message typing-indicator">
            <div class="message-content">
                <div class="typing-dots">
                    <span></span>
                    <span></span>
                    <span></span>
                </div>
            </div>
        </div>
    }
}
