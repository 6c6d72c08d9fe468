//! Chat endpoint transport.
//!
//! Client-side (hydrate): a real `POST` via `gloo-net`.
//! Elsewhere: [`HttpChatTransport`] reports a transport failure, since the
//! endpoint is only reachable from the page.
//!
//! ERROR HANDLING
//! ==============
//! Every failure (network, non-2xx status, bad body) comes back as a
//! [`ChatError`]; the controller treats all of them the same way.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;

use super::types::{ChatReply, ChatRequest};
use crate::error::ChatError;

/// One request/response exchange with the chat endpoint.
///
/// Futures are `!Send`: the browser event loop is single-threaded.
#[async_trait(?Send)]
pub trait ChatTransport {
    /// Send `request` and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] when the request fails in any way.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// `POST`s JSON to a fixed endpoint path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpChatTransport {
    endpoint: String,
}

impl HttpChatTransport {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::post(&self.endpoint)
                .json(request)
                .map_err(|e| ChatError::Transport(e.to_string()))?
                .send()
                .await
                .map_err(|e| ChatError::Transport(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| ChatError::Transport(e.to_string()))?;
            super::types::classify_response(status, &body)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(ChatError::Transport(format!("{} is only reachable from the browser", self.endpoint)))
        }
    }
}
