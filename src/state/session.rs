//! Per-page session flags.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Transient busy flag serializing submissions one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    awaiting_response: bool,
}

impl SessionState {
    #[must_use]
    pub fn awaiting_response(self) -> bool {
        self.awaiting_response
    }

    /// Claim the single in-flight slot. Returns `false` if already taken.
    pub fn begin_request(&mut self) -> bool {
        if self.awaiting_response {
            return false;
        }
        self.awaiting_response = true;
        true
    }

    /// Release the slot, whatever the outcome was.
    pub fn settle(&mut self) {
        self.awaiting_response = false;
    }
}
