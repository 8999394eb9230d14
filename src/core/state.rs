//! Display state tracking
//!
//! The mail client reports which messages are shown in the active tab; the
//! menu handler needs the first of them to resolve an attachment. The
//! context is owned by the dispatch loop and passed by reference wherever it
//! is read, so there is no free-floating global.

use serde::{Deserialize, Serialize};

/// Mail-store handle for one message
pub type MessageId = String;

/// One entry of a message-display notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayedMessage {
    /// Message identifier assigned by the mail store
    pub id: MessageId,
}

/// Tracks the currently displayed message
///
/// Overwritten on every display notification, cleared when nothing is
/// displayed. Recording cannot fail.
#[derive(Debug, Clone, Default)]
pub struct DisplayContext {
    current: Option<MessageId>,
}

impl DisplayContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a display notification: first message wins, empty clears.
    pub fn record_displayed(&mut self, messages: &[DisplayedMessage]) {
        self.current = messages.first().map(|m| m.id.clone());
    }

    /// The currently displayed message, if any
    pub fn current(&self) -> Option<&MessageId> {
        self.current.as_ref()
    }
}
