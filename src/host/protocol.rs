//! Wire types for the extension channel
//!
//! The extension forwards WebExtension events as tagged JSON frames and
//! answers attachment-fetch requests in-band. Field names follow the
//! WebExtension camelCase convention so the extension side can relay event
//! objects mostly untouched.

use crate::core::state::DisplayedMessage;
use crate::mail::AttachmentRef;
use serde::{Deserialize, Serialize};

/// Event pushed by the extension
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    /// The set of messages shown in the active tab changed
    MessagesDisplayed {
        #[serde(default)]
        messages: Vec<DisplayedMessage>,
    },

    /// A context-menu entry was clicked on a message attachment
    #[serde(rename_all = "camelCase")]
    MenuClicked {
        menu_item_id: String,
        #[serde(default)]
        attachments: Vec<AttachmentRef>,
    },
}

/// Request sent back to the extension to retrieve attachment bytes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest<'a> {
    pub request: &'static str,
    pub id: u64,
    pub message_id: &'a str,
    pub part_name: &'a str,
}

pub const FETCH_ATTACHMENT: &str = "fetch-attachment";

impl<'a> FetchRequest<'a> {
    pub fn new(id: u64, message_id: &'a str, part_name: &'a str) -> Self {
        Self {
            request: FETCH_ATTACHMENT,
            id,
            message_id,
            part_name,
        }
    }
}

/// Reply to a [`FetchRequest`]; carries base64 content or an error string
#[derive(Debug, Deserialize)]
pub struct FetchReply {
    pub reply: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Any frame the extension may send
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    Reply(FetchReply),
    Event(HostEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_displayed_parses() {
        let json = r#"{"event":"messages-displayed","messages":[{"id":"42"},{"id":"43"}]}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        match event {
            HostEvent::MessagesDisplayed { messages } => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[0].id, "42");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_menu_clicked_parses_camel_case() {
        let json = r#"{"event":"menu-clicked","menuItemId":"open-in-dvm","attachments":[{"partName":"1.2","name":"invoice.pdf"}]}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        match event {
            HostEvent::MenuClicked { menu_item_id, attachments } => {
                assert_eq!(menu_item_id, "open-in-dvm");
                assert_eq!(attachments[0].part_name, "1.2");
                assert_eq!(attachments[0].name, "invoice.pdf");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_menu_clicked_without_attachments() {
        let json = r#"{"event":"menu-clicked","menuItemId":"open-in-dvm"}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, HostEvent::MenuClicked { attachments, .. } if attachments.is_empty()));
    }

    #[test]
    fn test_reply_routes_before_events() {
        let json = r#"{"reply":7,"content":"aGk="}"#;
        let incoming: Incoming = serde_json::from_str(json).unwrap();
        assert!(matches!(incoming, Incoming::Reply(FetchReply { reply: 7, .. })));

        let json = r#"{"event":"messages-displayed","messages":[]}"#;
        let incoming: Incoming = serde_json::from_str(json).unwrap();
        assert!(matches!(incoming, Incoming::Event(_)));
    }

    #[test]
    fn test_fetch_request_shape() {
        let request = FetchRequest::new(3, "42", "1.2");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "request": "fetch-attachment",
                "id": 3,
                "messageId": "42",
                "partName": "1.2",
            })
        );
    }
}
