//! Framed channel to the mail client's extension
//!
//! One channel carries two things: events pushed by the extension and the
//! request/response pair used to fetch attachment bytes. The pipeline is
//! strictly sequential, so no background reader task exists; a fetch simply
//! reads frames until its reply shows up and buffers any events that arrive
//! in between for the next `next_event` call.

use crate::core::state::MessageId;
use crate::framing::{read_frame, write_frame};
use crate::host::protocol::{FetchRequest, HostEvent, Incoming};
use crate::mail::store::{MailStore, StoreError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

/// Bidirectional framed channel to the extension
pub struct HostChannel<R, W> {
    reader: R,
    writer: W,
    /// Events that arrived while a fetch reply was pending
    buffered: VecDeque<HostEvent>,
    next_request_id: u64,
}

impl<R, W> HostChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buffered: VecDeque::new(),
            next_request_id: 1,
        }
    }

    /// Next host event, or `None` once the extension disconnects.
    ///
    /// Frames that do not parse are logged and skipped; a malformed frame
    /// from the extension must not take the whole channel down.
    pub async fn next_event(&mut self) -> io::Result<Option<HostEvent>> {
        if let Some(event) = self.buffered.pop_front() {
            return Ok(Some(event));
        }

        loop {
            let frame = match read_frame(&mut self.reader).await? {
                Some(frame) => frame,
                None => return Ok(None),
            };

            match serde_json::from_slice::<Incoming>(&frame) {
                Ok(Incoming::Event(event)) => return Ok(Some(event)),
                Ok(Incoming::Reply(reply)) => {
                    warn!("Dropping unsolicited fetch reply {}", reply.reply);
                }
                Err(e) => {
                    warn!("Skipping unparseable frame: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl<R, W> MailStore for HostChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn fetch_attachment(
        &mut self,
        message_id: &MessageId,
        part_name: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let request = FetchRequest::new(id, message_id, part_name);
        let payload = serde_json::to_vec(&request)
            .map_err(|e| StoreError::Rejected(format!("unencodable fetch request: {}", e)))?;
        write_frame(&mut self.writer, &payload).await?;
        debug!("Fetch {} sent for message {} part {}", id, message_id, part_name);

        loop {
            let frame = match read_frame(&mut self.reader).await? {
                Some(frame) => frame,
                None => return Err(StoreError::Disconnected),
            };

            match serde_json::from_slice::<Incoming>(&frame) {
                Ok(Incoming::Reply(reply)) if reply.reply == id => {
                    if let Some(error) = reply.error {
                        return Err(StoreError::Rejected(error));
                    }
                    let content = reply
                        .content
                        .ok_or_else(|| StoreError::Rejected("reply carried no content".into()))?;
                    return BASE64.decode(content.as_bytes()).map_err(StoreError::Decode);
                }
                Ok(Incoming::Reply(reply)) => {
                    warn!("Dropping stale fetch reply {}", reply.reply);
                }
                Ok(Incoming::Event(event)) => {
                    // Deliver it on the next `next_event` call
                    self.buffered.push_back(event);
                }
                Err(e) => {
                    warn!("Skipping unparseable frame: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::write_frame as send;
    use serde_json::json;

    async fn frame(buf: &mut Vec<u8>, value: serde_json::Value) {
        send(buf, value.to_string().as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_next_event_parses_and_skips_garbage() {
        let mut incoming = Vec::new();
        send(&mut incoming, b"not json").await.unwrap();
        frame(&mut incoming, json!({"event": "messages-displayed", "messages": [{"id": "9"}]})).await;

        let mut channel = HostChannel::new(incoming.as_slice(), Vec::new());
        let event = channel.next_event().await.unwrap().unwrap();
        assert!(matches!(event, HostEvent::MessagesDisplayed { ref messages } if messages[0].id == "9"));
        assert!(channel.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_decodes_content_and_buffers_events() {
        let mut incoming = Vec::new();
        // An event sneaks in ahead of the reply
        frame(&mut incoming, json!({"event": "messages-displayed", "messages": []})).await;
        frame(&mut incoming, json!({"reply": 1, "content": BASE64.encode(b"pdf bytes")})).await;

        let mut channel = HostChannel::new(incoming.as_slice(), Vec::new());
        let content = channel
            .fetch_attachment(&"42".to_string(), "1.2")
            .await
            .unwrap();
        assert_eq!(content, b"pdf bytes");

        // The interleaved event is delivered afterwards
        let event = channel.next_event().await.unwrap().unwrap();
        assert!(matches!(event, HostEvent::MessagesDisplayed { ref messages } if messages.is_empty()));
    }

    #[tokio::test]
    async fn test_fetch_writes_well_formed_request() {
        let incoming = {
            let mut buf = Vec::new();
            frame(&mut buf, json!({"reply": 1, "content": ""})).await;
            buf
        };

        let mut channel = HostChannel::new(incoming.as_slice(), Vec::new());
        channel.fetch_attachment(&"42".to_string(), "1.2").await.unwrap();

        let mut sent = channel.writer.as_slice();
        let request = read_frame(&mut sent).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&request).unwrap();
        assert_eq!(
            value,
            json!({"request": "fetch-attachment", "id": 1, "messageId": "42", "partName": "1.2"})
        );
    }

    #[tokio::test]
    async fn test_fetch_error_reply_is_rejected() {
        let mut incoming = Vec::new();
        frame(&mut incoming, json!({"reply": 1, "error": "no such part"})).await;

        let mut channel = HostChannel::new(incoming.as_slice(), Vec::new());
        let err = channel
            .fetch_attachment(&"42".to_string(), "bogus")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(ref msg) if msg == "no such part"));
    }

    #[tokio::test]
    async fn test_fetch_eof_is_disconnected() {
        let mut channel = HostChannel::new(&[][..], Vec::new());
        let err = channel
            .fetch_attachment(&"42".to_string(), "1.2")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Disconnected));
    }
}
