//! Mail store seam
//!
//! The mail store lives on the other side of the extension channel; this
//! trait is the only way the pipeline reaches it, which keeps the handler
//! testable without a mail client attached.

use crate::core::state::MessageId;
use async_trait::async_trait;
use thiserror::Error;

/// Attachment content retrieval failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the channel failed
    #[error("extension channel transport failed")]
    Transport(#[from] std::io::Error),

    /// The channel closed before the reply arrived
    #[error("extension channel closed before the fetch reply arrived")]
    Disconnected,

    /// The mail store reported a failure for this fetch
    #[error("mail store rejected the fetch: {0}")]
    Rejected(String),

    /// The reply content was not valid base64
    #[error("fetch reply carried undecodable content")]
    Decode(#[source] base64::DecodeError),
}

/// Read access to message attachments
#[async_trait]
pub trait MailStore {
    /// Retrieve the binary content of one attachment part.
    async fn fetch_attachment(
        &mut self,
        message_id: &MessageId,
        part_name: &str,
    ) -> Result<Vec<u8>, StoreError>;
}
