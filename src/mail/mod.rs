//! Mail module - attachment references and materialization

pub mod downloads;
pub mod store;

pub use downloads::{DownloadManager, FsDownloadManager};
pub use store::MailStore;

use crate::core::error::OpenError;
use crate::core::state::MessageId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Attachment metadata carried by a menu-click event
///
/// Ephemeral; scoped to the handling of one click.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// Mail-store handle for the attachment within the message MIME tree
    #[serde(default)]
    pub part_name: String,
    /// Display filename of the attachment
    #[serde(default)]
    pub name: String,
}

/// An attachment persisted to the local filesystem, ready for hand-off
#[derive(Debug, Clone)]
pub struct MaterializedFile {
    /// Resolved path reported by the download subsystem
    pub path: PathBuf,
    /// Originating attachment filename
    pub filename: String,
}

/// Fetch an attachment's bytes and persist them under the original filename.
///
/// Any failure here must prevent the VM bridge from being invoked; the
/// caller gets the failure category through [`OpenError`].
pub async fn materialize(
    store: &mut dyn MailStore,
    downloads: &dyn DownloadManager,
    message_id: &MessageId,
    part_name: &str,
    filename: &str,
) -> Result<MaterializedFile, OpenError> {
    let content = store
        .fetch_attachment(message_id, part_name)
        .await
        .map_err(OpenError::ContentFetch)?;

    let path = downloads.save(&content, filename).await?;

    Ok(MaterializedFile {
        path,
        filename: filename.to_string(),
    })
}
