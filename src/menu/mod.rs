//! Context-menu handler
//!
//! The one user-visible operation: a right click on a message attachment,
//! handed off through the mail store, the download manager, and the VM
//! bridge in that order. All failures come back as [`OpenError`] values for
//! the dispatch layer to report; nothing is logged away down here.

use crate::bridge::launcher::VmLauncher;
use crate::core::error::OpenError;
use crate::core::state::DisplayContext;
use crate::mail::downloads::DownloadManager;
use crate::mail::store::MailStore;
use crate::mail::{materialize, AttachmentRef, MaterializedFile};
use serde_json::Value;
use tracing::debug;

/// Identifier of the context-menu entry registered by the extension
pub const MENU_ITEM_ID: &str = "open-in-dvm";

/// Title of the context-menu entry
pub const MENU_TITLE: &str = "Open in Qubes Disposable VM";

/// Result of one handled menu click
#[derive(Debug)]
pub enum ClickOutcome {
    /// The click belonged to some other menu entry
    Ignored,
    /// The attachment was materialized and handed to the VM bridge
    Opened {
        file: MaterializedFile,
        /// Raw helper response, opaque to this process
        response: Value,
    },
}

/// Handle one menu click against the current display context.
///
/// The VM bridge is never invoked without both a non-empty part identifier
/// and a known current message; those checks abort with no side effect.
pub async fn handle_menu_click(
    ctx: &DisplayContext,
    menu_item_id: &str,
    attachments: &[AttachmentRef],
    store: &mut dyn MailStore,
    downloads: &dyn DownloadManager,
    launcher: &dyn VmLauncher,
) -> Result<ClickOutcome, OpenError> {
    if menu_item_id != MENU_ITEM_ID {
        return Ok(ClickOutcome::Ignored);
    }

    let attachment = attachments.first().ok_or(OpenError::NoAttachments)?;
    if attachments.len() > 1 {
        // Known limitation: no disambiguation UI, the first attachment wins.
        debug!("{} attachments in context, opening the first", attachments.len());
    }

    if attachment.part_name.is_empty() {
        return Err(OpenError::MissingPartName {
            name: attachment.name.clone(),
        });
    }

    let message_id = ctx.current().ok_or(OpenError::NoDisplayedMessage)?;

    let file = materialize(store, downloads, message_id, &attachment.part_name, &attachment.name).await?;

    let response = launcher.open(&file.path).await?;

    Ok(ClickOutcome::Opened { file, response })
}
