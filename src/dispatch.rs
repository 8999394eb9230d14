//! Event dispatch loop
//!
//! Reads host events off the extension channel and drives the pipeline.
//! Strictly sequential: a menu click is handled to completion before the
//! next frame is read, so invocations can never overlap. This is also the
//! only place pipeline outcomes get logged; the log is the sole error
//! surface, and no failure ever propagates back to the host.

use crate::bridge::launcher::VmLauncher;
use crate::core::error::ErrorCategory;
use crate::core::state::DisplayContext;
use crate::host::channel::HostChannel;
use crate::host::protocol::HostEvent;
use crate::mail::downloads::DownloadManager;
use crate::menu::{self, ClickOutcome};
use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

/// Run the dispatch loop until the extension disconnects.
pub async fn run<R, W, D, L>(
    channel: &mut HostChannel<R, W>,
    ctx: &mut DisplayContext,
    downloads: &D,
    launcher: &L,
) -> Result<()>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    D: DownloadManager,
    L: VmLauncher,
{
    while let Some(event) = channel.next_event().await? {
        match event {
            HostEvent::MessagesDisplayed { messages } => {
                ctx.record_displayed(&messages);
                match ctx.current() {
                    Some(id) => debug!("Currently displayed message: {}", id),
                    None => debug!("No message is currently displayed"),
                }
            }

            HostEvent::MenuClicked { menu_item_id, attachments } => {
                let result =
                    menu::handle_menu_click(ctx, &menu_item_id, &attachments, channel, downloads, launcher)
                        .await;

                match result {
                    Ok(ClickOutcome::Ignored) => {
                        debug!("Ignoring click on foreign menu item {:?}", menu_item_id);
                    }
                    Ok(ClickOutcome::Opened { file, response }) => {
                        info!(
                            "Opened {} in disposable VM, helper response: {}",
                            file.path.display(),
                            response
                        );
                    }
                    Err(e) if e.category() == ErrorCategory::MissingInput => {
                        warn!("Menu action aborted: {}", e);
                    }
                    Err(e) => {
                        error!("Attachment hand-off failed: {:#}", anyhow::Error::new(e));
                    }
                }
            }
        }
    }

    Ok(())
}
