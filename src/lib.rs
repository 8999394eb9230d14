//! dvm-opener
//!
//! A companion process for a mail client that opens message attachments in
//! Qubes disposable VMs.
//!
//! The mail client's extension forwards display and menu-click events over
//! the native-messaging stdio framing; this process fetches the clicked
//! attachment back over the same channel, saves it into the downloads
//! directory, and asks the registered VM-opener helper to run
//! `qvm-open-in-dvm` against the saved path.
//!
//! # Pipeline
//! - Tracks the currently displayed message ([`core::state::DisplayContext`])
//! - Handles the "Open in Qubes Disposable VM" menu click ([`menu`])
//! - Materializes attachment bytes to a local path ([`mail`])
//! - Runs one request/response round trip with the helper ([`bridge`])

pub mod bridge;
pub mod core;
pub mod dispatch;
pub mod framing;
pub mod host;
pub mod mail;
pub mod menu;

pub use core::config::Config;
pub use core::error::{ErrorCategory, OpenError};
pub use core::state::{DisplayContext, DisplayedMessage, MessageId};
pub use host::HostChannel;
pub use mail::{AttachmentRef, MaterializedFile};
