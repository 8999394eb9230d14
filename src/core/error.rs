//! Pipeline error taxonomy
//!
//! Errors are returned up to the dispatch layer, which decides how to report
//! them; core logic never logs and never panics on a failed invocation.

use crate::bridge::launcher::LaunchError;
use crate::mail::downloads::DownloadError;
use crate::mail::store::StoreError;
use thiserror::Error;

/// Failure of one menu-click invocation
#[derive(Debug, Error)]
pub enum OpenError {
    /// Menu context carried no attachments
    #[error("no attachments in the menu context")]
    NoAttachments,

    /// Attachment reference has an empty part identifier
    #[error("attachment {name:?} has no part identifier")]
    MissingPartName { name: String },

    /// No message is currently displayed
    #[error("no message is currently displayed")]
    NoDisplayedMessage,

    /// Attachment content retrieval failed
    #[error("attachment content retrieval failed")]
    ContentFetch(#[source] StoreError),

    /// Persisting the attachment locally failed
    #[error("attachment download failed")]
    Download(#[from] DownloadError),

    /// The VM-opener helper round trip failed
    #[error("disposable VM launch failed")]
    Launch(#[from] LaunchError),
}

/// Coarse failure class, used by the dispatch layer to pick a log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected synchronously before any side effect
    MissingInput,
    /// A host API rejected an asynchronous operation
    HostApi,
}

impl OpenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OpenError::NoAttachments
            | OpenError::MissingPartName { .. }
            | OpenError::NoDisplayedMessage => ErrorCategory::MissingInput,
            OpenError::ContentFetch(_) | OpenError::Download(_) | OpenError::Launch(_) => {
                ErrorCategory::HostApi
            }
        }
    }
}
