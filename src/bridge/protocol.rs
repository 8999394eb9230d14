//! Launch request payload for the VM-opener helper
//!
//! The helper receives exactly one framed message per invocation: a fixed
//! command path and a single-element argument list holding the saved file.
//! Its response is opaque to this process.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One launch request for the helper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Absolute command path the helper executes
    pub command: String,
    /// Sole argument: the materialized file path
    pub args: Vec<String>,
}

impl LaunchRequest {
    pub fn new(command: &str, path: &Path) -> Self {
        Self {
            command: command.to_string(),
            args: vec![path.to_string_lossy().into_owned()],
        }
    }
}
