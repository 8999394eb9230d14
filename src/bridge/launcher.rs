//! VM-opener helper invocation
//!
//! One round trip per invocation: spawn the registered helper, send it a
//! single framed [`LaunchRequest`], read a single framed response. No retry.
//! The response payload is opaque and returned to the caller as-is.

use crate::bridge::manifest;
use crate::bridge::protocol::LaunchRequest;
use crate::core::config::BridgeConfig;
use crate::framing::{read_frame, write_frame};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Helper round-trip failures
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Spawning the helper process failed
    #[error("failed to spawn VM-opener helper {helper:?}")]
    Spawn {
        helper: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The launch request could not be serialized
    #[error("launch request could not be encoded")]
    Encode(#[source] serde_json::Error),

    /// Writing the request to the helper failed
    #[error("failed to send the launch request to the helper")]
    Send(#[source] io::Error),

    /// Reading the helper's response failed
    #[error("failed to read the helper response")]
    Receive(#[source] io::Error),

    /// The helper exited without sending a response frame
    #[error("helper closed the channel without responding")]
    NoResponse,

    /// The helper's response was not valid JSON
    #[error("helper response was not valid JSON")]
    Decode(#[source] serde_json::Error),

    /// The round trip did not finish in time
    #[error("helper did not respond within {0:?}")]
    Timeout(Duration),
}

/// Opens a local file in a disposable VM
#[async_trait]
pub trait VmLauncher {
    /// One request/response round trip for `path`. The returned payload is
    /// the helper's raw response, logged by the caller and not interpreted.
    async fn open(&self, path: &Path) -> Result<Value, LaunchError>;
}

/// Launcher backed by the registered native-messaging helper process
#[derive(Debug, Clone)]
pub struct NativeBridge {
    helper: PathBuf,
    command: String,
    timeout: Option<Duration>,
}

impl NativeBridge {
    pub fn new(helper: PathBuf, command: String, timeout: Option<Duration>) -> Self {
        Self {
            helper,
            command,
            timeout,
        }
    }

    /// Build from configuration, resolving the helper through its host
    /// manifest unless an explicit path is configured.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let helper = match &config.host_path {
            Some(path) => path.clone(),
            None => manifest::resolve_host_path(&config.host_name)?,
        };
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Ok(Self::new(helper, config.command.clone(), timeout))
    }

    async fn round_trip(&self, path: &Path) -> Result<Value, LaunchError> {
        let mut child = Command::new(&self.helper)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                helper: self.helper.clone(),
                source,
            })?;

        let request = LaunchRequest::new(&self.command, path);
        let payload = serde_json::to_vec(&request).map_err(LaunchError::Encode)?;

        // Piped handles are present right after a successful spawn; a helper
        // closing them early surfaces as a Send/Receive error below.
        let mut stdin = child.stdin.take().ok_or(LaunchError::NoResponse)?;
        let mut stdout = child.stdout.take().ok_or(LaunchError::NoResponse)?;

        write_frame(&mut stdin, &payload).await.map_err(LaunchError::Send)?;
        debug!("Launch request sent to {}", self.helper.display());

        let frame = read_frame(&mut stdout)
            .await
            .map_err(LaunchError::Receive)?
            .ok_or(LaunchError::NoResponse)?;

        serde_json::from_slice(&frame).map_err(LaunchError::Decode)
    }
}

#[async_trait]
impl VmLauncher for NativeBridge {
    async fn open(&self, path: &Path) -> Result<Value, LaunchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.round_trip(path))
                .await
                .map_err(|_| LaunchError::Timeout(limit))?,
            None => self.round_trip(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_disables() {
        let config = BridgeConfig {
            host_path: Some(PathBuf::from("/bin/true")),
            timeout_ms: 0,
            ..BridgeConfig::default()
        };
        let bridge = NativeBridge::from_config(&config).unwrap();
        assert!(bridge.timeout.is_none());
        assert_eq!(bridge.helper, PathBuf::from("/bin/true"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_round_trip_with_echoing_helper() {
        // `cat` frames our own request straight back, which is a valid
        // opaque response.
        let bridge = NativeBridge::new(
            PathBuf::from("/bin/cat"),
            "/usr/bin/qvm-open-in-dvm".to_string(),
            Some(Duration::from_secs(5)),
        );

        let response = bridge.open(Path::new("/tmp/invoice.pdf")).await.unwrap();
        assert_eq!(response["command"], "/usr/bin/qvm-open-in-dvm");
        assert_eq!(response["args"], serde_json::json!(["/tmp/invoice.pdf"]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_helper_is_no_response() {
        let bridge = NativeBridge::new(
            PathBuf::from("/bin/true"),
            "/usr/bin/qvm-open-in-dvm".to_string(),
            Some(Duration::from_secs(5)),
        );

        let err = bridge.open(Path::new("/tmp/x")).await.unwrap_err();
        assert!(matches!(err, LaunchError::NoResponse | LaunchError::Send(_)));
    }

    #[tokio::test]
    async fn test_missing_helper_is_spawn_error() {
        let bridge = NativeBridge::new(
            PathBuf::from("/nonexistent/helper"),
            "/usr/bin/qvm-open-in-dvm".to_string(),
            None,
        );

        let err = bridge.open(Path::new("/tmp/x")).await.unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }
}
