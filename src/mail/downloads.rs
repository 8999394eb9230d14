//! Download persistence
//!
//! Saves attachment bytes under their original filename without prompting,
//! the way the mail client's own download subsystem would, and reports the
//! resolved path back for the hand-off.

use crate::core::config::DownloadsConfig;
use async_trait::async_trait;
use directories::UserDirs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// How many `name (n).ext` candidates to try before giving up
const MAX_COLLISION_ATTEMPTS: u32 = 1000;

/// Download persistence failures
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Writing the file failed
    #[error("writing {filename:?} to the download directory failed")]
    Request {
        filename: String,
        #[source]
        source: io::Error,
    },

    /// The written file could not be resolved afterwards
    #[error("no download record found for {filename:?}")]
    Lookup {
        filename: String,
        #[source]
        source: io::Error,
    },
}

/// Persists attachment content and resolves the final path
#[async_trait]
pub trait DownloadManager {
    /// Save `content` under `filename`, returning the resolved path.
    async fn save(&self, content: &[u8], filename: &str) -> Result<PathBuf, DownloadError>;
}

/// Filesystem-backed download manager
#[derive(Debug, Clone)]
pub struct FsDownloadManager {
    dir: PathBuf,
}

impl FsDownloadManager {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Build from configuration: configured dir, else the platform download
    /// directory, else the system temp dir.
    pub fn from_config(config: &DownloadsConfig) -> Self {
        let dir = config
            .dir
            .clone()
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
            .unwrap_or_else(std::env::temp_dir);
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick a non-colliding path for `filename` inside the download dir.
    async fn target_path(&self, filename: &str) -> Result<PathBuf, DownloadError> {
        let safe = sanitize_filename(filename);

        let mut candidate = self.dir.join(&safe);
        for n in 1..=MAX_COLLISION_ATTEMPTS {
            match tokio::fs::try_exists(&candidate).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => candidate = self.dir.join(numbered_name(&safe, n)),
                Err(source) => {
                    return Err(DownloadError::Request {
                        filename: filename.to_string(),
                        source,
                    })
                }
            }
        }

        Err(DownloadError::Request {
            filename: filename.to_string(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "too many name collisions"),
        })
    }
}

#[async_trait]
impl DownloadManager for FsDownloadManager {
    async fn save(&self, content: &[u8], filename: &str) -> Result<PathBuf, DownloadError> {
        let request_err = |source| DownloadError::Request {
            filename: filename.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(request_err)?;

        let path = self.target_path(filename).await?;
        tokio::fs::write(&path, content).await.map_err(request_err)?;
        debug!("Saved {} bytes to {}", content.len(), path.display());

        // The download record lookup: resolve and verify what was written.
        path.canonicalize().map_err(|source| DownloadError::Lookup {
            filename: filename.to_string(),
            source,
        })
    }
}

/// Reduce an untrusted attachment name to a bare filename.
fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." {
        "attachment".to_string()
    } else {
        base
    }
}

/// `invoice.pdf` -> `invoice (1).pdf`
fn numbered_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", name, n),
    }
}
