//! dvm-opener - Entry Point
//!
//! Wires the extension channel on stdin/stdout to the download manager and
//! the VM-opener bridge, then runs the dispatch loop until the mail client
//! disconnects.

use anyhow::Result;
use dvm_opener::bridge::NativeBridge;
use dvm_opener::mail::FsDownloadManager;
use dvm_opener::{dispatch, Config, DisplayContext, HostChannel};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging. Stdout carries the framed protocol, so logs must
    // go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting dvm-opener companion");

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded");

    let downloads = FsDownloadManager::from_config(&config.downloads);
    info!("Attachments will be saved to {}", downloads.dir().display());

    let launcher = NativeBridge::from_config(&config.bridge)?;

    let mut ctx = DisplayContext::new();
    let mut channel = HostChannel::new(tokio::io::stdin(), tokio::io::stdout());

    dispatch::run(&mut channel, &mut ctx, &downloads, &launcher).await?;

    info!("Extension channel closed, shutting down");
    Ok(())
}
