//! Bridge module - invocation of the disposable-VM opener helper

pub mod launcher;
pub mod manifest;
pub mod protocol;

pub use launcher::{NativeBridge, VmLauncher};
pub use protocol::LaunchRequest;
