//! Host module - native-messaging channel to the mail client's extension

pub mod channel;
pub mod protocol;

pub use channel::HostChannel;
pub use protocol::HostEvent;
