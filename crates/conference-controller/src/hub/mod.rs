//! Notification fan-out to the real-time hub transport.

pub mod broadcaster;
pub mod messages;

pub use broadcaster::{HubBroadcaster, HUB_CHANNEL_BUFFER};
pub use messages::{Group, HubEnvelope, HubMessage, TransferDirection};
