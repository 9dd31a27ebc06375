//! Helpers for asserting on hub traffic.

use tokio::sync::mpsc;

use conference_controller::hub::{Group, HubEnvelope};

/// Drain every envelope currently buffered on the hub channel.
pub fn drain_envelopes(receiver: &mut mpsc::Receiver<HubEnvelope>) -> Vec<HubEnvelope> {
    let mut envelopes = Vec::new();
    while let Ok(envelope) = receiver.try_recv() {
        envelopes.push(envelope);
    }
    envelopes
}

/// Envelopes addressed to one group.
pub fn envelopes_for_group(envelopes: &[HubEnvelope], group: &Group) -> Vec<HubEnvelope> {
    envelopes
        .iter()
        .filter(|e| e.group == *group)
        .cloned()
        .collect()
}
