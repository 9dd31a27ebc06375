//! Hub broadcaster - fans messages out to groups over a channel.
//!
//! The broadcaster is the only writer to the hub transport channel.
//! The real-time transport (the SignalR-equivalent edge) consumes
//! `HubEnvelope`s from the other end; in tests the receiver is simply
//! drained and asserted on.
//!
//! Fan-out is best-effort per recipient: a failed send is logged and
//! dropped, never surfaced back to the event handler that triggered
//! it.

use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use super::messages::{Group, HubEnvelope, HubMessage};
use crate::conference::model::Conference;

/// Default buffer size for the hub transport channel.
pub const HUB_CHANNEL_BUFFER: usize = 500;

/// Publishes hub messages to per-participant, operations and
/// per-conference groups.
#[derive(Clone)]
pub struct HubBroadcaster {
    sender: mpsc::Sender<HubEnvelope>,
}

impl HubBroadcaster {
    /// Wrap an existing transport sender.
    #[must_use]
    pub fn new(sender: mpsc::Sender<HubEnvelope>) -> Self {
        Self { sender }
    }

    /// Create a broadcaster together with the transport receiver.
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<HubEnvelope>) {
        let (sender, receiver) = mpsc::channel(HUB_CHANNEL_BUFFER);
        (Self::new(sender), receiver)
    }

    /// Publish a message to one group. Best-effort.
    pub async fn send_to_group(&self, group: Group, message: HubMessage) {
        if let Err(e) = self.sender.send(HubEnvelope { group, message }).await {
            warn!(
                target: "cc.hub",
                error = %e,
                "Hub transport dropped, message discarded"
            );
        }
    }

    /// Publish to a participant's group (username lower-cased).
    pub async fn send_to_participant(&self, username: &str, message: HubMessage) {
        self.send_to_group(Group::participant(username), message)
            .await;
    }

    /// Publish to the video hearings officers group.
    pub async fn send_to_vho_officers(&self, message: HubMessage) {
        self.send_to_group(Group::VhoOfficers, message).await;
    }

    /// Publish to the conference-wide group.
    pub async fn send_to_conference(&self, conference_id: Uuid, message: HubMessage) {
        self.send_to_group(Group::Conference(conference_id), message)
            .await;
    }

    /// Publish one copy of `message` to every participant group in the
    /// conference.
    pub async fn send_to_all_participants(&self, conference: &Conference, message: HubMessage) {
        for participant in &conference.participants {
            self.send_to_participant(&participant.username, message.clone())
                .await;
        }
    }

    /// Publish to every participant group plus the operations group -
    /// the standard audience for status changes.
    pub async fn send_to_participants_and_officers(
        &self,
        conference: &Conference,
        message: HubMessage,
    ) {
        self.send_to_all_participants(conference, message.clone())
            .await;
        self.send_to_vho_officers(message).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::conference::model::{
        ConferenceStatus, Participant, ParticipantStatus, Role,
    };
    use chrono::Utc;

    fn conference_with(usernames: &[&str]) -> Conference {
        Conference {
            id: Uuid::new_v4(),
            hearing_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            scheduled_duration_minutes: 30,
            status: ConferenceStatus::NotStarted,
            countdown_complete: false,
            participants: usernames
                .iter()
                .map(|u| Participant {
                    id: Uuid::new_v4(),
                    username: (*u).to_string(),
                    display_name: (*u).to_string(),
                    role: Role::Individual,
                    status: ParticipantStatus::Available,
                    current_room: None,
                    last_event_time: None,
                    linked_participants: Vec::new(),
                })
                .collect(),
            endpoints: Vec::new(),
            telephone_participants: Vec::new(),
            consultation_rooms: Vec::new(),
        }
    }

    fn drain(receiver: &mut mpsc::Receiver<HubEnvelope>) -> Vec<HubEnvelope> {
        let mut envelopes = Vec::new();
        while let Ok(envelope) = receiver.try_recv() {
            envelopes.push(envelope);
        }
        envelopes
    }

    #[tokio::test]
    async fn test_fan_out_to_participants_and_officers() {
        let (broadcaster, mut rx) = HubBroadcaster::channel();
        let conf = conference_with(&["A@x.test", "B@x.test", "C@x.test"]);

        broadcaster
            .send_to_participants_and_officers(
                &conf,
                HubMessage::ConferenceStatus {
                    conference_id: conf.id,
                    status: ConferenceStatus::Paused,
                },
            )
            .await;

        let envelopes = drain(&mut rx);
        assert_eq!(envelopes.len(), 4);
        assert_eq!(
            envelopes
                .iter()
                .filter(|e| e.group == Group::VhoOfficers)
                .count(),
            1
        );
        assert!(envelopes
            .iter()
            .any(|e| e.group == Group::Participant("a@x.test".to_string())));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_does_not_error() {
        let (broadcaster, rx) = HubBroadcaster::channel();
        drop(rx);

        // Best-effort: nothing to assert beyond "does not panic or
        // return an error to the caller".
        broadcaster
            .send_to_vho_officers(HubMessage::NewConferenceAdded {
                conference_id: Uuid::new_v4(),
            })
            .await;
    }
}
