//! Consultation invitation tracking.
//!
//! A consultation involving a linked participant (e.g. an interpreter
//! pair) only proceeds once every invited party has accepted. The
//! tracker aggregates those responses: starting tracking builds one
//! response slot for the requested participant plus one per linked
//! participant, all initialized to [`ConsultationAnswer::None`].
//!
//! Entries expire after a TTL so an abandoned consultation request
//! cannot linger forever. A missing or expired invitation is treated
//! as *not* satisfied - both aggregate checks return `false` - so a
//! lost invitation can delay a consultation but never admit an
//! unanswered party.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::conference::model::Conference;
use crate::errors::CcError;

/// A participant's answer to a consultation invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConsultationAnswer {
    /// Not yet responded.
    None,
    Accepted,
    Rejected,
    Failed,
    Transferring,
}

/// A tracked multi-party consultation invitation.
#[derive(Debug, Clone)]
pub struct ConsultationInvitation {
    /// Invitation id.
    pub id: Uuid,
    /// Conference the consultation belongs to.
    pub conference_id: Uuid,
    /// The participant the consultation is for.
    pub requested_for: Uuid,
    /// Target consultation room label.
    pub room_label: String,
    /// Response slot per invited participant.
    pub responses: HashMap<Uuid, ConsultationAnswer>,
}

struct TrackedInvitation {
    invitation: ConsultationInvitation,
    expires_at: Instant,
}

/// Default invitation lifetime.
pub const DEFAULT_INVITATION_TTL: Duration = Duration::from_secs(120);

/// Tracks multi-party invitation-response aggregation with expiry.
pub struct InvitationTracker {
    ttl: Duration,
    entries: RwLock<HashMap<Uuid, TrackedInvitation>>,
}

impl Default for InvitationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_INVITATION_TTL)
    }
}

impl InvitationTracker {
    /// Create a tracker whose invitations expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Begin tracking an invitation for `requested_for` into
    /// `room_label`.
    ///
    /// Builds one response slot for the requested participant plus one
    /// per linked participant, all [`ConsultationAnswer::None`]. An
    /// entry is created even when the participant has no linked
    /// participants. Returns the fresh invitation id.
    ///
    /// # Errors
    ///
    /// [`CcError::ParticipantNotFound`] if `requested_for` is not on
    /// the conference roster.
    pub async fn start_tracking_invitation(
        &self,
        conference: &Conference,
        room_label: &str,
        requested_for: Uuid,
    ) -> Result<Uuid, CcError> {
        let participant = conference
            .participant(requested_for)
            .ok_or_else(|| CcError::ParticipantNotFound(requested_for.to_string()))?;

        let mut responses = HashMap::new();
        responses.insert(requested_for, ConsultationAnswer::None);
        for linked_id in &participant.linked_participants {
            responses.insert(*linked_id, ConsultationAnswer::None);
        }

        let id = Uuid::new_v4();
        let invitation = ConsultationInvitation {
            id,
            conference_id: conference.id,
            requested_for,
            room_label: room_label.to_string(),
            responses,
        };

        debug!(
            target: "cc.consultation",
            invitation_id = %id,
            conference_id = %conference.id,
            room = %room_label,
            invited = invitation.responses.len(),
            "Started tracking consultation invitation"
        );

        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries);
        entries.insert(
            id,
            TrackedInvitation {
                invitation,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(id)
    }

    /// Fetch a tracked invitation, if it still exists.
    pub async fn get_invitation(&self, id: Uuid) -> Option<ConsultationInvitation> {
        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries);
        entries.get(&id).map(|t| t.invitation.clone())
    }

    /// Record a participant's answer. A no-op if the invitation no
    /// longer exists or the participant was never invited.
    pub async fn update_consultation_response(
        &self,
        id: Uuid,
        participant_id: Uuid,
        answer: ConsultationAnswer,
    ) {
        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries);
        if let Some(tracked) = entries.get_mut(&id) {
            if let Some(slot) = tracked.invitation.responses.get_mut(&participant_id) {
                *slot = answer;
            }
        }
    }

    /// Whether every invited participant has accepted. A missing or
    /// expired invitation is not satisfied and yields `false`.
    pub async fn have_all_participants_accepted(&self, id: Uuid) -> bool {
        self.check(id, |answers| {
            answers.iter().all(|a| *a == ConsultationAnswer::Accepted)
        })
        .await
    }

    /// Whether every invited participant has responded with anything
    /// other than [`ConsultationAnswer::None`]. Missing invitations
    /// yield `false`.
    pub async fn have_all_participants_responded(&self, id: Uuid) -> bool {
        self.check(id, |answers| {
            answers.iter().all(|a| *a != ConsultationAnswer::None)
        })
        .await
    }

    /// Stop tracking one invitation.
    pub async fn stop_tracking_invitation(&self, id: Uuid) {
        let mut entries = self.entries.write().await;
        entries.remove(&id);
    }

    /// Stop tracking every invitation that references `participant_id`
    /// in any response slot.
    pub async fn stop_tracking_invitations_for_participant(&self, participant_id: Uuid) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, tracked| !tracked.invitation.responses.contains_key(&participant_id));
    }

    async fn check(&self, id: Uuid, predicate: impl Fn(Vec<ConsultationAnswer>) -> bool) -> bool {
        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries);
        entries
            .get(&id)
            .map(|t| predicate(t.invitation.responses.values().copied().collect()))
            .unwrap_or(false)
    }

    fn purge_expired(entries: &mut HashMap<Uuid, TrackedInvitation>) {
        let now = Instant::now();
        entries.retain(|_, tracked| tracked.expires_at > now);
    }
}
