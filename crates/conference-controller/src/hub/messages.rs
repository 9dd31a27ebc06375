//! Hub message catalogue and group addressing.
//!
//! Every derived notification the controller fans out is one of these
//! messages, addressed to a [`Group`]. Delivery is best-effort and not
//! exactly-once; consumers must be idempotent against repeated status
//! messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conference::model::{
    ConferenceStatus, ConsultationRoom, EndpointStatus, Participant, ParticipantStatus,
};
use crate::consultation::ConsultationAnswer;

/// Broadcast audience.
///
/// Three addressing schemes: a group per participant username
/// (lower-cased key), the fixed operations group for video hearings
/// officers, and a group per conference for role-agnostic signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// One participant, keyed by lower-cased username.
    Participant(String),
    /// Hearing-operations staff overseeing all conferences.
    VhoOfficers,
    /// Everyone connected to one conference.
    Conference(Uuid),
}

impl Group {
    /// Address a participant group. The username is lower-cased to
    /// form the group key.
    #[must_use]
    pub fn participant(username: &str) -> Self {
        Group::Participant(username.to_lowercase())
    }
}

/// Direction of a non-host transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    In,
    Out,
}

/// A message published to a hub group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HubMessage {
    ParticipantStatus {
        participant_id: Uuid,
        username: String,
        conference_id: Uuid,
        status: ParticipantStatus,
        reason: String,
    },
    ConferenceStatus {
        conference_id: Uuid,
        status: ConferenceStatus,
    },
    EndpointStatus {
        endpoint_id: Uuid,
        conference_id: Uuid,
        status: EndpointStatus,
    },
    RoomUpdate {
        room: ConsultationRoom,
    },
    ParticipantHandRaise {
        participant_id: Uuid,
        conference_id: Uuid,
        raised: bool,
    },
    NonHostTransfer {
        conference_id: Uuid,
        participant_id: Uuid,
        direction: TransferDirection,
    },
    RequestedConsultation {
        invitation_id: Uuid,
        conference_id: Uuid,
        room_label: String,
        /// `None` when the request comes from a video hearings officer.
        requested_by: Option<Uuid>,
        requested_for: Uuid,
    },
    ConsultationRequestResponse {
        conference_id: Uuid,
        invitation_id: Uuid,
        room_label: String,
        requested_for: Uuid,
        answer: ConsultationAnswer,
    },
    ParticipantsUpdated {
        conference_id: Uuid,
        participants: Vec<Participant>,
    },
    HelpRequested {
        conference_id: Uuid,
        participant_id: Uuid,
        username: String,
    },
    HearingDetailsUpdated {
        conference_id: Uuid,
    },
    HearingCancelled {
        conference_id: Uuid,
    },
    HearingDateTimeChanged {
        conference_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },
    NewConferenceAdded {
        conference_id: Uuid,
    },
    AllocationUpdated {
        allocated_to: String,
        conference_ids: Vec<Uuid>,
    },
    RecordingConnectionFailed {
        conference_id: Uuid,
    },
}

/// A message together with its destination group.
#[derive(Debug, Clone)]
pub struct HubEnvelope {
    pub group: Group,
    pub message: HubMessage,
}
