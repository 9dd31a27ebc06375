//! Conference aggregate - the live state of one hearing.
//!
//! The `Conference` owns everything the controller knows about a
//! hearing while it is running: the ordered participant roster,
//! video endpoints, telephone participants and any dynamically created
//! consultation rooms. All mutation happens through whole-object
//! replace in the cache; two handlers never partial-merge the same
//! conference.
//!
//! Linked participants (interpreter pairings) are stored arena-style:
//! participants sit in a flat ordered list on the conference and
//! reference each other by id, resolved via lookup at use time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Conference lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConferenceStatus {
    NotStarted,
    InSession,
    Paused,
    Suspended,
    Closed,
}

/// Participant presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantStatus {
    NotSignedIn,
    Joining,
    Available,
    InHearing,
    InConsultation,
    Disconnected,
}

/// Video endpoint status. Mirrors the subset of participant states a
/// non-human endpoint can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointStatus {
    NotYetJoined,
    Connected,
    Disconnected,
    InConsultation,
}

/// Hearing role of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Judge,
    Individual,
    Representative,
    JudicialOfficeHolder,
    StaffMember,
    QuickLinkParticipant,
    QuickLinkObserver,
    VideoHearingsOfficer,
}

impl Role {
    /// Whether this role sits on the bench alongside the judge.
    #[must_use]
    pub fn is_judicial_office_holder(self) -> bool {
        matches!(self, Role::JudicialOfficeHolder)
    }
}

/// A room a participant or endpoint can occupy.
///
/// The standard rooms (WaitingRoom, HearingRoom, AdminRoom) are fixed
/// and never materialize as [`ConsultationRoom`] entries; only bespoke
/// consultation labels (e.g. `JudgeConsultationRoom3`) do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomLabel {
    Waiting,
    Hearing,
    Admin,
    Consultation(String),
}

impl RoomLabel {
    /// Whether this is one of the fixed standard rooms.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        !matches!(self, RoomLabel::Consultation(_))
    }

    /// The bespoke consultation label, if any.
    #[must_use]
    pub fn consultation_label(&self) -> Option<&str> {
        match self {
            RoomLabel::Consultation(label) => Some(label),
            _ => None,
        }
    }
}

impl From<String> for RoomLabel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "WaitingRoom" => RoomLabel::Waiting,
            "HearingRoom" => RoomLabel::Hearing,
            "AdminRoom" => RoomLabel::Admin,
            _ => RoomLabel::Consultation(value),
        }
    }
}

impl From<&str> for RoomLabel {
    fn from(value: &str) -> Self {
        RoomLabel::from(value.to_string())
    }
}

impl From<RoomLabel> for String {
    fn from(value: RoomLabel) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RoomLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomLabel::Waiting => f.write_str("WaitingRoom"),
            RoomLabel::Hearing => f.write_str("HearingRoom"),
            RoomLabel::Admin => f.write_str("AdminRoom"),
            RoomLabel::Consultation(label) => f.write_str(label),
        }
    }
}

/// A participant in the hearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Participant id.
    pub id: Uuid,
    /// Username; the case-insensitive identity key for hub grouping.
    pub username: String,
    /// Display name shown to other participants.
    pub display_name: String,
    /// Hearing role.
    pub role: Role,
    /// Current presence status.
    pub status: ParticipantStatus,
    /// Room the participant currently occupies, if signed in.
    pub current_room: Option<RoomLabel>,
    /// Timestamp of the newest callback event applied to this
    /// participant. Only ever moves forward.
    pub last_event_time: Option<DateTime<Utc>>,
    /// Ids of linked participants (interpreter pairing).
    pub linked_participants: Vec<Uuid>,
}

impl Participant {
    /// Record an event timestamp against this participant.
    ///
    /// `last_event_time` only moves forward. Returns `true` when the
    /// event is older than the newest already recorded - callers still
    /// apply the event (the upstream platform offers no ordering
    /// guarantee and the observed behavior is to apply regardless),
    /// but log the reordering.
    pub fn record_event_time(&mut self, timestamp: DateTime<Utc>) -> bool {
        match self.last_event_time {
            Some(last) if timestamp < last => true,
            _ => {
                self.last_event_time = Some(timestamp);
                false
            }
        }
    }

    /// Whether this participant ever signed in to the conference.
    #[must_use]
    pub fn has_signed_in(&self) -> bool {
        self.status != ParticipantStatus::NotSignedIn
    }
}

/// A non-human video endpoint, subject to the same room-transfer rules
/// as participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint id.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Current status.
    pub status: EndpointStatus,
    /// Room the endpoint currently occupies.
    pub current_room: Option<RoomLabel>,
}

/// A telephone participant dialled in through the phone gateway.
///
/// Created on `TelephoneJoined`, moved on transfer, removed on
/// `TelephoneDisconnected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephoneParticipant {
    /// Telephone participant id.
    pub id: Uuid,
    /// Caller phone number.
    pub phone_number: String,
    /// Whether the call is currently connected.
    pub connected: bool,
    /// Room the caller currently occupies. Starts in the waiting room.
    pub current_room: RoomLabel,
}

/// Occupant reference held by a consultation room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomOccupant {
    Participant(Uuid),
    Endpoint(Uuid),
}

/// A dynamically created consultation room.
///
/// Materialized the first time a transfer targets a not-yet-existing
/// label; destroyed when its occupant set becomes empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRoom {
    /// Room label; unique per conference and used as the transfer
    /// target on the media platform.
    pub label: String,
    /// Whether the room is locked to outside entry.
    pub locked: bool,
    /// Conference this room belongs to.
    pub conference_id: Uuid,
    /// Current occupants.
    pub occupants: Vec<RoomOccupant>,
}

impl ConsultationRoom {
    /// Whether the room has no occupants left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

/// Aggregate root for one hearing's live state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conference {
    /// Conference id.
    pub id: Uuid,
    /// Hearing id at the bookings service.
    pub hearing_id: Uuid,
    /// Scheduled start time.
    pub scheduled_at: DateTime<Utc>,
    /// Scheduled duration in minutes.
    pub scheduled_duration_minutes: u32,
    /// Current lifecycle status.
    pub status: ConferenceStatus,
    /// Whether the pre-hearing countdown has completed.
    pub countdown_complete: bool,
    /// Ordered participant roster.
    pub participants: Vec<Participant>,
    /// Video endpoints.
    pub endpoints: Vec<Endpoint>,
    /// Telephone participants.
    pub telephone_participants: Vec<TelephoneParticipant>,
    /// Live consultation rooms.
    pub consultation_rooms: Vec<ConsultationRoom>,
}

impl Conference {
    /// Look up a participant by id.
    #[must_use]
    pub fn participant(&self, id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Look up a participant by id, mutably.
    pub fn participant_mut(&mut self, id: Uuid) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Look up a participant by username, case-insensitively.
    #[must_use]
    pub fn participant_by_username(&self, username: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.username.eq_ignore_ascii_case(username))
    }

    /// Look up an endpoint by id.
    #[must_use]
    pub fn endpoint(&self, id: Uuid) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    /// Look up an endpoint by id, mutably.
    pub fn endpoint_mut(&mut self, id: Uuid) -> Option<&mut Endpoint> {
        self.endpoints.iter_mut().find(|e| e.id == id)
    }

    /// Look up a telephone participant by id, mutably.
    pub fn telephone_participant_mut(&mut self, id: Uuid) -> Option<&mut TelephoneParticipant> {
        self.telephone_participants.iter_mut().find(|t| t.id == id)
    }

    /// The judge assigned to this hearing, if present on the roster.
    #[must_use]
    pub fn judge(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.role == Role::Judge)
    }

    /// All judicial office holders on the roster.
    pub fn judicial_office_holders(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.role.is_judicial_office_holder())
    }

    /// Resolve the linked participants of `participant` via id lookup.
    /// Ids with no matching roster entry are skipped.
    #[must_use]
    pub fn linked_participants_of(&self, participant: &Participant) -> Vec<&Participant> {
        participant
            .linked_participants
            .iter()
            .filter_map(|id| self.participant(*id))
            .collect()
    }

    /// Look up a consultation room by label.
    #[must_use]
    pub fn consultation_room(&self, label: &str) -> Option<&ConsultationRoom> {
        self.consultation_rooms.iter().find(|r| r.label == label)
    }
}
