//! Callback event wire model.
//!
//! The external media platform posts these to the ingestion endpoint
//! as JSON. The event type is a closed enum: strings the controller
//! does not recognise deserialize to [`EventType::Unsupported`], which
//! the dispatcher rejects as a configuration fault rather than
//! silently ignoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conference::model::RoomLabel;

/// The kind of state change a callback event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Joined,
    Disconnected,
    Leave,
    Transfer,
    EndpointJoined,
    EndpointDisconnected,
    EndpointTransfer,
    TelephoneJoined,
    TelephoneTransfer,
    TelephoneDisconnected,
    VhoCall,
    Help,
    Pause,
    Suspend,
    Close,
    Start,
    CountdownFinished,
    ParticipantsUpdated,
    NewConferenceAdded,
    HearingCancelled,
    HearingDateTimeChanged,
    HearingDetailsUpdated,
    AllocationHearings,
    RecordingConnectionFailed,
    /// Any event type the controller does not know. Dispatching it is
    /// an error, never a no-op.
    #[serde(other)]
    Unsupported,
}

/// An inbound state-change notification from the media platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackEvent {
    /// Platform-assigned event id, for tracing only.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Event type.
    pub event_type: EventType,
    /// Conference the event belongs to.
    pub conference_id: Uuid,
    /// Participant, endpoint or telephone participant the event is
    /// about, where applicable.
    #[serde(default)]
    pub participant_id: Option<Uuid>,
    /// Source room of a transfer.
    #[serde(default)]
    pub transfer_from: Option<RoomLabel>,
    /// Target room of a transfer.
    #[serde(default)]
    pub transfer_to: Option<RoomLabel>,
    /// Event timestamp assigned by the platform.
    pub time_stamp_utc: DateTime<Utc>,
    /// Free-form reason string, echoed into status messages.
    #[serde(default)]
    pub reason: String,
    /// Caller phone number (telephone events).
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether the participant is already inside a virtual meeting
    /// room (joined mid-hearing).
    #[serde(default)]
    pub is_participant_in_vmr: bool,
    /// Whether the participant is joining a consultation that already
    /// has other occupants.
    #[serde(default)]
    pub is_other_participants_in_consultation_room: bool,
    /// Operations user the hearings were allocated to
    /// (`AllocationHearings` only).
    #[serde(default)]
    pub allocated_to_username: Option<String>,
    /// Hearings covered by an allocation update.
    #[serde(default)]
    pub allocated_hearing_ids: Vec<Uuid>,
}
