//! Conference Controller error types.
//!
//! The taxonomy follows the boundary described in the service design:
//! not-found conditions are fatal to the current operation, invalid
//! transitions are protocol errors from the upstream platform, and
//! downstream notify failures never surface here at all (the hub is
//! best-effort). Internal details are logged server-side but not
//! exposed to callers.

use thiserror::Error;
use uuid::Uuid;

/// Invalid room transition detected while deriving a transfer state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomTransferError {
    /// Transfer where the source and target rooms are the same.
    #[error("cannot transfer within the same room: {0}")]
    SameRoom(String),

    /// Transfer pair that no state table maps to a valid status.
    #[error("unsupported room transfer from {from} to {to}")]
    Unsupported { from: String, to: String },
}

/// Conference Controller error type.
#[derive(Debug, Error)]
pub enum CcError {
    /// No conference for the id, in cache or at the detail provider.
    #[error("conference not found: {0}")]
    ConferenceNotFound(Uuid),

    /// The conference is loaded but does not contain the participant.
    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    /// Invalid room transition from the upstream platform.
    #[error("room transfer error: {0}")]
    RoomTransfer(#[from] RoomTransferError),

    /// An event that requires a transfer-to room arrived without one.
    #[error("{event_type} event is missing the transfer-to room")]
    MissingTransferTo { event_type: &'static str },

    /// An event that requires a participant id arrived without one.
    #[error("{event_type} event is missing the participant id")]
    MissingParticipantId { event_type: &'static str },

    /// Event type with no registered handler. A configuration fault,
    /// never a recoverable per-event failure.
    #[error("unsupported callback event type")]
    UnsupportedEvent,

    /// Conference detail provider call failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Media platform command channel call failed.
    #[error("video platform error: {0}")]
    Platform(String),

    /// Redis operation failed (distributed lock).
    #[error("redis error: {0}")]
    Redis(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CcError {
    /// HTTP status code for the callback ingestion boundary.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            CcError::ConferenceNotFound(_) | CcError::ParticipantNotFound(_) => 404,
            CcError::RoomTransfer(_)
            | CcError::MissingTransferTo { .. }
            | CcError::MissingParticipantId { .. }
            | CcError::UnsupportedEvent => 400,
            CcError::Provider(_)
            | CcError::Platform(_)
            | CcError::Redis(_)
            | CcError::Config(_)
            | CcError::Internal(_) => 500,
        }
    }

    /// Client-safe message (no internal details).
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            CcError::ConferenceNotFound(_) => "Conference not found".to_string(),
            CcError::ParticipantNotFound(_) => "Participant not found".to_string(),
            CcError::RoomTransfer(e) => e.to_string(),
            CcError::MissingTransferTo { .. }
            | CcError::MissingParticipantId { .. }
            | CcError::UnsupportedEvent => self.to_string(),
            CcError::Provider(_)
            | CcError::Platform(_)
            | CcError::Redis(_)
            | CcError::Config(_)
            | CcError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(CcError::ConferenceNotFound(id).status_code(), 404);
        assert_eq!(
            CcError::ParticipantNotFound("p".to_string()).status_code(),
            404
        );
        assert_eq!(
            CcError::RoomTransfer(RoomTransferError::SameRoom("WaitingRoom".to_string()))
                .status_code(),
            400
        );
        assert_eq!(
            CcError::MissingTransferTo {
                event_type: "VhoCall"
            }
            .status_code(),
            400
        );
        assert_eq!(CcError::UnsupportedEvent.status_code(), 400);
        assert_eq!(CcError::Redis("timeout".to_string()).status_code(), 500);
        assert_eq!(
            CcError::Provider("503 from bookings".to_string()).status_code(),
            500
        );
    }

    #[test]
    fn test_client_messages_hide_internal_details() {
        let provider_err = CcError::Provider("connection refused at 10.0.0.4:443".to_string());
        assert!(!provider_err.client_message().contains("10.0.0.4"));
        assert_eq!(provider_err.client_message(), "An internal error occurred");

        let redis_err = CcError::Redis("WRONGPASS invalid password".to_string());
        assert!(!redis_err.client_message().contains("WRONGPASS"));
    }

    #[test]
    fn test_missing_transfer_to_message_text() {
        let err = CcError::MissingTransferTo {
            event_type: "VhoCall",
        };
        assert_eq!(
            err.to_string(),
            "VhoCall event is missing the transfer-to room"
        );
    }

    #[test]
    fn test_room_transfer_error_conversion() {
        let transfer_err = RoomTransferError::Unsupported {
            from: "WaitingRoom".to_string(),
            to: "AdminRoom".to_string(),
        };
        let cc_err: CcError = transfer_err.into();
        assert!(matches!(cc_err, CcError::RoomTransfer(_)));
        assert_eq!(cc_err.status_code(), 400);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!(
                "{}",
                RoomTransferError::SameRoom("HearingRoom".to_string())
            ),
            "cannot transfer within the same room: HearingRoom"
        );
        assert_eq!(
            format!("{}", CcError::Redis("timeout".to_string())),
            "redis error: timeout"
        );
    }
}
