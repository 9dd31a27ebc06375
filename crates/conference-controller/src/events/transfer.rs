//! Room-transfer derivation tables.
//!
//! Given where an occupant is coming from and where the platform says
//! it is going, these functions derive the status the occupant ends up
//! in. A transfer whose source and target match is rejected rather
//! than absorbed; the caller decides whether that aborts the event.

use crate::conference::model::{EndpointStatus, ParticipantStatus, RoomLabel};
use crate::errors::RoomTransferError;

/// Status a participant takes on after landing in `to`.
///
/// The admin room only ever hosts private consultations with staff, so
/// it maps to `InConsultation` like any consultation room.
pub fn derive_participant_status(
    from: Option<&RoomLabel>,
    to: &RoomLabel,
) -> Result<ParticipantStatus, RoomTransferError> {
    reject_same_room(from, to)?;
    Ok(match to {
        RoomLabel::Hearing => ParticipantStatus::InHearing,
        RoomLabel::Waiting => ParticipantStatus::Available,
        RoomLabel::Admin | RoomLabel::Consultation(_) => ParticipantStatus::InConsultation,
    })
}

/// Status an endpoint takes on after landing in `to`.
pub fn derive_endpoint_status(
    from: Option<&RoomLabel>,
    to: &RoomLabel,
) -> Result<EndpointStatus, RoomTransferError> {
    reject_same_room(from, to)?;
    Ok(match to {
        RoomLabel::Consultation(_) | RoomLabel::Admin => EndpointStatus::InConsultation,
        RoomLabel::Hearing | RoomLabel::Waiting => EndpointStatus::Connected,
    })
}

/// Room a telephone participant may occupy after a transfer.
///
/// Telephone participants can only ever sit in the waiting or hearing
/// room; any other target is an unsupported routing.
pub fn derive_telephone_room(
    from: Option<&RoomLabel>,
    to: &RoomLabel,
) -> Result<RoomLabel, RoomTransferError> {
    reject_same_room(from, to)?;
    match to {
        RoomLabel::Waiting | RoomLabel::Hearing => Ok(to.clone()),
        RoomLabel::Admin | RoomLabel::Consultation(_) => Err(RoomTransferError::Unsupported {
            from: from.map_or_else(|| "none".to_string(), ToString::to_string),
            to: to.to_string(),
        }),
    }
}

fn reject_same_room(from: Option<&RoomLabel>, to: &RoomLabel) -> Result<(), RoomTransferError> {
    if from == Some(to) {
        return Err(RoomTransferError::SameRoom(to.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_status_by_target_room() {
        assert_eq!(
            derive_participant_status(Some(&RoomLabel::Waiting), &RoomLabel::Hearing).unwrap(),
            ParticipantStatus::InHearing
        );
        assert_eq!(
            derive_participant_status(Some(&RoomLabel::Hearing), &RoomLabel::Waiting).unwrap(),
            ParticipantStatus::Available
        );
        assert_eq!(
            derive_participant_status(None, &RoomLabel::Admin).unwrap(),
            ParticipantStatus::InConsultation
        );
        assert_eq!(
            derive_participant_status(
                Some(&RoomLabel::Waiting),
                &RoomLabel::Consultation("JudgeConsultationRoom1".to_string())
            )
            .unwrap(),
            ParticipantStatus::InConsultation
        );
    }

    #[test]
    fn test_same_room_transfer_is_rejected() {
        let err = derive_participant_status(Some(&RoomLabel::Waiting), &RoomLabel::Waiting)
            .unwrap_err();
        assert!(matches!(err, RoomTransferError::SameRoom(room) if room == "WaitingRoom"));

        let label = RoomLabel::Consultation("ConsultationRoom1".to_string());
        assert!(derive_endpoint_status(Some(&label), &label).is_err());
        assert!(derive_telephone_room(Some(&RoomLabel::Hearing), &RoomLabel::Hearing).is_err());
    }

    #[test]
    fn test_endpoint_status_by_target_room() {
        assert_eq!(
            derive_endpoint_status(
                Some(&RoomLabel::Waiting),
                &RoomLabel::Consultation("ConsultationRoom1".to_string())
            )
            .unwrap(),
            EndpointStatus::InConsultation
        );
        assert_eq!(
            derive_endpoint_status(Some(&RoomLabel::Waiting), &RoomLabel::Hearing).unwrap(),
            EndpointStatus::Connected
        );
    }

    #[test]
    fn test_telephone_restricted_to_waiting_and_hearing() {
        assert_eq!(
            derive_telephone_room(Some(&RoomLabel::Waiting), &RoomLabel::Hearing).unwrap(),
            RoomLabel::Hearing
        );
        assert!(matches!(
            derive_telephone_room(
                Some(&RoomLabel::Waiting),
                &RoomLabel::Consultation("ConsultationRoom1".to_string())
            ),
            Err(RoomTransferError::Unsupported { .. })
        ));
        assert!(derive_telephone_room(None, &RoomLabel::Admin).is_err());
    }
}
