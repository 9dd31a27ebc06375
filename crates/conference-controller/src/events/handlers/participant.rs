//! Participant presence and transfer handlers.

use tracing::warn;

use crate::conference::model::{ConferenceStatus, ParticipantStatus, Role, RoomLabel, RoomOccupant};
use crate::errors::CcError;
use crate::events::dispatcher::EventDispatcher;
use crate::events::model::CallbackEvent;
use crate::events::transfer::derive_participant_status;
use crate::hub::HubMessage;

impl EventDispatcher {
    /// `Joined` - a participant's client connected to the conference.
    ///
    /// A participant joining mid-hearing (already inside the virtual
    /// meeting room while the conference is in session) lands straight
    /// in the hearing; one joining a consultation in progress is marked
    /// in consultation; everyone else starts available in the waiting
    /// room.
    pub(in crate::events) async fn handle_participant_joined(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let participant_id = Self::require_participant_id(&event, "Joined")?;
        let mut conference = self.load_conference(&event).await?;

        let in_session = conference.status == ConferenceStatus::InSession;
        let participant = conference
            .participant_mut(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        if participant.record_event_time(event.time_stamp_utc) {
            warn!(
                target: "cc.events",
                participant_id = %participant_id,
                "Out-of-order Joined event, applying anyway"
            );
        }

        if event.is_participant_in_vmr && in_session {
            participant.status = ParticipantStatus::InHearing;
            participant.current_room = Some(RoomLabel::Hearing);
        } else if event.is_other_participants_in_consultation_room {
            participant.status = ParticipantStatus::InConsultation;
        } else {
            participant.status = ParticipantStatus::Available;
            participant.current_room = Some(RoomLabel::Waiting);
        }

        let message = participant_status_message(&event, participant_id, &conference)?;
        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(&conference, message)
            .await;
        Ok(())
    }

    /// `Disconnected` - a participant's client dropped.
    ///
    /// A participant who never signed in stays `NotSignedIn`; anyone
    /// else becomes `Disconnected`. Either way they leave their room
    /// and any consultation invitations referencing them stop being
    /// tracked.
    pub(in crate::events) async fn handle_participant_disconnected(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let participant_id = Self::require_participant_id(&event, "Disconnected")?;
        let mut conference = self.load_conference(&event).await?;

        let participant = conference
            .participant_mut(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        if participant.record_event_time(event.time_stamp_utc) {
            warn!(
                target: "cc.events",
                participant_id = %participant_id,
                "Out-of-order Disconnected event, applying anyway"
            );
        }

        if participant.has_signed_in() {
            participant.status = ParticipantStatus::Disconnected;
        }
        participant.current_room = None;
        conference.remove_from_current_room(RoomOccupant::Participant(participant_id));

        let message = participant_status_message(&event, participant_id, &conference)?;
        self.cache.update(conference.clone()).await;
        self.invitations
            .stop_tracking_invitations_for_participant(participant_id)
            .await;
        self.hub
            .send_to_participants_and_officers(&conference, message)
            .await;
        Ok(())
    }

    /// `Leave` - a participant deliberately left the conference.
    ///
    /// Unlike a dropped connection this is always `Disconnected`, even
    /// for a participant who never signed in, and the room they were in
    /// is left as the platform reported it.
    pub(in crate::events) async fn handle_participant_leave(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let participant_id = Self::require_participant_id(&event, "Leave")?;
        let mut conference = self.load_conference(&event).await?;

        let participant = conference
            .participant_mut(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        if participant.record_event_time(event.time_stamp_utc) {
            warn!(
                target: "cc.events",
                participant_id = %participant_id,
                "Out-of-order Leave event, applying anyway"
            );
        }
        participant.status = ParticipantStatus::Disconnected;

        let message = participant_status_message(&event, participant_id, &conference)?;
        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(&conference, message)
            .await;
        Ok(())
    }

    /// `Transfer` - the platform moved a participant between rooms.
    ///
    /// The judge entering the hearing room brings the conference into
    /// session. A transfer into a consultation label materializes the
    /// room on first entry; leaving one destroys it when emptied.
    pub(in crate::events) async fn handle_participant_transfer(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let participant_id = Self::require_participant_id(&event, "Transfer")?;
        let to = event.transfer_to.clone().ok_or(CcError::MissingTransferTo {
            event_type: "Transfer",
        })?;
        let mut conference = self.load_conference(&event).await?;

        let participant = conference
            .participant_mut(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        let from = event.transfer_from.clone().or_else(|| participant.current_room.clone());
        let status = derive_participant_status(from.as_ref(), &to)?;

        if participant.record_event_time(event.time_stamp_utc) {
            warn!(
                target: "cc.events",
                participant_id = %participant_id,
                "Out-of-order Transfer event, applying anyway"
            );
        }
        participant.status = status;
        participant.current_room = Some(to.clone());
        let is_judge = participant.role == Role::Judge;

        let room_created = match to.consultation_label() {
            Some(label) => {
                let label = label.to_string();
                conference.add_participant_to_consultation_room(&label, participant_id)
            }
            None => {
                conference.remove_from_current_room(RoomOccupant::Participant(participant_id));
                false
            }
        };

        let starts_session = is_judge
            && to == RoomLabel::Hearing
            && conference.status != ConferenceStatus::InSession;
        if starts_session {
            conference.status = ConferenceStatus::InSession;
        }

        let status_message = participant_status_message(&event, participant_id, &conference)?;
        self.cache.update(conference.clone()).await;

        self.hub
            .send_to_participants_and_officers(&conference, status_message)
            .await;
        if starts_session {
            self.hub
                .send_to_participants_and_officers(
                    &conference,
                    HubMessage::ConferenceStatus {
                        conference_id: conference.id,
                        status: ConferenceStatus::InSession,
                    },
                )
                .await;
        }
        if room_created {
            if let Some(room) = to
                .consultation_label()
                .and_then(|label| conference.consultation_room(label))
            {
                self.hub
                    .send_to_conference(
                        conference.id,
                        HubMessage::RoomUpdate { room: room.clone() },
                    )
                    .await;
            }
        }
        Ok(())
    }

}

fn participant_status_message(
    event: &CallbackEvent,
    participant_id: uuid::Uuid,
    conference: &crate::conference::model::Conference,
) -> Result<HubMessage, CcError> {
    let participant = conference
        .participant(participant_id)
        .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;
    Ok(HubMessage::ParticipantStatus {
        participant_id,
        username: participant.username.clone(),
        conference_id: conference.id,
        status: participant.status,
        reason: event.reason.clone(),
    })
}
