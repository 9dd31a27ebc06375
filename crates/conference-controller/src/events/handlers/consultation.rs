//! Officer-initiated consultation call handler.

use tracing::debug;

use crate::conference::model::{EndpointStatus, RoomOccupant};
use crate::errors::CcError;
use crate::events::dispatcher::EventDispatcher;
use crate::events::model::CallbackEvent;
use crate::hub::HubMessage;

impl EventDispatcher {
    /// `VhoCall` - an officer calls a participant or endpoint into a
    /// consultation room.
    ///
    /// A participant target (and every linked participant) receives a
    /// consultation invitation to answer; the tracker aggregates the
    /// responses. An endpoint cannot answer, so it is commanded
    /// straight into the room over the platform channel.
    pub(in crate::events) async fn handle_vho_call(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let to = event.transfer_to.clone().ok_or(CcError::MissingTransferTo {
            event_type: "VhoCall",
        })?;
        let target_id = Self::require_participant_id(&event, "VhoCall")?;
        let room_label = to.to_string();
        let conference = self.load_conference(&event).await?;

        if conference.participant(target_id).is_some() {
            let invitation_id = self
                .invitations
                .start_tracking_invitation(&conference, &room_label, target_id)
                .await?;

            let invitation = HubMessage::RequestedConsultation {
                invitation_id,
                conference_id: conference.id,
                room_label: room_label.clone(),
                requested_by: None,
                requested_for: target_id,
            };

            // The target and every linked participant must each see the
            // invitation; resolution skips dangling links.
            let target = conference
                .participant(target_id)
                .ok_or_else(|| CcError::ParticipantNotFound(target_id.to_string()))?;
            self.hub
                .send_to_participant(&target.username, invitation.clone())
                .await;
            for linked in conference.linked_participants_of(target) {
                self.hub
                    .send_to_participant(&linked.username, invitation.clone())
                    .await;
            }

            debug!(
                target: "cc.consultation",
                conference_id = %conference.id,
                invitation_id = %invitation_id,
                room = %room_label,
                "Officer consultation invitation sent"
            );
            return Ok(());
        }

        if conference.endpoint(target_id).is_some() {
            self.platform
                .join_endpoint_to_consultation(conference.id, target_id, &room_label)
                .await?;

            let mut conference = conference;
            let endpoint = conference
                .endpoint_mut(target_id)
                .ok_or_else(|| CcError::ParticipantNotFound(target_id.to_string()))?;
            endpoint.status = EndpointStatus::InConsultation;
            endpoint.current_room = Some(to.clone());

            let room_created = match to.consultation_label() {
                Some(label) => {
                    let label = label.to_string();
                    conference.add_endpoint_to_consultation_room(&label, target_id)
                }
                None => {
                    conference.remove_from_current_room(RoomOccupant::Endpoint(target_id));
                    false
                }
            };

            self.cache.update(conference.clone()).await;
            self.hub
                .send_to_participants_and_officers(
                    &conference,
                    HubMessage::EndpointStatus {
                        endpoint_id: target_id,
                        conference_id: conference.id,
                        status: EndpointStatus::InConsultation,
                    },
                )
                .await;
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
            return Ok(());
        }

        Err(CcError::ParticipantNotFound(target_id.to_string()))
    }
}
