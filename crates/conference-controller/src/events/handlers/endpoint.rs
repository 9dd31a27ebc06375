//! Video endpoint handlers.
//!
//! Endpoints move through the same rooms as participants but have no
//! client to answer invitations with, so all their movement is
//! platform-driven.

use crate::conference::model::{EndpointStatus, RoomLabel, RoomOccupant};
use crate::errors::CcError;
use crate::events::dispatcher::EventDispatcher;
use crate::events::model::CallbackEvent;
use crate::events::transfer::derive_endpoint_status;
use crate::hub::HubMessage;

impl EventDispatcher {
    /// `EndpointJoined` - an endpoint connected, starting in the
    /// waiting room.
    pub(in crate::events) async fn handle_endpoint_joined(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let endpoint_id = Self::require_participant_id(&event, "EndpointJoined")?;
        let mut conference = self.load_conference(&event).await?;

        let endpoint = conference
            .endpoint_mut(endpoint_id)
            .ok_or_else(|| CcError::ParticipantNotFound(endpoint_id.to_string()))?;
        endpoint.status = EndpointStatus::Connected;
        endpoint.current_room = Some(RoomLabel::Waiting);

        self.store_and_broadcast_endpoint(conference, endpoint_id, EndpointStatus::Connected)
            .await
    }

    /// `EndpointDisconnected` - an endpoint dropped off the platform.
    pub(in crate::events) async fn handle_endpoint_disconnected(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let endpoint_id = Self::require_participant_id(&event, "EndpointDisconnected")?;
        let mut conference = self.load_conference(&event).await?;

        let endpoint = conference
            .endpoint_mut(endpoint_id)
            .ok_or_else(|| CcError::ParticipantNotFound(endpoint_id.to_string()))?;
        endpoint.status = EndpointStatus::Disconnected;
        endpoint.current_room = None;
        conference.remove_from_current_room(RoomOccupant::Endpoint(endpoint_id));

        self.store_and_broadcast_endpoint(conference, endpoint_id, EndpointStatus::Disconnected)
            .await
    }

    /// `EndpointTransfer` - the platform moved an endpoint between
    /// rooms. Follows the same room-materialization rules as a
    /// participant transfer.
    pub(in crate::events) async fn handle_endpoint_transfer(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let endpoint_id = Self::require_participant_id(&event, "EndpointTransfer")?;
        let to = event.transfer_to.clone().ok_or(CcError::MissingTransferTo {
            event_type: "EndpointTransfer",
        })?;
        let mut conference = self.load_conference(&event).await?;

        let endpoint = conference
            .endpoint_mut(endpoint_id)
            .ok_or_else(|| CcError::ParticipantNotFound(endpoint_id.to_string()))?;
        let from = event.transfer_from.clone().or_else(|| endpoint.current_room.clone());
        let status = derive_endpoint_status(from.as_ref(), &to)?;
        endpoint.status = status;
        endpoint.current_room = Some(to.clone());

        let room_created = match to.consultation_label() {
            Some(label) => {
                let label = label.to_string();
                conference.add_endpoint_to_consultation_room(&label, endpoint_id)
            }
            None => {
                conference.remove_from_current_room(RoomOccupant::Endpoint(endpoint_id));
                false
            }
        };

        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::EndpointStatus {
                    endpoint_id,
                    conference_id: conference.id,
                    status,
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
        Ok(())
    }

    async fn store_and_broadcast_endpoint(
        &self,
        conference: crate::conference::model::Conference,
        endpoint_id: uuid::Uuid,
        status: EndpointStatus,
    ) -> Result<(), CcError> {
        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::EndpointStatus {
                    endpoint_id,
                    conference_id: conference.id,
                    status,
                },
            )
            .await;
        Ok(())
    }
}
