//! Telephone participant handlers.
//!
//! Telephone participants exist only while their call is up: created
//! on `TelephoneJoined`, removed on `TelephoneDisconnected`. They can
//! occupy the waiting and hearing rooms only.

use tracing::{debug, warn};

use crate::conference::model::{RoomLabel, TelephoneParticipant};
use crate::errors::CcError;
use crate::events::dispatcher::EventDispatcher;
use crate::events::model::CallbackEvent;
use crate::events::transfer::derive_telephone_room;
use crate::hub::HubMessage;

impl EventDispatcher {
    /// `TelephoneJoined` - a caller dialled in. Starts in the waiting
    /// room; repeated events for the same id are absorbed.
    pub(in crate::events) async fn handle_telephone_joined(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let telephone_id = Self::require_participant_id(&event, "TelephoneJoined")?;
        let mut conference = self.load_conference(&event).await?;

        if let Some(existing) = conference.telephone_participant_mut(telephone_id) {
            existing.connected = true;
        } else {
            conference.telephone_participants.push(TelephoneParticipant {
                id: telephone_id,
                phone_number: event.phone.clone().unwrap_or_default(),
                connected: true,
                current_room: RoomLabel::Waiting,
            });
        }
        debug!(
            target: "cc.events",
            conference_id = %conference.id,
            telephone_id = %telephone_id,
            "Telephone participant joined"
        );

        self.store_and_notify_roster(conference).await;
        Ok(())
    }

    /// `TelephoneTransfer` - the platform moved a caller. Only the
    /// waiting and hearing rooms are valid targets.
    pub(in crate::events) async fn handle_telephone_transfer(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let telephone_id = Self::require_participant_id(&event, "TelephoneTransfer")?;
        let to = event.transfer_to.clone().ok_or(CcError::MissingTransferTo {
            event_type: "TelephoneTransfer",
        })?;
        let mut conference = self.load_conference(&event).await?;

        let caller = conference
            .telephone_participant_mut(telephone_id)
            .ok_or_else(|| CcError::ParticipantNotFound(telephone_id.to_string()))?;
        let room = derive_telephone_room(Some(&caller.current_room), &to)?;
        caller.current_room = room;

        self.store_and_notify_roster(conference).await;
        Ok(())
    }

    /// `TelephoneDisconnected` - the call ended; the caller is removed
    /// from the roster entirely.
    pub(in crate::events) async fn handle_telephone_disconnected(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let telephone_id = Self::require_participant_id(&event, "TelephoneDisconnected")?;
        let mut conference = self.load_conference(&event).await?;

        let before = conference.telephone_participants.len();
        conference
            .telephone_participants
            .retain(|t| t.id != telephone_id);
        if conference.telephone_participants.len() == before {
            warn!(
                target: "cc.events",
                conference_id = %conference.id,
                telephone_id = %telephone_id,
                "Disconnect for unknown telephone participant"
            );
        }

        self.store_and_notify_roster(conference).await;
        Ok(())
    }

    async fn store_and_notify_roster(&self, conference: crate::conference::model::Conference) {
        self.cache.update(conference.clone()).await;
        // Telephone changes have no per-caller hub group; officers see
        // the refreshed roster instead.
        self.hub
            .send_to_vho_officers(HubMessage::ParticipantsUpdated {
                conference_id: conference.id,
                participants: conference.participants.clone(),
            })
            .await;
    }
}
