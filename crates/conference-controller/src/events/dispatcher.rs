//! Callback event dispatcher.
//!
//! One dispatcher instance owns the collaborators every handler needs
//! (cache, detail provider, platform command channel, hub broadcaster,
//! invitation tracker) and routes each inbound event to its handler by
//! event type. The match is exhaustive: a new event type does not
//! compile until it is routed.
//!
//! Handlers follow a fixed shape: load the conference, mutate a local
//! copy, store it back with a whole-object replace, and only then
//! broadcast. An error anywhere before the store aborts the event with
//! zero broadcasts.

use std::sync::Arc;

use tracing::instrument;

use super::model::{CallbackEvent, EventType};
use crate::conference::cache::ConferenceCache;
use crate::conference::model::Conference;
use crate::consultation::InvitationTracker;
use crate::errors::CcError;
use crate::hub::HubBroadcaster;
use crate::platform::{ConferenceProvider, VideoPlatformClient};

/// Routes callback events to their handlers.
pub struct EventDispatcher {
    pub(super) cache: Arc<ConferenceCache>,
    pub(super) provider: Arc<dyn ConferenceProvider>,
    pub(super) platform: Arc<dyn VideoPlatformClient>,
    pub(super) hub: HubBroadcaster,
    pub(super) invitations: Arc<InvitationTracker>,
}

impl EventDispatcher {
    /// Assemble a dispatcher from its collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<ConferenceCache>,
        provider: Arc<dyn ConferenceProvider>,
        platform: Arc<dyn VideoPlatformClient>,
        hub: HubBroadcaster,
        invitations: Arc<InvitationTracker>,
    ) -> Self {
        Self {
            cache,
            provider,
            platform,
            hub,
            invitations,
        }
    }

    /// Handle one callback event.
    ///
    /// # Errors
    ///
    /// Whatever the routed handler returns;
    /// [`CcError::UnsupportedEvent`] for event types the controller
    /// does not know.
    #[instrument(
        skip_all,
        fields(
            conference_id = %event.conference_id,
            event_type = ?event.event_type,
        )
    )]
    pub async fn dispatch(&self, event: CallbackEvent) -> Result<(), CcError> {
        match event.event_type {
            EventType::Joined => self.handle_participant_joined(event).await,
            EventType::Disconnected => self.handle_participant_disconnected(event).await,
            EventType::Leave => self.handle_participant_leave(event).await,
            EventType::Transfer => self.handle_participant_transfer(event).await,
            EventType::EndpointJoined => self.handle_endpoint_joined(event).await,
            EventType::EndpointDisconnected => self.handle_endpoint_disconnected(event).await,
            EventType::EndpointTransfer => self.handle_endpoint_transfer(event).await,
            EventType::TelephoneJoined => self.handle_telephone_joined(event).await,
            EventType::TelephoneTransfer => self.handle_telephone_transfer(event).await,
            EventType::TelephoneDisconnected => self.handle_telephone_disconnected(event).await,
            EventType::VhoCall => self.handle_vho_call(event).await,
            EventType::Help => self.handle_help(event).await,
            EventType::Pause => self.handle_pause(event).await,
            EventType::Suspend => self.handle_suspend(event).await,
            EventType::Close => self.handle_close(event).await,
            EventType::Start => self.handle_start(event).await,
            EventType::CountdownFinished => self.handle_countdown_finished(event).await,
            EventType::ParticipantsUpdated => self.handle_participants_updated(event).await,
            EventType::NewConferenceAdded => self.handle_new_conference_added(event).await,
            EventType::HearingCancelled => self.handle_hearing_cancelled(event).await,
            EventType::HearingDateTimeChanged => self.handle_hearing_date_time_changed(event).await,
            EventType::HearingDetailsUpdated => self.handle_hearing_details_updated(event).await,
            EventType::AllocationHearings => self.handle_allocation_hearings(event).await,
            EventType::RecordingConnectionFailed => {
                self.handle_recording_connection_failed(event).await
            }
            EventType::Unsupported => Err(CcError::UnsupportedEvent),
        }
    }

    /// Load the event's conference, hitting the provider on miss.
    pub(super) async fn load_conference(
        &self,
        event: &CallbackEvent,
    ) -> Result<Conference, CcError> {
        self.cache
            .get_or_load(event.conference_id, self.provider.as_ref())
            .await
    }

    /// Extract the participant id an event is required to carry.
    pub(super) fn require_participant_id(
        event: &CallbackEvent,
        event_type: &'static str,
    ) -> Result<uuid::Uuid, CcError> {
        event
            .participant_id
            .ok_or(CcError::MissingParticipantId { event_type })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::conference::model::{
        ConferenceStatus, Participant, ParticipantStatus, Role, RoomLabel,
    };
    use crate::hub::{Group, HubEnvelope, HubMessage};
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    struct StaticProvider {
        conference: Conference,
    }

    #[async_trait]
    impl ConferenceProvider for StaticProvider {
        async fn get_conference_details(
            &self,
            conference_id: Uuid,
        ) -> Result<Option<Conference>, CcError> {
            Ok((conference_id == self.conference.id).then(|| self.conference.clone()))
        }

        async fn get_conferences_for_today(&self) -> Result<Vec<Conference>, CcError> {
            Ok(vec![self.conference.clone()])
        }
    }

    struct NoopPlatform;

    #[async_trait]
    impl VideoPlatformClient for NoopPlatform {
        async fn join_endpoint_to_consultation(
            &self,
            _conference_id: Uuid,
            _endpoint_id: Uuid,
            _room_label: &str,
        ) -> Result<(), CcError> {
            Ok(())
        }
    }

    fn participant(role: Role, username: &str) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: username.to_string(),
            role,
            status: ParticipantStatus::NotSignedIn,
            current_room: None,
            last_event_time: None,
            linked_participants: Vec::new(),
        }
    }

    fn conference() -> Conference {
        Conference {
            id: Uuid::new_v4(),
            hearing_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            scheduled_duration_minutes: 30,
            status: ConferenceStatus::NotStarted,
            countdown_complete: false,
            participants: vec![
                participant(Role::Judge, "judge@court.test"),
                participant(Role::Individual, "claimant@court.test"),
            ],
            endpoints: Vec::new(),
            telephone_participants: Vec::new(),
            consultation_rooms: Vec::new(),
        }
    }

    fn dispatcher_for(conference: Conference) -> (EventDispatcher, mpsc::Receiver<HubEnvelope>) {
        let (hub, rx) = HubBroadcaster::channel();
        let dispatcher = EventDispatcher::new(
            Arc::new(ConferenceCache::new()),
            Arc::new(StaticProvider { conference }),
            Arc::new(NoopPlatform),
            hub,
            Arc::new(InvitationTracker::default()),
        );
        (dispatcher, rx)
    }

    fn event(event_type: EventType, conference_id: Uuid) -> CallbackEvent {
        CallbackEvent {
            event_id: None,
            event_type,
            conference_id,
            participant_id: None,
            transfer_from: None,
            transfer_to: None,
            time_stamp_utc: Utc::now(),
            reason: String::new(),
            phone: None,
            is_participant_in_vmr: false,
            is_other_participants_in_consultation_room: false,
            allocated_to_username: None,
            allocated_hearing_ids: Vec::new(),
        }
    }

    fn drain(rx: &mut mpsc::Receiver<HubEnvelope>) -> Vec<HubEnvelope> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn test_unsupported_event_is_an_error() {
        let conf = conference();
        let (dispatcher, mut rx) = dispatcher_for(conf.clone());

        let result = dispatcher
            .dispatch(event(EventType::Unsupported, conf.id))
            .await;

        assert!(matches!(result, Err(CcError::UnsupportedEvent)));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conference_aborts_without_broadcast() {
        let (dispatcher, mut rx) = dispatcher_for(conference());

        let result = dispatcher
            .dispatch(event(EventType::Pause, Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(CcError::ConferenceNotFound(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_joined_broadcasts_to_participants_and_officers() {
        let conf = conference();
        let claimant_id = conf.participant_by_username("claimant@court.test").unwrap().id;
        let (dispatcher, mut rx) = dispatcher_for(conf.clone());

        let mut joined = event(EventType::Joined, conf.id);
        joined.participant_id = Some(claimant_id);
        dispatcher.dispatch(joined).await.unwrap();

        // 2 participants + the officers group.
        let envelopes = drain(&mut rx);
        assert_eq!(envelopes.len(), 3);
        assert!(envelopes.iter().any(|e| e.group == Group::VhoOfficers));
        assert!(envelopes.iter().all(|e| matches!(
            e.message,
            HubMessage::ParticipantStatus {
                status: ParticipantStatus::Available,
                ..
            }
        )));

        let cached = dispatcher.cache.get(conf.id).await.unwrap();
        let claimant = cached.participant(claimant_id).unwrap();
        assert_eq!(claimant.status, ParticipantStatus::Available);
        assert_eq!(claimant.current_room, Some(RoomLabel::Waiting));
    }

    #[tokio::test]
    async fn test_same_room_transfer_rejected_with_no_broadcast() {
        let mut conf = conference();
        let claimant_id = conf.participant_by_username("claimant@court.test").unwrap().id;
        {
            let p = conf.participant_mut(claimant_id).unwrap();
            p.status = ParticipantStatus::Available;
            p.current_room = Some(RoomLabel::Waiting);
        }
        let (dispatcher, mut rx) = dispatcher_for(conf.clone());

        let mut transfer = event(EventType::Transfer, conf.id);
        transfer.participant_id = Some(claimant_id);
        transfer.transfer_from = Some(RoomLabel::Waiting);
        transfer.transfer_to = Some(RoomLabel::Waiting);

        let result = dispatcher.dispatch(transfer).await;

        assert!(matches!(result, Err(CcError::RoomTransfer(_))));
        assert!(drain(&mut rx).is_empty());
        // The rejected transfer must not have moved the participant.
        let cached = dispatcher.cache.get(conf.id).await.unwrap();
        assert_eq!(
            cached.participant(claimant_id).unwrap().status,
            ParticipantStatus::Available
        );
    }

    #[tokio::test]
    async fn test_judge_into_hearing_room_starts_conference() {
        let conf = conference();
        let judge_id = conf.judge().unwrap().id;
        let (dispatcher, mut rx) = dispatcher_for(conf.clone());

        let mut transfer = event(EventType::Transfer, conf.id);
        transfer.participant_id = Some(judge_id);
        transfer.transfer_from = Some(RoomLabel::Waiting);
        transfer.transfer_to = Some(RoomLabel::Hearing);
        dispatcher.dispatch(transfer).await.unwrap();

        let cached = dispatcher.cache.get(conf.id).await.unwrap();
        assert_eq!(cached.status, ConferenceStatus::InSession);
        assert_eq!(
            cached.participant(judge_id).unwrap().status,
            ParticipantStatus::InHearing
        );

        let envelopes = drain(&mut rx);
        assert!(envelopes.iter().any(|e| matches!(
            e.message,
            HubMessage::ConferenceStatus {
                status: ConferenceStatus::InSession,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_vho_call_without_transfer_to_names_the_event() {
        let conf = conference();
        let claimant_id = conf.participant_by_username("claimant@court.test").unwrap().id;
        let (dispatcher, _rx) = dispatcher_for(conf.clone());

        let mut call = event(EventType::VhoCall, conf.id);
        call.participant_id = Some(claimant_id);

        let err = dispatcher.dispatch(call).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "VhoCall event is missing the transfer-to room"
        );
    }
}
