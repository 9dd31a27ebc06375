//! Conference management service.
//!
//! Operations initiated by users (rather than by platform callbacks):
//! hand raising and host-initiated participant removal. Both are
//! notification flows over the current cached state; the authoritative
//! state change arrives later as a callback event.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::conference::cache::ConferenceCache;
use crate::conference::model::{Conference, Participant};
use crate::errors::CcError;
use crate::hub::{HubBroadcaster, HubMessage, TransferDirection};
use crate::platform::ConferenceProvider;

/// User-facing conference operations.
pub struct ConferenceManagementService {
    cache: Arc<ConferenceCache>,
    provider: Arc<dyn ConferenceProvider>,
    hub: HubBroadcaster,
}

impl ConferenceManagementService {
    /// Assemble the service from its collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<ConferenceCache>,
        provider: Arc<dyn ConferenceProvider>,
        hub: HubBroadcaster,
    ) -> Self {
        Self {
            cache,
            provider,
            hub,
        }
    }

    /// Raise or lower a participant's hand.
    ///
    /// The change is visible to the participant themselves, their
    /// linked participants and the judge; when the raiser is a
    /// judicial office holder the other judicial office holders see it
    /// too. Each distinct user is notified once even when they fill
    /// several of those roles.
    ///
    /// # Errors
    ///
    /// [`CcError::ConferenceNotFound`] / [`CcError::ParticipantNotFound`]
    /// before anything is broadcast.
    #[instrument(skip_all, fields(conference_id = %conference_id, participant_id = %participant_id))]
    pub async fn update_participant_hand_status(
        &self,
        conference_id: Uuid,
        participant_id: Uuid,
        raised: bool,
    ) -> Result<(), CcError> {
        let conference = self
            .cache
            .get_or_load(conference_id, self.provider.as_ref())
            .await?;
        let participant = conference
            .participant(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        let mut recipients: Vec<&Participant> = vec![participant];
        recipients.extend(conference.linked_participants_of(participant));
        recipients.extend(conference.judge());
        if participant.role.is_judicial_office_holder() {
            recipients.extend(conference.judicial_office_holders());
        }

        let mut seen = HashSet::new();
        let message = HubMessage::ParticipantHandRaise {
            participant_id,
            conference_id,
            raised,
        };
        for recipient in recipients {
            if seen.insert(recipient.username.to_lowercase()) {
                self.hub
                    .send_to_participant(&recipient.username, message.clone())
                    .await;
            }
        }

        debug!(
            target: "cc.service",
            raised,
            notified = seen.len(),
            "Hand raise status broadcast"
        );
        Ok(())
    }

    /// Signal that a host removed a participant from the hearing.
    ///
    /// `participant_ref` is either the participant id or a username.
    /// Everyone in the conference learns of the transfer-out; the
    /// participant's actual disconnect arrives as a later callback.
    ///
    /// # Errors
    ///
    /// [`CcError::ConferenceNotFound`] / [`CcError::ParticipantNotFound`].
    #[instrument(skip_all, fields(conference_id = %conference_id, participant = %participant_ref))]
    pub async fn participant_leave_conference(
        &self,
        conference_id: Uuid,
        participant_ref: &str,
    ) -> Result<(), CcError> {
        let conference = self
            .cache
            .get_or_load(conference_id, self.provider.as_ref())
            .await?;
        let participant = resolve_participant(&conference, participant_ref)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_ref.to_string()))?;

        let message = HubMessage::NonHostTransfer {
            conference_id,
            participant_id: participant.id,
            direction: TransferDirection::Out,
        };
        self.hub
            .send_to_all_participants(&conference, message.clone())
            .await;
        self.hub.send_to_conference(conference_id, message).await;
        Ok(())
    }
}

/// Find a participant by id when `reference` parses as a uuid, by
/// username otherwise.
fn resolve_participant<'a>(
    conference: &'a Conference,
    reference: &str,
) -> Option<&'a Participant> {
    match reference.parse::<Uuid>() {
        Ok(id) => conference.participant(id),
        Err(_) => conference.participant_by_username(reference),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::conference::model::{ConferenceStatus, ParticipantStatus, Role};
    use crate::hub::{Group, HubEnvelope};
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

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

    fn participant(role: Role, username: &str) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: username.to_string(),
            role,
            status: ParticipantStatus::Available,
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
            status: ConferenceStatus::InSession,
            countdown_complete: true,
            participants: vec![
                participant(Role::Judge, "judge@court.test"),
                participant(Role::JudicialOfficeHolder, "winger@court.test"),
                participant(Role::Individual, "claimant@court.test"),
                participant(Role::Individual, "interpreter@court.test"),
            ],
            endpoints: Vec::new(),
            telephone_participants: Vec::new(),
            consultation_rooms: Vec::new(),
        }
    }

    fn service_for(
        conference: Conference,
    ) -> (ConferenceManagementService, mpsc::Receiver<HubEnvelope>) {
        let (hub, rx) = HubBroadcaster::channel();
        let service = ConferenceManagementService::new(
            Arc::new(ConferenceCache::new()),
            Arc::new(StaticProvider { conference }),
            hub,
        );
        (service, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<HubEnvelope>) -> Vec<HubEnvelope> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn test_hand_raise_from_individual_reaches_self_linked_and_judge() {
        let mut conf = conference();
        let claimant_id = conf.participant_by_username("claimant@court.test").unwrap().id;
        let interpreter_id = conf
            .participant_by_username("interpreter@court.test")
            .unwrap()
            .id;
        conf.participant_mut(claimant_id)
            .unwrap()
            .linked_participants
            .push(interpreter_id);
        let (service, mut rx) = service_for(conf.clone());

        service
            .update_participant_hand_status(conf.id, claimant_id, true)
            .await
            .unwrap();

        let groups: Vec<Group> = drain(&mut rx).into_iter().map(|e| e.group).collect();
        // Claimant, interpreter, judge. The judicial office holder is
        // not on an individual's hand-raise audience.
        assert_eq!(groups.len(), 3);
        for username in [
            "claimant@court.test",
            "interpreter@court.test",
            "judge@court.test",
        ] {
            assert!(groups.contains(&Group::participant(username)));
        }
        assert!(!groups.contains(&Group::participant("winger@court.test")));
    }

    #[tokio::test]
    async fn test_hand_raise_from_joh_reaches_bench_each_once() {
        let mut conf = conference();
        conf.participants
            .push(participant(Role::JudicialOfficeHolder, "flanker@court.test"));
        let winger_id = conf.participant_by_username("winger@court.test").unwrap().id;
        let (service, mut rx) = service_for(conf.clone());

        service
            .update_participant_hand_status(conf.id, winger_id, true)
            .await
            .unwrap();

        // The raiser, the judge and the other office holder, each once
        // even though the raiser is also in the office-holder set.
        let groups: Vec<Group> = drain(&mut rx).into_iter().map(|e| e.group).collect();
        assert_eq!(groups.len(), 3);
        for username in [
            "winger@court.test",
            "judge@court.test",
            "flanker@court.test",
        ] {
            assert!(groups.contains(&Group::participant(username)));
        }
    }

    #[tokio::test]
    async fn test_hand_raise_notifies_each_user_once() {
        let conf = conference();
        let judge_id = conf.judge().unwrap().id;
        let (service, mut rx) = service_for(conf.clone());

        // The judge raising their own hand collapses self and judge
        // into one recipient.
        service
            .update_participant_hand_status(conf.id, judge_id, true)
            .await
            .unwrap();

        let envelopes = drain(&mut rx);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].group, Group::participant("judge@court.test"));
    }

    #[tokio::test]
    async fn test_hand_raise_unknown_participant_broadcasts_nothing() {
        let conf = conference();
        let (service, mut rx) = service_for(conf.clone());

        let result = service
            .update_participant_hand_status(conf.id, Uuid::new_v4(), true)
            .await;

        assert!(matches!(result, Err(CcError::ParticipantNotFound(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_leave_resolves_by_id_or_username() {
        let conf = conference();
        let claimant_id = conf.participant_by_username("claimant@court.test").unwrap().id;
        let (service, mut rx) = service_for(conf.clone());

        service
            .participant_leave_conference(conf.id, &claimant_id.to_string())
            .await
            .unwrap();
        // 4 participant groups + the conference group.
        assert_eq!(drain(&mut rx).len(), 5);

        service
            .participant_leave_conference(conf.id, "CLAIMANT@court.test")
            .await
            .unwrap();
        let envelopes = drain(&mut rx);
        assert_eq!(envelopes.len(), 5);
        assert!(envelopes
            .iter()
            .any(|e| e.group == Group::Conference(conf.id)));
        assert!(envelopes.iter().all(|e| matches!(
            e.message,
            HubMessage::NonHostTransfer {
                direction: TransferDirection::Out,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_leave_unknown_reference_fails() {
        let conf = conference();
        let (service, mut rx) = service_for(conf.clone());

        let result = service
            .participant_leave_conference(conf.id, "nobody@court.test")
            .await;

        assert!(matches!(result, Err(CcError::ParticipantNotFound(_))));
        assert!(drain(&mut rx).is_empty());
    }
}
