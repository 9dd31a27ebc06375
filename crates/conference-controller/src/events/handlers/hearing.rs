//! Conference lifecycle and hearing-admin handlers.
//!
//! The hearing-admin events (cancellation, reschedule, detail and
//! roster changes, allocation) are notify-only: the bookings service
//! already holds the new truth, and the live aggregate in the cache -
//! participant presence, rooms, telephone callers - must not be
//! replaced by booking-time state.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::conference::model::{Conference, ConferenceStatus};
use crate::errors::CcError;
use crate::events::dispatcher::EventDispatcher;
use crate::events::model::CallbackEvent;
use crate::hub::{Group, HubMessage};

impl EventDispatcher {
    /// `Pause` - the judge paused the hearing.
    pub(in crate::events) async fn handle_pause(&self, event: CallbackEvent) -> Result<(), CcError> {
        self.set_conference_status(event, ConferenceStatus::Paused, false)
            .await
    }

    /// `Suspend` - the hearing was suspended; the pre-hearing countdown
    /// must run again before it resumes.
    pub(in crate::events) async fn handle_suspend(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        self.set_conference_status(event, ConferenceStatus::Suspended, true)
            .await
    }

    /// `Close` - the hearing ended.
    pub(in crate::events) async fn handle_close(&self, event: CallbackEvent) -> Result<(), CcError> {
        self.set_conference_status(event, ConferenceStatus::Closed, false)
            .await
    }

    /// `Start` - the hearing came into session.
    pub(in crate::events) async fn handle_start(&self, event: CallbackEvent) -> Result<(), CcError> {
        self.set_conference_status(event, ConferenceStatus::InSession, false)
            .await
    }

    /// `CountdownFinished` - the pre-hearing countdown completed.
    pub(in crate::events) async fn handle_countdown_finished(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let mut conference = self.load_conference(&event).await?;
        conference.countdown_complete = true;
        let status = conference.status;

        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::ConferenceStatus {
                    conference_id: conference.id,
                    status,
                },
            )
            .await;
        Ok(())
    }

    /// `ParticipantsUpdated` - the roster changed at the bookings
    /// service. The new roster is read from the provider and pushed
    /// out; the cached aggregate is left alone (the source roster was
    /// already refreshed by whoever raised the event).
    pub(in crate::events) async fn handle_participants_updated(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let conference = self.load_conference(&event).await?;
        let fresh = self.fresh_details(event.conference_id).await?;

        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::ParticipantsUpdated {
                    conference_id: conference.id,
                    participants: fresh.participants,
                },
            )
            .await;
        Ok(())
    }

    /// `NewConferenceAdded` - a hearing was booked for today after the
    /// daily population run. Loading it warms the cache.
    pub(in crate::events) async fn handle_new_conference_added(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let conference = self.load_conference(&event).await?;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::NewConferenceAdded {
                    conference_id: conference.id,
                },
            )
            .await;
        Ok(())
    }

    /// `HearingCancelled` - the booking was cancelled. Notify-only:
    /// the conference stays cached until the process recycles.
    pub(in crate::events) async fn handle_hearing_cancelled(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let message = HubMessage::HearingCancelled {
            conference_id: event.conference_id,
        };
        match self.cache.get(event.conference_id).await {
            Some(conference) => {
                self.hub
                    .send_to_participants_and_officers(&conference, message)
                    .await;
            }
            None => {
                // Never tracked; the officers still need to know.
                self.hub.send_to_vho_officers(message).await;
            }
        }
        Ok(())
    }

    /// `HearingDateTimeChanged` - the hearing was rescheduled. The new
    /// time is read from the provider; nothing is stored.
    pub(in crate::events) async fn handle_hearing_date_time_changed(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let conference = self.load_conference(&event).await?;
        let fresh = self.fresh_details(event.conference_id).await?;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::HearingDateTimeChanged {
                    conference_id: conference.id,
                    scheduled_at: fresh.scheduled_at,
                },
            )
            .await;
        Ok(())
    }

    /// `HearingDetailsUpdated` - hearing details (venue, case name)
    /// changed at the bookings service. Notify-only.
    pub(in crate::events) async fn handle_hearing_details_updated(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let conference = self.load_conference(&event).await?;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::HearingDetailsUpdated {
                    conference_id: conference.id,
                },
            )
            .await;
        Ok(())
    }

    /// `AllocationHearings` - hearings were allocated to an operations
    /// user. Notifies that user's group only. An event without the
    /// allocated username has nobody to notify and is dropped with a
    /// warning rather than failed.
    pub(in crate::events) async fn handle_allocation_hearings(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let Some(username) = event.allocated_to_username.as_deref() else {
            warn!(
                target: "cc.events",
                conference_id = %event.conference_id,
                "AllocationHearings event without an allocated username, dropped"
            );
            return Ok(());
        };

        self.hub
            .send_to_group(
                Group::participant(username),
                HubMessage::AllocationUpdated {
                    allocated_to: username.to_lowercase(),
                    conference_ids: event.allocated_hearing_ids.clone(),
                },
            )
            .await;
        Ok(())
    }

    /// `Help` - a participant pressed the help button. Only the
    /// officers see this.
    pub(in crate::events) async fn handle_help(&self, event: CallbackEvent) -> Result<(), CcError> {
        let participant_id = Self::require_participant_id(&event, "Help")?;
        let conference = self.load_conference(&event).await?;
        let participant = conference
            .participant(participant_id)
            .ok_or_else(|| CcError::ParticipantNotFound(participant_id.to_string()))?;

        self.hub
            .send_to_vho_officers(HubMessage::HelpRequested {
                conference_id: conference.id,
                participant_id,
                username: participant.username.clone(),
            })
            .await;
        Ok(())
    }

    /// `RecordingConnectionFailed` - the platform lost its recording
    /// link. Only the judge can act on it, so only the judge's group is
    /// notified.
    pub(in crate::events) async fn handle_recording_connection_failed(
        &self,
        event: CallbackEvent,
    ) -> Result<(), CcError> {
        let conference = self.load_conference(&event).await?;
        match conference.judge() {
            Some(judge) => {
                self.hub
                    .send_to_participant(
                        &judge.username,
                        HubMessage::RecordingConnectionFailed {
                            conference_id: conference.id,
                        },
                    )
                    .await;
            }
            None => {
                warn!(
                    target: "cc.events",
                    conference_id = %conference.id,
                    "Recording connection failed but no judge on the roster"
                );
            }
        }
        Ok(())
    }

    /// Read the provider's current view of a conference without
    /// storing it.
    async fn fresh_details(&self, conference_id: Uuid) -> Result<Conference, CcError> {
        self.provider
            .get_conference_details(conference_id)
            .await?
            .ok_or(CcError::ConferenceNotFound(conference_id))
    }

    async fn set_conference_status(
        &self,
        event: CallbackEvent,
        status: ConferenceStatus,
        reset_countdown: bool,
    ) -> Result<(), CcError> {
        let mut conference = self.load_conference(&event).await?;
        conference.status = status;
        if reset_countdown {
            conference.countdown_complete = false;
        }
        debug!(
            target: "cc.events",
            conference_id = %conference.id,
            status = ?status,
            "Conference status changed"
        );

        self.cache.update(conference.clone()).await;
        self.hub
            .send_to_participants_and_officers(
                &conference,
                HubMessage::ConferenceStatus {
                    conference_id: conference.id,
                    status,
                },
            )
            .await;
        Ok(())
    }
}
