//! External collaborator seams.
//!
//! The controller talks to two remote systems: the conference detail
//! provider (the authoritative source the cache reloads from) and the
//! media platform command channel (used to push consultation commands
//! for non-human endpoints). Both are narrow object-safe traits so
//! tests inject recording mocks and production wires HTTP clients.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::conference::model::Conference;
use crate::errors::CcError;

/// Authoritative source of conference details.
///
/// Used as the cache-miss loader and by the daily population job. A
/// `None` return means the conference genuinely does not exist, which
/// callers surface as [`CcError::ConferenceNotFound`].
#[async_trait]
pub trait ConferenceProvider: Send + Sync {
    /// Fetch the full details of one conference.
    async fn get_conference_details(
        &self,
        conference_id: Uuid,
    ) -> Result<Option<Conference>, CcError>;

    /// Fetch every conference scheduled for today.
    async fn get_conferences_for_today(&self) -> Result<Vec<Conference>, CcError>;
}

/// Command channel to the external media platform.
#[async_trait]
pub trait VideoPlatformClient: Send + Sync {
    /// Instruct the platform to move a video endpoint into a
    /// consultation room. Endpoints cannot answer invitations, so this
    /// is a direct command rather than an invitation.
    async fn join_endpoint_to_consultation(
        &self,
        conference_id: Uuid,
        endpoint_id: Uuid,
        room_label: &str,
    ) -> Result<(), CcError>;
}

/// HTTP client for the conference detail provider (bookings service).
pub struct HttpConferenceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConferenceProvider {
    /// Point a client at the provider's base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ConferenceProvider for HttpConferenceProvider {
    #[instrument(skip_all, fields(conference_id = %conference_id))]
    async fn get_conference_details(
        &self,
        conference_id: Uuid,
    ) -> Result<Option<Conference>, CcError> {
        let url = format!("{}/conferences/{conference_id}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(target: "cc.provider", error = %e, "Conference detail request failed");
            CcError::Provider(format!("detail request failed: {e}"))
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(|e| {
            warn!(target: "cc.provider", error = %e, "Conference detail request rejected");
            CcError::Provider(format!("detail request rejected: {e}"))
        })?;

        let conference = response.json::<Conference>().await.map_err(|e| {
            warn!(target: "cc.provider", error = %e, "Conference detail body unreadable");
            CcError::Provider(format!("detail response malformed: {e}"))
        })?;
        Ok(Some(conference))
    }

    #[instrument(skip_all)]
    async fn get_conferences_for_today(&self) -> Result<Vec<Conference>, CcError> {
        let url = format!("{}/conferences/today", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "cc.provider", error = %e, "Today's conferences request failed");
                CcError::Provider(format!("today request failed: {e}"))
            })?
            .error_for_status()
            .map_err(|e| {
                warn!(target: "cc.provider", error = %e, "Today's conferences request rejected");
                CcError::Provider(format!("today request rejected: {e}"))
            })?;

        response.json::<Vec<Conference>>().await.map_err(|e| {
            warn!(target: "cc.provider", error = %e, "Today's conferences body unreadable");
            CcError::Provider(format!("today response malformed: {e}"))
        })
    }
}

#[derive(Serialize)]
struct JoinConsultationRequest<'a> {
    endpoint_id: Uuid,
    room_label: &'a str,
}

/// HTTP client for the media platform command API.
pub struct HttpVideoPlatformClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVideoPlatformClient {
    /// Point a client at the platform's base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl VideoPlatformClient for HttpVideoPlatformClient {
    #[instrument(skip_all, fields(conference_id = %conference_id, endpoint_id = %endpoint_id))]
    async fn join_endpoint_to_consultation(
        &self,
        conference_id: Uuid,
        endpoint_id: Uuid,
        room_label: &str,
    ) -> Result<(), CcError> {
        let url = format!(
            "{}/conferences/{conference_id}/consultations/join-endpoint",
            self.base_url
        );
        self.client
            .post(&url)
            .json(&JoinConsultationRequest {
                endpoint_id,
                room_label,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(target: "cc.platform", error = %e, "Endpoint consultation command failed");
                CcError::Platform(format!("join-endpoint request failed: {e}"))
            })?
            .error_for_status()
            .map_err(|e| {
                warn!(target: "cc.platform", error = %e, "Endpoint consultation command rejected");
                CcError::Platform(format!("join-endpoint request rejected: {e}"))
            })?;
        Ok(())
    }
}
