//! In-memory conference cache.
//!
//! Keyed store of the [`Conference`] aggregate with process lifetime:
//! created at start-up, torn down at shutdown, nothing persisted. A
//! restart loses all tracked conferences and they are repopulated from
//! the detail provider on miss or by the daily population job.
//!
//! # Concurrency
//!
//! Callback events for the same conference can race on the
//! read-mutate-write cycle; there is no per-conference serialization.
//! `update` is therefore last-writer-wins at the granularity of a
//! whole `Conference` - handlers replace the entire aggregate and
//! never merge individual fields into a stored instance.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::model::Conference;
use crate::errors::CcError;
use crate::platform::ConferenceProvider;

/// Keyed in-memory store of live conferences.
pub struct ConferenceCache {
    entries: RwLock<HashMap<Uuid, Conference>>,
}

impl Default for ConferenceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConferenceCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a conference without touching the provider.
    pub async fn get(&self, id: Uuid) -> Option<Conference> {
        self.entries.read().await.get(&id).cloned()
    }

    /// Get a conference, loading it from the provider on miss.
    ///
    /// A provider answer of "no such conference" is fatal to the
    /// current operation and surfaces as
    /// [`CcError::ConferenceNotFound`]; callers never fall back to a
    /// default.
    #[instrument(skip_all, fields(conference_id = %id))]
    pub async fn get_or_load(
        &self,
        id: Uuid,
        provider: &dyn ConferenceProvider,
    ) -> Result<Conference, CcError> {
        if let Some(conference) = self.get(id).await {
            return Ok(conference);
        }

        let loaded = provider
            .get_conference_details(id)
            .await?
            .ok_or(CcError::ConferenceNotFound(id))?;

        debug!(target: "cc.cache", conference_id = %id, "Loaded conference on cache miss");

        let mut entries = self.entries.write().await;
        // Another loader may have won the race; keep whichever entry
        // is already stored rather than clobbering newer state.
        Ok(entries.entry(id).or_insert(loaded).clone())
    }

    /// Reload a conference from the provider, overwriting any cached
    /// instance.
    #[instrument(skip_all, fields(conference_id = %id))]
    pub async fn force_refresh(
        &self,
        id: Uuid,
        provider: &dyn ConferenceProvider,
    ) -> Result<Conference, CcError> {
        let loaded = provider
            .get_conference_details(id)
            .await?
            .ok_or(CcError::ConferenceNotFound(id))?;

        debug!(target: "cc.cache", conference_id = %id, "Force-refreshed conference");

        let mut entries = self.entries.write().await;
        entries.insert(id, loaded.clone());
        Ok(loaded)
    }

    /// Replace the stored conference with `conference`
    /// (last-writer-wins).
    pub async fn update(&self, conference: Conference) {
        let mut entries = self.entries.write().await;
        entries.insert(conference.id, conference);
    }

    /// Remove a conference from the cache.
    pub async fn remove(&self, id: Uuid) {
        let mut entries = self.entries.write().await;
        entries.remove(&id);
    }

    /// Number of conferences currently tracked.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no conferences.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
