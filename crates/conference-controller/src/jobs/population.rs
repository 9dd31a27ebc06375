//! Daily conference population job.
//!
//! At the start of each hearing day every controller instance races to
//! populate the cache with today's conferences. A distributed lock
//! elects the one instance that does the work; the rest skip and rely
//! on cache-miss loading for anything they are asked about before the
//! winner finishes.
//!
//! The lock is released on every exit path. The TTL only covers the
//! crashed-holder case.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::conference::cache::ConferenceCache;
use crate::errors::CcError;
use crate::platform::ConferenceProvider;
use crate::redis::{LockGuard, RedisLockClient};

/// Name of the population election lock.
pub const DAILY_POPULATION_LOCK: &str = "daily-population";

/// How a population run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum PopulationOutcome {
    /// Another instance holds the lock; nothing was done.
    Skipped,
    /// The full list was loaded into the cache.
    Completed { populated: usize },
    /// Shutdown interrupted the run partway through.
    Cancelled { populated: usize },
}

/// A held population lock.
#[async_trait]
pub trait HeldLock: Send {
    /// Release the lock.
    async fn release(self: Box<Self>) -> Result<bool, CcError>;
}

/// Lock provider seam; production is Redis, tests use an in-memory
/// implementation.
#[async_trait]
pub trait PopulationLock: Send + Sync {
    /// Try to take the named lock.
    async fn try_acquire(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<Box<dyn HeldLock>>, CcError>;
}

#[async_trait]
impl HeldLock for LockGuard {
    async fn release(self: Box<Self>) -> Result<bool, CcError> {
        LockGuard::release(*self).await
    }
}

#[async_trait]
impl PopulationLock for RedisLockClient {
    async fn try_acquire(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<Box<dyn HeldLock>>, CcError> {
        Ok(RedisLockClient::try_acquire(self, name, ttl)
            .await?
            .map(|guard| Box::new(guard) as Box<dyn HeldLock>))
    }
}

/// Populate the cache with today's conferences, guarded by the
/// distributed lock.
///
/// # Errors
///
/// Provider and lock failures; the lock is released first.
#[instrument(skip_all)]
pub async fn populate_daily_conferences(
    cache: &ConferenceCache,
    provider: Arc<dyn ConferenceProvider>,
    lock: &dyn PopulationLock,
    lock_ttl: Duration,
    cancel: &CancellationToken,
) -> Result<PopulationOutcome, CcError> {
    let Some(guard) = lock.try_acquire(DAILY_POPULATION_LOCK, lock_ttl).await? else {
        info!(
            target: "cc.jobs",
            "Daily population lock held elsewhere, skipping"
        );
        return Ok(PopulationOutcome::Skipped);
    };

    let conferences = match provider.get_conferences_for_today().await {
        Ok(conferences) => conferences,
        Err(e) => {
            release_lock(guard).await;
            return Err(e);
        }
    };

    let total = conferences.len();
    let mut populated = 0;
    for conference in conferences {
        if cancel.is_cancelled() {
            warn!(
                target: "cc.jobs",
                populated,
                total,
                "Daily population cancelled mid-run"
            );
            release_lock(guard).await;
            return Ok(PopulationOutcome::Cancelled { populated });
        }
        cache.update(conference).await;
        populated += 1;
    }

    info!(target: "cc.jobs", populated, "Daily population complete");
    release_lock(guard).await;
    Ok(PopulationOutcome::Completed { populated })
}

async fn release_lock(guard: Box<dyn HeldLock>) {
    // A failed release only means waiting out the TTL; it never fails
    // the run that held the lock.
    if let Err(e) = guard.release().await {
        warn!(
            target: "cc.jobs",
            error = %e,
            "Failed to release population lock"
        );
    }
}
