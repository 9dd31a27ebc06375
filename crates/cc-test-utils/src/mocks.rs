//! Recording mock collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use conference_controller::conference::model::Conference;
use conference_controller::errors::CcError;
use conference_controller::platform::{ConferenceProvider, VideoPlatformClient};

/// In-memory conference detail provider that records how often it is
/// hit.
#[derive(Default)]
pub struct MockConferenceProvider {
    conferences: Mutex<HashMap<Uuid, Conference>>,
    detail_calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockConferenceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conference(conference: Conference) -> Self {
        let provider = Self::new();
        provider.add_conference(conference);
        provider
    }

    pub fn with_conferences(conferences: Vec<Conference>) -> Self {
        let provider = Self::new();
        for conference in conferences {
            provider.add_conference(conference);
        }
        provider
    }

    pub fn add_conference(&self, conference: Conference) {
        self.conferences
            .lock()
            .expect("provider mutex poisoned")
            .insert(conference.id, conference);
    }

    /// Make every call fail with `CcError::Provider`.
    pub fn fail_requests(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Number of `get_conference_details` calls observed.
    pub fn detail_call_count(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConferenceProvider for MockConferenceProvider {
    async fn get_conference_details(
        &self,
        conference_id: Uuid,
    ) -> Result<Option<Conference>, CcError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CcError::Provider("mock provider failure".to_string()));
        }
        Ok(self
            .conferences
            .lock()
            .expect("provider mutex poisoned")
            .get(&conference_id)
            .cloned())
    }

    async fn get_conferences_for_today(&self) -> Result<Vec<Conference>, CcError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CcError::Provider("mock provider failure".to_string()));
        }
        Ok(self
            .conferences
            .lock()
            .expect("provider mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

/// A recorded endpoint consultation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEndpointCall {
    pub conference_id: Uuid,
    pub endpoint_id: Uuid,
    pub room_label: String,
}

/// Recording media platform client.
#[derive(Default)]
pub struct MockPlatformClient {
    calls: Mutex<Vec<JoinEndpointCall>>,
    fail: AtomicBool,
}

impl MockPlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command fail with `CcError::Platform`.
    pub fn fail_requests(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// All commands observed so far.
    pub fn calls(&self) -> Vec<JoinEndpointCall> {
        self.calls.lock().expect("platform mutex poisoned").clone()
    }
}

#[async_trait]
impl VideoPlatformClient for MockPlatformClient {
    async fn join_endpoint_to_consultation(
        &self,
        conference_id: Uuid,
        endpoint_id: Uuid,
        room_label: &str,
    ) -> Result<(), CcError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CcError::Platform("mock platform failure".to_string()));
        }
        self.calls
            .lock()
            .expect("platform mutex poisoned")
            .push(JoinEndpointCall {
                conference_id,
                endpoint_id,
                room_label: room_label.to_string(),
            });
        Ok(())
    }
}
