//! HTTP surface: callback ingestion and health probes.
//!
//! Two separate routers on two bind addresses. The callback router is
//! the platform-facing ingestion endpoint; `GET /health` and
//! `GET /ready` on the second address answer the orchestrator's probes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::errors::CcError;
use crate::events::{CallbackEvent, EventDispatcher};
use crate::service::ConferenceManagementService;

/// Error body returned to the callback sender. Internal details stay
/// in the logs.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

/// Create the callback ingestion router.
pub fn callback_router(dispatcher: Arc<EventDispatcher>) -> Router {
    Router::new()
        .route("/callback", post(callback_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn callback_handler(
    State(dispatcher): State<Arc<EventDispatcher>>,
    Json(event): Json<CallbackEvent>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    dispatcher
        .dispatch(event)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

/// Body for the hand-status endpoint.
#[derive(Debug, Deserialize)]
struct HandStatusBody {
    raised: bool,
}

/// Create the conference management router (user-facing operations).
pub fn management_router(service: Arc<ConferenceManagementService>) -> Router {
    Router::new()
        .route(
            "/conferences/:conference_id/participants/:participant_id/hand-status",
            post(hand_status_handler),
        )
        .route(
            "/conferences/:conference_id/participants/:participant/leave",
            post(leave_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn hand_status_handler(
    State(service): State<Arc<ConferenceManagementService>>,
    Path((conference_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<HandStatusBody>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    service
        .update_participant_hand_status(conference_id, participant_id, body.raised)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

async fn leave_handler(
    State(service): State<Arc<ConferenceManagementService>>,
    Path((conference_id, participant)): Path<(Uuid, String)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    service
        .participant_leave_conference(conference_id, &participant)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

fn error_response(e: CcError) -> (StatusCode, Json<ErrorBody>) {
    warn!(target: "cc.http", error = %e, "Management request rejected");
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            message: e.client_message(),
        }),
    )
}

/// Probe flags shared between `main` and the health router.
///
/// Liveness holds from startup; readiness flips on once the first
/// population pass finishes (or is skipped) and off again at shutdown.
#[derive(Debug)]
pub struct HealthState {
    live: AtomicBool,
    ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Start live but not yet ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Drops readiness so the load balancer drains us before exit.
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Router answering `/health` and `/ready`.
pub fn health_router(health_state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(liveness_handler))
        .route("/ready", get(readiness_handler))
        .with_state(health_state)
}

async fn liveness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_live() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn readiness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
