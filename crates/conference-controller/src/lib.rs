//! Conference Controller (CC) Service Library
//!
//! Live-state service for online court hearings. The controller keeps
//! an in-memory picture of every running hearing ("conference") and
//! reacts to callback events from the external media platform:
//!
//! - Conference state caching with provider fallback on miss
//! - Callback event dispatch (participant, endpoint, telephone,
//!   hearing lifecycle and consultation events)
//! - Lazy consultation room orchestration
//! - Multi-party consultation invitation tracking with expiry
//! - Hub notification fan-out to participants, officers and
//!   conference-wide groups
//! - Distributed-lock-guarded daily cache population
//!
//! # Key Design Decisions
//!
//! - **Whole-object replace**: Handlers mutate a local copy of a
//!   conference and store it back; last writer wins, no field merging
//! - **Best-effort hub**: Notify failures never fail the operation
//!   that triggered them
//! - **Events apply regardless of order**: The platform offers no
//!   ordering guarantee; out-of-order events are logged and applied,
//!   and only `last_event_time` is monotonic
//!
//! # Modules
//!
//! - [`conference`] - Conference aggregate, room orchestration, cache
//! - [`events`] - Callback event model and dispatch
//! - [`consultation`] - Invitation tracking
//! - [`hub`] - Notification fan-out
//! - [`service`] - User-facing conference operations
//! - [`jobs`] - Daily population job
//! - [`redis`] - Distributed lock
//! - [`config`] - Service configuration from environment
//! - [`errors`] - Error types with HTTP status mapping

pub mod conference;
pub mod config;
pub mod consultation;
pub mod errors;
pub mod events;
pub mod http;
pub mod hub;
pub mod jobs;
pub mod platform;
pub mod redis;
pub mod secret;
pub mod service;
