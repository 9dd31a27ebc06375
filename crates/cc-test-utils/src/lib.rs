//! # CC Test Utilities
//!
//! Shared test utilities for the Conference Controller (CC) service.
//!
//! This crate provides mock collaborators and test fixtures for
//! isolated CC testing without requiring real infrastructure.
//!
//! ## Modules
//!
//! - `fixtures` - Builders for conferences, participants and endpoints
//! - `mocks` - Recording mock provider and platform clients
//! - `hub` - Helpers for draining and asserting on hub traffic
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cc_test_utils::fixtures::ConferenceBuilder;
//! use cc_test_utils::mocks::MockConferenceProvider;
//!
//! let conference = ConferenceBuilder::new()
//!     .with_judge("judge@court.test")
//!     .with_individual("claimant@court.test")
//!     .build();
//! let provider = MockConferenceProvider::with_conference(conference);
//! ```

pub mod fixtures;
pub mod hub;
pub mod mocks;

pub use fixtures::{ConferenceBuilder, EndpointBuilder, ParticipantBuilder};
pub use hub::{drain_envelopes, envelopes_for_group};
pub use mocks::{MockConferenceProvider, MockPlatformClient};
