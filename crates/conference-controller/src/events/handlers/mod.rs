//! Per-event-type handlers, grouped by the entity they act on.
//!
//! Each module extends [`EventDispatcher`](super::EventDispatcher)
//! with the handlers for one family of events.

mod consultation;
mod endpoint;
mod hearing;
mod participant;
mod telephone;
