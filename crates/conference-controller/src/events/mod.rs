//! Callback event ingestion and handling.

pub mod dispatcher;
pub mod handlers;
pub mod model;
pub mod transfer;

pub use dispatcher::EventDispatcher;
pub use model::{CallbackEvent, EventType};
