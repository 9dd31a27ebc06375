//! Conference domain: the aggregate model, room orchestration and the
//! in-memory cache.

pub mod cache;
pub mod model;
pub mod rooms;

pub use cache::ConferenceCache;
pub use model::{
    Conference, ConferenceStatus, ConsultationRoom, Endpoint, EndpointStatus, Participant,
    ParticipantStatus, Role, RoomLabel, RoomOccupant, TelephoneParticipant,
};
