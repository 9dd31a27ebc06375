//! Consultation flows: multi-party invitation tracking.

pub mod invitations;

pub use invitations::{
    ConsultationAnswer, ConsultationInvitation, InvitationTracker, DEFAULT_INVITATION_TTL,
};
