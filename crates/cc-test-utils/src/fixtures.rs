//! Builders for conference test data.

use chrono::Utc;
use uuid::Uuid;

use conference_controller::conference::model::{
    Conference, ConferenceStatus, Endpoint, EndpointStatus, Participant, ParticipantStatus, Role,
    RoomLabel,
};

/// Builder for a single participant.
pub struct ParticipantBuilder {
    participant: Participant,
}

impl ParticipantBuilder {
    /// Start building a participant with the given role and username.
    pub fn new(role: Role, username: &str) -> Self {
        Self {
            participant: Participant {
                id: Uuid::new_v4(),
                username: username.to_string(),
                display_name: username.to_string(),
                role,
                status: ParticipantStatus::NotSignedIn,
                current_room: None,
                last_event_time: None,
                linked_participants: Vec::new(),
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.participant.id = id;
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.participant.display_name = name.to_string();
        self
    }

    pub fn with_status(mut self, status: ParticipantStatus) -> Self {
        self.participant.status = status;
        self
    }

    pub fn with_room(mut self, room: RoomLabel) -> Self {
        self.participant.current_room = Some(room);
        self
    }

    pub fn linked_to(mut self, id: Uuid) -> Self {
        self.participant.linked_participants.push(id);
        self
    }

    pub fn build(self) -> Participant {
        self.participant
    }
}

/// Builder for a video endpoint.
pub struct EndpointBuilder {
    endpoint: Endpoint,
}

impl EndpointBuilder {
    pub fn new(display_name: &str) -> Self {
        Self {
            endpoint: Endpoint {
                id: Uuid::new_v4(),
                display_name: display_name.to_string(),
                status: EndpointStatus::NotYetJoined,
                current_room: None,
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.endpoint.id = id;
        self
    }

    pub fn with_status(mut self, status: EndpointStatus) -> Self {
        self.endpoint.status = status;
        self
    }

    pub fn with_room(mut self, room: RoomLabel) -> Self {
        self.endpoint.current_room = Some(room);
        self
    }

    pub fn build(self) -> Endpoint {
        self.endpoint
    }
}

/// Builder for a whole conference aggregate.
pub struct ConferenceBuilder {
    conference: Conference,
}

impl Default for ConferenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConferenceBuilder {
    pub fn new() -> Self {
        Self {
            conference: Conference {
                id: Uuid::new_v4(),
                hearing_id: Uuid::new_v4(),
                scheduled_at: Utc::now(),
                scheduled_duration_minutes: 45,
                status: ConferenceStatus::NotStarted,
                countdown_complete: false,
                participants: Vec::new(),
                endpoints: Vec::new(),
                telephone_participants: Vec::new(),
                consultation_rooms: Vec::new(),
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.conference.id = id;
        self
    }

    pub fn with_status(mut self, status: ConferenceStatus) -> Self {
        self.conference.status = status;
        self
    }

    pub fn with_countdown_complete(mut self) -> Self {
        self.conference.countdown_complete = true;
        self
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.conference.participants.push(participant);
        self
    }

    /// Add a judge with default fields.
    pub fn with_judge(self, username: &str) -> Self {
        self.with_participant(ParticipantBuilder::new(Role::Judge, username).build())
    }

    /// Add an individual with default fields.
    pub fn with_individual(self, username: &str) -> Self {
        self.with_participant(ParticipantBuilder::new(Role::Individual, username).build())
    }

    /// Add a judicial office holder with default fields.
    pub fn with_judicial_office_holder(self, username: &str) -> Self {
        self.with_participant(
            ParticipantBuilder::new(Role::JudicialOfficeHolder, username).build(),
        )
    }

    /// Add an individual linked to an interpreter; both are appended.
    pub fn with_interpreter_pair(mut self, username: &str, interpreter: &str) -> Self {
        let interpreter = ParticipantBuilder::new(Role::Individual, interpreter).build();
        let principal = ParticipantBuilder::new(Role::Individual, username)
            .linked_to(interpreter.id)
            .build();
        self.conference.participants.push(principal);
        self.conference.participants.push(interpreter);
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.conference.endpoints.push(endpoint);
        self
    }

    pub fn build(self) -> Conference {
        self.conference
    }
}
