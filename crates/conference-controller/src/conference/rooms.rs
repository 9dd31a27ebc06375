//! Room and consultation orchestration on the conference aggregate.
//!
//! Consultation rooms are materialized lazily: the first transfer that
//! targets a not-yet-existing label creates the room (locked, label =
//! transfer target), and the room is removed the instant its occupant
//! set becomes empty after a departure. The standard rooms
//! (WaitingRoom, HearingRoom, AdminRoom) never materialize as
//! `ConsultationRoom` entries.

use tracing::debug;
use uuid::Uuid;

use super::model::{Conference, ConsultationRoom, RoomLabel, RoomOccupant};

impl Conference {
    /// Move a participant into the named consultation room, creating
    /// the room if this is the first occupant.
    ///
    /// Returns `true` when the room was newly materialized.
    pub fn add_participant_to_consultation_room(
        &mut self,
        label: &str,
        participant_id: Uuid,
    ) -> bool {
        self.add_occupant(label, RoomOccupant::Participant(participant_id))
    }

    /// Move an endpoint into the named consultation room, creating the
    /// room if this is the first occupant.
    ///
    /// Returns `true` when the room was newly materialized.
    pub fn add_endpoint_to_consultation_room(&mut self, label: &str, endpoint_id: Uuid) -> bool {
        self.add_occupant(label, RoomOccupant::Endpoint(endpoint_id))
    }

    /// Remove an occupant from whichever consultation room holds it,
    /// destroying the room if it is left empty.
    ///
    /// Returns the label of the destroyed room, if any. Occupants of
    /// standard rooms have no `ConsultationRoom` entry to leave, so
    /// this is a no-op for them.
    pub fn remove_from_current_room(&mut self, occupant: RoomOccupant) -> Option<String> {
        for room in &mut self.consultation_rooms {
            if let Some(pos) = room.occupants.iter().position(|o| *o == occupant) {
                room.occupants.remove(pos);
                break;
            }
        }

        let emptied = self
            .consultation_rooms
            .iter()
            .position(ConsultationRoom::is_empty)?;
        let room = self.consultation_rooms.remove(emptied);
        debug!(
            target: "cc.rooms",
            conference_id = %self.id,
            room = %room.label,
            "Consultation room emptied, destroyed"
        );
        Some(room.label)
    }

    fn add_occupant(&mut self, label: &str, occupant: RoomOccupant) -> bool {
        // Leaving the previous room first keeps the invariant that an
        // occupant is in at most one consultation room.
        self.remove_from_current_room(occupant);

        if RoomLabel::from(label).is_standard() {
            // Standard rooms are fixed; nothing materializes.
            return false;
        }

        if let Some(room) = self.consultation_rooms.iter_mut().find(|r| r.label == label) {
            if !room.occupants.contains(&occupant) {
                room.occupants.push(occupant);
            }
            return false;
        }

        debug!(
            target: "cc.rooms",
            conference_id = %self.id,
            room = %label,
            "Materializing consultation room"
        );
        self.consultation_rooms.push(ConsultationRoom {
            label: label.to_string(),
            locked: true,
            conference_id: self.id,
            occupants: vec![occupant],
        });
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::conference::model::ConferenceStatus;
    use chrono::Utc;

    fn conference() -> Conference {
        Conference {
            id: Uuid::new_v4(),
            hearing_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            scheduled_duration_minutes: 30,
            status: ConferenceStatus::NotStarted,
            countdown_complete: false,
            participants: Vec::new(),
            endpoints: Vec::new(),
            telephone_participants: Vec::new(),
            consultation_rooms: Vec::new(),
        }
    }

    #[test]
    fn test_first_entry_materializes_room() {
        let mut conf = conference();
        let pid = Uuid::new_v4();

        let created = conf.add_participant_to_consultation_room("JudgeConsultationRoom3", pid);

        assert!(created);
        let room = conf.consultation_room("JudgeConsultationRoom3").unwrap();
        assert!(room.locked);
        assert_eq!(room.conference_id, conf.id);
        assert_eq!(room.occupants, vec![RoomOccupant::Participant(pid)]);
    }

    #[test]
    fn test_second_entry_reuses_room() {
        let mut conf = conference();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(conf.add_participant_to_consultation_room("ParticipantConsultationRoom1", first));
        assert!(!conf.add_endpoint_to_consultation_room("ParticipantConsultationRoom1", second));

        assert_eq!(conf.consultation_rooms.len(), 1);
        let room = conf
            .consultation_room("ParticipantConsultationRoom1")
            .unwrap();
        assert_eq!(room.occupants.len(), 2);
    }

    #[test]
    fn test_last_occupant_leaving_destroys_room() {
        let mut conf = conference();
        let pid = Uuid::new_v4();
        let eid = Uuid::new_v4();

        conf.add_participant_to_consultation_room("ConsultationRoom2", pid);
        conf.add_endpoint_to_consultation_room("ConsultationRoom2", eid);

        assert_eq!(
            conf.remove_from_current_room(RoomOccupant::Participant(pid)),
            None
        );
        assert_eq!(conf.consultation_rooms.len(), 1);

        assert_eq!(
            conf.remove_from_current_room(RoomOccupant::Endpoint(eid)),
            Some("ConsultationRoom2".to_string())
        );
        assert!(conf.consultation_rooms.is_empty());
    }

    #[test]
    fn test_moving_between_rooms_leaves_previous() {
        let mut conf = conference();
        let pid = Uuid::new_v4();

        conf.add_participant_to_consultation_room("RoomA", pid);
        conf.add_participant_to_consultation_room("RoomB", pid);

        // RoomA was emptied by the move and destroyed.
        assert!(conf.consultation_room("RoomA").is_none());
        let room_b = conf.consultation_room("RoomB").unwrap();
        assert_eq!(room_b.occupants, vec![RoomOccupant::Participant(pid)]);
    }

    #[test]
    fn test_standard_rooms_never_materialize() {
        let mut conf = conference();
        let pid = Uuid::new_v4();

        assert!(!conf.add_participant_to_consultation_room("WaitingRoom", pid));
        assert!(!conf.add_participant_to_consultation_room("HearingRoom", pid));
        assert!(!conf.add_participant_to_consultation_room("AdminRoom", pid));
        assert!(conf.consultation_rooms.is_empty());
    }

    #[test]
    fn test_remove_is_noop_for_untracked_occupant() {
        let mut conf = conference();
        assert_eq!(
            conf.remove_from_current_room(RoomOccupant::Participant(Uuid::new_v4())),
            None
        );
    }
}
