// Ordered participant directory for one session.

use super::participant::{Participant, PeerId};

/// Result of a character request against the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterOutcome {
    Assigned,
    /// Another participant already holds the character (or the id was empty).
    Rejected,
    UnknownParticipant,
}

/// Participants in join order, unique by identity.
///
/// The host mutates its copy; clients replace theirs wholesale from each broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    participants: Vec<Participant>,
}

impl Directory {
    /// Creates the host-side directory holding only the local host.
    pub fn with_host(host: Participant) -> Self {
        Self {
            participants: vec![host],
        }
    }

    /// Rebuilds a mirror from a received snapshot (last write wins).
    pub fn from_snapshot(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Appends a guest; returns false (and changes nothing) when the id is already present.
    pub fn admit(&mut self, id: &str, display_name: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.participants.push(Participant::guest(id, display_name));
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(index))
    }

    /// Gives `character` to `id` unless another participant already holds it.
    pub fn assign_character(&mut self, id: &str, character: &str) -> CharacterOutcome {
        if character.is_empty() {
            return CharacterOutcome::Rejected;
        }
        let taken = self
            .participants
            .iter()
            .any(|p| p.character == character && p.id != id);
        let Some(participant) = self.participants.iter_mut().find(|p| p.id == id) else {
            return CharacterOutcome::UnknownParticipant;
        };
        if taken {
            return CharacterOutcome::Rejected;
        }
        participant.character = character.to_string();
        CharacterOutcome::Assigned
    }

    pub fn all_characters_chosen(&self) -> bool {
        self.participants.iter().all(Participant::has_character)
    }

    /// Adds `delta` to the participant's cumulative total and returns the new total.
    pub fn add_score(&mut self, id: &str, delta: u32) -> Option<u32> {
        let participant = self.participants.iter_mut().find(|p| p.id == id)?;
        participant.total_score = participant.total_score.saturating_add(delta);
        Some(participant.total_score)
    }

    /// Overwrites a cumulative total with the value the host announced.
    pub fn set_score(&mut self, id: &str, total: u32) {
        if let Some(participant) = self.participants.iter_mut().find(|p| p.id == id) {
            participant.total_score = total;
        }
    }

    pub fn reset_scores(&mut self) {
        for participant in &mut self.participants {
            participant.total_score = 0;
        }
    }

    pub fn set_spectating(&mut self, id: &str, spectating: bool) {
        if let Some(participant) = self.participants.iter_mut().find(|p| p.id == id) {
            participant.spectating = spectating;
        }
    }

    pub fn clear_spectators(&mut self) {
        for participant in &mut self.participants {
            participant.spectating = false;
        }
    }

    pub fn spectators(&self) -> impl Iterator<Item = &PeerId> {
        self.participants
            .iter()
            .filter(|p| p.spectating)
            .map(|p| &p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> Directory {
        let mut directory = Directory::with_host(Participant::host("host", "Hana"));
        directory.admit("a", "Ari");
        directory.admit("b", "Bo");
        directory
    }

    #[test]
    fn admit_keeps_join_order_and_ignores_duplicates() {
        let mut directory = lobby();
        assert!(!directory.admit("a", "Ari again"));

        let ids: Vec<&str> = directory.participants().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["host", "a", "b"]);
        assert_eq!(directory.get("a").map(|p| p.display_name.as_str()), Some("Ari"));
    }

    #[test]
    fn exactly_one_host_after_admissions() {
        let directory = lobby();
        let hosts = directory.participants().iter().filter(|p| p.is_host).count();
        assert_eq!(hosts, 1);
        assert!(directory.participants()[0].is_host);
    }

    #[test]
    fn character_taken_by_someone_else_is_rejected() {
        let mut directory = lobby();
        assert_eq!(
            directory.assign_character("a", "chicken"),
            CharacterOutcome::Assigned
        );
        assert_eq!(
            directory.assign_character("b", "chicken"),
            CharacterOutcome::Rejected
        );
        assert_eq!(directory.get("b").map(|p| p.character.as_str()), Some(""));
    }

    #[test]
    fn reselecting_own_character_is_allowed() {
        let mut directory = lobby();
        directory.assign_character("a", "chicken");
        assert_eq!(
            directory.assign_character("a", "chicken"),
            CharacterOutcome::Assigned
        );
    }

    #[test]
    fn unknown_requester_changes_nothing() {
        let mut directory = lobby();
        let before = directory.clone();
        assert_eq!(
            directory.assign_character("ghost", "chicken"),
            CharacterOutcome::UnknownParticipant
        );
        assert_eq!(directory, before);
    }

    #[test]
    fn all_characters_chosen_requires_every_participant() {
        let mut directory = lobby();
        directory.assign_character("host", "duck");
        directory.assign_character("a", "chicken");
        assert!(!directory.all_characters_chosen());
        directory.assign_character("b", "horse");
        assert!(directory.all_characters_chosen());
    }

    #[test]
    fn scores_accumulate_and_reset() {
        let mut directory = lobby();
        assert_eq!(directory.add_score("a", 10), Some(10));
        assert_eq!(directory.add_score("a", 4), Some(14));
        assert_eq!(directory.add_score("ghost", 4), None);
        directory.reset_scores();
        assert!(directory.participants().iter().all(|p| p.total_score == 0));
    }

    #[test]
    fn remove_drops_the_entry() {
        let mut directory = lobby();
        assert!(directory.remove("a").is_some());
        assert!(!directory.contains("a"));
        assert_eq!(directory.len(), 2);
    }
}
