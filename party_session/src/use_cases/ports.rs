// Ports for the collaborators the session core drives.

use super::types::SessionMessage;
use crate::domain::{
    ActorSnapshot, Participant, PartyBoxSlot, PeerId, PlacedItem, RoundPhase, Rotation,
    ScoreEntry, Vec3,
};

/// Per-destination ordered channels to the remote peers.
pub trait Transport {
    /// Queues `message` for `peer`; dropped silently when no channel is open.
    fn send(&mut self, peer: &str, message: &SessionMessage);

    /// Identities with a live channel.
    fn peers(&self) -> Vec<PeerId>;

    /// Sends to every recipient with a live channel; returns how many were reached.
    fn broadcast(&mut self, message: &SessionMessage, recipients: &[PeerId]) -> usize {
        let mut sent = 0;
        for peer in self.peers() {
            if recipients.contains(&peer) {
                self.send(&peer, message);
                sent += 1;
            }
        }
        sent
    }
}

/// Lobby screen contents.
#[derive(Debug)]
pub struct LobbyView<'a> {
    pub local_id: &'a str,
    pub participants: &'a [Participant],
    pub is_host: bool,
}

/// Physics, rendering and UI as seen from the session core.
///
/// Only the placement oracle and transient messages are mandatory; every other sink
/// defaults to doing nothing so headless peers stay small.
pub trait Frontend {
    fn placement_is_valid(&self, item_id: &str, position: Vec3, rotation: Rotation) -> bool;

    fn show_message(&mut self, text: &str);

    fn spawn_item(&mut self, _item: &PlacedItem) {}

    fn clear_level(&mut self) {}

    fn show_party_box(&mut self, _slots: &[PartyBoxSlot]) {}

    fn hide_slot(&mut self, _index: usize) {}

    fn spawn_actors(&mut self, _participants: &[Participant], _local_id: &str) {}

    fn apply_snapshot(&mut self, _snapshot: &ActorSnapshot) {}

    /// Pose of the local actor; `None` when there is nothing to stream.
    fn local_snapshot(&self) -> Option<ActorSnapshot> {
        None
    }

    fn phase_changed(&mut self, _phase: RoundPhase) {}

    fn show_lobby(&mut self, _lobby: &LobbyView<'_>) {}

    fn show_scores(&mut self, _scores: &[ScoreEntry], _goal_score: u32) {}

    fn show_winner(&mut self, _winner: &ScoreEntry) {}
}
