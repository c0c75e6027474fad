// Frontend for peers without a renderer: keeps a level model and logs what a UI would show.

use crate::domain::items::footprint;
use crate::domain::{
    ActorSnapshot, Participant, PartyBoxSlot, PlacedItem, Rotation, RoundPhase, ScoreEntry, Vec3,
};
use crate::use_cases::{Frontend, LobbyView};
use tracing::{debug, info};

// Placed blocks may touch but not interpenetrate.
const OVERLAP_SLACK: f32 = 0.05;

const SPAWN_POINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

#[derive(Debug, Default)]
pub struct HeadlessFrontend {
    level: Vec<PlacedItem>,
    pose: Option<ActorSnapshot>,
}

impl HeadlessFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> &[PlacedItem] {
        &self.level
    }
}

fn half_extents(item_id: &str, rotation: Rotation) -> Vec3 {
    let size = footprint(item_id, rotation);
    Vec3::new(
        size.x / 2.0 - OVERLAP_SLACK,
        size.y / 2.0 - OVERLAP_SLACK,
        size.z / 2.0 - OVERLAP_SLACK,
    )
}

fn overlaps(a_pos: Vec3, a_half: Vec3, b_pos: Vec3, b_half: Vec3) -> bool {
    (a_pos.x - b_pos.x).abs() < a_half.x + b_half.x
        && (a_pos.y - b_pos.y).abs() < a_half.y + b_half.y
        && (a_pos.z - b_pos.z).abs() < a_half.z + b_half.z
}

impl Frontend for HeadlessFrontend {
    fn placement_is_valid(&self, item_id: &str, position: Vec3, rotation: Rotation) -> bool {
        if !position.is_finite() {
            return false;
        }
        let half = half_extents(item_id, rotation);
        !self.level.iter().any(|placed| {
            overlaps(
                position,
                half,
                placed.position,
                half_extents(&placed.item_id, placed.rotation),
            )
        })
    }

    fn show_message(&mut self, text: &str) {
        info!(text, "message");
    }

    fn spawn_item(&mut self, item: &PlacedItem) {
        debug!(
            item_id = %item.item_id,
            actor_id = %item.actor_id,
            x = item.position.x,
            y = item.position.y,
            z = item.position.z,
            rotation = item.rotation.quarter_turns(),
            "item placed"
        );
        self.level.push(item.clone());
    }

    fn clear_level(&mut self) {
        self.level.clear();
    }

    fn show_party_box(&mut self, slots: &[PartyBoxSlot]) {
        let items: Vec<&str> = slots.iter().map(|slot| slot.item_id.as_str()).collect();
        info!(slots = slots.len(), ?items, "party box");
    }

    fn hide_slot(&mut self, index: usize) {
        debug!(index, "slot claimed");
    }

    fn spawn_actors(&mut self, participants: &[Participant], local_id: &str) {
        self.pose = Some(ActorSnapshot {
            id: local_id.to_string(),
            position: SPAWN_POINT,
            rotation: [0.0, 0.0, 0.0, 1.0],
            anim: "idle".to_string(),
        });
        debug!(actors = participants.len(), "actors spawned");
    }

    fn local_snapshot(&self) -> Option<ActorSnapshot> {
        self.pose.clone()
    }

    fn phase_changed(&mut self, phase: RoundPhase) {
        if phase == RoundPhase::Lobby {
            self.pose = None;
        }
    }

    fn show_lobby(&mut self, lobby: &LobbyView<'_>) {
        let ready = lobby
            .participants
            .iter()
            .filter(|p| p.has_character())
            .count();
        info!(
            participants = lobby.participants.len(),
            ready,
            is_host = lobby.is_host,
            "lobby"
        );
    }

    fn show_scores(&mut self, scores: &[ScoreEntry], goal_score: u32) {
        for entry in scores {
            info!(
                id = %entry.id,
                name = %entry.display_name,
                total = entry.current,
                added = entry.added,
                goal_score,
                "score"
            );
        }
    }

    fn show_winner(&mut self, winner: &ScoreEntry) {
        info!(id = %winner.id, name = %winner.display_name, total = winner.current, "winner");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::items::WOOD_BLOCK_321;

    fn block_at(x: f32, z: f32, rotation: Rotation) -> PlacedItem {
        PlacedItem {
            item_id: WOOD_BLOCK_321.to_string(),
            position: Vec3::new(x, 0.5, z),
            rotation,
            actor_id: "a".to_string(),
        }
    }

    #[test]
    fn when_block_overlaps_placed_block_then_placement_is_rejected() {
        let mut frontend = HeadlessFrontend::new();
        frontend.spawn_item(&block_at(0.0, 0.0, Rotation::new(0)));

        assert!(!frontend.placement_is_valid(
            WOOD_BLOCK_321,
            Vec3::new(1.0, 0.5, 0.0),
            Rotation::new(0)
        ));
    }

    #[test]
    fn when_blocks_touch_side_by_side_then_placement_is_allowed() {
        let mut frontend = HeadlessFrontend::new();
        frontend.spawn_item(&block_at(0.0, 0.0, Rotation::new(0)));

        assert!(frontend.placement_is_valid(
            WOOD_BLOCK_321,
            Vec3::new(3.0, 0.5, 0.0),
            Rotation::new(0)
        ));
    }

    #[test]
    fn when_rotation_swaps_extents_then_overlap_uses_the_rotated_footprint() {
        let mut frontend = HeadlessFrontend::new();
        frontend.spawn_item(&block_at(0.0, 0.0, Rotation::new(0)));

        // 2.3 along z clears a 2-deep block but not a 3-deep one.
        let position = Vec3::new(0.0, 0.5, 2.3);
        assert!(frontend.placement_is_valid(WOOD_BLOCK_321, position, Rotation::new(0)));
        assert!(!frontend.placement_is_valid(WOOD_BLOCK_321, position, Rotation::new(1)));
    }

    #[test]
    fn when_level_is_cleared_then_old_blocks_no_longer_collide() {
        let mut frontend = HeadlessFrontend::new();
        frontend.spawn_item(&block_at(0.0, 0.0, Rotation::new(0)));
        frontend.clear_level();

        assert!(frontend.level().is_empty());
        assert!(frontend.placement_is_valid(
            WOOD_BLOCK_321,
            Vec3::new(0.0, 0.5, 0.0),
            Rotation::new(0)
        ));
    }

    #[test]
    fn when_actors_spawn_then_local_pose_is_streamed_until_lobby() {
        let mut frontend = HeadlessFrontend::new();
        assert!(frontend.local_snapshot().is_none());

        frontend.spawn_actors(&[], "me");
        let pose = frontend.local_snapshot().expect("pose after spawn");
        assert_eq!(pose.id, "me");

        frontend.phase_changed(RoundPhase::Lobby);
        assert!(frontend.local_snapshot().is_none());
    }

    #[test]
    fn when_position_is_not_finite_then_placement_is_rejected() {
        let frontend = HeadlessFrontend::new();
        assert!(!frontend.placement_is_valid(
            WOOD_BLOCK_321,
            Vec3::new(f32::NAN, 0.0, 0.0),
            Rotation::new(0)
        ));
    }
}
