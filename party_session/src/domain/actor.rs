// Live actor state: pose snapshots and run progress from contact events.

use super::items::Vec3;
use super::participant::PeerId;

/// Semantic category of a contact reported by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Hazard,
    Goal,
    BouncePad,
    Collectible,
    PushZone,
}

/// Pose of one actor, streamed every tick during countdown and run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub id: PeerId,
    pub position: Vec3,
    // Quaternion as x, y, z, w.
    pub rotation: [f32; 4],
    pub anim: String,
}

/// How a participant's run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunResult {
    pub won: bool,
    pub coins: u32,
}

/// Local run bookkeeping for the current round.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunProgress {
    coins: u32,
    finished: Option<RunResult>,
}

impl RunProgress {
    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn result(&self) -> Option<RunResult> {
        self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Applies a contact; returns the result exactly once, when the contact ends the run.
    pub fn record(&mut self, kind: ContactKind) -> Option<RunResult> {
        if self.finished.is_some() {
            return None;
        }
        let result = match kind {
            ContactKind::Collectible => {
                self.coins += 1;
                return None;
            }
            // Movement effects stay inside the physics collaborator.
            ContactKind::BouncePad | ContactKind::PushZone => return None,
            ContactKind::Goal => RunResult {
                won: true,
                coins: self.coins,
            },
            ContactKind::Hazard => RunResult {
                won: false,
                coins: self.coins,
            },
        };
        self.finished = Some(result);
        Some(result)
    }
}
