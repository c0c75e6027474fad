// Completion barrier shared by the build and run phases.

use super::directory::Directory;
use super::participant::PeerId;
use std::collections::HashSet;

/// Identities that completed the current barrier phase.
///
/// The build and run barriers are never open at the same time, so one tracker serves both.
#[derive(Debug, Clone, Default)]
pub struct TurnTracker {
    completed: HashSet<PeerId>,
}

impl TurnTracker {
    /// Records a completion; returns false when the identity was already recorded.
    pub fn mark_done(&mut self, id: &str) -> bool {
        if self.completed.contains(id) {
            return false;
        }
        self.completed.insert(id.to_string())
    }

    pub fn has_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    pub fn forget(&mut self, id: &str) {
        self.completed.remove(id);
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn reset(&mut self) {
        self.completed.clear();
    }

    /// True once every participant has completed or is sitting the round out.
    ///
    /// Marks left behind by participants who since left the directory do not count.
    pub fn is_barrier_cleared(&self, directory: &Directory) -> bool {
        directory
            .participants()
            .iter()
            .all(|p| p.spectating || self.completed.contains(&p.id))
    }
}
