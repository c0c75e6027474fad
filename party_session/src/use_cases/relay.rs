// Fan-out of host facts over the joined participants.

use crate::domain::{Participant, PeerId};

/// Which participants a broadcast reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fanout<'a> {
    Everyone,
    // Skip one peer, usually the original sender of a relayed fact.
    Except(&'a str),
}

impl Fanout<'_> {
    pub fn includes(&self, peer: &str) -> bool {
        match self {
            Fanout::Everyone => true,
            Fanout::Except(excluded) => *excluded != peer,
        }
    }

    /// Remote participants selected by this fan-out, in directory order.
    ///
    /// Open channels that never sent JOIN are not participants and get nothing.
    pub fn recipients(&self, participants: &[Participant], local_id: &str) -> Vec<PeerId> {
        participants
            .iter()
            .map(|p| p.id.as_str())
            .filter(|id| *id != local_id && self.includes(id))
            .map(str::to_string)
            .collect()
    }
}
