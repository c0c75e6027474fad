// Host-side round scoring and win evaluation.

use super::actor::RunResult;
use super::directory::Directory;
use super::participant::PeerId;
use super::tuning::ScoringTuning;
use std::collections::HashMap;

/// One participant's line on the score screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub id: PeerId,
    pub display_name: String,
    // Cumulative total after this round.
    pub current: u32,
    // Points earned this round.
    pub added: u32,
}

pub fn round_delta(result: &RunResult, tuning: &ScoringTuning) -> u32 {
    let bonus = if result.won { tuning.goal_bonus } else { 0 };
    bonus + result.coins.saturating_mul(tuning.collectible_value)
}

/// Adds each participant's round delta to their total and returns the entries in directory order.
///
/// Participants without a recorded result (spectators) earn nothing this round.
pub fn tally_round(
    directory: &mut Directory,
    results: &HashMap<PeerId, RunResult>,
    tuning: &ScoringTuning,
) -> Vec<ScoreEntry> {
    let ids: Vec<PeerId> = directory
        .participants()
        .iter()
        .map(|p| p.id.clone())
        .collect();

    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        let added = results
            .get(&id)
            .map(|result| round_delta(result, tuning))
            .unwrap_or(0);
        let Some(current) = directory.add_score(&id, added) else {
            continue;
        };
        let display_name = directory
            .get(&id)
            .map(|p| p.display_name.clone())
            .unwrap_or_default();
        entries.push(ScoreEntry {
            id,
            display_name,
            current,
            added,
        });
    }
    entries
}

/// First entry (directory order) whose total reached the goal score.
pub fn find_winner(entries: &[ScoreEntry], goal_score: u32) -> Option<&ScoreEntry> {
    entries.iter().find(|entry| entry.current >= goal_score)
}
