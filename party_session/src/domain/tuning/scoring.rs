/// Scoring rules applied by the host at the end of each run.
///
/// Keep this separate from runtime configuration (ports, channel sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct ScoringTuning {
    /// Points for reaching the goal in a round.
    pub goal_bonus: u32,

    /// Points per collectible picked up during the run.
    pub collectible_value: u32,

    /// Cumulative total that ends the game.
    pub goal_score: u32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            goal_bonus: 10,
            collectible_value: 2,
            goal_score: 50,
        }
    }
}
