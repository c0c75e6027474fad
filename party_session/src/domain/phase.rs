// Round phases a session moves through.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    // Before the first transition; distinct from Lobby so entering Lobby always runs.
    Unset,
    Lobby,
    ItemPick,
    BuildView,
    BuildPlace,
    Countdown,
    Run,
    Score,
    GameOver,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Unset => "UNSET",
            RoundPhase::Lobby => "LOBBY",
            RoundPhase::ItemPick => "ITEM_PICK",
            RoundPhase::BuildView => "BUILD_VIEW",
            RoundPhase::BuildPlace => "BUILD_PLACE",
            RoundPhase::Countdown => "COUNTDOWN",
            RoundPhase::Run => "RUN",
            RoundPhase::Score => "SCORE",
            RoundPhase::GameOver => "GAME_OVER",
        }
    }

    /// Phases during which every peer streams its actor pose.
    pub fn streams_snapshots(&self) -> bool {
        matches!(self, RoundPhase::Countdown | RoundPhase::Run)
    }

    /// Phases that belong to a running round.
    pub fn is_in_round(&self) -> bool {
        !matches!(
            self,
            RoundPhase::Unset | RoundPhase::Lobby | RoundPhase::GameOver
        )
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
