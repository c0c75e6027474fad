// Round state and replicated level shared by the host and client roles.

use super::ports::{Frontend, LobbyView, Transport};
use super::types::SessionStatus;
use crate::domain::tuning::{RoundTuning, ScoringTuning};
use crate::domain::{
    ActorSnapshot, ContactKind, Directory, Participant, PartyBox, PartyBoxSlot, PeerId,
    PlacedItem, Rotation, RoundPhase, RunProgress, RunResult, TurnTracker, Vec3,
};
use tracing::{debug, info};

pub(crate) const INVALID_PLACEMENT: &str = "Invalid Placement!";
pub(crate) const WAITING_FOR_PLAYERS: &str = "Waiting for other players...";

/// Gameplay tuning a session runs with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    pub scoring: ScoringTuning,
    pub round: RoundTuning,
}

/// State every peer keeps, whichever role it plays.
pub(crate) struct Session<T, F> {
    pub(crate) local_id: PeerId,
    pub(crate) is_host: bool,
    pub(crate) directory: Directory,
    pub(crate) phase: RoundPhase,
    pub(crate) round: u32,
    pub(crate) turns: TurnTracker,
    pub(crate) party_box: PartyBox,
    // Item won in the pick phase and not yet placed.
    pub(crate) held_item: Option<String>,
    pub(crate) rotation: Rotation,
    // Every placement applied this game, in application order.
    pub(crate) placed: Vec<PlacedItem>,
    pub(crate) run: RunProgress,
    // Seconds left before the run starts.
    pub(crate) countdown: f32,
    pub(crate) settings: SessionSettings,
    pub(crate) transport: T,
    pub(crate) frontend: F,
}

impl<T: Transport, F: Frontend> Session<T, F> {
    pub(crate) fn new(
        local_id: PeerId,
        is_host: bool,
        directory: Directory,
        settings: SessionSettings,
        transport: T,
        frontend: F,
    ) -> Self {
        Self {
            local_id,
            is_host,
            directory,
            phase: RoundPhase::Unset,
            round: 0,
            turns: TurnTracker::default(),
            party_box: PartyBox::default(),
            held_item: None,
            rotation: Rotation::default(),
            placed: Vec::new(),
            run: RunProgress::default(),
            countdown: 0.0,
            settings,
            transport,
            frontend,
        }
    }

    /// Moves to `phase` and runs its entry actions; re-entering the current phase is a no-op.
    pub(crate) fn enter(&mut self, phase: RoundPhase) -> bool {
        if self.phase == phase {
            return false;
        }
        let from = self.phase;
        self.phase = phase;
        info!(
            peer_id = %self.local_id,
            from = from.as_str(),
            to = phase.as_str(),
            round = self.round,
            "phase changed"
        );

        match phase {
            RoundPhase::Lobby => {
                self.placed.clear();
                self.frontend.clear_level();
                self.reset_round_state();
            }
            RoundPhase::ItemPick => self.reset_round_state(),
            RoundPhase::Countdown => {
                self.turns.reset();
                self.countdown = self.settings.round.countdown_seconds;
            }
            _ => {}
        }

        self.frontend.phase_changed(phase);
        match phase {
            RoundPhase::Lobby => self.show_lobby(),
            RoundPhase::Countdown => {
                let text = countdown_text(self.countdown);
                self.frontend.show_message(&text);
            }
            _ => {}
        }
        true
    }

    fn reset_round_state(&mut self) {
        self.turns.reset();
        self.party_box = PartyBox::default();
        self.held_item = None;
        self.rotation = Rotation::default();
        self.run = RunProgress::default();
        self.countdown = 0.0;
    }

    /// Starts the next round on this peer.
    pub(crate) fn begin_round(&mut self) {
        self.round += 1;
        self.frontend
            .spawn_actors(self.directory.participants(), &self.local_id);
        self.enter(RoundPhase::ItemPick);
    }

    pub(crate) fn install_party_box(&mut self, slots: Vec<PartyBoxSlot>) {
        self.frontend.show_party_box(&slots);
        self.party_box = PartyBox::new(slots);
    }

    /// Applies a confirmed claim; the local actor moves on to build when it was the claimant.
    pub(crate) fn adopt_claim(&mut self, index: usize, actor_id: &str) -> bool {
        let Some(slot) = self.party_box.record_claim(index, actor_id) else {
            debug!(index, actor_id, "claim for unknown slot ignored");
            return false;
        };
        let item_id = slot.item_id.clone();
        self.frontend.hide_slot(index);
        if actor_id == self.local_id && self.phase == RoundPhase::ItemPick {
            self.held_item = Some(item_id);
            self.enter(RoundPhase::BuildView);
        }
        true
    }

    pub(crate) fn begin_placement(&mut self) -> bool {
        if self.phase != RoundPhase::BuildView || self.held_item.is_none() {
            return false;
        }
        self.enter(RoundPhase::BuildPlace)
    }

    pub(crate) fn rotate(&mut self) -> Option<Rotation> {
        if self.phase != RoundPhase::BuildPlace {
            return None;
        }
        self.rotation = self.rotation.next();
        Some(self.rotation)
    }

    /// Places the held item locally when the oracle accepts it and returns the fact to replicate.
    pub(crate) fn place_local(&mut self, position: Vec3) -> Option<PlacedItem> {
        if self.phase != RoundPhase::BuildPlace || self.turns.has_completed(&self.local_id) {
            return None;
        }
        let item_id = self.held_item.clone()?;
        if !position.is_finite()
            || !self
                .frontend
                .placement_is_valid(&item_id, position, self.rotation)
        {
            self.frontend.show_message(INVALID_PLACEMENT);
            return None;
        }

        let item = PlacedItem {
            item_id,
            position,
            rotation: self.rotation,
            actor_id: self.local_id.clone(),
        };
        self.frontend.spawn_item(&item);
        self.placed.push(item.clone());
        self.held_item = None;
        self.turns.mark_done(&self.local_id);
        Some(item)
    }

    /// Announces the wait, or starts the countdown when this placement was the last one.
    pub(crate) fn after_local_place(&mut self) {
        if !self.check_build_barrier() {
            self.frontend.show_message(WAITING_FOR_PLAYERS);
        }
    }

    /// Applies a relayed placement; returns false for self-echoes and duplicates.
    pub(crate) fn apply_remote_place(&mut self, item: PlacedItem) -> bool {
        if item.actor_id == self.local_id || self.phase == RoundPhase::Unset {
            return false;
        }
        if self.placed.contains(&item) {
            debug!(actor_id = %item.actor_id, "duplicate placement ignored");
            return false;
        }
        self.frontend.spawn_item(&item);
        self.turns.mark_done(&item.actor_id);
        self.placed.push(item);
        self.check_build_barrier();
        true
    }

    /// Rebuilds placements made before this peer joined, without counting them as turns.
    pub(crate) fn restore_level(&mut self, items: Vec<PlacedItem>) {
        for item in items {
            if self.placed.contains(&item) {
                continue;
            }
            self.frontend.spawn_item(&item);
            self.placed.push(item);
        }
    }

    pub(crate) fn check_build_barrier(&mut self) -> bool {
        if self.phase != RoundPhase::BuildPlace || !self.turns.is_barrier_cleared(&self.directory)
        {
            return false;
        }
        info!(round = self.round, "every participant placed; countdown");
        self.enter(RoundPhase::Countdown)
    }

    /// Advances the countdown and returns the local pose to stream, if any.
    pub(crate) fn tick(&mut self, dt: f32) -> Option<ActorSnapshot> {
        if self.phase == RoundPhase::Countdown {
            let shown = self.countdown.ceil();
            self.countdown -= dt;
            if self.countdown <= 0.0 {
                self.enter(RoundPhase::Run);
            } else if self.countdown.ceil() < shown {
                let text = countdown_text(self.countdown);
                self.frontend.show_message(&text);
            }
        }

        if !self.phase.streams_snapshots() {
            return None;
        }
        let mut snapshot = self.frontend.local_snapshot()?;
        snapshot.id = self.local_id.clone();
        Some(snapshot)
    }

    /// Feeds a local contact into the run; returns the result once, when the run ends.
    pub(crate) fn record_contact(&mut self, kind: ContactKind) -> Option<RunResult> {
        if self.phase != RoundPhase::Run {
            return None;
        }
        let result = self.run.record(kind)?;
        self.turns.mark_done(&self.local_id);
        self.frontend
            .show_message(if result.won { "GOAL!" } else { "DIED!" });
        info!(
            peer_id = %self.local_id,
            won = result.won,
            coins = result.coins,
            "run finished"
        );
        Some(result)
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: &ActorSnapshot) {
        if snapshot.id == self.local_id {
            return;
        }
        self.frontend.apply_snapshot(snapshot);
    }

    /// Replaces the mirrored directory wholesale (last write wins).
    pub(crate) fn replace_directory(&mut self, participants: Vec<Participant>) {
        self.directory = Directory::from_snapshot(participants);
        if self.phase == RoundPhase::Lobby {
            self.show_lobby();
        }
        self.check_build_barrier();
    }

    pub(crate) fn show_lobby(&mut self) {
        self.frontend.show_lobby(&LobbyView {
            local_id: &self.local_id,
            participants: self.directory.participants(),
            is_host: self.is_host,
        });
    }

    /// True when the local participant joined mid-round and sits it out.
    pub(crate) fn is_spectating(&self) -> bool {
        self.directory
            .get(&self.local_id)
            .is_some_and(|p| p.spectating)
    }

    pub(crate) fn status(&self) -> SessionStatus {
        SessionStatus {
            local_id: self.local_id.clone(),
            is_host: self.is_host,
            phase: self.phase,
            round: self.round,
            participants: self.directory.participants().to_vec(),
        }
    }
}

fn countdown_text(remaining: f32) -> String {
    format!("Get Ready! {}", remaining.ceil().max(1.0) as u32)
}
