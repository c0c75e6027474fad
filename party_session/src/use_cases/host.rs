// Host role: owns the authoritative directory, arbitrates picks and scores rounds.

use super::ports::{Frontend, Transport};
use super::relay::Fanout;
use super::session::{Session, SessionSettings};
use super::types::{SessionMessage, SessionStatus};
use crate::domain::items::{ITEM_CATALOG, WOOD_BLOCK_321};
use crate::domain::scoring::{find_winner, tally_round};
use crate::domain::tuning::RoundTuning;
use crate::domain::{
    ActorSnapshot, CharacterOutcome, ContactKind, Directory, Participant, PartyBoxSlot, PeerId,
    PlacedItem, RoundPhase, RunResult, ScoreEntry, Vec3,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::f32::consts::TAU;
use tracing::{debug, info, warn};

pub(crate) const CHARACTERS_MISSING: &str = "All players must select a character!";

/// The peer that created the session.
///
/// Every arbitration happens here: admissions, character ownership, pick claims,
/// barrier evaluation and scoring. Remote peers only ever see the outcomes.
pub struct HostSession<T, F> {
    session: Session<T, F>,
    // Run results reported this round, keyed by participant.
    results: HashMap<PeerId, RunResult>,
    last_scores: Vec<ScoreEntry>,
}

impl<T: Transport, F: Frontend> HostSession<T, F> {
    pub fn new(
        local_id: impl Into<PeerId>,
        display_name: &str,
        settings: SessionSettings,
        transport: T,
        frontend: F,
    ) -> Self {
        let local_id = local_id.into();
        let directory = Directory::with_host(Participant::host(local_id.clone(), display_name));
        let mut session = Session::new(local_id, true, directory, settings, transport, frontend);
        session.enter(RoundPhase::Lobby);
        Self {
            session,
            results: HashMap::new(),
            last_scores: Vec::new(),
        }
    }

    pub fn local_id(&self) -> &str {
        &self.session.local_id
    }

    pub fn phase(&self) -> RoundPhase {
        self.session.phase
    }

    pub fn round(&self) -> u32 {
        self.session.round
    }

    pub fn directory(&self) -> &Directory {
        &self.session.directory
    }

    pub fn placed(&self) -> &[PlacedItem] {
        &self.session.placed
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn transport(&self) -> &T {
        &self.session.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.session.transport
    }

    pub fn frontend(&self) -> &F {
        &self.session.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.session.frontend
    }

    /// Dispatches one message received from `from`.
    pub fn handle_message(&mut self, from: &str, message: SessionMessage) {
        if let SessionMessage::Join { display_name } = &message {
            self.handle_join(from, display_name);
            return;
        }
        if !self.session.directory.contains(from) {
            debug!(from, kind = message.kind(), "message from non-participant dropped");
            return;
        }

        match message {
            SessionMessage::CharacterSelect { character } => {
                self.handle_character_select(from, &character)
            }
            SessionMessage::Snapshot(snapshot) => self.handle_snapshot(from, snapshot),
            SessionMessage::Place(item) => self.handle_place(from, item),
            SessionMessage::PickItem { index } => {
                self.process_pick(from, index);
            }
            SessionMessage::FinishedRun(result) => self.handle_finished_run(from, result),
            other => warn!(from, kind = other.kind(), "unexpected message for host"),
        }
    }

    fn handle_join(&mut self, from: &str, display_name: &str) {
        if !self.session.directory.admit(from, display_name) {
            debug!(peer_id = from, "duplicate join ignored");
            return;
        }
        let in_round = self.session.phase.is_in_round();
        if in_round {
            self.session.directory.set_spectating(from, true);
        }
        info!(
            peer_id = from,
            participants = self.session.directory.len(),
            spectating = in_round,
            "participant joined"
        );

        let welcome = SessionMessage::Welcome {
            participants: self.session.directory.participants().to_vec(),
            phase: self.session.phase,
            placed: self.session.placed.clone(),
        };
        self.session.transport.send(from, &welcome);
        self.broadcast_directory(Fanout::Except(from));
        if self.session.phase == RoundPhase::Lobby {
            self.session.show_lobby();
        }
    }

    /// Requests a character for the host itself.
    pub fn select_character(&mut self, character: &str) {
        let local_id = self.session.local_id.clone();
        self.handle_character_select(&local_id, character);
    }

    fn handle_character_select(&mut self, from: &str, character: &str) {
        if self.session.phase != RoundPhase::Lobby {
            debug!(peer_id = from, "character select outside lobby ignored");
            // The requester still gets the roster back so its mirror drops the request.
            if from != self.session.local_id && self.session.directory.contains(from) {
                let update = SessionMessage::LobbyUpdate {
                    participants: self.session.directory.participants().to_vec(),
                };
                self.session.transport.send(from, &update);
            }
            return;
        }
        match self.session.directory.assign_character(from, character) {
            CharacterOutcome::Assigned => info!(peer_id = from, character, "character selected"),
            CharacterOutcome::Rejected => {
                debug!(peer_id = from, character, "character unavailable")
            }
            CharacterOutcome::UnknownParticipant => return,
        }
        // Rebroadcast on rejection too so the requester drops its optimistic choice.
        self.broadcast_directory(Fanout::Everyone);
        self.session.show_lobby();
    }

    /// Starts the first round once every participant has a character.
    pub fn start_session(&mut self) -> bool {
        if self.session.phase != RoundPhase::Lobby {
            return false;
        }
        if !self.session.directory.all_characters_chosen() {
            self.session.frontend.show_message(CHARACTERS_MISSING);
            return false;
        }
        self.start_round();
        true
    }

    fn start_round(&mut self) {
        self.results.clear();
        self.last_scores.clear();
        self.session.directory.clear_spectators();
        self.broadcast_directory(Fanout::Everyone);
        self.fan_out(&SessionMessage::StartGame, Fanout::Everyone);
        self.session.begin_round();

        let count = self.session.directory.len() + self.session.settings.round.extra_party_box_slots;
        let slots = generate_party_box(
            count,
            &self.session.settings.round,
            &mut rand::thread_rng(),
        );
        info!(round = self.session.round, slots = slots.len(), "round started");
        self.session.install_party_box(slots.clone());
        self.fan_out(&SessionMessage::PartyBoxUpdate { slots }, Fanout::Everyone);
    }

    /// Claims a party-box slot for the host.
    pub fn pick(&mut self, index: usize) -> bool {
        if self.session.phase != RoundPhase::ItemPick {
            return false;
        }
        let local_id = self.session.local_id.clone();
        self.process_pick(&local_id, index)
    }

    // Requests are not gated on the host's own phase: a client may reach the pick
    // phase while the host is still in it or already past it.
    fn process_pick(&mut self, actor: &str, index: usize) -> bool {
        if !self.session.phase.is_in_round() || self.is_spectator(actor) {
            return false;
        }
        if let Err(err) = self.session.party_box.claim(index, actor) {
            debug!(peer_id = actor, index, ?err, "pick rejected");
            return false;
        }
        info!(peer_id = actor, index, "item picked");
        let confirmation = SessionMessage::ItemPicked {
            index,
            actor_id: actor.to_string(),
        };
        self.fan_out(&confirmation, Fanout::Everyone);
        self.session.adopt_claim(index, actor);
        true
    }

    pub fn begin_placement(&mut self) -> bool {
        self.session.begin_placement()
    }

    pub fn rotate(&mut self) {
        self.session.rotate();
    }

    /// Places the held item for the host and replicates it.
    pub fn place(&mut self, position: Vec3) -> bool {
        let Some(item) = self.session.place_local(position) else {
            return false;
        };
        self.fan_out(&SessionMessage::Place(item), Fanout::Everyone);
        self.session.after_local_place();
        self.check_run_barrier();
        true
    }

    fn handle_place(&mut self, from: &str, mut item: PlacedItem) {
        if !self.session.phase.is_in_round() || self.is_spectator(from) {
            return;
        }
        item.actor_id = from.to_string();
        if !self.session.apply_remote_place(item.clone()) {
            return;
        }
        debug!(peer_id = from, item_id = %item.item_id, "placement relayed");
        self.fan_out(&SessionMessage::Place(item), Fanout::Except(from));
        self.check_run_barrier();
    }

    /// Applies a contact reported by the host's physics.
    pub fn report_contact(&mut self, kind: ContactKind) {
        if let Some(result) = self.session.record_contact(kind) {
            let local_id = self.session.local_id.clone();
            self.results.insert(local_id, result);
            self.check_run_barrier();
        }
    }

    fn handle_finished_run(&mut self, from: &str, result: RunResult) {
        if !self.session.phase.is_in_round()
            || self.session.phase == RoundPhase::Score
            || self.is_spectator(from)
        {
            return;
        }
        if self.results.contains_key(from) {
            debug!(peer_id = from, "duplicate run result ignored");
            return;
        }
        info!(
            peer_id = from,
            won = result.won,
            coins = result.coins,
            "run result received"
        );
        self.results.insert(from.to_string(), result);
        self.check_run_barrier();
    }

    // Results can arrive before the host itself reaches the countdown, so they are
    // folded into the tracker only once the run barrier is the open one.
    fn check_run_barrier(&mut self) {
        if !self.session.phase.streams_snapshots() {
            return;
        }
        for id in self.results.keys() {
            self.session.turns.mark_done(id);
        }
        if self.session.phase == RoundPhase::Run
            && self.session.turns.is_barrier_cleared(&self.session.directory)
        {
            self.finish_run();
        }
    }

    fn finish_run(&mut self) {
        self.session.enter(RoundPhase::Score);
        let scores = tally_round(
            &mut self.session.directory,
            &self.results,
            &self.session.settings.scoring,
        );
        info!(round = self.session.round, "round scored");
        self.session
            .frontend
            .show_scores(&scores, self.session.settings.scoring.goal_score);
        self.fan_out(
            &SessionMessage::ShowScore {
                scores: scores.clone(),
            },
            Fanout::Everyone,
        );
        self.last_scores = scores;
    }

    /// Ends the score screen: declares a winner or starts the next round.
    pub fn score_reveal_finished(&mut self) {
        if self.session.phase != RoundPhase::Score {
            return;
        }
        let goal = self.session.settings.scoring.goal_score;
        let Some(winner) = find_winner(&self.last_scores, goal).cloned() else {
            self.start_round();
            return;
        };
        info!(winner = %winner.id, total = winner.current, "game over");
        self.session.enter(RoundPhase::GameOver);
        self.session.frontend.show_winner(&winner);
        self.fan_out(&SessionMessage::GameOver { winner }, Fanout::Everyone);
    }

    /// Leaves the win screen and reopens the lobby with fresh totals.
    pub fn dismiss_win_screen(&mut self) {
        if self.session.phase != RoundPhase::GameOver {
            return;
        }
        self.session.directory.reset_scores();
        self.session.directory.clear_spectators();
        self.results.clear();
        self.last_scores.clear();
        self.session.enter(RoundPhase::Lobby);
        self.broadcast_directory(Fanout::Everyone);
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(snapshot) = self.session.tick(dt) {
            self.fan_out(&SessionMessage::Snapshot(snapshot), Fanout::Everyone);
        }
        self.check_run_barrier();
    }

    // Relayed to everyone, sender included; receivers drop their own pose.
    fn handle_snapshot(&mut self, from: &str, mut snapshot: ActorSnapshot) {
        snapshot.id = from.to_string();
        self.session.apply_snapshot(&snapshot);
        self.fan_out(&SessionMessage::Snapshot(snapshot), Fanout::Everyone);
    }

    pub fn peer_opened(&mut self, peer: &str) {
        debug!(peer_id = peer, "channel opened; awaiting join");
    }

    /// Forgets a departed participant and re-evaluates whatever barrier is open.
    pub fn peer_closed(&mut self, peer: &str) {
        if self.session.directory.remove(peer).is_none() {
            return;
        }
        self.session.turns.forget(peer);
        self.results.remove(peer);
        info!(
            peer_id = peer,
            participants = self.session.directory.len(),
            "participant left"
        );

        self.broadcast_directory(Fanout::Everyone);
        if self.session.phase == RoundPhase::Lobby {
            self.session.show_lobby();
        }
        self.session.check_build_barrier();
        self.check_run_barrier();
    }

    fn is_spectator(&self, id: &str) -> bool {
        self.session.directory.get(id).is_none_or(|p| p.spectating)
    }

    fn broadcast_directory(&mut self, fanout: Fanout<'_>) {
        let update = SessionMessage::LobbyUpdate {
            participants: self.session.directory.participants().to_vec(),
        };
        self.fan_out(&update, fanout);
    }

    fn fan_out(&mut self, message: &SessionMessage, fanout: Fanout<'_>) -> usize {
        let recipients = fanout.recipients(
            self.session.directory.participants(),
            &self.session.local_id,
        );
        self.session.transport.broadcast(message, &recipients)
    }
}

/// Draws `count` party-box slots scattered around the configured origin.
pub fn generate_party_box<R: Rng + ?Sized>(
    count: usize,
    tuning: &RoundTuning,
    rng: &mut R,
) -> Vec<PartyBoxSlot> {
    let [ox, oy, oz] = tuning.party_box_origin;
    let [spread_x, spread_z] = tuning.party_box_spread;
    (0..count)
        .map(|_| {
            let item_id = ITEM_CATALOG.choose(rng).copied().unwrap_or(WOOD_BLOCK_321);
            let x = ox + rng.gen_range(-spread_x..=spread_x);
            let z = oz + rng.gen_range(-spread_z..=spread_z);
            PartyBoxSlot {
                item_id: item_id.to_string(),
                position: Vec3::new(x, oy, z),
                yaw: rng.gen_range(0.0..TAU),
            }
        })
        .collect()
}
