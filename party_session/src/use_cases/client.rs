// Client role: mirrors the host's facts and forwards local requests to it.

use super::ports::{Frontend, Transport};
use super::session::{Session, SessionSettings};
use super::types::{SessionMessage, SessionStatus};
use crate::domain::{
    ContactKind, Directory, Participant, PeerId, PlacedItem, RoundPhase, ScoreEntry, Vec3,
};
use tracing::{debug, info, warn};

pub(crate) const ROUND_IN_PROGRESS: &str = "Round in progress, you will join the next one";
pub(crate) const HOST_LEFT: &str = "The host left the session";

/// A peer that joined someone else's session.
///
/// It never arbitrates: claims, barriers it does not own and scores all arrive as
/// host facts, and any local belief is overwritten when they do.
pub struct ClientSession<T, F> {
    session: Session<T, F>,
    host_id: PeerId,
    display_name: String,
    // Slot requested from the host and not yet confirmed for anyone.
    pending_pick: Option<usize>,
    last_scores: Vec<ScoreEntry>,
}

impl<T: Transport, F: Frontend> ClientSession<T, F> {
    pub fn new(
        local_id: impl Into<PeerId>,
        host_id: impl Into<PeerId>,
        display_name: &str,
        settings: SessionSettings,
        transport: T,
        frontend: F,
    ) -> Self {
        let session = Session::new(
            local_id.into(),
            false,
            Directory::default(),
            settings,
            transport,
            frontend,
        );
        Self {
            session,
            host_id: host_id.into(),
            display_name: display_name.to_string(),
            pending_pick: None,
            last_scores: Vec::new(),
        }
    }

    pub fn local_id(&self) -> &str {
        &self.session.local_id
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
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

    pub fn last_scores(&self) -> &[ScoreEntry] {
        &self.last_scores
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

    /// Asks the host for admission; the answer is a WELCOME.
    pub fn request_join(&mut self) {
        let join = SessionMessage::Join {
            display_name: self.display_name.clone(),
        };
        self.session.transport.send(&self.host_id, &join);
    }

    /// Applies a host fact. Anything not sent by the host is dropped.
    pub fn handle_message(&mut self, from: &str, message: SessionMessage) {
        if from != self.host_id {
            warn!(from, kind = message.kind(), "message from non-host peer dropped");
            return;
        }
        if self.session.phase == RoundPhase::Unset {
            match message {
                SessionMessage::Welcome {
                    participants,
                    phase,
                    placed,
                } => self.handle_welcome(participants, phase, placed),
                other => debug!(kind = other.kind(), "fact before welcome ignored"),
            }
            return;
        }

        match message {
            SessionMessage::Welcome { .. } => debug!("duplicate welcome ignored"),
            SessionMessage::LobbyUpdate { participants } => {
                self.session.replace_directory(participants)
            }
            SessionMessage::StartGame => {
                self.pending_pick = None;
                // The host may restart before this peer dismissed its win screen.
                if self.session.phase == RoundPhase::GameOver {
                    self.session.enter(RoundPhase::Lobby);
                }
                self.session.begin_round();
            }
            SessionMessage::PartyBoxUpdate { slots } => self.session.install_party_box(slots),
            SessionMessage::ItemPicked { index, actor_id } => {
                if self.pending_pick == Some(index) || actor_id == self.session.local_id {
                    self.pending_pick = None;
                }
                self.session.adopt_claim(index, &actor_id);
            }
            SessionMessage::Place(item) => {
                self.session.apply_remote_place(item);
            }
            SessionMessage::Snapshot(snapshot) => self.session.apply_snapshot(&snapshot),
            SessionMessage::ShowScore { scores } => self.handle_show_score(scores),
            SessionMessage::GameOver { winner } => {
                self.session.enter(RoundPhase::GameOver);
                self.session.frontend.show_winner(&winner);
            }
            other => warn!(kind = other.kind(), "unexpected message for client"),
        }
    }

    fn handle_welcome(
        &mut self,
        participants: Vec<Participant>,
        host_phase: RoundPhase,
        placed: Vec<PlacedItem>,
    ) {
        info!(
            peer_id = %self.session.local_id,
            participants = participants.len(),
            host_phase = host_phase.as_str(),
            "welcomed"
        );
        self.session.directory = Directory::from_snapshot(participants);
        self.session.enter(RoundPhase::Lobby);
        if host_phase.is_in_round() {
            self.session.frontend.show_message(ROUND_IN_PROGRESS);
        }
        self.session.restore_level(placed);
    }

    fn handle_show_score(&mut self, scores: Vec<ScoreEntry>) {
        for entry in &scores {
            self.session.directory.set_score(&entry.id, entry.current);
        }
        if self.session.phase == RoundPhase::Lobby {
            // Sat this round out; the lobby already shows the new totals.
            self.session.show_lobby();
            self.last_scores = scores;
            return;
        }
        self.session.enter(RoundPhase::Score);
        self.session
            .frontend
            .show_scores(&scores, self.session.settings.scoring.goal_score);
        self.last_scores = scores;
    }

    /// Requests a character; the host's next LOBBY_UPDATE says whether it stuck.
    pub fn select_character(&mut self, character: &str) -> bool {
        if self.session.phase != RoundPhase::Lobby {
            return false;
        }
        let request = SessionMessage::CharacterSelect {
            character: character.to_string(),
        };
        self.session.transport.send(&self.host_id, &request);
        true
    }

    /// Requests a party-box slot; the local view only changes on the host's confirmation.
    pub fn pick(&mut self, index: usize) -> bool {
        let party_box = &self.session.party_box;
        if self.session.phase != RoundPhase::ItemPick
            || self.session.is_spectating()
            || self.pending_pick.is_some()
            || party_box.claim_of(&self.session.local_id).is_some()
            || !party_box.is_available(index)
        {
            return false;
        }
        self.pending_pick = Some(index);
        self.session
            .transport
            .send(&self.host_id, &SessionMessage::PickItem { index });
        true
    }

    pub fn begin_placement(&mut self) -> bool {
        self.session.begin_placement()
    }

    pub fn rotate(&mut self) {
        self.session.rotate();
    }

    /// Places the held item locally and sends the fact to the host for relay.
    pub fn place(&mut self, position: Vec3) -> bool {
        let Some(item) = self.session.place_local(position) else {
            return false;
        };
        self.session
            .transport
            .send(&self.host_id, &SessionMessage::Place(item));
        self.session.after_local_place();
        true
    }

    pub fn report_contact(&mut self, kind: ContactKind) {
        if let Some(result) = self.session.record_contact(kind) {
            self.session
                .transport
                .send(&self.host_id, &SessionMessage::FinishedRun(result));
        }
    }

    pub fn dismiss_win_screen(&mut self) {
        if self.session.phase == RoundPhase::GameOver {
            self.session.enter(RoundPhase::Lobby);
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(snapshot) = self.session.tick(dt) {
            self.session
                .transport
                .send(&self.host_id, &SessionMessage::Snapshot(snapshot));
        }
    }

    /// Returns false once the host's channel is gone; the session cannot continue.
    pub fn peer_closed(&mut self, peer: &str) -> bool {
        if peer != self.host_id {
            return true;
        }
        warn!(host_id = %self.host_id, "host channel closed");
        self.session.frontend.show_message(HOST_LEFT);
        false
    }

    pub(crate) fn show_message(&mut self, text: &str) {
        self.session.frontend.show_message(text);
    }
}
