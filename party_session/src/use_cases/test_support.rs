use super::SessionMessage;
use super::peer::Peer;
use super::ports::{Frontend, LobbyView, Transport};
use super::types::{LocalIntent, SessionStatus};
use super::{ClientSession, HostSession, SessionSettings};
use crate::domain::{
    ActorSnapshot, PartyBoxSlot, PeerId, PlacedItem, Rotation, RoundPhase, ScoreEntry, Vec3,
};

// In-memory transport that records every send per destination.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    open: Vec<PeerId>,
    pub(crate) sent: Vec<(PeerId, SessionMessage)>,
}

impl RecordingTransport {
    pub(crate) fn with_peers(peers: &[&str]) -> Self {
        let mut transport = Self::default();
        for peer in peers {
            transport.open(peer);
        }
        transport
    }

    pub(crate) fn open(&mut self, peer: &str) {
        if !self.open.iter().any(|p| p == peer) {
            self.open.push(peer.to_string());
        }
    }

    pub(crate) fn close(&mut self, peer: &str) {
        self.open.retain(|p| p != peer);
    }

    pub(crate) fn sent_to(&self, peer: &str) -> Vec<SessionMessage> {
        self.sent
            .iter()
            .filter(|(to, _)| to == peer)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, peer: &str, message: &SessionMessage) {
        if self.open.iter().any(|p| p == peer) {
            self.sent.push((peer.to_string(), message.clone()));
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.open.clone()
    }
}

// Frontend double that records what the session asked it to show.
#[derive(Debug)]
pub(crate) struct ScriptedFrontend {
    pub(crate) accept_placements: bool,
    pub(crate) messages: Vec<String>,
    pub(crate) spawned: Vec<PlacedItem>,
    pub(crate) level_clears: usize,
    pub(crate) hidden_slots: Vec<usize>,
    pub(crate) snapshots: Vec<PeerId>,
    pub(crate) lobby_views: usize,
    pub(crate) phases: Vec<RoundPhase>,
    pub(crate) scores: Vec<Vec<ScoreEntry>>,
    pub(crate) winner: Option<ScoreEntry>,
}

impl Default for ScriptedFrontend {
    fn default() -> Self {
        Self {
            accept_placements: true,
            messages: Vec::new(),
            spawned: Vec::new(),
            level_clears: 0,
            hidden_slots: Vec::new(),
            snapshots: Vec::new(),
            lobby_views: 0,
            phases: Vec::new(),
            scores: Vec::new(),
            winner: None,
        }
    }
}

impl ScriptedFrontend {
    pub(crate) fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl Frontend for ScriptedFrontend {
    fn placement_is_valid(&self, _item_id: &str, _position: Vec3, _rotation: Rotation) -> bool {
        self.accept_placements
    }

    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn spawn_item(&mut self, item: &PlacedItem) {
        self.spawned.push(item.clone());
    }

    fn clear_level(&mut self) {
        self.level_clears += 1;
        self.spawned.clear();
    }

    fn show_party_box(&mut self, _slots: &[PartyBoxSlot]) {
        self.hidden_slots.clear();
    }

    fn hide_slot(&mut self, index: usize) {
        self.hidden_slots.push(index);
    }

    fn apply_snapshot(&mut self, snapshot: &ActorSnapshot) {
        self.snapshots.push(snapshot.id.clone());
    }

    fn local_snapshot(&self) -> Option<ActorSnapshot> {
        Some(ActorSnapshot {
            id: String::new(),
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: [0.0, 0.0, 0.0, 1.0],
            anim: "idle".to_string(),
        })
    }

    fn phase_changed(&mut self, phase: RoundPhase) {
        self.phases.push(phase);
    }

    fn show_lobby(&mut self, _lobby: &LobbyView<'_>) {
        self.lobby_views += 1;
    }

    fn show_scores(&mut self, scores: &[ScoreEntry], _goal_score: u32) {
        self.scores.push(scores.to_vec());
    }

    fn show_winner(&mut self, winner: &ScoreEntry) {
        self.winner = Some(winner.clone());
    }
}

pub(crate) type TestPeer = Peer<RecordingTransport, ScriptedFrontend>;

pub(crate) fn frontend_of(peer: &TestPeer) -> &ScriptedFrontend {
    match peer {
        Peer::Host(host) => host.frontend(),
        Peer::Client(client) => client.frontend(),
    }
}

// A host and its clients wired together with in-order, lossless delivery.
pub(crate) struct Room {
    host_id: PeerId,
    peers: Vec<(PeerId, TestPeer)>,
}

impl Room {
    /// Host `host_id` plus one joined client per id in `clients`.
    pub(crate) fn new(host_id: &str, clients: &[&str]) -> Self {
        let mut host_transport = RecordingTransport::default();
        for client in clients {
            host_transport.open(client);
        }
        let host = HostSession::new(
            host_id,
            "Host",
            SessionSettings::default(),
            host_transport,
            ScriptedFrontend::default(),
        );
        let mut room = Self {
            host_id: host_id.to_string(),
            peers: vec![(host_id.to_string(), Peer::Host(host))],
        };
        for client in clients {
            room.connect(client);
        }
        room
    }

    /// Opens a channel between a new client and the host, then joins.
    pub(crate) fn connect(&mut self, id: &str) {
        let host_id = self.host_id.clone();
        self.peer_mut(&host_id).transport_mut().open(id);
        let mut client = ClientSession::new(
            id,
            host_id.as_str(),
            &id.to_uppercase(),
            SessionSettings::default(),
            RecordingTransport::with_peers(&[host_id.as_str()]),
            ScriptedFrontend::default(),
        );
        client.request_join();
        self.peers.push((id.to_string(), Peer::Client(client)));
        self.pump();
    }

    /// Drops a client and tells the host its channel closed.
    pub(crate) fn disconnect(&mut self, id: &str) {
        self.peers.retain(|(peer_id, _)| peer_id != id);
        let host_id = self.host_id.clone();
        let host = self.peer_mut(&host_id);
        host.transport_mut().close(id);
        host.peer_closed(id);
        self.pump();
    }

    pub(crate) fn ids(&self) -> Vec<PeerId> {
        self.peers.iter().map(|(id, _)| id.clone()).collect()
    }

    pub(crate) fn peer(&self, id: &str) -> &TestPeer {
        self.peers
            .iter()
            .find(|(peer_id, _)| peer_id == id)
            .map(|(_, peer)| peer)
            .expect("unknown peer")
    }

    pub(crate) fn peer_mut(&mut self, id: &str) -> &mut TestPeer {
        self.peers
            .iter_mut()
            .find(|(peer_id, _)| peer_id == id)
            .map(|(_, peer)| peer)
            .expect("unknown peer")
    }

    pub(crate) fn status(&self, id: &str) -> SessionStatus {
        self.peer(id).status()
    }

    /// Applies a local intent without delivering what it sends.
    pub(crate) fn queue(&mut self, id: &str, intent: LocalIntent) {
        self.peer_mut(id).apply_intent(intent);
    }

    pub(crate) fn intent(&mut self, id: &str, intent: LocalIntent) {
        self.queue(id, intent);
        self.pump();
    }

    pub(crate) fn tick_all(&mut self, dt: f32) {
        for (_, peer) in &mut self.peers {
            peer.tick(dt);
        }
        self.pump();
    }

    /// Delivers queued messages until no peer has anything left to send.
    pub(crate) fn pump(&mut self) {
        loop {
            let mut outgoing = Vec::new();
            for (id, peer) in &mut self.peers {
                let sent = std::mem::take(&mut peer.transport_mut().sent);
                outgoing.extend(sent.into_iter().map(|(to, message)| (id.clone(), to, message)));
            }
            if outgoing.is_empty() {
                return;
            }
            for (from, to, message) in outgoing {
                if let Some((_, peer)) = self.peers.iter_mut().find(|(id, _)| *id == to) {
                    peer.handle_message(&from, message);
                }
            }
        }
    }
}
