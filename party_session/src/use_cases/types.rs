// Use-case level messages, local intents and status exchanged with adapters.

use crate::domain::{
    ActorSnapshot, ContactKind, Participant, PartyBoxSlot, PeerId, PlacedItem, RoundPhase,
    RunResult, ScoreEntry, Vec3,
};

/// Facts and requests exchanged between peers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    // client -> host
    Join {
        display_name: String,
    },
    // host -> requester
    Welcome {
        participants: Vec<Participant>,
        phase: RoundPhase,
        placed: Vec<PlacedItem>,
    },
    // host -> all
    LobbyUpdate {
        participants: Vec<Participant>,
    },
    // client -> host
    CharacterSelect {
        character: String,
    },
    // host -> all
    StartGame,
    // peer -> host -> all
    Snapshot(ActorSnapshot),
    // actor -> host -> all
    Place(PlacedItem),
    // host -> all
    PartyBoxUpdate {
        slots: Vec<PartyBoxSlot>,
    },
    // client -> host
    PickItem {
        index: usize,
    },
    // host -> all
    ItemPicked {
        index: usize,
        actor_id: PeerId,
    },
    // actor -> host
    FinishedRun(RunResult),
    // host -> all
    ShowScore {
        scores: Vec<ScoreEntry>,
    },
    // host -> all
    GameOver {
        winner: ScoreEntry,
    },
}

impl SessionMessage {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionMessage::Join { .. } => "join",
            SessionMessage::Welcome { .. } => "welcome",
            SessionMessage::LobbyUpdate { .. } => "lobby_update",
            SessionMessage::CharacterSelect { .. } => "character_select",
            SessionMessage::StartGame => "start_game",
            SessionMessage::Snapshot(_) => "snapshot",
            SessionMessage::Place(_) => "event_place",
            SessionMessage::PartyBoxUpdate { .. } => "party_box_update",
            SessionMessage::PickItem { .. } => "pick_item",
            SessionMessage::ItemPicked { .. } => "item_picked",
            SessionMessage::FinishedRun(_) => "player_finished_run",
            SessionMessage::ShowScore { .. } => "show_score",
            SessionMessage::GameOver { .. } => "game_over",
        }
    }
}

/// Actions initiated by the local user (or the collaborator standing in for them).
#[derive(Debug, Clone, PartialEq)]
pub enum LocalIntent {
    SelectCharacter(String),
    StartSession,
    Pick(usize),
    BeginPlacement,
    Rotate,
    Place(Vec3),
    Contact(ContactKind),
    ScoreRevealFinished,
    DismissWinScreen,
}

/// Point-in-time view of a session for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub local_id: PeerId,
    pub is_host: bool,
    pub phase: RoundPhase,
    pub round: u32,
    pub participants: Vec<Participant>,
}
