// Wire protocol DTOs and conversions for peer-to-peer session frames.
// Every frame is one JSON envelope `{ "type": TAG, "payload": ... }`.

use crate::domain::{
    ActorSnapshot, Participant, PartyBoxSlot, PlacedItem, Rotation, RoundPhase, RunResult,
    ScoreEntry, Vec3,
};
use crate::use_cases::{SessionMessage, SessionStatus};
use serde::{Deserialize, Serialize};

/// Frames exchanged over a peer connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Envelope {
    // Transport-level: first frame on every accepted socket.
    Identity(IdentityDto),
    Join(JoinDto),
    Welcome(WelcomeDto),
    LobbyUpdate(Vec<ParticipantDto>),
    CharacterSelect(CharacterSelectDto),
    StartGame(StartGameDto),
    Snapshot(SnapshotDto),
    EventPlace(PlaceDto),
    PartyBoxUpdate(Vec<SlotDto>),
    PickItem(PickItemDto),
    ItemPicked(ItemPickedDto),
    PlayerFinishedRun(FinishedRunDto),
    ShowScore(ShowScoreDto),
    GameOver(GameOverDto),
}

/// Reasons a decoded envelope cannot become a session message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    // IDENTITY belongs to the transport handshake, not the session.
    UnexpectedIdentity,
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDto {
    pub peer_id: String,
    pub host_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDto {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseDto {
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

impl From<RoundPhase> for PhaseDto {
    fn from(phase: RoundPhase) -> Self {
        match phase {
            RoundPhase::Unset => PhaseDto::Unset,
            RoundPhase::Lobby => PhaseDto::Lobby,
            RoundPhase::ItemPick => PhaseDto::ItemPick,
            RoundPhase::BuildView => PhaseDto::BuildView,
            RoundPhase::BuildPlace => PhaseDto::BuildPlace,
            RoundPhase::Countdown => PhaseDto::Countdown,
            RoundPhase::Run => PhaseDto::Run,
            RoundPhase::Score => PhaseDto::Score,
            RoundPhase::GameOver => PhaseDto::GameOver,
        }
    }
}

impl From<PhaseDto> for RoundPhase {
    fn from(phase: PhaseDto) -> Self {
        match phase {
            PhaseDto::Unset => RoundPhase::Unset,
            PhaseDto::Lobby => RoundPhase::Lobby,
            PhaseDto::ItemPick => RoundPhase::ItemPick,
            PhaseDto::BuildView => RoundPhase::BuildView,
            PhaseDto::BuildPlace => RoundPhase::BuildPlace,
            PhaseDto::Countdown => RoundPhase::Countdown,
            PhaseDto::Run => RoundPhase::Run,
            PhaseDto::Score => RoundPhase::Score,
            PhaseDto::GameOver => RoundPhase::GameOver,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub spectating: bool,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id.clone(),
            display_name: participant.display_name.clone(),
            character: participant.character.clone(),
            is_host: participant.is_host,
            score: participant.total_score,
            spectating: participant.spectating,
        }
    }
}

impl From<ParticipantDto> for Participant {
    fn from(dto: ParticipantDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
            character: dto.character,
            is_host: dto.is_host,
            total_score: dto.score,
            spectating: dto.spectating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelcomeDto {
    pub participants: Vec<ParticipantDto>,
    pub phase: PhaseDto,
    // Objects already placed this game, so a late joiner can rebuild the level.
    #[serde(default)]
    pub placed: Vec<PlaceDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSelectDto {
    pub character_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartGameDto {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDto {
    #[serde(default)]
    pub id: String,
    pub pos: [f32; 3],
    pub rot: [f32; 4],
    #[serde(default)]
    pub anim: String,
}

impl From<&ActorSnapshot> for SnapshotDto {
    fn from(snapshot: &ActorSnapshot) -> Self {
        let Vec3 { x, y, z } = snapshot.position;
        Self {
            id: snapshot.id.clone(),
            pos: [x, y, z],
            rot: snapshot.rotation,
            anim: snapshot.anim.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub item_id: String,
    pub pos: PositionDto,
    #[serde(default)]
    pub rot: u8,
    #[serde(default)]
    pub actor_id: String,
}

impl From<&PlacedItem> for PlaceDto {
    fn from(item: &PlacedItem) -> Self {
        let Vec3 { x, y, z } = item.position;
        Self {
            item_id: item.item_id.clone(),
            pos: PositionDto { x, y, z },
            rot: item.rotation.quarter_turns(),
            actor_id: item.actor_id.clone(),
        }
    }
}

impl TryFrom<PlaceDto> for PlacedItem {
    type Error = ProtocolError;

    fn try_from(dto: PlaceDto) -> Result<Self, Self::Error> {
        let position = Vec3::new(dto.pos.x, dto.pos.y, dto.pos.z);
        if !position.is_finite() {
            return Err(ProtocolError::NonFinite);
        }
        Ok(Self {
            item_id: dto.item_id,
            position,
            rotation: Rotation::new(dto.rot),
            actor_id: dto.actor_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDto {
    // Item type id.
    pub id: String,
    pub pos: [f32; 3],
    // Spawn yaw in radians.
    #[serde(default)]
    pub rot: f32,
}

impl From<&PartyBoxSlot> for SlotDto {
    fn from(slot: &PartyBoxSlot) -> Self {
        let Vec3 { x, y, z } = slot.position;
        Self {
            id: slot.item_id.clone(),
            pos: [x, y, z],
            rot: slot.yaw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickItemDto {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPickedDto {
    pub index: usize,
    pub actor_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishedRunDto {
    pub won: bool,
    #[serde(default)]
    pub coins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntryDto {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub current: u32,
    #[serde(default)]
    pub added: u32,
}

impl From<&ScoreEntry> for ScoreEntryDto {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            id: entry.id.clone(),
            display_name: entry.display_name.clone(),
            current: entry.current,
            added: entry.added,
        }
    }
}

impl From<ScoreEntryDto> for ScoreEntry {
    fn from(dto: ScoreEntryDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
            current: dto.current,
            added: dto.added,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowScoreDto {
    pub scores: Vec<ScoreEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverDto {
    pub winner_id: String,
    #[serde(default)]
    pub display_name: String,
    pub total: u32,
    // Points the winner earned in the deciding round.
    #[serde(default)]
    pub added: u32,
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl From<&SessionMessage> for Envelope {
    fn from(message: &SessionMessage) -> Self {
        match message {
            SessionMessage::Join { display_name } => Envelope::Join(JoinDto {
                display_name: display_name.clone(),
            }),
            SessionMessage::Welcome {
                participants,
                phase,
                placed,
            } => Envelope::Welcome(WelcomeDto {
                participants: participants.iter().map(ParticipantDto::from).collect(),
                phase: (*phase).into(),
                placed: placed.iter().map(PlaceDto::from).collect(),
            }),
            SessionMessage::LobbyUpdate { participants } => {
                Envelope::LobbyUpdate(participants.iter().map(ParticipantDto::from).collect())
            }
            SessionMessage::CharacterSelect { character } => {
                Envelope::CharacterSelect(CharacterSelectDto {
                    character_id: character.clone(),
                })
            }
            SessionMessage::StartGame => Envelope::StartGame(StartGameDto {}),
            SessionMessage::Snapshot(snapshot) => Envelope::Snapshot(snapshot.into()),
            SessionMessage::Place(item) => Envelope::EventPlace(item.into()),
            SessionMessage::PartyBoxUpdate { slots } => {
                Envelope::PartyBoxUpdate(slots.iter().map(SlotDto::from).collect())
            }
            SessionMessage::PickItem { index } => Envelope::PickItem(PickItemDto { index: *index }),
            SessionMessage::ItemPicked { index, actor_id } => {
                Envelope::ItemPicked(ItemPickedDto {
                    index: *index,
                    actor_id: actor_id.clone(),
                })
            }
            SessionMessage::FinishedRun(result) => {
                Envelope::PlayerFinishedRun(FinishedRunDto {
                    won: result.won,
                    coins: result.coins,
                })
            }
            SessionMessage::ShowScore { scores } => Envelope::ShowScore(ShowScoreDto {
                scores: scores.iter().map(ScoreEntryDto::from).collect(),
            }),
            SessionMessage::GameOver { winner } => Envelope::GameOver(GameOverDto {
                winner_id: winner.id.clone(),
                display_name: winner.display_name.clone(),
                total: winner.current,
                added: winner.added,
            }),
        }
    }
}

impl TryFrom<Envelope> for SessionMessage {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let message = match envelope {
            Envelope::Identity(_) => return Err(ProtocolError::UnexpectedIdentity),
            Envelope::Join(dto) => SessionMessage::Join {
                display_name: dto.display_name,
            },
            Envelope::Welcome(dto) => SessionMessage::Welcome {
                participants: dto.participants.into_iter().map(Participant::from).collect(),
                phase: dto.phase.into(),
                placed: dto
                    .placed
                    .into_iter()
                    .map(PlacedItem::try_from)
                    .collect::<Result<_, _>>()?,
            },
            Envelope::LobbyUpdate(participants) => SessionMessage::LobbyUpdate {
                participants: participants.into_iter().map(Participant::from).collect(),
            },
            Envelope::CharacterSelect(dto) => SessionMessage::CharacterSelect {
                character: dto.character_id,
            },
            Envelope::StartGame(_) => SessionMessage::StartGame,
            Envelope::Snapshot(dto) => {
                if !all_finite(&dto.pos) || !all_finite(&dto.rot) {
                    return Err(ProtocolError::NonFinite);
                }
                SessionMessage::Snapshot(ActorSnapshot {
                    id: dto.id,
                    position: Vec3::new(dto.pos[0], dto.pos[1], dto.pos[2]),
                    rotation: dto.rot,
                    anim: dto.anim,
                })
            }
            Envelope::EventPlace(dto) => SessionMessage::Place(dto.try_into()?),
            Envelope::PartyBoxUpdate(slots) => {
                let mut converted = Vec::with_capacity(slots.len());
                for slot in slots {
                    if !all_finite(&slot.pos) || !slot.rot.is_finite() {
                        return Err(ProtocolError::NonFinite);
                    }
                    converted.push(PartyBoxSlot {
                        item_id: slot.id,
                        position: Vec3::new(slot.pos[0], slot.pos[1], slot.pos[2]),
                        yaw: slot.rot,
                    });
                }
                SessionMessage::PartyBoxUpdate { slots: converted }
            }
            Envelope::PickItem(dto) => SessionMessage::PickItem { index: dto.index },
            Envelope::ItemPicked(dto) => SessionMessage::ItemPicked {
                index: dto.index,
                actor_id: dto.actor_id,
            },
            Envelope::PlayerFinishedRun(dto) => SessionMessage::FinishedRun(RunResult {
                won: dto.won,
                coins: dto.coins,
            }),
            Envelope::ShowScore(dto) => SessionMessage::ShowScore {
                scores: dto.scores.into_iter().map(ScoreEntry::from).collect(),
            },
            Envelope::GameOver(dto) => SessionMessage::GameOver {
                winner: ScoreEntry {
                    id: dto.winner_id,
                    display_name: dto.display_name,
                    current: dto.total,
                    added: dto.added,
                },
            },
        };
        Ok(message)
    }
}

/// Body of `GET /session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusDto {
    pub phase: PhaseDto,
    pub round: u32,
    pub participants: Vec<ParticipantDto>,
}

impl From<&SessionStatus> for SessionStatusDto {
    fn from(status: &SessionStatus) -> Self {
        Self {
            phase: status.phase.into(),
            round: status.round,
            participants: status.participants.iter().map(ParticipantDto::from).collect(),
        }
    }
}
