// Domain layer: session roster, round rules and scoring.

pub mod actor;
pub mod directory;
pub mod items;
pub mod participant;
pub mod phase;
pub mod scoring;
pub mod tuning;
pub mod turns;

pub use actor::{ActorSnapshot, ContactKind, RunProgress, RunResult};
pub use directory::{CharacterOutcome, Directory};
pub use items::{ClaimError, PartyBox, PartyBoxSlot, PlacedItem, Rotation, Vec3};
pub use participant::{Participant, PeerId};
pub use phase::RoundPhase;
pub use scoring::ScoreEntry;
pub use turns::TurnTracker;
