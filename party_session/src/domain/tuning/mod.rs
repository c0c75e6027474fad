// Gameplay tuning values for rounds and scoring.

pub mod round;
pub mod scoring;

pub use round::RoundTuning;
pub use scoring::ScoringTuning;
