/// Pacing of a single round.

#[derive(Debug, Clone, Copy)]
pub struct RoundTuning {
    /// Seconds between the build barrier clearing and the run starting.
    pub countdown_seconds: f32,

    /// Party-box slots offered on top of one per participant.
    pub extra_party_box_slots: usize,

    /// Centre of the party box in world space.
    pub party_box_origin: [f32; 3],

    /// Half-width of the spawn area along x and z.
    pub party_box_spread: [f32; 2],
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            countdown_seconds: 3.0,
            extra_party_box_slots: 2,
            party_box_origin: [-100.0, 0.5, 0.0],
            party_box_spread: [5.0, 3.0],
        }
    }
}
