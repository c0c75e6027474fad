// Placeable items, placed-object records and the per-round party box.

use super::participant::PeerId;

/// The only item type the party box currently offers.
pub const WOOD_BLOCK_321: &str = "wood_block_321";

/// Item types the host draws party-box slots from.
pub const ITEM_CATALOG: &[&str] = &[WOOD_BLOCK_321];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Discrete yaw in quarter turns (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation(u8);

impl Rotation {
    pub fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    pub fn quarter_turns(&self) -> u8 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self::new(self.0 + 1)
    }

    pub fn radians(&self) -> f32 {
        f32::from(self.0) * std::f32::consts::FRAC_PI_2
    }
}

/// Axis-aligned size of an item once rotated, in world units.
pub fn footprint(item_id: &str, rotation: Rotation) -> Vec3 {
    match item_id {
        // 3x1x2 block; odd quarter turns swap the x/z extents.
        WOOD_BLOCK_321 if rotation.quarter_turns() % 2 == 0 => Vec3::new(3.0, 1.0, 2.0),
        WOOD_BLOCK_321 => Vec3::new(2.0, 1.0, 3.0),
        _ => Vec3::new(1.0, 1.0, 1.0),
    }
}

/// A replicated placement fact.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub item_id: String,
    pub position: Vec3,
    pub rotation: Rotation,
    pub actor_id: PeerId,
}

/// One pickable item offered during the pick phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyBoxSlot {
    pub item_id: String,
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    OutOfRange,
    AlreadyClaimed,
    // The requester already holds a slot this round.
    RequesterHoldsClaim,
}

/// The pick-phase manifest plus who claimed which slot.
#[derive(Debug, Clone, Default)]
pub struct PartyBox {
    slots: Vec<PartyBoxSlot>,
    claims: Vec<Option<PeerId>>,
}

impl PartyBox {
    pub fn new(slots: Vec<PartyBoxSlot>) -> Self {
        let claims = vec![None; slots.len()];
        Self { slots, claims }
    }

    pub fn slots(&self) -> &[PartyBoxSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&PartyBoxSlot> {
        self.slots.get(index)
    }

    pub fn is_available(&self, index: usize) -> bool {
        matches!(self.claims.get(index), Some(None))
    }

    pub fn claimant(&self, index: usize) -> Option<&str> {
        self.claims.get(index)?.as_deref()
    }

    pub fn claim_of(&self, actor: &str) -> Option<usize> {
        self.claims
            .iter()
            .position(|claim| claim.as_deref() == Some(actor))
    }

    /// Host-side arbitration: the first valid request for a free slot wins.
    pub fn claim(&mut self, index: usize, actor: &str) -> Result<&PartyBoxSlot, ClaimError> {
        match self.claims.get(index) {
            None => return Err(ClaimError::OutOfRange),
            Some(Some(_)) => return Err(ClaimError::AlreadyClaimed),
            Some(None) => {}
        }
        if self.claim_of(actor).is_some() {
            return Err(ClaimError::RequesterHoldsClaim);
        }
        self.claims[index] = Some(actor.to_string());
        Ok(&self.slots[index])
    }

    /// Applies a host confirmation, overriding whatever this peer believed.
    pub fn record_claim(&mut self, index: usize, actor: &str) -> Option<&PartyBoxSlot> {
        let claim = self.claims.get_mut(index)?;
        *claim = Some(actor.to_string());
        self.slots.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> PartyBoxSlot {
        PartyBoxSlot {
            item_id: WOOD_BLOCK_321.to_string(),
            position: Vec3::new(-100.0, 0.5, 0.0),
            yaw: 0.0,
        }
    }

    #[test]
    fn rotation_wraps_after_four_quarter_turns() {
        let mut rotation = Rotation::default();
        for _ in 0..4 {
            rotation = rotation.next();
        }
        assert_eq!(rotation, Rotation::new(0));
        assert_eq!(Rotation::new(7).quarter_turns(), 3);
    }

    #[test]
    fn wood_block_footprint_swaps_on_odd_rotation() {
        assert_eq!(
            footprint(WOOD_BLOCK_321, Rotation::new(0)),
            Vec3::new(3.0, 1.0, 2.0)
        );
        assert_eq!(
            footprint(WOOD_BLOCK_321, Rotation::new(1)),
            Vec3::new(2.0, 1.0, 3.0)
        );
        assert_eq!(footprint("spring", Rotation::new(1)), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn slot_can_only_be_claimed_once() {
        let mut party_box = PartyBox::new(vec![slot(), slot()]);
        assert!(party_box.claim(0, "a").is_ok());
        assert_eq!(party_box.claim(0, "b"), Err(ClaimError::AlreadyClaimed));
        assert_eq!(party_box.claimant(0), Some("a"));
        assert!(party_box.is_available(1));
    }

    #[test]
    fn requester_cannot_hold_two_slots() {
        let mut party_box = PartyBox::new(vec![slot(), slot()]);
        assert!(party_box.claim(0, "a").is_ok());
        assert_eq!(
            party_box.claim(1, "a"),
            Err(ClaimError::RequesterHoldsClaim)
        );
        assert!(party_box.is_available(1));
    }

    #[test]
    fn out_of_range_claim_is_rejected() {
        let mut party_box = PartyBox::new(vec![slot()]);
        assert_eq!(party_box.claim(3, "a"), Err(ClaimError::OutOfRange));
        assert!(!party_box.is_available(3));
    }

    #[test]
    fn recorded_claim_overrides_local_belief() {
        let mut party_box = PartyBox::new(vec![slot()]);
        let _ = party_box.claim(0, "me");
        assert!(party_box.record_claim(0, "other").is_some());
        assert_eq!(party_box.claimant(0), Some("other"));
        assert_eq!(party_box.claim_of("me"), None);
    }
}
