use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::claim::region::ClaimBox;
use crate::trust::{TrustLevel, TrustSubject};
use crate::world::{BlockPos, ClaimId, UserId, WorldId, MAX_WORLD_Y, MIN_WORLD_Y};

/// Kind of a claim, deciding ownership rules and what may nest inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimType {
    /// Implicit claim covering all unclaimed space. Never stored in the index.
    Wilderness,
    /// Player-owned claim.
    Basic,
    /// Server-owned claim, no owner.
    Admin,
    /// Settlement claim that may contain other claims.
    Town,
    /// Child region carved out of a parent claim.
    Subdivision,
}

impl ClaimType {
    pub fn name(&self) -> &'static str {
        match self {
            ClaimType::Wilderness => "wilderness",
            ClaimType::Basic => "basic",
            ClaimType::Admin => "admin",
            ClaimType::Town => "town",
            ClaimType::Subdivision => "subdivision",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ClaimType::Wilderness => 0,
            ClaimType::Basic => 1,
            ClaimType::Admin => 2,
            ClaimType::Town => 3,
            ClaimType::Subdivision => 4,
        }
    }

    pub const ALL: [ClaimType; 5] = [
        ClaimType::Wilderness,
        ClaimType::Basic,
        ClaimType::Admin,
        ClaimType::Town,
        ClaimType::Subdivision,
    ];
}

/// A region of space with an owner, a trust list, and optional nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_type: ClaimType,
    pub world: WorldId,
    pub area: ClaimBox,
    /// True for full 3-D claims; false for column claims that span the
    /// entire world height regardless of the stored Y corners.
    pub cuboid: bool,
    /// `None` for wilderness and admin claims.
    pub owner: Option<UserId>,
    pub parent: Option<ClaimId>,
    pub children: Vec<ClaimId>,
    /// Explicit trust entries on this claim.
    pub trust: FxHashMap<TrustSubject, TrustLevel>,
    /// Whether trust lookups fall through to the parent claim when this
    /// claim has no explicit entry for the subject.
    pub inherit_parent_trust: bool,
}

impl Claim {
    pub fn new(
        claim_type: ClaimType,
        world: WorldId,
        area: ClaimBox,
        cuboid: bool,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            id: ClaimId::new(),
            claim_type,
            world,
            area,
            cuboid,
            owner,
            parent: None,
            children: Vec::new(),
            trust: FxHashMap::default(),
            inherit_parent_trust: claim_type == ClaimType::Subdivision,
        }
    }

    /// The sentinel claim covering all unclaimed space in a world.
    pub fn wilderness(world: WorldId) -> Self {
        let area = ClaimBox::new(
            BlockPos::new(i32::MIN / 2, MIN_WORLD_Y, i32::MIN / 2),
            BlockPos::new(i32::MAX / 2, MAX_WORLD_Y - 1, i32::MAX / 2),
        );
        Self::new(ClaimType::Wilderness, world, area, false, None)
    }

    pub fn is_wilderness(&self) -> bool {
        self.claim_type == ClaimType::Wilderness
    }

    /// True if the position lies inside this claim's boundary. Column
    /// claims ignore Y.
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.area.contains(pos, !self.cuboid)
    }

    /// Explicit trust entry for a subject, not considering groups or parents.
    pub fn trust_entry(&self, subject: &TrustSubject) -> Option<TrustLevel> {
        self.trust.get(subject).copied()
    }

    pub fn set_trust(&mut self, subject: TrustSubject, level: TrustLevel) {
        self.trust.insert(subject, level);
    }

    pub fn remove_trust(&mut self, subject: &TrustSubject) -> Option<TrustLevel> {
        self.trust.remove(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_claim_ignores_y() {
        let world = WorldId::new();
        let area = ClaimBox::new(BlockPos::new(0, 60, 0), BlockPos::new(31, 70, 31));
        let claim = Claim::new(ClaimType::Basic, world, area, false, Some(UserId::new()));
        assert!(claim.contains(BlockPos::new(5, -40, 5)));
        assert!(claim.contains(BlockPos::new(5, 300, 5)));
        assert!(!claim.contains(BlockPos::new(32, 64, 5)));
    }

    #[test]
    fn cuboid_claim_checks_y() {
        let world = WorldId::new();
        let area = ClaimBox::new(BlockPos::new(0, 60, 0), BlockPos::new(31, 70, 31));
        let claim = Claim::new(ClaimType::Subdivision, world, area, true, None);
        assert!(claim.contains(BlockPos::new(5, 65, 5)));
        assert!(!claim.contains(BlockPos::new(5, 71, 5)));
    }

    #[test]
    fn wilderness_covers_everything() {
        let claim = Claim::wilderness(WorldId::new());
        assert!(claim.is_wilderness());
        assert!(claim.contains(BlockPos::new(1_000_000, 64, -1_000_000)));
        assert!(claim.owner.is_none());
    }
}
