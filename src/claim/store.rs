use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use lazy_static::lazy_static;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::claim::claim::{Claim, ClaimType};
use crate::claim::error::ClaimError;
use crate::claim::index::ChunkClaimIndex;
use crate::claim::nesting::NestingPolicy;
use crate::claim::region::ClaimBox;
use crate::persist::{self, PersistError};
use crate::trust::{TrustLevel, TrustSubject};
use crate::world::{BlockPos, ClaimId, UserId, WorldId};

lazy_static! {
    /// Fallback wilderness returned for worlds the store has never seen.
    static ref VOID_WILDERNESS: Claim = Claim::wilderness(WorldId(uuid::Uuid::nil()));
}

const SNAPSHOT_VERSION: u32 = 1;

/// Limits and Y-range constraints applied when creating or resizing claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimRules {
    pub min_claim_y: i32,
    pub max_claim_y: i32,
    /// Per-user claim count limits by type; 0 means unlimited.
    pub basic_limit: u32,
    pub town_limit: u32,
    pub subdivision_limit: u32,
}

impl Default for ClaimRules {
    fn default() -> Self {
        Self {
            min_claim_y: crate::world::MIN_WORLD_Y,
            max_claim_y: crate::world::MAX_WORLD_Y - 1,
            basic_limit: 0,
            town_limit: 0,
            subdivision_limit: 0,
        }
    }
}

impl ClaimRules {
    fn limit_for(&self, claim_type: ClaimType) -> Option<u32> {
        let limit = match claim_type {
            ClaimType::Basic => self.basic_limit,
            ClaimType::Town => self.town_limit,
            ClaimType::Subdivision => self.subdivision_limit,
            _ => 0,
        };
        if limit == 0 {
            None
        } else {
            Some(limit)
        }
    }
}

/// What happens to child claims when their parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildPolicy {
    /// Children reparent to the deleted claim's parent (or become top-level).
    Orphan,
    /// Children are deleted along with the parent.
    Cascade,
}

impl Default for ChildPolicy {
    fn default() -> Self {
        ChildPolicy::Orphan
    }
}

/// Spatial-locality hint from a previous lookup.
///
/// Valid only while the store generation matches; any structural mutation
/// bumps the generation and invalidates every outstanding hint. This
/// replaces reliance on reference liveness with an explicit contract.
#[derive(Debug, Clone, Copy)]
pub struct ClaimHint {
    pub claim: ClaimId,
    pub generation: u64,
}

/// Parameters for creating a claim.
#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub world: WorldId,
    pub corner_a: BlockPos,
    pub corner_b: BlockPos,
    pub claim_type: ClaimType,
    pub owner: Option<UserId>,
    pub cuboid: bool,
    pub parent: Option<ClaimId>,
}

#[derive(Debug, Default)]
struct WorldClaims {
    claims: FxHashMap<ClaimId, Claim>,
    index: ChunkClaimIndex,
    wilderness: Option<Claim>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    claims: Vec<Claim>,
}

/// All claims across all worlds, with the chunk-bucketed index, hierarchy
/// bookkeeping, and mutation validation.
#[derive(Debug, Default)]
pub struct ClaimStore {
    worlds: FxHashMap<WorldId, WorldClaims>,
    locate: FxHashMap<ClaimId, WorldId>,
    nesting: NestingPolicy,
    generation: u64,
    batch_depth: AtomicU32,
}

impl ClaimStore {
    pub fn new(nesting: NestingPolicy) -> Self {
        Self {
            nesting,
            ..Self::default()
        }
    }

    /// Register a world, creating its wilderness sentinel. Idempotent.
    pub fn add_world(&mut self, world: WorldId) {
        let entry = self.worlds.entry(world).or_default();
        if entry.wilderness.is_none() {
            entry.wilderness = Some(Claim::wilderness(world));
        }
    }

    /// Current structural generation; bumps on create/resize/remove.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: ClaimId) -> Option<&Claim> {
        let world = self.locate.get(&id)?;
        self.worlds.get(world)?.claims.get(&id)
    }

    /// The wilderness sentinel for a world.
    pub fn wilderness(&self, world: WorldId) -> &Claim {
        match self.worlds.get(&world).and_then(|w| w.wilderness.as_ref()) {
            Some(c) => c,
            None => {
                warn!("wilderness lookup for unregistered world {}", world);
                &VOID_WILDERNESS
            }
        }
    }

    /// Walk up the parent chain to the first claim with an owner. Admin
    /// subdivisions resolve to `None` like their parents.
    pub fn effective_owner(&self, claim: &Claim) -> Option<UserId> {
        let mut current = claim;
        loop {
            if current.owner.is_some() {
                return current.owner;
            }
            match current.parent.and_then(|id| self.get(id)) {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    pub fn parent_of(&self, claim: &Claim) -> Option<&Claim> {
        claim.parent.and_then(|id| self.get(id))
    }

    /// The most specific claim containing the point: if nested claims all
    /// contain it, the deepest wins; otherwise the wilderness sentinel.
    pub fn claim_at(&self, world: WorldId, pos: BlockPos) -> &Claim {
        let Some(w) = self.worlds.get(&world) else {
            warn!("claim_at for unregistered world {}", world);
            return &VOID_WILDERNESS;
        };
        let mut best: Option<(&Claim, usize)> = None;
        for id in w.index.candidates_at(pos) {
            let Some(claim) = w.claims.get(id) else {
                continue;
            };
            if !claim.contains(pos) {
                continue;
            }
            let depth = self.depth_of(claim);
            match best {
                Some((_, best_depth)) if best_depth >= depth => {}
                _ => best = Some((claim, depth)),
            }
        }
        match best {
            Some((claim, _)) => claim,
            None => w.wilderness.as_ref().unwrap_or(&VOID_WILDERNESS),
        }
    }

    /// Fast path exploiting spatial locality of sequential checks: if the
    /// hinted claim is still live and contains the point, only its subtree
    /// is searched. Falls back to a full lookup otherwise. Returns the
    /// claim together with a fresh hint.
    pub fn claim_at_with_hint(
        &self,
        world: WorldId,
        pos: BlockPos,
        hint: Option<ClaimHint>,
    ) -> (&Claim, ClaimHint) {
        if let Some(h) = hint {
            if h.generation == self.generation {
                if let Some(w) = self.worlds.get(&world) {
                    if let Some(claim) = w.claims.get(&h.claim) {
                        if claim.contains(pos) {
                            let deepest = Self::descend(w, claim, pos);
                            return (deepest, self.hint_for(deepest));
                        }
                    }
                }
            }
        }
        let claim = self.claim_at(world, pos);
        (claim, self.hint_for(claim))
    }

    fn hint_for(&self, claim: &Claim) -> ClaimHint {
        ClaimHint {
            claim: claim.id,
            generation: self.generation,
        }
    }

    fn descend<'a>(w: &'a WorldClaims, from: &'a Claim, pos: BlockPos) -> &'a Claim {
        let mut current = from;
        'outer: loop {
            for child_id in &current.children {
                if let Some(child) = w.claims.get(child_id) {
                    if child.contains(pos) {
                        current = child;
                        continue 'outer;
                    }
                }
            }
            return current;
        }
    }

    fn depth_of(&self, claim: &Claim) -> usize {
        let mut depth = 0;
        let mut current = claim;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// All stored claims whose box intersects the given claim's box,
    /// excluding its own ancestors and descendants (legal nesting).
    pub fn find_overlapping(&self, id: ClaimId) -> Result<Vec<ClaimId>, ClaimError> {
        let claim = self.get(id).ok_or(ClaimError::UnknownClaim(id))?;
        let w = self
            .worlds
            .get(&claim.world)
            .ok_or(ClaimError::UnknownClaim(id))?;
        let ancestors = self.ancestors_of(claim);
        let subtree = self.subtree_of(claim);
        let mut out = Vec::new();
        for cand_id in w.index.candidates_in_box(&claim.area) {
            if cand_id == id || ancestors.contains(&cand_id) || subtree.contains(&cand_id) {
                continue;
            }
            let Some(cand) = w.claims.get(&cand_id) else {
                continue;
            };
            let either_column = !claim.cuboid || !cand.cuboid;
            if claim.area.intersects(&cand.area, either_column) {
                out.push(cand_id);
            }
        }
        Ok(out)
    }

    fn ancestors_of(&self, claim: &Claim) -> FxHashSet<ClaimId> {
        let mut out = FxHashSet::default();
        let mut current = claim;
        while let Some(parent) = self.parent_of(current) {
            out.insert(parent.id);
            current = parent;
        }
        out
    }

    fn subtree_of(&self, claim: &Claim) -> FxHashSet<ClaimId> {
        let mut out = FxHashSet::default();
        let mut stack: Vec<ClaimId> = claim.children.clone();
        while let Some(id) = stack.pop() {
            if out.insert(id) {
                if let Some(child) = self.get(id) {
                    stack.extend(child.children.iter().copied());
                }
            }
        }
        out
    }

    fn conflict_in(
        w: &WorldClaims,
        area: &ClaimBox,
        cuboid: bool,
        ignore: &FxHashSet<ClaimId>,
    ) -> Option<ClaimId> {
        let mut candidates: Vec<ClaimId> = w.index.candidates_in_box(area).into_iter().collect();
        candidates.sort();
        for cand_id in candidates {
            if ignore.contains(&cand_id) {
                continue;
            }
            let Some(cand) = w.claims.get(&cand_id) else {
                continue;
            };
            let either_column = !cuboid || !cand.cuboid;
            if area.intersects(&cand.area, either_column) {
                return Some(cand_id);
            }
        }
        None
    }

    fn check_y_range(area: &ClaimBox, cuboid: bool, rules: &ClaimRules) -> Result<(), ClaimError> {
        if cuboid && (area.lesser.y < rules.min_claim_y || area.greater.y > rules.max_claim_y) {
            return Err(ClaimError::Level {
                min: rules.min_claim_y,
                max: rules.max_claim_y,
            });
        }
        Ok(())
    }

    /// Validate and insert a new claim.
    pub fn create_claim(
        &mut self,
        req: CreateClaim,
        rules: &ClaimRules,
    ) -> Result<ClaimId, ClaimError> {
        self.assert_mutable()?;
        let area = ClaimBox::new(req.corner_a, req.corner_b);
        Self::check_y_range(&area, req.cuboid, rules)?;

        if req.claim_type == ClaimType::Wilderness {
            return Err(ClaimError::IllegalNesting {
                parent: ClaimType::Wilderness,
                child: ClaimType::Wilderness,
            });
        }

        self.add_world(req.world);

        let mut ignore = FxHashSet::default();
        match req.parent {
            Some(parent_id) => {
                let parent = self
                    .get(parent_id)
                    .ok_or(ClaimError::UnknownClaim(parent_id))?;
                if parent.world != req.world {
                    return Err(ClaimError::UnknownClaim(parent_id));
                }
                if !self.nesting.allows(parent.claim_type, req.claim_type) {
                    return Err(ClaimError::IllegalNesting {
                        parent: parent.claim_type,
                        child: req.claim_type,
                    });
                }
                if !parent.area.contains_box(&area, !parent.cuboid) {
                    return Err(ClaimError::OutsideParent(parent_id));
                }
                ignore.insert(parent_id);
                ignore.extend(self.ancestors_of(parent));
            }
            None => {
                // Top-level claims nest in wilderness implicitly; subdivisions
                // always need a parent.
                if req.claim_type == ClaimType::Subdivision {
                    return Err(ClaimError::IllegalNesting {
                        parent: ClaimType::Wilderness,
                        child: ClaimType::Subdivision,
                    });
                }
            }
        }

        if let (Some(owner), Some(limit)) = (req.owner, rules.limit_for(req.claim_type)) {
            let w = self.worlds.get(&req.world).expect("world just ensured");
            let held = w
                .claims
                .values()
                .filter(|c| c.owner == Some(owner) && c.claim_type == req.claim_type)
                .count() as u32;
            if held >= limit {
                return Err(ClaimError::Limit {
                    claim_type: req.claim_type,
                    limit,
                });
            }
        }

        {
            let w = self.worlds.get(&req.world).expect("world just ensured");
            if let Some(offender) = Self::conflict_in(w, &area, req.cuboid, &ignore) {
                return Err(ClaimError::Overlap(offender));
            }
        }

        let mut claim = Claim::new(req.claim_type, req.world, area, req.cuboid, req.owner);
        claim.parent = req.parent;
        let id = claim.id;

        let w = self.worlds.get_mut(&req.world).expect("world just ensured");
        w.index.insert(&claim);
        if let Some(parent_id) = req.parent {
            if let Some(parent) = w.claims.get_mut(&parent_id) {
                parent.children.push(id);
            }
        }
        w.claims.insert(id, claim);
        self.locate.insert(id, req.world);
        self.generation += 1;
        debug!("created claim {} ({:?})", id, req.claim_type);
        Ok(id)
    }

    /// Re-validate and apply a new boundary for an existing claim.
    pub fn resize_claim(
        &mut self,
        id: ClaimId,
        corner_a: BlockPos,
        corner_b: BlockPos,
        rules: &ClaimRules,
    ) -> Result<(), ClaimError> {
        self.assert_mutable()?;
        let world = *self.locate.get(&id).ok_or(ClaimError::UnknownClaim(id))?;
        let area = ClaimBox::new(corner_a, corner_b);

        let old_claim = self.get(id).ok_or(ClaimError::UnknownClaim(id))?.clone();
        let cuboid = old_claim.cuboid;
        Self::check_y_range(&area, cuboid, rules)?;

        if let Some(parent) = self.parent_of(&old_claim) {
            if !parent.area.contains_box(&area, !parent.cuboid) {
                return Err(ClaimError::OutsideParent(parent.id));
            }
        }
        for child_id in &old_claim.children {
            if let Some(child) = self.get(*child_id) {
                if !area.contains_box(&child.area, !cuboid) {
                    return Err(ClaimError::ChildOutsideBoundary(*child_id));
                }
            }
        }

        let mut ignore = self.ancestors_of(&old_claim);
        ignore.extend(self.subtree_of(&old_claim));
        ignore.insert(id);
        {
            let w = self.worlds.get(&world).ok_or(ClaimError::UnknownClaim(id))?;
            if let Some(offender) = Self::conflict_in(w, &area, cuboid, &ignore) {
                return Err(ClaimError::Overlap(offender));
            }
        }

        let w = self.worlds.get_mut(&world).expect("located world exists");
        w.index.remove(&old_claim);
        let claim = w.claims.get_mut(&id).expect("claim checked above");
        claim.area = area;
        let reindexed = claim.clone();
        w.index.insert(&reindexed);
        self.generation += 1;
        Ok(())
    }

    /// Remove a claim; `policy` decides whether children reparent or are
    /// deleted with it.
    pub fn remove_claim(&mut self, id: ClaimId, policy: ChildPolicy) -> Result<(), ClaimError> {
        self.assert_mutable()?;
        let world = *self.locate.get(&id).ok_or(ClaimError::UnknownClaim(id))?;

        let mut doomed = vec![id];
        if policy == ChildPolicy::Cascade {
            let claim = self.get(id).ok_or(ClaimError::UnknownClaim(id))?;
            doomed.extend(self.subtree_of(claim));
        }

        let w = self.worlds.get_mut(&world).expect("located world exists");
        let removed = w.claims.get(&id).ok_or(ClaimError::UnknownClaim(id))?;
        let grandparent = removed.parent;
        let children = removed.children.clone();

        if let Some(parent_id) = grandparent {
            if let Some(parent) = w.claims.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        if policy == ChildPolicy::Orphan {
            for child_id in &children {
                if let Some(child) = w.claims.get_mut(child_id) {
                    child.parent = grandparent;
                }
            }
            if let Some(parent_id) = grandparent {
                if let Some(parent) = w.claims.get_mut(&parent_id) {
                    parent.children.extend(children.iter().copied());
                }
            }
        }

        for doomed_id in doomed {
            if let Some(claim) = w.claims.remove(&doomed_id) {
                w.index.remove(&claim);
                self.locate.remove(&doomed_id);
            }
        }
        self.generation += 1;
        Ok(())
    }

    /// Set or replace a trust entry. Trust edits do not bump the structural
    /// generation; spatial hints stay valid.
    pub fn set_trust(
        &mut self,
        id: ClaimId,
        subject: TrustSubject,
        level: TrustLevel,
    ) -> Result<(), ClaimError> {
        self.assert_mutable()?;
        self.claim_mut(id)?.set_trust(subject, level);
        Ok(())
    }

    pub fn remove_trust(&mut self, id: ClaimId, subject: &TrustSubject) -> Result<(), ClaimError> {
        self.assert_mutable()?;
        self.claim_mut(id)?.remove_trust(subject);
        Ok(())
    }

    fn claim_mut(&mut self, id: ClaimId) -> Result<&mut Claim, ClaimError> {
        let world = *self.locate.get(&id).ok_or(ClaimError::UnknownClaim(id))?;
        self.worlds
            .get_mut(&world)
            .and_then(|w| w.claims.get_mut(&id))
            .ok_or(ClaimError::UnknownClaim(id))
    }

    /// Open a resolution batch; structural and trust mutations fail with
    /// [`ClaimError::MutationDuringBatch`] until the matching `end_batch`.
    pub fn begin_batch(&self) {
        self.batch_depth.fetch_add(1, Ordering::Relaxed);
    }

    pub fn end_batch(&self) {
        let prev = self.batch_depth.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(prev > 0, "end_batch without begin_batch");
    }

    /// RAII form of [`begin_batch`](Self::begin_batch).
    pub fn batch(&self) -> StoreBatch<'_> {
        self.begin_batch();
        StoreBatch(self)
    }

    fn assert_mutable(&self) -> Result<(), ClaimError> {
        if self.batch_depth.load(Ordering::Relaxed) > 0 {
            return Err(ClaimError::MutationDuringBatch);
        }
        Ok(())
    }

    /// Serialize every stored claim into an opaque blob.
    pub fn snapshot(&self) -> Result<Vec<u8>, PersistError> {
        let claims: Vec<Claim> = self
            .worlds
            .values()
            .flat_map(|w| w.claims.values().cloned())
            .collect();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            claims,
        };
        bincode::serialize(&snapshot).map_err(|e| PersistError::Encode(e.to_string()))
    }

    /// Replace the store contents from a snapshot blob, rebuilding the
    /// index and hierarchy bookkeeping.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        self.assert_mutable()
            .map_err(|e| PersistError::Encode(e.to_string()))?;
        let snapshot: Snapshot =
            bincode::deserialize(bytes).map_err(|e| PersistError::Decode(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistError::Version {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        self.worlds.clear();
        self.locate.clear();
        for claim in snapshot.claims {
            self.add_world(claim.world);
            let w = self.worlds.get_mut(&claim.world).expect("world ensured");
            w.index.insert(&claim);
            self.locate.insert(claim.id, claim.world);
            w.claims.insert(claim.id, claim);
        }
        self.generation += 1;
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        persist::atomic_write(path, &self.snapshot()?)
    }

    pub fn load_from(&mut self, path: &Path) -> Result<(), PersistError> {
        let bytes = std::fs::read(path)?;
        self.restore(&bytes)
    }

    /// Replace the nesting policy (configuration reload).
    pub fn set_nesting_policy(&mut self, nesting: NestingPolicy) {
        self.nesting = nesting;
    }
}

/// Open resolution batch; claim mutations fail until this drops.
pub struct StoreBatch<'a>(&'a ClaimStore);

impl Drop for StoreBatch<'_> {
    fn drop(&mut self) {
        self.0.end_batch();
    }
}
