use rustc_hash::{FxHashMap, FxHashSet};

use crate::claim::claim::Claim;
use crate::claim::region::ClaimBox;
use crate::world::{BlockPos, ChunkPos, ClaimId};

/// Chunk-bucketed claim index for one world.
///
/// Every claim is registered in each chunk column its footprint touches, so
/// a point query only inspects the claims overlapping one chunk instead of
/// scanning the whole world. Point queries fire on nearly every tracked
/// event, so this lookup has to stay cheap.
#[derive(Debug, Default)]
pub struct ChunkClaimIndex {
    buckets: FxHashMap<ChunkPos, Vec<ClaimId>>,
}

impl ChunkClaimIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, claim: &Claim) {
        for chunk in claim.area.chunk_span() {
            let bucket = self.buckets.entry(chunk).or_default();
            if !bucket.contains(&claim.id) {
                bucket.push(claim.id);
            }
        }
    }

    pub fn remove(&mut self, claim: &Claim) {
        for chunk in claim.area.chunk_span() {
            if let Some(bucket) = self.buckets.get_mut(&chunk) {
                bucket.retain(|id| *id != claim.id);
                if bucket.is_empty() {
                    self.buckets.remove(&chunk);
                }
            }
        }
    }

    /// Claims whose footprint touches the chunk containing `pos`.
    pub fn candidates_at(&self, pos: BlockPos) -> &[ClaimId] {
        self.buckets
            .get(&pos.to_chunk_pos())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct claims registered in any chunk the box touches.
    pub fn candidates_in_box(&self, area: &ClaimBox) -> FxHashSet<ClaimId> {
        let mut out = FxHashSet::default();
        for chunk in area.chunk_span() {
            if let Some(bucket) = self.buckets.get(&chunk) {
                out.extend(bucket.iter().copied());
            }
        }
        out
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::claim::ClaimType;
    use crate::world::{UserId, WorldId};

    fn claim_with_box(world: WorldId, a: (i32, i32, i32), b: (i32, i32, i32)) -> Claim {
        let area = ClaimBox::new(
            BlockPos::new(a.0, a.1, a.2),
            BlockPos::new(b.0, b.1, b.2),
        );
        Claim::new(ClaimType::Basic, world, area, false, Some(UserId::new()))
    }

    #[test]
    fn insert_registers_every_touched_chunk() {
        let world = WorldId::new();
        let mut index = ChunkClaimIndex::new();
        let claim = claim_with_box(world, (0, 0, 0), (31, 10, 31));
        index.insert(&claim);
        assert_eq!(index.bucket_count(), 4);
        assert_eq!(index.candidates_at(BlockPos::new(20, 64, 20)), &[claim.id]);
        assert!(index.candidates_at(BlockPos::new(40, 64, 40)).is_empty());
    }

    #[test]
    fn remove_clears_empty_buckets() {
        let world = WorldId::new();
        let mut index = ChunkClaimIndex::new();
        let claim = claim_with_box(world, (0, 0, 0), (15, 10, 15));
        index.insert(&claim);
        index.remove(&claim);
        assert_eq!(index.bucket_count(), 0);
    }

    #[test]
    fn box_query_deduplicates() {
        let world = WorldId::new();
        let mut index = ChunkClaimIndex::new();
        let claim = claim_with_box(world, (0, 0, 0), (47, 10, 47));
        index.insert(&claim);
        let probe = ClaimBox::new(BlockPos::new(0, 0, 0), BlockPos::new(47, 10, 47));
        assert_eq!(index.candidates_in_box(&probe).len(), 1);
    }
}
