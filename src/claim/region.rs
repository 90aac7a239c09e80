use serde::{Deserialize, Serialize};

use crate::world::{BlockPos, ChunkPos, CHUNK_SIZE};

/// Axis-aligned cuboid boundary of a claim, inclusive on all faces.
///
/// `lesser` holds the minimum coordinate on every axis and `greater` the
/// maximum; the constructor normalizes arbitrary corner pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBox {
    pub lesser: BlockPos,
    pub greater: BlockPos,
}

impl ClaimBox {
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            lesser: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            greater: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// True if the position lies inside the box. `ignore_y` treats the box
    /// as a full-height column (2-D claims).
    pub fn contains(&self, pos: BlockPos, ignore_y: bool) -> bool {
        pos.x >= self.lesser.x
            && pos.x <= self.greater.x
            && pos.z >= self.lesser.z
            && pos.z <= self.greater.z
            && (ignore_y || (pos.y >= self.lesser.y && pos.y <= self.greater.y))
    }

    /// True if the two boxes share any block. Column claims intersect on
    /// the horizontal footprint alone.
    pub fn intersects(&self, other: &ClaimBox, either_column: bool) -> bool {
        let horizontal = self.lesser.x <= other.greater.x
            && self.greater.x >= other.lesser.x
            && self.lesser.z <= other.greater.z
            && self.greater.z >= other.lesser.z;
        let vertical =
            either_column || (self.lesser.y <= other.greater.y && self.greater.y >= other.lesser.y);
        horizontal && vertical
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &ClaimBox, ignore_y: bool) -> bool {
        self.contains(other.lesser, ignore_y) && self.contains(other.greater, ignore_y)
    }

    /// Chunk columns covered by this box's horizontal footprint.
    pub fn chunk_span(&self) -> impl Iterator<Item = ChunkPos> {
        let min_cx = self.lesser.x.div_euclid(CHUNK_SIZE);
        let max_cx = self.greater.x.div_euclid(CHUNK_SIZE);
        let min_cz = self.lesser.z.div_euclid(CHUNK_SIZE);
        let max_cz = self.greater.z.div_euclid(CHUNK_SIZE);
        (min_cx..=max_cx).flat_map(move |x| (min_cz..=max_cz).map(move |z| ChunkPos::new(x, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    #[test]
    fn corners_are_normalized() {
        let b = ClaimBox::new(block(10, 64, -5), block(-3, 0, 20));
        assert_eq!(b.lesser, block(-3, 0, -5));
        assert_eq!(b.greater, block(10, 64, 20));
    }

    #[test]
    fn contains_is_inclusive() {
        let b = ClaimBox::new(block(0, 0, 0), block(15, 15, 15));
        assert!(b.contains(block(0, 0, 0), false));
        assert!(b.contains(block(15, 15, 15), false));
        assert!(!b.contains(block(16, 0, 0), false));
        assert!(!b.contains(block(0, 16, 0), false));
        assert!(b.contains(block(0, 200, 0), true));
    }

    #[test]
    fn intersection_and_containment() {
        let outer = ClaimBox::new(block(0, 0, 0), block(100, 100, 100));
        let inner = ClaimBox::new(block(10, 10, 10), block(20, 20, 20));
        let apart = ClaimBox::new(block(200, 0, 200), block(210, 10, 210));
        assert!(outer.intersects(&inner, false));
        assert!(outer.contains_box(&inner, false));
        assert!(!inner.contains_box(&outer, false));
        assert!(!outer.intersects(&apart, false));
    }

    #[test]
    fn column_claims_intersect_on_footprint() {
        let low = ClaimBox::new(block(0, 0, 0), block(10, 5, 10));
        let high = ClaimBox::new(block(5, 50, 5), block(15, 60, 15));
        assert!(!low.intersects(&high, false));
        assert!(low.intersects(&high, true));
    }

    #[test]
    fn chunk_span_covers_straddled_chunks() {
        let b = ClaimBox::new(block(-1, 0, 0), block(16, 0, 16));
        let span: Vec<ChunkPos> = b.chunk_span().collect();
        assert_eq!(span.len(), 6);
        assert!(span.contains(&ChunkPos::new(-1, 0)));
        assert!(span.contains(&ChunkPos::new(1, 1)));
    }
}
