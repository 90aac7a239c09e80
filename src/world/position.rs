use serde::{Deserialize, Serialize};

/// Horizontal edge length of a chunk column in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Lowest block Y coordinate the engine tracks.
pub const MIN_WORLD_Y: i32 = -64;

/// Highest block Y coordinate the engine tracks (exclusive).
pub const MAX_WORLD_Y: i32 = 320;

/// Position of a block in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the chunk column this block belongs to.
    pub fn to_chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.x.div_euclid(CHUNK_SIZE), self.z.div_euclid(CHUNK_SIZE))
    }

    /// Pack the chunk-local position into a single key for per-chunk tables.
    ///
    /// Layout: `y_index << 8 | local_x << 4 | local_z`, where `y_index` is the
    /// offset above [`MIN_WORLD_Y`]. Returns `None` for Y outside the tracked
    /// world height.
    pub fn to_local_key(&self) -> Option<u32> {
        if self.y < MIN_WORLD_Y || self.y >= MAX_WORLD_Y {
            return None;
        }
        let y_index = (self.y - MIN_WORLD_Y) as u32;
        let local_x = self.x.rem_euclid(CHUNK_SIZE) as u32;
        let local_z = self.z.rem_euclid(CHUNK_SIZE) as u32;
        Some(y_index << 8 | local_x << 4 | local_z)
    }

    /// Create a new block position offset by the given amounts.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Position of a chunk column (chunk coordinates, horizontal only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World coordinate of the chunk's lesser corner.
    pub fn origin(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE, self.z * CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_to_chunk_handles_negatives() {
        assert_eq!(BlockPos::new(0, 64, 0).to_chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(-1, 64, -1).to_chunk_pos(), ChunkPos::new(-1, -1));
        assert_eq!(BlockPos::new(-16, 64, 31).to_chunk_pos(), ChunkPos::new(-1, 1));
    }

    #[test]
    fn local_key_is_unique_within_chunk() {
        let mut seen = std::collections::HashSet::new();
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in [MIN_WORLD_Y, 0, MAX_WORLD_Y - 1] {
                    let key = BlockPos::new(x, y, z).to_local_key().unwrap();
                    assert!(seen.insert(key));
                }
            }
        }
    }

    #[test]
    fn local_key_rejects_out_of_range_y() {
        assert!(BlockPos::new(0, MIN_WORLD_Y - 1, 0).to_local_key().is_none());
        assert!(BlockPos::new(0, MAX_WORLD_Y, 0).to_local_key().is_none());
    }
}
