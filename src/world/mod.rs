//! World coordinate model: block and chunk positions, stable identifiers.

pub mod ids;
pub mod position;

pub use ids::{ClaimId, UserId, WorldId};
pub use position::{BlockPos, ChunkPos, CHUNK_SIZE, MAX_WORLD_Y, MIN_WORLD_Y};
