//! Chunk-scoped block attribution: who placed or last caused an update to
//! each tracked block, persisted per chunk and slaved to the host's chunk
//! load/unload lifecycle.

pub mod store;
pub mod tracker;

pub use store::{AttributionStore, FileAttributionStore, NullAttributionStore};
pub use tracker::{AttributionCache, AttributionKind, BlockAttribution, ChunkAttributionTable};
