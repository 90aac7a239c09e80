use log::warn;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::attribution::store::AttributionStore;
use crate::persist::PersistError;
use crate::world::{BlockPos, ChunkPos, UserId, WorldId};

const BLOB_VERSION: u32 = 1;

/// Which attribution field a record updates. Owner answers "who placed
/// this block"; Notifier answers "who last caused it to update". Writing
/// one never clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributionKind {
    Owner,
    Notifier,
}

/// Attribution entry for one tracked block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAttribution {
    pub owner: Option<UserId>,
    pub notifier: Option<UserId>,
    pub last_modified_tick: u64,
}

/// Attribution entries for one chunk, keyed by packed local position.
#[derive(Debug, Default)]
pub struct ChunkAttributionTable {
    entries: FxHashMap<u32, BlockAttribution>,
    dirty: bool,
}

impl ChunkAttributionTable {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn encode(&self) -> Result<Vec<u8>, PersistError> {
        let mut blob = BLOB_VERSION.to_le_bytes().to_vec();
        let body =
            bincode::serialize(&self.entries).map_err(|e| PersistError::Encode(e.to_string()))?;
        blob.extend_from_slice(&body);
        Ok(blob)
    }

    fn decode(blob: &[u8]) -> Result<Self, PersistError> {
        if blob.len() < 4 {
            return Err(PersistError::Decode("attribution blob too short".into()));
        }
        let version = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]);
        if version != BLOB_VERSION {
            return Err(PersistError::Version {
                expected: BLOB_VERSION,
                found: version,
            });
        }
        let entries =
            bincode::deserialize(&blob[4..]).map_err(|e| PersistError::Decode(e.to_string()))?;
        Ok(Self {
            entries,
            dirty: false,
        })
    }
}

/// Per-chunk attribution tracker.
///
/// Bounded by the number of loaded chunks: the cache never evicts on its
/// own, its lifecycle is slaved to the host's chunk load/unload events,
/// because attribution is only meaningful while a chunk is active.
pub struct AttributionCache {
    chunks: FxHashMap<(WorldId, ChunkPos), ChunkAttributionTable>,
    store: Box<dyn AttributionStore>,
    tick: u64,
}

impl AttributionCache {
    pub fn new(store: Box<dyn AttributionStore>) -> Self {
        Self {
            chunks: FxHashMap::default(),
            store,
            tick: 0,
        }
    }

    /// Advance the tick counter stamped onto new records.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Record an attribution for a block. Out-of-range positions are a
    /// host anomaly: logged and dropped, never fatal.
    pub fn record(&mut self, world: WorldId, pos: BlockPos, user: UserId, kind: AttributionKind) {
        let Some(key) = pos.to_local_key() else {
            warn!("attribution record outside world height at y={}", pos.y);
            return;
        };
        let table = self
            .chunks
            .entry((world, pos.to_chunk_pos()))
            .or_default();
        let entry = table.entries.entry(key).or_default();
        match kind {
            AttributionKind::Owner => entry.owner = Some(user),
            AttributionKind::Notifier => entry.notifier = Some(user),
        }
        entry.last_modified_tick = self.tick;
        table.dirty = true;
    }

    pub fn owner_of(&self, world: WorldId, pos: BlockPos) -> Option<UserId> {
        self.entry_at(world, pos)?.owner
    }

    pub fn notifier_of(&self, world: WorldId, pos: BlockPos) -> Option<UserId> {
        self.entry_at(world, pos)?.notifier
    }

    fn entry_at(&self, world: WorldId, pos: BlockPos) -> Option<&BlockAttribution> {
        let key = pos.to_local_key()?;
        self.chunks
            .get(&(world, pos.to_chunk_pos()))?
            .entries
            .get(&key)
    }

    /// Populate the in-memory table for a chunk from persisted storage.
    /// Re-loading an already-loaded chunk overwrites it; this is not an
    /// error.
    pub fn load(&mut self, world: WorldId, chunk: ChunkPos) -> Result<(), PersistError> {
        match self.store.load(world, chunk)? {
            Some(blob) => {
                let table = ChunkAttributionTable::decode(&blob)?;
                self.chunks.insert((world, chunk), table);
            }
            None => {
                self.chunks.remove(&(world, chunk));
            }
        }
        Ok(())
    }

    /// Persist the chunk's table if it has entries, then discard it from
    /// memory. Safe to call for chunks that were never loaded or tracked.
    pub fn unload(&mut self, world: WorldId, chunk: ChunkPos) -> Result<(), PersistError> {
        let Some(table) = self.chunks.remove(&(world, chunk)) else {
            return Ok(());
        };
        // A clean table is already on disk (or empty); skip the write.
        if table.is_empty() || !table.dirty {
            return Ok(());
        }
        self.store.save(world, chunk, &table.encode()?)
    }

    /// Number of chunk tables currently resident.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }
}
