use std::path::PathBuf;

use crate::persist::{self, PersistError};
use crate::world::{ChunkPos, WorldId};

/// Opaque blob storage for per-chunk attribution tables. The engine never
/// interprets paths or formats beyond its own blob encoding; hosts may
/// back this with files, a database, or region storage.
pub trait AttributionStore {
    fn load(&self, world: WorldId, chunk: ChunkPos) -> Result<Option<Vec<u8>>, PersistError>;
    fn save(&self, world: WorldId, chunk: ChunkPos, blob: &[u8]) -> Result<(), PersistError>;
}

/// Store that persists nothing; attribution lives only while chunks stay
/// loaded. Used in tests and by hosts that opt out of persistence.
#[derive(Debug, Default)]
pub struct NullAttributionStore;

impl AttributionStore for NullAttributionStore {
    fn load(&self, _world: WorldId, _chunk: ChunkPos) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(None)
    }

    fn save(&self, _world: WorldId, _chunk: ChunkPos, _blob: &[u8]) -> Result<(), PersistError> {
        Ok(())
    }
}

/// One file per chunk under `<root>/<world>/<x>.<z>.attr`, written
/// atomically.
#[derive(Debug)]
pub struct FileAttributionStore {
    root: PathBuf,
}

impl FileAttributionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, world: WorldId, chunk: ChunkPos) -> PathBuf {
        self.root
            .join(world.to_string())
            .join(format!("{}.{}.attr", chunk.x, chunk.z))
    }
}

impl AttributionStore for FileAttributionStore {
    fn load(&self, world: WorldId, chunk: ChunkPos) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.path_for(world, chunk);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, world: WorldId, chunk: ChunkPos, blob: &[u8]) -> Result<(), PersistError> {
        persist::atomic_write(&self.path_for(world, chunk), blob)
    }
}
