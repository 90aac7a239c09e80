use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::world::WorldId;

/// Per-world, per-flag sets of source/target type identifiers that are
/// never evaluated. A blacklisted identifier short-circuits resolution to
/// Undefined: the flag expresses no opinion for that pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blacklist {
    entries: FxHashMap<WorldId, FxHashMap<String, FxHashSet<String>>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, world: WorldId, flag: impl Into<String>, id: impl Into<String>) {
        self.entries
            .entry(world)
            .or_default()
            .entry(flag.into())
            .or_default()
            .insert(id.into());
    }

    pub fn is_blacklisted(&self, world: WorldId, flag: &str, id: &str) -> bool {
        self.entries
            .get(&world)
            .and_then(|flags| flags.get(flag))
            .map(|ids| ids.contains(id))
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blacklist_is_scoped_by_world_and_flag() {
        let w1 = WorldId::new();
        let w2 = WorldId::new();
        let mut bl = Blacklist::new();
        bl.add(w1, "block-break", "minecraft:grass");
        assert!(bl.is_blacklisted(w1, "block-break", "minecraft:grass"));
        assert!(!bl.is_blacklisted(w2, "block-break", "minecraft:grass"));
        assert!(!bl.is_blacklisted(w1, "block-place", "minecraft:grass"));
        assert!(!bl.is_blacklisted(w1, "block-break", "minecraft:stone"));
    }
}
