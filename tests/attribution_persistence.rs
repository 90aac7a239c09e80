//! Chunk attribution lifecycle through the engine facade: records survive
//! an unload/load cycle via the file store, and claim snapshots round-trip
//! alongside them.

use landguard::{
    AttributionKind, BlockPos, ClaimEngine, ClaimStore, ClaimType, ConfigData, ConfigHandle,
    CreateClaim, FileAttributionStore, StaticIdentity, UserId, WorldId,
};

fn engine_with_store(root: &std::path::Path) -> ClaimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    ClaimEngine::new(
        ConfigHandle::new(ConfigData::default()),
        Box::new(StaticIdentity::new()),
        Box::new(FileAttributionStore::new(root)),
    )
}

#[test]
fn attribution_survives_chunk_unload_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_with_store(dir.path());

    let world = WorldId::new();
    engine.add_world(world);
    let placer = UserId::new();
    let lever = BlockPos::new(100, 70, -40);
    let chunk = lever.to_chunk_pos();

    engine.set_tick(128);
    engine.record_attribution(world, lever, placer, AttributionKind::Owner);
    engine.record_attribution(world, lever, placer, AttributionKind::Notifier);

    engine.on_chunk_unload(world, chunk).unwrap();
    assert_eq!(engine.attribution_owner(world, lever), None);

    engine.on_chunk_load(world, chunk).unwrap();
    assert_eq!(engine.attribution_owner(world, lever), Some(placer));
    assert_eq!(engine.attribution_notifier(world, lever), Some(placer));
}

#[test]
fn attribution_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldId::new();
    let placer = UserId::new();
    let pos = BlockPos::new(-300, 12, 555);
    let chunk = pos.to_chunk_pos();

    {
        let mut engine = engine_with_store(dir.path());
        engine.add_world(world);
        engine.record_attribution(world, pos, placer, AttributionKind::Owner);
        engine.on_chunk_unload(world, chunk).unwrap();
    }

    let mut engine = engine_with_store(dir.path());
    engine.add_world(world);
    engine.on_chunk_load(world, chunk).unwrap();
    assert_eq!(engine.attribution_owner(world, pos), Some(placer));
}

#[test]
fn unloading_an_untouched_chunk_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_with_store(dir.path());
    let world = WorldId::new();
    engine.add_world(world);
    engine
        .on_chunk_unload(world, BlockPos::new(0, 64, 0).to_chunk_pos())
        .unwrap();
    // Nothing tracked, so no per-world directory appears.
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn claim_store_snapshot_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_with_store(dir.path());
    let world = WorldId::new();
    engine.add_world(world);
    let owner = UserId::new();
    let id = engine
        .create_claim(CreateClaim {
            world,
            corner_a: BlockPos::new(0, 0, 0),
            corner_b: BlockPos::new(31, 31, 31),
            claim_type: ClaimType::Basic,
            owner: Some(owner),
            cuboid: false,
            parent: None,
        })
        .unwrap();

    let path = dir.path().join("claims.bin");
    engine.store().save_to(&path).unwrap();

    let mut restored = ClaimStore::default();
    restored.load_from(&path).unwrap();
    assert_eq!(restored.claim_at(world, BlockPos::new(5, 64, 5)).id, id);
    assert_eq!(restored.get(id).unwrap().owner, Some(owner));
}
