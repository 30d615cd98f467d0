use planet_core::gen::artifacts::layout;
use planet_core::gen::{
    FsArtifactStore, GenerationConfig, GenerationPipeline, PlanetRequest, RenderScope,
};
use planet_core::objects::{EffectsTemplate, PlanetEntity, PlanetId};
use planet_core::registry::{
    ArchiveFidelity, FsDocumentStore, MaintenanceOutcome, PlanetRegistry, RegistryConfig,
    RegistryPersistence, Tier,
};
use planet_core::utils::time::{ManualClock, DAY, HOUR};
use planet_core::utils::Threader;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

struct World {
    _dir: TempDir,
    clock: Arc<ManualClock>,
    registry: Arc<PlanetRegistry>,
    artifacts: Arc<FsArtifactStore>,
    pipeline: Arc<GenerationPipeline>,
}

fn world(config: RegistryConfig, seed: u64) -> World {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(DAY));
    let registry = Arc::new(PlanetRegistry::new(config, clock.clone()).with_rng_seed(seed));
    let artifacts = Arc::new(FsArtifactStore::new(dir.path().join("artifacts")).unwrap());
    let pipeline = GenerationPipeline::new(
        registry.clone(),
        artifacts.clone(),
        Arc::new(Threader::with_threads(32, 2).unwrap()),
        GenerationConfig::default(),
    )
    .unwrap()
    .with_rng_seed(seed);
    World {
        _dir: dir,
        clock,
        registry,
        artifacts,
        pipeline: Arc::new(pipeline),
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn seeded_generation_matches_tables_and_shards() {
    let w = world(RegistryConfig::default(), 2024);

    for n in 1..=45u32 {
        let outcome = w.pipeline.generate(PlanetRequest::random()).unwrap();
        let id = outcome.entity.id();
        assert_eq!(id, &PlanetId::from_sequence(n));

        let key = format!("planets/group_{:02}/planet_{:03}.json", n / 20, n);
        assert_eq!(layout::planet_descriptor(id), key);
        let doc = read_json(&w.artifacts.root().join(&key));

        let profile = outcome.entity.effects().profile();
        assert_eq!(doc["dimension"]["sky_color"], profile.sky.sky_color);
        assert_eq!(doc["dimension"]["fog_color"], profile.fog.fog_color);
        assert_eq!(doc["rendering"]["sky"]["sky_color"], profile.sky.sky_color);
        assert_eq!(doc["rendering"]["fog"]["fog_color"], profile.fog.fog_color);

        let biome_key = format!("worldgen/biome/planet_{:03}_plains.json", n);
        let biome = read_json(&w.artifacts.root().join(biome_key));
        assert_eq!(biome["effects"]["sky_color"], profile.sky.sky_color);
    }

    // Same seed, same planets.
    let again = world(RegistryConfig::default(), 2024);
    for n in 1..=45u32 {
        let outcome = again.pipeline.generate(PlanetRequest::random()).unwrap();
        let original = w.registry.peek(&PlanetId::from_sequence(n)).unwrap();
        assert_eq!(outcome.entity.descriptor, original.descriptor);
    }
}

#[test]
fn archive_promote_and_restart() {
    let config = RegistryConfig {
        archive_fidelity: ArchiveFidelity::Lossless,
        ..RegistryConfig::default()
    };
    let w = world(config.clone(), 11);
    let kept = w
        .pipeline
        .generate(PlanetRequest::named("Kepler-4242b").with_effects(EffectsTemplate::GasGiant))
        .unwrap()
        .entity;
    let idle = w
        .pipeline
        .generate(PlanetRequest::named("Gliese-581c").with_scope(RenderScope::PlanetOnly))
        .unwrap()
        .entity;
    w.registry.mark_loaded(kept.id()).unwrap();

    w.clock.advance(DAY + HOUR);
    let MaintenanceOutcome::Ran(report) = w.registry.run_maintenance() else {
        panic!("maintenance should run");
    };
    assert_eq!(report.archived_ids, vec![idle.id().clone()]);
    assert!(w.registry.search_by_name("gliese").is_empty());

    let docs = Arc::new(FsDocumentStore::new(w.artifacts.root().join("state")).unwrap());
    RegistryPersistence::new(docs.clone()).save(&w.registry).unwrap();

    let restarted = PlanetRegistry::new(config, w.clock.clone());
    assert!(RegistryPersistence::new(docs).load(&restarted).unwrap());
    assert_eq!(restarted.tier_of(idle.id()), Some(Tier::Archived));
    assert!(restarted.peek(kept.id()).unwrap().is_loaded());

    let (promoted, tier) = restarted.get_tracked(idle.id()).unwrap();
    assert_eq!(tier, Tier::Archived);
    assert_eq!(promoted.descriptor, idle.descriptor);
    assert!(!promoted.is_loaded());
    assert_eq!(restarted.search_by_name("gliese").len(), 1);
    assert_eq!(restarted.generate_next_id().unwrap(), PlanetId::from_sequence(3));
}

#[test]
fn population_cap_holds_under_mixed_operations() {
    let config = RegistryConfig {
        max_planets: 12,
        max_loaded: 4,
        ..RegistryConfig::default()
    };
    let w = world(config, 99);
    let mut rng = StdRng::seed_from_u64(5);
    let mut known: Vec<PlanetEntity> = Vec::new();

    for _ in 0..300 {
        match rng.random_range(0..6) {
            0 | 1 => {
                if let Ok(outcome) = w
                    .pipeline
                    .generate(PlanetRequest::random().with_scope(RenderScope::PlanetOnly))
                {
                    known.push(outcome.entity);
                }
            }
            2 if !known.is_empty() => {
                let pick = &known[rng.random_range(0..known.len())];
                let _ = w.registry.get(pick.id());
            }
            3 if !known.is_empty() => {
                let pick = &known[rng.random_range(0..known.len())];
                let _ = w.registry.mark_loaded(pick.id());
            }
            4 if !known.is_empty() => {
                let pick = &known[rng.random_range(0..known.len())];
                let _ = w.registry.mark_unloaded(pick.id());
            }
            _ => {
                w.clock.advance(rng.random_range(HOUR..3 * DAY));
                w.registry.run_maintenance();
            }
        }
        let stats = w.registry.stats();
        assert!(stats.active + stats.archived <= 12);
        assert!(stats.loaded <= 4);
    }
}

#[tokio::test]
async fn background_generation_completes() {
    let w = world(RegistryConfig::default(), 3);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            w.pipeline
                .submit(PlanetRequest::named(format!("Nova-{} Prime", 1000 + i)))
                .unwrap()
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    let stats = w.registry.stats();
    assert_eq!(stats.active, 8);
    assert_eq!(w.registry.search_by_name("nova").len(), 8);
}
