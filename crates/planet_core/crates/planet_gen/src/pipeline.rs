//! Planet generation pipeline.
//!
//! `TemplatesSelected -> EntitySynthesized -> ArtifactsRendered ->
//! ArtifactsStaged -> Registered -> ArtifactsCommitted -> Instantiated`
//!
//! Artifacts are staged before registration and only committed once the
//! registry accepted the planet. A rejected registration discards the staged
//! bundle; a failed commit retracts the registration.

use crate::artifacts::{render_bundle, RenderScope};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::loader::{InstanceHandle, WorldLoader};
use crate::names;
use crate::store::ArtifactStore;
use crate::synth::synthesize;
use planet_objects::{CelestialTemplate, EffectsTemplate, PlanetEntity};
use planet_registry::{CapacityKind, PlanetRegistry, RegistryError};
use planet_utils::Threader;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    TemplatesSelected,
    EntitySynthesized,
    ArtifactsRendered,
    ArtifactsStaged,
    Registered,
    ArtifactsCommitted,
    Instantiated,
}

/// Canned template combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanetPreset {
    EarthLike,
    MoonLike,
    MarsLike,
}

impl PlanetPreset {
    pub fn templates(self) -> (EffectsTemplate, CelestialTemplate) {
        match self {
            PlanetPreset::EarthLike => (EffectsTemplate::Rocky, CelestialTemplate::SingleSun),
            PlanetPreset::MoonLike => (EffectsTemplate::MoonLike, CelestialTemplate::SunAndEarth),
            PlanetPreset::MarsLike => (EffectsTemplate::Rocky, CelestialTemplate::TwoMoons),
        }
    }
}

/// What to generate. Unset fields are chosen by the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanetRequest {
    pub name: Option<String>,
    /// Effects template ID; weighted random when unset.
    pub effects: Option<String>,
    /// Celestial template ID; uniform random when unset.
    pub celestial: Option<String>,
    pub scope: Option<RenderScope>,
    pub hot_load: bool,
}

impl PlanetRequest {
    pub fn random() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn preset(preset: PlanetPreset, name: impl Into<String>) -> Self {
        let (effects, celestial) = preset.templates();
        Self::named(name).with_effects(effects).with_celestial(celestial)
    }

    pub fn with_effects(mut self, effects: EffectsTemplate) -> Self {
        self.effects = Some(effects.id().to_string());
        self
    }

    pub fn with_celestial(mut self, celestial: CelestialTemplate) -> Self {
        self.celestial = Some(celestial.id().to_string());
        self
    }

    pub fn with_scope(mut self, scope: RenderScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn hot_loaded(mut self) -> Self {
        self.hot_load = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub entity: PlanetEntity,
    pub artifact_keys: Vec<String>,
    pub instance: Option<InstanceHandle>,
    pub stages: Vec<GenerationStage>,
}

pub type GenerationHandle = oneshot::Receiver<Result<GenerationOutcome, GenerationError>>;

pub struct GenerationPipeline {
    registry: Arc<PlanetRegistry>,
    artifacts: Arc<dyn ArtifactStore>,
    loader: Option<Arc<dyn WorldLoader>>,
    threader: Arc<Threader>,
    config: GenerationConfig,
    rng: Mutex<StdRng>,
}

impl GenerationPipeline {
    pub fn new(
        registry: Arc<PlanetRegistry>,
        artifacts: Arc<dyn ArtifactStore>,
        threader: Arc<Threader>,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        if config.orbit_min >= config.orbit_max {
            return Err(GenerationError::InvalidConfig(format!(
                "orbit range {}..{} is empty",
                config.orbit_min, config.orbit_max
            )));
        }
        Ok(Self {
            registry,
            artifacts,
            loader: None,
            threader,
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    pub fn with_loader(mut self, loader: Arc<dyn WorldLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn registry(&self) -> &Arc<PlanetRegistry> {
        &self.registry
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs one request to completion on the calling thread.
    pub fn generate(&self, request: PlanetRequest) -> Result<GenerationOutcome, GenerationError> {
        let mut stages = Vec::with_capacity(7);

        let (effects, celestial, name) = {
            let mut rng = self.rng();
            let effects = match request.effects.as_deref() {
                Some(tag) => EffectsTemplate::from_id(tag)?,
                None => EffectsTemplate::pick_weighted(&mut *rng),
            };
            let celestial = match request.celestial.as_deref() {
                Some(tag) => CelestialTemplate::from_id(tag)?,
                None => CelestialTemplate::pick(&mut *rng),
            };
            let name = match request.name.clone() {
                Some(name) => name,
                None => names::random_name(&mut *rng),
            };
            (effects, celestial, name)
        };
        stages.push(GenerationStage::TemplatesSelected);

        if !self.registry.can_admit() {
            warn!(%name, "generation rejected: registry full");
            return Err(RegistryError::CapacityExceeded {
                kind: CapacityKind::Population,
                limit: self.registry.config().max_planets,
            }
            .into());
        }

        let id = self.registry.generate_next_id()?;
        let mut entity = synthesize(
            id,
            name,
            effects,
            celestial,
            &self.config,
            &mut *self.rng(),
            self.registry.now(),
        );
        stages.push(GenerationStage::EntitySynthesized);

        let bundle = render_bundle(&entity, request.scope.unwrap_or(self.config.default_scope))?;
        stages.push(GenerationStage::ArtifactsRendered);

        let staged = self
            .artifacts
            .stage(&bundle)
            .map_err(GenerationError::ArtifactWrite)?;
        stages.push(GenerationStage::ArtifactsStaged);

        // An Err here drops `staged`, which discards the bundle.
        self.registry.register(entity.clone())?;
        stages.push(GenerationStage::Registered);

        let artifact_keys = match staged.commit() {
            Ok(keys) => keys,
            Err(err) => {
                error!(id = %entity.id(), error = %err, "artifact commit failed, retracting planet");
                if let Err(retract) = self.registry.retract(entity.id()) {
                    error!(id = %entity.id(), error = %retract, "retraction failed");
                }
                return Err(GenerationError::ArtifactWrite(err));
            }
        };
        let linkage = bundle.linkage();
        self.registry.set_artifacts(entity.id(), linkage.clone())?;
        entity.runtime.artifacts = linkage;
        stages.push(GenerationStage::ArtifactsCommitted);

        let instance = if request.hot_load {
            self.hot_load(&mut entity)
        } else {
            None
        };
        if instance.is_some() {
            stages.push(GenerationStage::Instantiated);
        }

        info!(
            id = %entity.id(),
            name = %entity.display_name(),
            effects = effects.id(),
            celestial = celestial.id(),
            documents = artifact_keys.len(),
            "planet generated"
        );
        Ok(GenerationOutcome {
            entity,
            artifact_keys,
            instance,
            stages,
        })
    }

    /// Loading failures are logged; the planet stays registered either way.
    fn hot_load(&self, entity: &mut PlanetEntity) -> Option<InstanceHandle> {
        let Some(loader) = self.loader.as_ref() else {
            warn!(id = %entity.id(), "hot-load requested without a world loader");
            return None;
        };
        if let Err(err) = self.registry.mark_loaded(entity.id()) {
            warn!(id = %entity.id(), error = %err, "hot-load skipped");
            return None;
        }
        match loader.instantiate(entity.id(), entity) {
            Ok(handle) => {
                entity.runtime.loaded = true;
                Some(handle)
            }
            Err(err) => {
                warn!(id = %entity.id(), error = %err, "hot-load failed");
                if let Err(err) = self.registry.mark_unloaded(entity.id()) {
                    warn!(id = %entity.id(), error = %err, "could not reset loaded flag");
                }
                None
            }
        }
    }

    /// Queues a request on the worker pool. Dropping the handle does not stop
    /// the work.
    pub fn submit(self: &Arc<Self>, request: PlanetRequest) -> Result<GenerationHandle, GenerationError> {
        let pipeline = Arc::clone(self);
        let handle = self
            .threader
            .submit_profiled_result("planet_generation", move || pipeline.generate(request))?;
        Ok(handle)
    }

    /// Several planets sharing a system name. Members that fail are logged and skipped.
    pub fn create_system(&self, system_name: &str, count: usize) -> Vec<GenerationOutcome> {
        let mut members = Vec::with_capacity(count);
        for index in 0..count {
            let name = names::system_member_name(system_name, index);
            match self.generate(PlanetRequest::named(name.clone())) {
                Ok(outcome) => members.push(outcome),
                Err(err) => warn!(%name, system = system_name, error = %err, "system member failed"),
            }
        }
        info!(system = system_name, planets = members.len(), "planet system created");
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{layout, planet_doc::PlanetDocument, world_docs::BiomeDocument};
    use crate::error::LoaderError;
    use crate::store::{MemoryArtifactStore, StagedBundle};
    use crate::artifacts::ArtifactBundle;
    use planet_objects::{PlanetId, TemplateLookupError};
    use planet_registry::{RegistryConfig, StoreError, Tier};
    use planet_utils::time::{ManualClock, DAY};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Harness {
        registry: Arc<PlanetRegistry>,
        store: Arc<MemoryArtifactStore>,
        pipeline: GenerationPipeline,
    }

    fn harness(config: RegistryConfig) -> Harness {
        let registry = Arc::new(PlanetRegistry::new(config, Arc::new(ManualClock::new(DAY))));
        let store = Arc::new(MemoryArtifactStore::new());
        let threader = Arc::new(Threader::with_threads(16, 2).unwrap());
        let pipeline = GenerationPipeline::new(
            registry.clone(),
            store.clone(),
            threader,
            GenerationConfig::default(),
        )
        .unwrap()
        .with_rng_seed(7);
        Harness {
            registry,
            store,
            pipeline,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(store: &MemoryArtifactStore, key: &str) -> T {
        serde_json::from_slice(&store.read(key).unwrap().unwrap()).unwrap()
    }

    #[derive(Default)]
    struct RecordingLoader {
        calls: AtomicUsize,
        fail: bool,
    }

    impl WorldLoader for RecordingLoader {
        fn instantiate(&self, id: &PlanetId, _: &PlanetEntity) -> Result<InstanceHandle, LoaderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoaderError {
                    id: id.to_string(),
                    reason: "no space available".into(),
                });
            }
            Ok(InstanceHandle {
                id: id.clone(),
                instance: format!("space/{}", id.path()),
            })
        }
    }

    struct BrokenCommitStore;

    struct BrokenStaged;

    impl StagedBundle for BrokenStaged {
        fn commit(self: Box<Self>) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    impl ArtifactStore for BrokenCommitStore {
        fn stage(&self, _: &ArtifactBundle) -> Result<Box<dyn StagedBundle + '_>, StoreError> {
            Ok(Box::new(BrokenStaged))
        }
        fn write(&self, _: &str, _: &[u8]) -> Result<(), StoreError> {
            Ok(())
        }
        fn read(&self, _: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }
        fn list(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_explicit_templates_produce_consistent_bundle() {
        let h = harness(RegistryConfig::default());
        let outcome = h
            .pipeline
            .generate(
                PlanetRequest::named("Kepler-4242b")
                    .with_effects(EffectsTemplate::IceWorld)
                    .with_celestial(CelestialTemplate::RingSystem),
            )
            .unwrap();

        let id = outcome.entity.id().clone();
        assert_eq!(id.as_str(), "stellar:planet_001");
        assert_eq!(outcome.artifact_keys.len(), 5);
        assert_eq!(
            outcome.stages.last(),
            Some(&GenerationStage::ArtifactsCommitted)
        );

        let planet: PlanetDocument = read_json(&h.store, &layout::planet_descriptor(&id));
        let biome: BiomeDocument = read_json(&h.store, &layout::biome(&id));
        assert_eq!(planet.dimension.sky_color, biome.effects.sky_color);
        assert_eq!(planet.dimension.fog_color, biome.effects.fog_color);
        assert_eq!(planet.properties.moon_count, 3);

        let stored = h.registry.peek(&id).unwrap();
        assert_eq!(
            stored.runtime.artifacts.descriptor_path.as_deref(),
            Some(std::path::Path::new("planets/group_00/planet_001.json"))
        );
        assert!(stored.runtime.artifacts.world_files_written);
    }

    #[test]
    fn test_unknown_template_rejected_before_mutation() {
        let h = harness(RegistryConfig::default());
        let mut request = PlanetRequest::named("Nova-1111c");
        request.effects = Some("plasma_world".into());
        let err = h.pipeline.generate(request).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::TemplateLookup(TemplateLookupError::UnknownEffects(_))
        ));
        assert!(h.store.is_empty());
        assert_eq!(h.registry.generate_next_id().unwrap().as_str(), "stellar:planet_001");
    }

    #[test]
    fn test_capacity_rejection_writes_nothing() {
        let h = harness(RegistryConfig {
            max_planets: 2,
            ..RegistryConfig::default()
        });
        h.pipeline.generate(PlanetRequest::random()).unwrap();
        h.pipeline.generate(PlanetRequest::random()).unwrap();
        let before = h.store.len();
        let err = h.pipeline.generate(PlanetRequest::random()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Registry(RegistryError::CapacityExceeded { .. })
        ));
        assert_eq!(h.store.len(), before);
        assert_eq!(h.registry.stats().total, 2);
    }

    #[test]
    fn test_failed_commit_retracts_registration() {
        let registry = Arc::new(PlanetRegistry::new(
            RegistryConfig::default(),
            Arc::new(ManualClock::new(DAY)),
        ));
        let pipeline = GenerationPipeline::new(
            registry.clone(),
            Arc::new(BrokenCommitStore),
            Arc::new(Threader::with_threads(4, 1).unwrap()),
            GenerationConfig::default(),
        )
        .unwrap();
        let err = pipeline.generate(PlanetRequest::named("Ross-2000d")).unwrap_err();
        assert!(matches!(err, GenerationError::ArtifactWrite(_)));
        let id = PlanetId::from_sequence(1);
        assert_eq!(registry.tier_of(&id), None);
        assert_eq!(registry.stats().total, 0);
    }

    #[test]
    fn test_hot_load_paths() {
        let h = harness(RegistryConfig {
            max_loaded: 1,
            ..RegistryConfig::default()
        });
        let loader = Arc::new(RecordingLoader::default());
        let pipeline = h.pipeline.with_loader(loader.clone());

        let first = pipeline.generate(PlanetRequest::random().hot_loaded()).unwrap();
        assert!(first.instance.is_some());
        assert_eq!(first.stages.last(), Some(&GenerationStage::Instantiated));
        assert!(h.registry.peek(first.entity.id()).unwrap().is_loaded());

        // Loaded cap reached: still registered, never instantiated.
        let second = pipeline.generate(PlanetRequest::random().hot_loaded()).unwrap();
        assert!(second.instance.is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.registry.tier_of(second.entity.id()), Some(Tier::Active));
    }

    #[test]
    fn test_failed_hot_load_keeps_planet() {
        let h = harness(RegistryConfig::default());
        let loader = Arc::new(RecordingLoader {
            fail: true,
            ..RecordingLoader::default()
        });
        let pipeline = h.pipeline.with_loader(loader);
        let outcome = pipeline
            .generate(PlanetRequest::random().with_scope(RenderScope::PlanetOnly).hot_loaded())
            .unwrap();
        assert!(outcome.instance.is_none());
        let stored = h.registry.peek(outcome.entity.id()).unwrap();
        assert!(!stored.is_loaded());
        assert!(h.registry.can_load_more());
        assert_eq!(outcome.artifact_keys.len(), 1);
    }

    #[test]
    fn test_create_system_and_presets() {
        let h = harness(RegistryConfig {
            max_planets: 3,
            ..RegistryConfig::default()
        });
        let system = h.pipeline.create_system("Trappist", 4);
        let names: Vec<&str> = system.iter().map(|o| o.entity.display_name()).collect();
        assert_eq!(names, vec!["Trappist b", "Trappist c", "Trappist d"]);

        assert_eq!(
            PlanetPreset::MarsLike.templates(),
            (EffectsTemplate::Rocky, CelestialTemplate::TwoMoons)
        );
        let request = PlanetRequest::preset(PlanetPreset::MoonLike, "Luna");
        assert_eq!(request.effects.as_deref(), Some("moon_like"));
        assert_eq!(request.celestial.as_deref(), Some("sun_and_earth"));
    }

    #[test]
    fn test_descriptors_shard_by_group() {
        let h = harness(RegistryConfig::default());
        for _ in 0..25 {
            h.pipeline
                .generate(PlanetRequest::random().with_scope(RenderScope::PlanetOnly))
                .unwrap();
        }
        assert_eq!(h.store.list("planets/group_00/").unwrap().len(), 19);
        assert_eq!(h.store.list("planets/group_01/").unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_submit_reports_through_handle() {
        let h = harness(RegistryConfig::default());
        let pipeline = Arc::new(h.pipeline);
        let handle = pipeline
            .submit(PlanetRequest::preset(PlanetPreset::EarthLike, "Terra Nova"))
            .unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.entity.effects(), EffectsTemplate::Rocky);
        assert_eq!(outcome.entity.celestial(), CelestialTemplate::SingleSun);
        assert_eq!(pipeline.registry().stats().active, 1);
    }

    #[test]
    fn test_invalid_orbit_range() {
        let h = harness(RegistryConfig::default());
        let config = GenerationConfig {
            orbit_min: 500,
            orbit_max: 500,
            ..GenerationConfig::default()
        };
        let result = GenerationPipeline::new(
            h.registry.clone(),
            h.store.clone(),
            Arc::new(Threader::with_threads(1, 1).unwrap()),
            config,
        );
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }
}
