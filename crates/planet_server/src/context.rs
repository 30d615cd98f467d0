//! Everything the server owns, built once at startup and passed around
//! explicitly.

use crate::config::ServerConfig;
use crate::loader::LoggingWorldLoader;
use anyhow::{Context, Result};
use planet_core::gen::{
    FsArtifactStore, GenerationOutcome, GenerationPipeline, PlanetPreset, PlanetRequest,
};
use planet_core::registry::{
    FsDocumentStore, MaintenanceOutcome, MaintenanceReport, PlanetRegistry, RegistryPersistence,
};
use planet_core::utils::{Clock, SystemClock, Threader};
use planet_protocol::{ChannelTransport, SyncService};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    Restored { planets: usize },
    Bootstrapped { planets: usize },
}

pub struct ServerContext {
    pub config: ServerConfig,
    pub registry: Arc<PlanetRegistry>,
    pub pipeline: Arc<GenerationPipeline>,
    pub persistence: RegistryPersistence<FsDocumentStore>,
    pub transport: Arc<ChannelTransport>,
    pub sync: Arc<SyncService>,
    pub threader: Arc<Threader>,
}

impl ServerContext {
    pub fn build(config: ServerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let registry = Arc::new(PlanetRegistry::new(config.registry.clone(), clock));
        let docs = FsDocumentStore::new(&config.data_dir)
            .with_context(|| format!("cannot open data dir {}", config.data_dir.display()))?;
        let artifacts = FsArtifactStore::new(&config.artifact_dir).with_context(|| {
            format!("cannot open artifact dir {}", config.artifact_dir.display())
        })?;
        let threader = Arc::new(
            Threader::new(config.worker_queue).context("failed to start worker pool")?,
        );
        let pipeline = GenerationPipeline::new(
            registry.clone(),
            Arc::new(artifacts),
            threader.clone(),
            config.generation.clone(),
        )
        .context("invalid generation settings")?
        .with_loader(Arc::new(LoggingWorldLoader));

        let transport = Arc::new(ChannelTransport::new());
        let sync = Arc::new(SyncService::new(registry.clone(), transport.clone()));

        Ok(Self {
            config,
            registry,
            pipeline: Arc::new(pipeline),
            persistence: RegistryPersistence::new(Arc::new(docs)),
            transport,
            sync,
            threader,
        })
    }

    /// Loads the saved registry, or seeds a fresh one and saves it.
    pub fn restore_or_bootstrap(&self) -> Result<Startup> {
        if self
            .persistence
            .load(&self.registry)
            .context("failed to restore registry")?
        {
            let planets = self.registry.stats().total;
            info!(planets, "registry restored");
            return Ok(Startup::Restored { planets });
        }

        let mut planets = 0;
        for index in 0..self.config.bootstrap_planets {
            let request = if index == 0 {
                PlanetRequest::preset(PlanetPreset::EarthLike, "Terra").hot_loaded()
            } else {
                PlanetRequest::random()
            };
            match self.pipeline.generate(request) {
                Ok(_) => planets += 1,
                Err(err) => warn!(error = %err, "bootstrap planet failed"),
            }
        }
        self.save()?;
        info!(planets, "registry bootstrapped");
        Ok(Startup::Bootstrapped { planets })
    }

    /// Runs a request on the worker pool and announces the result to observers.
    pub async fn generate(&self, request: PlanetRequest) -> Result<GenerationOutcome> {
        let handle = self.pipeline.submit(request)?;
        let outcome = handle.await.context("generation job dropped")??;
        self.sync.publish_upsert(&outcome.entity)?;
        Ok(outcome)
    }

    pub async fn maintenance_tick(&self) -> Result<Option<MaintenanceReport>> {
        let registry = self.registry.clone();
        let outcome = self
            .threader
            .submit_profiled_result("maintenance", move || registry.run_maintenance())?
            .await
            .context("maintenance job dropped")?;

        match outcome {
            MaintenanceOutcome::Skipped => Ok(None),
            MaintenanceOutcome::Ran(report) => {
                if report.changed() {
                    let delivered = self.sync.publish_maintenance(&report)?;
                    debug!(delivered, "maintenance removals published");
                }
                Ok(Some(report))
            }
        }
    }

    /// Saves only when the registry changed since the last save.
    pub fn autosave(&self) -> Result<bool> {
        if !self.registry.is_dirty() {
            return Ok(false);
        }
        self.save()?;
        for report in self.threader.all_job_reports() {
            debug!(
                label = %report.label,
                runs = report.runs,
                avg_ms = report.avg_ms,
                max_ms = report.max_ms,
                "job stats"
            );
        }
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        self.persistence
            .save(&self.registry)
            .context("failed to save registry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_core::registry::Tier;
    use planet_core::utils::time::{ManualClock, DAY, HOUR};
    use planet_protocol::{ObserverMirror, SyncMessage};
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> ServerConfig {
        ServerConfig {
            data_dir: dir.path().join("registry"),
            artifact_dir: dir.path().join("artifacts"),
            bootstrap_planets: 3,
            worker_queue: 8,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_bootstrap_then_restore() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(DAY));

        let first = ServerContext::with_clock(config(&dir), clock.clone()).unwrap();
        assert_eq!(
            first.restore_or_bootstrap().unwrap(),
            Startup::Bootstrapped { planets: 3 }
        );
        let terra = first.registry.search_by_name("terra");
        assert_eq!(terra.len(), 1);
        assert!(terra[0].is_loaded());
        assert!(!first.registry.is_dirty());
        assert!(dir
            .path()
            .join("artifacts/planets/group_00/planet_001.json")
            .exists());

        let second = ServerContext::with_clock(config(&dir), clock).unwrap();
        assert_eq!(
            second.restore_or_bootstrap().unwrap(),
            Startup::Restored { planets: 3 }
        );
        assert_eq!(second.registry.snapshot(), first.registry.snapshot());
    }

    #[tokio::test]
    async fn test_generation_and_maintenance_reach_observers() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(DAY));
        let ctx = ServerContext::with_clock(
            ServerConfig {
                bootstrap_planets: 0,
                ..config(&dir)
            },
            clock.clone(),
        )
        .unwrap();
        ctx.restore_or_bootstrap().unwrap();

        let (_, mut frames) = ctx.transport.connect_with(|| ctx.sync.full_snapshot()).unwrap();
        let mut mirror = ObserverMirror::new();
        mirror.apply_frame(&frames.recv().await.unwrap()).unwrap();
        assert!(mirror.is_empty());

        let outcome = ctx.generate(PlanetRequest::named("Ross-128b")).await.unwrap();
        mirror.apply_frame(&frames.recv().await.unwrap()).unwrap();
        assert!(mirror.get(outcome.entity.id()).is_some());
        assert!(ctx.autosave().unwrap());
        assert!(!ctx.autosave().unwrap());

        clock.advance(DAY + HOUR);
        let report = ctx.maintenance_tick().await.unwrap().unwrap();
        assert_eq!(report.archived, 1);
        assert_eq!(ctx.registry.tier_of(outcome.entity.id()), Some(Tier::Archived));
        let frame = frames.recv().await.unwrap();
        assert!(matches!(
            planet_protocol::decode(&frame).unwrap(),
            SyncMessage::Delta { .. }
        ));
        mirror.apply_frame(&frame).unwrap();
        assert!(mirror.is_empty());

        // Inside the cooldown.
        assert!(ctx.maintenance_tick().await.unwrap().is_none());
        assert!(ctx.threader.job_report("maintenance").is_some());
    }
}
