//! Two-tier planet registry.
//!
//! Active planets live as full entities; idle ones are archived as compressed
//! records. One registry-wide `RwLock` guards both tiers, the loaded set and
//! the indices, so every tier change is atomic with its index updates.

use crate::archive::{ArchiveCodec, ArchivedRecord};
use crate::config::RegistryConfig;
use crate::error::{CapacityKind, RegistryError, StoreError};
use crate::indices::PlanetIndices;
use crate::persistence::{RegistrySnapshot, SNAPSHOT_VERSION};
use ahash::AHashMap;
use planet_objects::{
    ArtifactLinkage, CelestialTemplate, EffectsTemplate, PlanetEntity, PlanetId, PLANET_NAMESPACE,
};
use planet_utils::time::{Clock, Millis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Active,
    Archived,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub archived: usize,
    pub deleted: usize,
    pub failed: usize,
    pub archived_ids: Vec<PlanetId>,
    pub deleted_ids: Vec<PlanetId>,
}

impl MaintenanceReport {
    pub fn changed(&self) -> bool {
        self.archived > 0 || self.deleted > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    /// Still inside the cooldown window.
    Skipped,
    Ran(MaintenanceReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub active: usize,
    pub archived: usize,
    pub loaded: usize,
    pub total: usize,
    pub max_planets: usize,
    pub max_loaded: usize,
    pub archived_bytes: usize,
    pub by_effects: BTreeMap<EffectsTemplate, usize>,
    pub by_celestial: BTreeMap<CelestialTemplate, usize>,
}

#[derive(Debug, Default)]
struct RegistryState {
    active: AHashMap<PlanetId, PlanetEntity>,
    archived: AHashMap<PlanetId, ArchivedRecord>,
    loaded: BTreeSet<PlanetId>,
    retired: BTreeSet<PlanetId>,
    indices: PlanetIndices,
    counter: u32,
    last_maintenance: Option<Millis>,
}

impl RegistryState {
    fn total(&self) -> usize {
        self.active.len() + self.archived.len()
    }

    fn is_taken(&self, id: &PlanetId) -> bool {
        self.active.contains_key(id) || self.archived.contains_key(id) || self.retired.contains(id)
    }

    fn entities<'a>(&'a self, ids: impl IntoIterator<Item = &'a PlanetId>) -> Vec<PlanetEntity> {
        ids.into_iter()
            .filter_map(|id| self.active.get(id).cloned())
            .collect()
    }
}

pub struct PlanetRegistry {
    state: RwLock<RegistryState>,
    config: RegistryConfig,
    codec: ArchiveCodec,
    clock: Arc<dyn Clock>,
    dirty: AtomicBool,
    rng: Mutex<StdRng>,
}

impl PlanetRegistry {
    pub fn new(config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            codec: ArchiveCodec::new(config.archive_fidelity),
            config,
            clock,
            dirty: AtomicBool::new(false),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic orbit re-rolls for archive restores.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.clock.now_millis()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Snapshot for a save. The dirty flag is cleared before the state is
    /// read, so changes racing the write keep the registry dirty.
    pub fn snapshot_for_save(&self) -> RegistrySnapshot {
        self.dirty.swap(false, Ordering::AcqRel);
        self.snapshot()
    }

    // ---------- Admission ----------

    /// Adds a new planet to the active tier. The planet always starts unloaded.
    pub fn register(&self, mut entity: PlanetEntity) -> Result<(), RegistryError> {
        let mut state = self.write();
        if state.total() >= self.config.max_planets {
            warn!(id = %entity.id(), limit = self.config.max_planets, "registration rejected: registry full");
            return Err(RegistryError::CapacityExceeded {
                kind: CapacityKind::Population,
                limit: self.config.max_planets,
            });
        }
        if state.is_taken(entity.id()) {
            warn!(id = %entity.id(), "registration rejected: id already used");
            return Err(RegistryError::DuplicateIdentity(entity.id().clone()));
        }

        if entity.id().namespace() == PLANET_NAMESPACE {
            if let Some(sequence) = entity.id().sequence() {
                state.counter = state.counter.max(sequence);
            }
        }
        entity.runtime.loaded = false;
        state.indices.insert(&entity);
        info!(id = %entity.id(), name = %entity.display_name(), effects = entity.effects().id(), "planet registered");
        state.active.insert(entity.id().clone(), entity);
        drop(state);
        self.mark_dirty();
        Ok(())
    }

    pub fn can_admit(&self) -> bool {
        self.read().total() < self.config.max_planets
    }

    pub fn can_load_more(&self) -> bool {
        self.read().loaded.len() < self.config.max_loaded
    }

    /// Next sequential ID. Numbers are never handed out twice.
    pub fn generate_next_id(&self) -> Result<PlanetId, RegistryError> {
        let mut state = self.write();
        loop {
            state.counter = state
                .counter
                .checked_add(1)
                .ok_or(RegistryError::IdSpaceExhausted)?;
            let id = PlanetId::from_sequence(state.counter);
            if !state.is_taken(&id) {
                drop(state);
                self.mark_dirty();
                return Ok(id);
            }
        }
    }

    // ---------- Access ----------

    /// Fetches a planet, refreshing its access time and promoting it out of
    /// the archive when needed.
    pub fn get(&self, id: &PlanetId) -> Result<PlanetEntity, RegistryError> {
        self.get_tracked(id).map(|(entity, _)| entity)
    }

    /// Like [`get`](Self::get) but also reports the tier the planet was found in.
    pub fn get_tracked(&self, id: &PlanetId) -> Result<(PlanetEntity, Tier), RegistryError> {
        let now = self.now();
        let mut state = self.write();

        if let Some(entity) = state.active.get_mut(id) {
            entity.runtime.last_accessed = now;
            let entity = entity.clone();
            state.indices.touch(id, now);
            drop(state);
            self.mark_dirty();
            return Ok((entity, Tier::Active));
        }

        let record = state
            .archived
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let mut entity = self
            .codec
            .decompress(record, &mut *self.rng())
            .map_err(|source| {
                warn!(%id, error = %source, "archived planet failed to decode");
                RegistryError::DecodeFailure {
                    id: id.clone(),
                    source,
                }
            })?;

        state.archived.remove(id);
        entity.runtime.last_accessed = now;
        state.indices.insert(&entity);
        state.active.insert(id.clone(), entity.clone());
        drop(state);
        self.mark_dirty();
        debug!(%id, "planet promoted from archive");
        Ok((entity, Tier::Archived))
    }

    /// Active-tier read that leaves the access time alone.
    pub fn peek(&self, id: &PlanetId) -> Option<PlanetEntity> {
        self.read().active.get(id).cloned()
    }

    pub fn tier_of(&self, id: &PlanetId) -> Option<Tier> {
        let state = self.read();
        if state.active.contains_key(id) {
            Some(Tier::Active)
        } else if state.archived.contains_key(id) {
            Some(Tier::Archived)
        } else {
            None
        }
    }

    /// All active planets in sequence order.
    pub fn active_planets(&self) -> Vec<PlanetEntity> {
        let state = self.read();
        let mut planets: Vec<_> = state.active.values().cloned().collect();
        planets.sort_by(|a, b| a.id().cmp(b.id()));
        planets
    }

    pub fn mark_loaded(&self, id: &PlanetId) -> Result<(), RegistryError> {
        let mut state = self.write();
        if !state.active.contains_key(id) {
            return Err(RegistryError::NotFound(id.clone()));
        }
        if state.loaded.contains(id) {
            return Ok(());
        }
        if state.loaded.len() >= self.config.max_loaded {
            return Err(RegistryError::CapacityExceeded {
                kind: CapacityKind::Loaded,
                limit: self.config.max_loaded,
            });
        }
        state.loaded.insert(id.clone());
        if let Some(entity) = state.active.get_mut(id) {
            entity.runtime.loaded = true;
        }
        drop(state);
        self.mark_dirty();
        Ok(())
    }

    pub fn mark_unloaded(&self, id: &PlanetId) -> Result<(), RegistryError> {
        let mut state = self.write();
        let entity = state
            .active
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        entity.runtime.loaded = false;
        let was_loaded = state.loaded.remove(id);
        drop(state);
        if was_loaded {
            self.mark_dirty();
        }
        Ok(())
    }

    pub fn set_artifacts(&self, id: &PlanetId, artifacts: ArtifactLinkage) -> Result<(), RegistryError> {
        let mut state = self.write();
        let entity = state
            .active
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        entity.runtime.artifacts = artifacts;
        drop(state);
        self.mark_dirty();
        Ok(())
    }

    /// Removes a planet from either tier and retires its ID for good.
    pub fn retract(&self, id: &PlanetId) -> Result<(), RegistryError> {
        let mut state = self.write();
        if let Some(entity) = state.active.remove(id) {
            state.indices.remove(&entity);
        } else if state.archived.remove(id).is_none() {
            return Err(RegistryError::NotFound(id.clone()));
        }
        state.loaded.remove(id);
        state.retired.insert(id.clone());
        drop(state);
        self.mark_dirty();
        info!(%id, "planet retracted");
        Ok(())
    }

    // ---------- Queries ----------

    /// Case-insensitive substring match over display names and ID paths of
    /// active planets, sorted by display name.
    pub fn search_by_name(&self, pattern: &str) -> Vec<PlanetEntity> {
        let needle = pattern.trim().to_lowercase();
        let state = self.read();

        let mut hits: Vec<PlanetEntity> = if needle.split_whitespace().count() == 1 {
            // A whitespace-free needle can only occur inside a single name token.
            let mut ids = state.indices.with_token_containing(&needle);
            ids.extend(
                state
                    .active
                    .keys()
                    .filter(|id| id.path().to_lowercase().contains(&needle))
                    .cloned(),
            );
            state.entities(ids.iter())
        } else {
            state
                .active
                .values()
                .filter(|e| {
                    e.display_name().to_lowercase().contains(&needle)
                        || e.id().path().to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        };

        hits.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.id().cmp(b.id()))
        });
        hits
    }

    pub fn by_effects(&self, effects: EffectsTemplate) -> Vec<PlanetEntity> {
        let state = self.read();
        let ids = state.indices.with_effects(effects);
        state.entities(ids.iter())
    }

    pub fn by_celestial(&self, celestial: CelestialTemplate) -> Vec<PlanetEntity> {
        let state = self.read();
        let ids = state.indices.with_celestial(celestial);
        state.entities(ids.iter())
    }

    /// Newest access first.
    pub fn most_recently_accessed(&self, n: usize) -> Vec<PlanetEntity> {
        let state = self.read();
        state.entities(state.indices.by_access().rev().take(n).map(|(_, id)| id))
    }

    /// Loaded planets only, oldest access first.
    pub fn least_recently_used(&self, k: usize) -> Vec<PlanetEntity> {
        let state = self.read();
        state.entities(
            state
                .indices
                .by_access()
                .filter(|(_, id)| state.loaded.contains(id))
                .take(k)
                .map(|(_, id)| id),
        )
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.read();
        let mut stats = RegistryStats {
            active: state.active.len(),
            archived: state.archived.len(),
            loaded: state.loaded.len(),
            total: state.total(),
            max_planets: self.config.max_planets,
            max_loaded: self.config.max_loaded,
            ..RegistryStats::default()
        };
        for entity in state.active.values() {
            *stats.by_effects.entry(entity.effects()).or_default() += 1;
            *stats.by_celestial.entry(entity.celestial()).or_default() += 1;
        }
        for record in state.archived.values() {
            *stats.by_effects.entry(record.effects).or_default() += 1;
            *stats.by_celestial.entry(record.celestial).or_default() += 1;
            stats.archived_bytes += record.payload.len();
        }
        stats
    }

    // ---------- Maintenance ----------

    /// Archives idle unloaded planets and deletes long-idle archived ones.
    /// Runs at most once per cooldown window.
    pub fn run_maintenance(&self) -> MaintenanceOutcome {
        let now = self.now();
        let mut state = self.write();

        if let Some(last) = state.last_maintenance {
            if now.saturating_sub(last) < self.config.maintenance_cooldown() {
                debug!("maintenance skipped: cooldown");
                return MaintenanceOutcome::Skipped;
            }
        }
        state.last_maintenance = Some(now);

        let mut report = MaintenanceReport::default();
        let archive_after = self.config.archive_after();
        let delete_after = self.config.delete_after();

        let mut to_archive: Vec<PlanetId> = state
            .active
            .values()
            .filter(|e| !e.is_loaded() && e.runtime.idle_for(now) > archive_after)
            .map(|e| e.id().clone())
            .collect();
        to_archive.sort();

        for id in to_archive {
            let Some(entity) = state.active.get(&id) else {
                continue;
            };
            match self.codec.compress(entity) {
                Ok(record) => {
                    state.active.remove(&id);
                    state.archived.insert(id.clone(), record);
                    report.archived += 1;
                    report.archived_ids.push(id);
                }
                Err(error) => {
                    warn!(%id, %error, "failed to archive planet");
                    report.failed += 1;
                }
            }
        }

        let mut to_delete: Vec<PlanetId> = state
            .archived
            .iter()
            .filter(|(_, record)| self.codec.can_delete(record, now, delete_after))
            .map(|(id, _)| id.clone())
            .collect();
        to_delete.sort();

        for id in to_delete {
            state.archived.remove(&id);
            state.retired.insert(id.clone());
            report.deleted += 1;
            report.deleted_ids.push(id);
        }

        if report.changed() {
            let RegistryState {
                active, indices, ..
            } = &mut *state;
            indices.rebuild(active.values());
            drop(state);
            self.mark_dirty();
        }

        info!(
            archived = report.archived,
            deleted = report.deleted,
            failed = report.failed,
            "maintenance finished"
        );
        MaintenanceOutcome::Ran(report)
    }

    // ---------- Snapshots ----------

    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.read();
        let mut active: Vec<PlanetEntity> = state.active.values().cloned().collect();
        active.sort_by(|a, b| a.id().cmp(b.id()));
        let mut archived: Vec<(PlanetId, ArchivedRecord)> = state
            .archived
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        archived.sort_by(|a, b| a.0.cmp(&b.0));

        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            counter: state.counter,
            last_maintenance: state.last_maintenance,
            active,
            archived,
            loaded: state.loaded.iter().cloned().collect(),
            retired: state.retired.iter().cloned().collect(),
        }
    }

    /// Replaces the whole registry state and rebuilds the indices.
    pub fn restore(&self, snapshot: RegistrySnapshot) -> Result<(), StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut next = RegistryState {
            counter: snapshot.counter,
            last_maintenance: snapshot.last_maintenance,
            retired: snapshot.retired.into_iter().collect(),
            ..RegistryState::default()
        };
        for (id, record) in snapshot.archived {
            next.archived.insert(id, record);
        }
        for mut entity in snapshot.active {
            let id = entity.id().clone();
            if next.archived.contains_key(&id) || next.active.contains_key(&id) {
                return Err(StoreError::Corrupt(format!("planet {id} stored twice")));
            }
            entity.runtime.loaded = false;
            next.active.insert(id, entity);
        }
        for id in snapshot.loaded {
            let entity = next
                .active
                .get_mut(&id)
                .ok_or_else(|| StoreError::Corrupt(format!("loaded planet {id} is not active")))?;
            entity.runtime.loaded = true;
            next.loaded.insert(id);
        }
        let highest = next
            .active
            .keys()
            .chain(next.archived.keys())
            .chain(next.retired.iter())
            .filter(|id| id.namespace() == PLANET_NAMESPACE)
            .filter_map(PlanetId::sequence)
            .max()
            .unwrap_or(0);
        next.counter = next.counter.max(highest);

        {
            let RegistryState {
                active, indices, ..
            } = &mut next;
            indices.rebuild(active.values());
        }

        info!(
            active = next.active.len(),
            archived = next.archived.len(),
            loaded = next.loaded.len(),
            "registry restored"
        );
        *self.write() = next;
        self.clear_dirty();
        Ok(())
    }
}
