//! Registry-to-observer synchronisation.
//!
//! Observers mirror the active tier only. Planets leaving it, whether archived,
//! deleted or retracted, are announced as removals; a promoted planet comes
//! back as an upsert.

use crate::error::ProtocolError;
use crate::message::{decode, DeltaAction, PlanetSyncDescriptor, SyncMessage};
use crate::transport::Transport;
use planet_core::objects::{PlanetEntity, PlanetId};
use planet_core::registry::{MaintenanceReport, PlanetRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct SyncService {
    registry: Arc<PlanetRegistry>,
    transport: Arc<dyn Transport>,
}

impl SyncService {
    pub fn new(registry: Arc<PlanetRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Active planets in ID order. Access times are left untouched.
    pub fn full_snapshot(&self) -> SyncMessage {
        let planets = self
            .registry
            .active_planets()
            .iter()
            .map(PlanetSyncDescriptor::from)
            .collect();
        SyncMessage::FullSnapshot { planets }
    }

    pub fn publish_upsert(&self, entity: &PlanetEntity) -> Result<usize, ProtocolError> {
        self.transport.broadcast(&SyncMessage::upsert(entity))
    }

    pub fn publish_removal(&self, id: &PlanetId) -> Result<usize, ProtocolError> {
        self.transport.broadcast(&SyncMessage::remove(id.clone()))
    }

    /// One removal per planet the pass took out of the active tier.
    pub fn publish_maintenance(&self, report: &MaintenanceReport) -> Result<usize, ProtocolError> {
        let mut sent = 0;
        for id in report.archived_ids.iter().chain(&report.deleted_ids) {
            sent += self.publish_removal(id)?;
        }
        Ok(sent)
    }
}

/// Observer-side copy of the active tier.
#[derive(Debug, Default)]
pub struct ObserverMirror {
    planets: BTreeMap<PlanetId, PlanetSyncDescriptor>,
}

impl ObserverMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::FullSnapshot { planets } => {
                self.planets.clear();
                for planet in planets {
                    self.planets.insert(planet.id().clone(), planet);
                }
            }
            SyncMessage::Delta {
                planet,
                action: DeltaAction::Upsert,
            } => {
                self.planets.insert(planet.id().clone(), planet);
            }
            SyncMessage::Delta {
                planet,
                action: DeltaAction::Remove,
            } => {
                self.planets.remove(planet.id());
            }
        }
    }

    pub fn apply_frame(&mut self, frame: &[u8]) -> Result<(), ProtocolError> {
        self.apply(decode(frame)?);
        Ok(())
    }

    pub fn get(&self, id: &PlanetId) -> Option<&PlanetSyncDescriptor> {
        self.planets.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlanetId> {
        self.planets.keys()
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}
