use crate::ids::PlanetId;
use crate::templates::{CelestialTemplate, EffectsTemplate};
use planet_utils::time::Millis;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    pub gravity: f32,
    pub temperature: f32,
    pub day_length: f32,
    pub orbit_distance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereProperties {
    pub has_atmosphere: bool,
    pub breathable: bool,
    pub pressure: f32,
}

/// Coarse atmosphere class written into planet descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmosphereKind {
    None,
    Thin,
    Thick,
    Normal,
    Toxic,
}

impl AtmosphereProperties {
    pub fn kind(&self) -> AtmosphereKind {
        if !self.has_atmosphere {
            AtmosphereKind::None
        } else if self.pressure < 0.3 {
            AtmosphereKind::Thin
        } else if self.pressure > 2.0 {
            AtmosphereKind::Thick
        } else if self.breathable {
            AtmosphereKind::Normal
        } else {
            AtmosphereKind::Toxic
        }
    }

    pub fn oxygen_level(&self) -> f32 {
        if self.breathable {
            0.21
        } else {
            0.0
        }
    }
}

/// Immutable identity and generated properties of a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDescriptor {
    pub id: PlanetId,
    pub display_name: String,
    pub effects: EffectsTemplate,
    pub celestial: CelestialTemplate,
    pub physics: PhysicalProperties,
    pub atmosphere: AtmosphereProperties,
}

impl PlanetDescriptor {
    /// Descriptor carrying the unjittered defaults of `effects`.
    pub fn from_defaults(
        id: PlanetId,
        display_name: String,
        effects: EffectsTemplate,
        celestial: CelestialTemplate,
        orbit_distance: u32,
    ) -> Self {
        let profile = effects.profile();
        Self {
            id,
            display_name,
            effects,
            celestial,
            physics: PhysicalProperties {
                gravity: profile.physics.gravity,
                temperature: profile.physics.temperature,
                day_length: profile.physics.day_length,
                orbit_distance,
            },
            atmosphere: AtmosphereProperties {
                has_atmosphere: profile.atmosphere.has_atmosphere,
                breathable: profile.atmosphere.breathable,
                pressure: profile.atmosphere.pressure,
            },
        }
    }

    pub fn moon_count(&self) -> u32 {
        self.celestial.moon_count()
    }
}

/// Where the generated documents of a planet live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLinkage {
    pub descriptor_path: Option<PathBuf>,
    pub descriptor_written: bool,
    pub world_files_written: bool,
}

/// Registry-owned mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub loaded: bool,
    pub last_accessed: Millis,
    pub created_at: Millis,
    pub artifacts: ArtifactLinkage,
}

impl RuntimeState {
    pub fn new(now: Millis) -> Self {
        Self {
            loaded: false,
            last_accessed: now,
            created_at: now,
            artifacts: ArtifactLinkage::default(),
        }
    }

    pub fn idle_for(&self, now: Millis) -> Millis {
        now.saturating_sub(self.last_accessed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetEntity {
    pub descriptor: PlanetDescriptor,
    pub runtime: RuntimeState,
}

impl PlanetEntity {
    pub fn new(descriptor: PlanetDescriptor, now: Millis) -> Self {
        Self {
            descriptor,
            runtime: RuntimeState::new(now),
        }
    }

    pub fn id(&self) -> &PlanetId {
        &self.descriptor.id
    }

    pub fn display_name(&self) -> &str {
        &self.descriptor.display_name
    }

    pub fn effects(&self) -> EffectsTemplate {
        self.descriptor.effects
    }

    pub fn celestial(&self) -> CelestialTemplate {
        self.descriptor.celestial
    }

    pub fn is_loaded(&self) -> bool {
        self.runtime.loaded
    }
}
