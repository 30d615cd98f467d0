// Planet objects library - identities, templates and planet entities

pub mod ids;
pub mod planet;
pub mod templates;

// Re-export commonly used types
pub use ids::{IdError, PlanetId, PLANETS_PER_GROUP, PLANET_NAMESPACE};
pub use planet::{
    ArtifactLinkage, AtmosphereKind, AtmosphereProperties, PhysicalProperties, PlanetDescriptor,
    PlanetEntity, RuntimeState,
};
pub use templates::{CelestialTemplate, EffectsTemplate, TemplateLookupError};
