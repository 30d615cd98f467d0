// Top-level library for the `planet-core` crate.
// Re-exports the nested lifecycle crates behind one dependency, so callers
// write `planet_core::registry::PlanetRegistry` instead of depending on each.

pub use planet_gen as gen;
pub use planet_objects as objects;
pub use planet_registry as registry;
pub use planet_utils as utils;

pub mod prelude {
    pub use crate::gen::{GenerationPipeline, PlanetRequest, RenderScope};
    pub use crate::objects::{CelestialTemplate, EffectsTemplate, PlanetEntity, PlanetId};
    pub use crate::registry::{PlanetRegistry, RegistryConfig, Tier};
    pub use crate::utils::{Clock, SystemClock, Threader};
}
