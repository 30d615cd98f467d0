//! Template catalog: effects and celestial presets plus weighted selection.
//!
//! Per-template properties are table data (`EffectsProfile`, celestial lookup
//! tables), so adding a template means adding a row, not a match arm in every
//! consumer.

pub mod celestial;
pub mod effects;

use rand::Rng;
use thiserror::Error;

pub use celestial::{
    CelestialBodies, CelestialTemplate, PrimaryBody, SecondaryBody, SecondaryKind, SkyConfig,
    StarVisibility,
};
pub use effects::{
    AtmosphereDefaults, EffectsProfile, EffectsTemplate, FogProfile, ParticleProfile,
    PhysicsDefaults, SkyPalette, TerrainProfile, WeatherFlags,
};

/// Sum of all effects template weights. Draws are taken in `[0, TOTAL_WEIGHT)`.
pub const TOTAL_WEIGHT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateLookupError {
    #[error("unknown effects template '{0}'")]
    UnknownEffects(String),
    #[error("unknown celestial template '{0}'")]
    UnknownCelestial(String),
}

/// Template carrying a selection weight out of `TOTAL_WEIGHT`.
pub trait WeightedTemplate: Copy {
    fn weight(&self) -> u32;
}

/// Cumulative-weight walk over `templates` in their fixed order.
///
/// When the weights do not cover the whole draw range the last checked
/// template is returned instead of failing.
pub fn pick_weighted<T, R>(templates: &[T], total_weight: u32, rng: &mut R) -> Option<T>
where
    T: WeightedTemplate,
    R: Rng + ?Sized,
{
    let last = *templates.last()?;
    if total_weight == 0 {
        return Some(last);
    }
    let draw = rng.random_range(0..total_weight);
    let mut cumulative = 0;
    for template in templates {
        cumulative += template.weight();
        if draw < cumulative {
            return Some(*template);
        }
    }
    Some(last)
}
