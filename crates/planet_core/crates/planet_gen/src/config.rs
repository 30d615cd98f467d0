use crate::artifacts::RenderScope;
use serde::{Deserialize, Serialize};

/// Knobs for entity synthesis. A jitter factor `f` scales a template default
/// by `1 + (r - 0.5) * f` with `r` uniform in `[0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub orbit_min: u32,
    pub orbit_max: u32,
    pub gravity_jitter: f32,
    pub temperature_jitter: f32,
    pub day_length_jitter: f32,
    pub default_scope: RenderScope,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            orbit_min: 50,
            orbit_max: 1000,
            gravity_jitter: 0.4,
            temperature_jitter: 0.6,
            day_length_jitter: 0.8,
            default_scope: RenderScope::FullWorld,
        }
    }
}
