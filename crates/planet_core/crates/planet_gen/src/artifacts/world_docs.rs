//! Companion world documents: dimension type, dimension, noise settings and
//! the single fixed biome. All four are keyed by the planet ID.

use super::layout;
use planet_objects::PlanetEntity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MIN_Y: i32 = -64;
pub const WORLD_HEIGHT: u32 = 384;
pub const SEA_LEVEL: i32 = 63;
const FEATURE_STEPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTypeDocument {
    pub ultrawarm: bool,
    pub natural: bool,
    pub coordinate_scale: f64,
    pub has_skylight: bool,
    pub has_ceiling: bool,
    pub ambient_light: f32,
    pub fixed_time: Option<u64>,
    pub monster_spawn_light_level: u32,
    pub monster_spawn_block_light_limit: u32,
    pub min_y: i32,
    pub height: u32,
    pub logical_height: u32,
    pub infiniburn: String,
    pub effects: String,
    pub respawn_anchor_works: bool,
    pub has_raids: bool,
    pub bed_works: bool,
    pub piglin_safe: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDocument {
    #[serde(rename = "type")]
    pub dimension_type: String,
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub biome_source: BiomeSourceSection,
    pub settings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeSourceSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub biome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseShape {
    pub min_y: i32,
    pub height: u32,
    pub size_horizontal: u32,
    pub size_vertical: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseRouter {
    pub barrier: f32,
    pub fluid_level_floodedness: f32,
    pub fluid_level_spread: f32,
    pub lava: f32,
    pub temperature: f32,
    pub vegetation: f32,
    pub continents: f32,
    pub erosion: f32,
    pub depth: f32,
    pub ridges: f32,
    pub initial_density_without_jaggedness: String,
    pub final_density: String,
    pub vein_toggle: f32,
    pub vein_ridged: f32,
    pub vein_gap: f32,
}

impl Default for NoiseRouter {
    fn default() -> Self {
        let depth = "core:overworld/depth".to_string();
        Self {
            barrier: 0.0,
            fluid_level_floodedness: 0.0,
            fluid_level_spread: 0.0,
            lava: 0.0,
            temperature: 0.0,
            vegetation: 0.0,
            continents: 0.0,
            erosion: 0.0,
            depth: 0.0,
            ridges: 0.0,
            initial_density_without_jaggedness: depth.clone(),
            final_density: depth,
            vein_toggle: 0.0,
            vein_ridged: 0.0,
            vein_gap: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettingsDocument {
    pub sea_level: i32,
    pub disable_mob_generation: bool,
    pub aquifers_enabled: bool,
    pub ore_veins_enabled: bool,
    pub legacy_random_source: bool,
    pub default_block: BlockState,
    pub default_fluid: BlockState,
    pub noise: NoiseShape,
    pub noise_router: NoiseRouter,
    pub spawn_target: Vec<Value>,
    pub surface_rule: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeDocument {
    pub has_precipitation: bool,
    pub temperature: f32,
    pub temperature_modifier: String,
    pub downfall: f32,
    pub effects: BiomeEffects,
    pub spawners: Spawners,
    pub spawn_costs: serde_json::Map<String, Value>,
    pub carvers: Carvers,
    pub features: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeEffects {
    pub fog_color: u32,
    pub water_color: u32,
    pub water_fog_color: u32,
    pub sky_color: u32,
    pub grass_color: u32,
    pub foliage_color: u32,
    pub mood_sound: MoodSound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSound {
    pub sound: String,
    pub tick_delay: u32,
    pub block_search_extent: u32,
    pub offset: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spawners {
    pub monster: Vec<Value>,
    pub creature: Vec<Value>,
    pub ambient: Vec<Value>,
    pub axolotls: Vec<Value>,
    pub underground_water_creature: Vec<Value>,
    pub water_creature: Vec<Value>,
    pub water_ambient: Vec<Value>,
    pub misc: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Carvers {
    pub air: Vec<String>,
}

pub fn dimension_type(entity: &PlanetEntity) -> DimensionTypeDocument {
    let profile = entity.effects().profile();
    DimensionTypeDocument {
        ultrawarm: profile.terrain.ultrawarm,
        natural: false,
        coordinate_scale: 1.0,
        has_skylight: true,
        has_ceiling: false,
        ambient_light: profile.ambient_light,
        fixed_time: None,
        monster_spawn_light_level: 0,
        monster_spawn_block_light_limit: 0,
        min_y: MIN_Y,
        height: WORLD_HEIGHT,
        logical_height: WORLD_HEIGHT,
        infiniburn: "#core:infiniburn_overworld".into(),
        effects: entity.id().to_string(),
        respawn_anchor_works: false,
        has_raids: false,
        bed_works: false,
        piglin_safe: false,
    }
}

pub fn dimension(entity: &PlanetEntity) -> DimensionDocument {
    let id = entity.id();
    DimensionDocument {
        dimension_type: id.to_string(),
        generator: GeneratorSection {
            kind: "core:noise".into(),
            biome_source: BiomeSourceSection {
                kind: "core:fixed".into(),
                biome: layout::biome_resource(id),
            },
            settings: id.to_string(),
        },
    }
}

pub fn noise_settings(entity: &PlanetEntity) -> NoiseSettingsDocument {
    let terrain = entity.effects().profile().terrain;
    NoiseSettingsDocument {
        sea_level: SEA_LEVEL,
        disable_mob_generation: !terrain.mobs_enabled,
        aquifers_enabled: terrain.aquifers_enabled,
        ore_veins_enabled: true,
        legacy_random_source: false,
        default_block: BlockState {
            name: terrain.default_block.into(),
        },
        default_fluid: BlockState {
            name: "core:air".into(),
        },
        noise: NoiseShape {
            min_y: MIN_Y,
            height: WORLD_HEIGHT,
            size_horizontal: 1,
            size_vertical: 2,
        },
        noise_router: NoiseRouter::default(),
        spawn_target: Vec::new(),
        surface_rule: json!({
            "type": "core:sequence",
            "sequence": [{
                "type": "core:condition",
                "if_true": { "type": "core:above_preliminary_surface" },
                "then_run": {
                    "type": "core:block",
                    "result_state": { "Name": terrain.surface_block }
                }
            }]
        }),
    }
}

/// Sky and fog colours come from the same rows the planet descriptor reads,
/// so the two documents always agree.
pub fn biome(entity: &PlanetEntity) -> BiomeDocument {
    let profile = entity.effects().profile();
    let terrain = profile.terrain;
    BiomeDocument {
        has_precipitation: terrain.precipitation,
        temperature: terrain.biome_temperature,
        temperature_modifier: "none".into(),
        downfall: terrain.downfall,
        effects: BiomeEffects {
            fog_color: profile.fog.fog_color,
            water_color: terrain.water_color,
            water_fog_color: terrain.water_fog_color,
            sky_color: profile.sky.sky_color,
            grass_color: terrain.grass_color,
            foliage_color: terrain.foliage_color,
            mood_sound: MoodSound {
                sound: "core:ambient.cave".into(),
                tick_delay: 6000,
                block_search_extent: 8,
                offset: 2.0,
            },
        },
        spawners: Spawners::default(),
        spawn_costs: serde_json::Map::new(),
        carvers: Carvers::default(),
        features: vec![Vec::new(); FEATURE_STEPS],
    }
}
