use super::{pick_weighted, TemplateLookupError, WeightedTemplate, TOTAL_WEIGHT};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environmental effects template. Order of `ALL` is the weighted-walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectsTemplate {
    MoonLike,
    Rocky,
    GasGiant,
    IceWorld,
    Volcanic,
    AsteroidLike,
    AlteredOverworld,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsDefaults {
    pub gravity: f32,
    pub temperature: f32,
    pub day_length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereDefaults {
    pub has_atmosphere: bool,
    pub breathable: bool,
    pub pressure: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPalette {
    pub sky_color: u32,
    pub sunrise_color: u32,
    pub star_brightness: f32,
    pub stars_always_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogProfile {
    pub fog_color: u32,
    pub has_fog: bool,
    pub density: f32,
    pub far_plane: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherFlags {
    pub clouds: bool,
    pub rain: bool,
    pub snow: bool,
    pub storms: bool,
    pub acid_rain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleProfile {
    pub dust: bool,
    pub ash: bool,
    pub spores: bool,
    pub snowfall: bool,
    pub density: f32,
}

/// Terrain and biome inputs for the world documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainProfile {
    pub ultrawarm: bool,
    pub mobs_enabled: bool,
    pub aquifers_enabled: bool,
    pub default_block: &'static str,
    pub surface_block: &'static str,
    pub biome_temperature: f32,
    pub precipitation: bool,
    pub downfall: f32,
    pub water_color: u32,
    pub water_fog_color: u32,
    pub grass_color: u32,
    pub foliage_color: u32,
}

/// One row of the effects table: everything derived from an effects template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsProfile {
    pub template: EffectsTemplate,
    pub id: &'static str,
    pub description: &'static str,
    pub weight: u32,
    pub physics: PhysicsDefaults,
    pub atmosphere: AtmosphereDefaults,
    pub sky: SkyPalette,
    pub fog: FogProfile,
    pub ambient_light: f32,
    pub weather: WeatherFlags,
    pub particles: ParticleProfile,
    pub terrain: TerrainProfile,
}

const WATER: u32 = 4159204;
const WATER_FOG: u32 = 329011;

static EFFECTS_TABLE: [EffectsProfile; 7] = [
    EffectsProfile {
        template: EffectsTemplate::MoonLike,
        id: "moon_like",
        description: "Airless worlds with stark landscapes, low gravity, excellent stargazing",
        weight: 20,
        physics: PhysicsDefaults { gravity: 0.165, temperature: -173.0, day_length: 708.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: false, breathable: false, pressure: 0.0 },
        sky: SkyPalette { sky_color: 0, sunrise_color: 0, star_brightness: 2.5, stars_always_visible: true },
        fog: FogProfile { fog_color: 1447444, has_fog: false, density: 0.0, far_plane: 256.0 },
        ambient_light: 0.1,
        weather: WeatherFlags { clouds: false, rain: false, snow: false, storms: false, acid_rain: false },
        particles: ParticleProfile { dust: true, ash: false, spores: false, snowfall: false, density: 0.0 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: false,
            aquifers_enabled: false,
            default_block: "stellar:moon_stone",
            surface_block: "stellar:moon_stone",
            biome_temperature: -1.0,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 6316128,
            foliage_color: 6316128,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::Rocky,
        id: "rocky",
        description: "Mars-like worlds with thin atmosphere, dust storms, and rocky terrain",
        weight: 28,
        physics: PhysicsDefaults { gravity: 0.379, temperature: -65.0, day_length: 24.6 },
        atmosphere: AtmosphereDefaults { has_atmosphere: true, breathable: false, pressure: 0.006 },
        sky: SkyPalette { sky_color: 15510660, sunrise_color: 14349555, star_brightness: 1.2, stars_always_visible: false },
        fog: FogProfile { fog_color: 13791774, has_fog: true, density: 0.4, far_plane: 192.0 },
        ambient_light: 0.8,
        weather: WeatherFlags { clouds: false, rain: false, snow: false, storms: true, acid_rain: false },
        particles: ParticleProfile { dust: true, ash: false, spores: false, snowfall: false, density: 0.6 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: true,
            aquifers_enabled: true,
            default_block: "stellar:mars_stone",
            surface_block: "stellar:mars_stone",
            biome_temperature: -0.87,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 10387789,
            foliage_color: 10387789,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::GasGiant,
        id: "gas_giant",
        description: "Thick atmosphere worlds with floating islands, intense storms, and high pressure",
        weight: 15,
        physics: PhysicsDefaults { gravity: 2.5, temperature: -145.0, day_length: 16.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: true, breathable: false, pressure: 2.5 },
        sky: SkyPalette { sky_color: 8421631, sunrise_color: 16744703, star_brightness: 0.5, stars_always_visible: false },
        fog: FogProfile { fog_color: 6684774, has_fog: true, density: 0.8, far_plane: 96.0 },
        ambient_light: 0.3,
        weather: WeatherFlags { clouds: true, rain: false, snow: false, storms: true, acid_rain: false },
        particles: ParticleProfile { dust: false, ash: false, spores: false, snowfall: false, density: 0.4 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: true,
            aquifers_enabled: true,
            default_block: "core:stone",
            surface_block: "core:stone",
            biome_temperature: 0.2,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 5797459,
            foliage_color: 5797459,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::IceWorld,
        id: "ice_world",
        description: "Frozen worlds with snow storms, ice formations, and extremely cold temperatures",
        weight: 18,
        physics: PhysicsDefaults { gravity: 0.8, temperature: -220.0, day_length: 32.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: true, breathable: false, pressure: 0.3 },
        sky: SkyPalette { sky_color: 11657279, sunrise_color: 12632319, star_brightness: 1.8, stars_always_visible: false },
        fog: FogProfile { fog_color: 12632319, has_fog: true, density: 0.3, far_plane: 200.0 },
        ambient_light: 0.9,
        weather: WeatherFlags { clouds: false, rain: false, snow: true, storms: true, acid_rain: false },
        particles: ParticleProfile { dust: false, ash: false, spores: false, snowfall: true, density: 0.3 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: true,
            aquifers_enabled: true,
            default_block: "core:packed_ice",
            surface_block: "core:snow_block",
            biome_temperature: -0.8,
            precipitation: true,
            downfall: 0.8,
            water_color: 4020182,
            water_fog_color: WATER_FOG,
            grass_color: 4020182,
            foliage_color: 4020182,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::Volcanic,
        id: "volcanic",
        description: "Lava worlds with ash storms, extreme heat, and volcanic activity",
        weight: 8,
        physics: PhysicsDefaults { gravity: 1.2, temperature: 400.0, day_length: 18.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: true, breathable: false, pressure: 1.2 },
        sky: SkyPalette { sky_color: 6619136, sunrise_color: 16711680, star_brightness: 0.8, stars_always_visible: false },
        fog: FogProfile { fog_color: 3932160, has_fog: true, density: 0.7, far_plane: 128.0 },
        ambient_light: 0.7,
        weather: WeatherFlags { clouds: false, rain: false, snow: false, storms: true, acid_rain: true },
        particles: ParticleProfile { dust: false, ash: true, spores: false, snowfall: false, density: 0.8 },
        terrain: TerrainProfile {
            ultrawarm: true,
            mobs_enabled: true,
            aquifers_enabled: true,
            default_block: "core:blackstone",
            surface_block: "core:magma_block",
            biome_temperature: 2.0,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 2651799,
            foliage_color: 2651799,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::AsteroidLike,
        id: "asteroid_like",
        description: "Small rocky bodies with minimal gravity, jagged terrain, and no atmosphere",
        weight: 9,
        physics: PhysicsDefaults { gravity: 0.08, temperature: -180.0, day_length: 400.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: false, breathable: false, pressure: 0.0 },
        sky: SkyPalette { sky_color: 0, sunrise_color: 0, star_brightness: 2.8, stars_always_visible: false },
        fog: FogProfile { fog_color: 2631720, has_fog: true, density: 0.0, far_plane: 256.0 },
        ambient_light: 0.0,
        weather: WeatherFlags { clouds: false, rain: false, snow: false, storms: true, acid_rain: false },
        particles: ParticleProfile { dust: false, ash: false, spores: false, snowfall: false, density: 0.0 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: false,
            aquifers_enabled: true,
            default_block: "stellar:moon_stone",
            surface_block: "stellar:moon_stone",
            biome_temperature: -1.0,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 6316128,
            foliage_color: 6316128,
        },
    },
    EffectsProfile {
        template: EffectsTemplate::AlteredOverworld,
        id: "altered_overworld",
        description: "Earth-like worlds with modified biomes, breathable atmosphere, and familiar terrain",
        weight: 2,
        physics: PhysicsDefaults { gravity: 0.98, temperature: 15.0, day_length: 24.0 },
        atmosphere: AtmosphereDefaults { has_atmosphere: true, breathable: true, pressure: 1.0 },
        sky: SkyPalette { sky_color: 7907327, sunrise_color: 16777087, star_brightness: 1.0, stars_always_visible: false },
        fog: FogProfile { fog_color: 12638463, has_fog: true, density: 0.1, far_plane: 256.0 },
        ambient_light: 1.0,
        weather: WeatherFlags { clouds: false, rain: false, snow: false, storms: true, acid_rain: false },
        particles: ParticleProfile { dust: false, ash: false, spores: false, snowfall: false, density: 0.1 },
        terrain: TerrainProfile {
            ultrawarm: false,
            mobs_enabled: true,
            aquifers_enabled: true,
            default_block: "core:stone",
            surface_block: "core:grass_block",
            biome_temperature: 0.8,
            precipitation: false,
            downfall: 0.0,
            water_color: WATER,
            water_fog_color: WATER_FOG,
            grass_color: 5467731,
            foliage_color: 5467731,
        },
    },
];

impl EffectsTemplate {
    pub const ALL: [EffectsTemplate; 7] = [
        EffectsTemplate::MoonLike,
        EffectsTemplate::Rocky,
        EffectsTemplate::GasGiant,
        EffectsTemplate::IceWorld,
        EffectsTemplate::Volcanic,
        EffectsTemplate::AsteroidLike,
        EffectsTemplate::AlteredOverworld,
    ];

    pub fn profile(self) -> &'static EffectsProfile {
        // Table rows follow declaration order.
        &EFFECTS_TABLE[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.profile().id
    }

    pub fn description(self) -> &'static str {
        self.profile().description
    }

    pub fn from_id(id: &str) -> Result<Self, TemplateLookupError> {
        Self::ALL
            .into_iter()
            .find(|template| template.id() == id)
            .ok_or_else(|| TemplateLookupError::UnknownEffects(id.to_string()))
    }

    pub fn pick_weighted<R: Rng + ?Sized>(rng: &mut R) -> Self {
        pick_weighted(&Self::ALL, TOTAL_WEIGHT, rng).unwrap_or(EffectsTemplate::AlteredOverworld)
    }
}

impl WeightedTemplate for EffectsTemplate {
    fn weight(&self) -> u32 {
        self.profile().weight
    }
}

impl fmt::Display for EffectsTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.description())
    }
}
