//! The planet descriptor document.

use super::layout;
use planet_objects::templates::{PrimaryBody, SecondaryBody, SecondaryKind, StarVisibility};
use planet_objects::{AtmosphereKind, PlanetEntity};
use serde::{Deserialize, Serialize};

pub const NEAR_PLANE: f32 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDocument {
    pub id: String,
    pub display_name: String,
    pub properties: PropertiesSection,
    pub atmosphere: AtmosphereSection,
    pub dimension: DimensionSection,
    pub rendering: RenderingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertiesSection {
    pub gravity: f32,
    pub temperature: f32,
    pub day_length: f32,
    pub orbit_distance: u32,
    pub has_rings: bool,
    pub moon_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereSection {
    pub has_atmosphere: bool,
    pub breathable: bool,
    pub pressure: f32,
    pub oxygen_level: f32,
    #[serde(rename = "type")]
    pub kind: AtmosphereKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSection {
    pub dimension_type: String,
    pub biome_source: String,
    pub chunk_generator: String,
    pub is_orbital: bool,
    pub sky_color: u32,
    pub fog_color: u32,
    pub ambient_light: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingSection {
    pub sky: SkySection,
    pub fog: FogSection,
    pub celestial_bodies: CelestialSection,
    pub weather: WeatherSection,
    pub particles: ParticleSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySection {
    pub sky_color: u32,
    pub sunrise_color: u32,
    pub custom_sky: bool,
    pub has_stars: bool,
    pub star_count: u32,
    pub star_brightness: f32,
    pub star_visibility: StarVisibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSection {
    pub fog_color: u32,
    pub has_fog: bool,
    pub fog_density: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialSection {
    pub sun: PrimaryBody,
    pub moons: Vec<BodyEntry>,
    pub visible_planets: Vec<BodyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyEntry {
    pub texture: String,
    pub scale: f32,
    pub color: u32,
    pub horizontal_position: f32,
    pub vertical_position: f32,
    pub moves_with_time: bool,
    pub visible: bool,
}

impl From<&SecondaryBody> for BodyEntry {
    fn from(body: &SecondaryBody) -> Self {
        Self {
            texture: body.texture.clone(),
            scale: body.scale,
            color: body.color,
            horizontal_position: body.horizontal_position,
            vertical_position: body.vertical_position,
            moves_with_time: body.moves_with_time,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSection {
    pub has_clouds: bool,
    pub has_rain: bool,
    pub has_snow: bool,
    pub has_storms: bool,
    pub rain_acidity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSection {
    pub has_dust: bool,
    pub has_ash: bool,
    pub has_spores: bool,
    pub has_snowfall: bool,
    pub particle_density: f32,
    pub particle_color: u32,
}

pub fn render(entity: &PlanetEntity) -> PlanetDocument {
    let d = &entity.descriptor;
    let profile = d.effects.profile();
    let sky = d.celestial.sky_config(d.effects);
    let bodies = d.celestial.bodies();

    let (moons, visible_planets): (Vec<&SecondaryBody>, Vec<&SecondaryBody>) = bodies
        .secondary
        .iter()
        .partition(|b| b.kind == SecondaryKind::Moon);

    PlanetDocument {
        id: d.id.to_string(),
        display_name: d.display_name.clone(),
        properties: PropertiesSection {
            gravity: d.physics.gravity,
            temperature: d.physics.temperature,
            day_length: d.physics.day_length,
            orbit_distance: d.physics.orbit_distance,
            has_rings: false,
            moon_count: d.moon_count(),
        },
        atmosphere: AtmosphereSection {
            has_atmosphere: d.atmosphere.has_atmosphere,
            breathable: d.atmosphere.breathable,
            pressure: d.atmosphere.pressure,
            oxygen_level: d.atmosphere.oxygen_level(),
            kind: d.atmosphere.kind(),
        },
        dimension: DimensionSection {
            dimension_type: d.id.to_string(),
            biome_source: layout::biome_resource(&d.id),
            chunk_generator: d.id.to_string(),
            is_orbital: false,
            sky_color: profile.sky.sky_color,
            fog_color: profile.fog.fog_color,
            ambient_light: profile.ambient_light,
        },
        rendering: RenderingSection {
            sky: SkySection {
                sky_color: sky.sky_color,
                sunrise_color: sky.sunrise_color,
                custom_sky: true,
                has_stars: true,
                star_count: sky.star_count,
                star_brightness: sky.star_brightness,
                star_visibility: sky.star_visibility,
            },
            fog: FogSection {
                fog_color: profile.fog.fog_color,
                has_fog: profile.fog.has_fog,
                fog_density: profile.fog.density,
                near_plane: NEAR_PLANE,
                far_plane: profile.fog.far_plane,
            },
            celestial_bodies: CelestialSection {
                sun: bodies.primary.clone(),
                moons: moons.into_iter().map(BodyEntry::from).collect(),
                visible_planets: visible_planets.into_iter().map(BodyEntry::from).collect(),
            },
            weather: WeatherSection {
                has_clouds: profile.weather.clouds,
                has_rain: profile.weather.rain,
                has_snow: profile.weather.snow,
                has_storms: profile.weather.storms,
                rain_acidity: if profile.weather.acid_rain { 1.0 } else { 0.0 },
            },
            particles: ParticleSection {
                has_dust: profile.particles.dust,
                has_ash: profile.particles.ash,
                has_spores: profile.particles.spores,
                has_snowfall: profile.particles.snowfall,
                particle_density: profile.particles.density,
                particle_color: profile.fog.fog_color,
            },
        },
    }
}
