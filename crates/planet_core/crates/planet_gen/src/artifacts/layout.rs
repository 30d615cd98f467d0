//! Where each document of a bundle lives, relative to the artifact root.

use planet_objects::PlanetId;

pub const PLANETS_DIR: &str = "planets";

pub fn group_dir(id: &PlanetId) -> String {
    format!("{}/group_{:02}", PLANETS_DIR, id.group())
}

pub fn planet_descriptor(id: &PlanetId) -> String {
    format!("{}/{}.json", group_dir(id), id.path())
}

pub fn dimension_type(id: &PlanetId) -> String {
    format!("dimension_type/{}.json", id.path())
}

pub fn dimension(id: &PlanetId) -> String {
    format!("dimension/{}.json", id.path())
}

pub fn noise_settings(id: &PlanetId) -> String {
    format!("worldgen/noise_settings/{}.json", id.path())
}

pub fn biome(id: &PlanetId) -> String {
    format!("worldgen/biome/{}_plains.json", id.path())
}

/// Namespaced name of the planet's single biome.
pub fn biome_resource(id: &PlanetId) -> String {
    format!("{}_plains", id)
}
