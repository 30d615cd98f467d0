use super::effects::EffectsTemplate;
use super::TemplateLookupError;
use crate::ids::PLANET_NAMESPACE;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Celestial presets: what hangs in the sky of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelestialTemplate {
    NoCelestials,
    SingleSun,
    SunAndEarth,
    TwoMoons,
    BinaryStar,
    RingSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarVisibility {
    Constant,
    NightOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyConfig {
    pub sky_color: u32,
    pub sunrise_color: u32,
    pub star_count: u32,
    pub star_brightness: f32,
    pub star_visibility: StarVisibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryBody {
    pub texture: String,
    pub scale: f32,
    pub color: u32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryKind {
    Moon,
    Planet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryBody {
    pub kind: SecondaryKind,
    pub texture: String,
    pub scale: f32,
    pub color: u32,
    pub horizontal_position: f32,
    pub vertical_position: f32,
    pub moves_with_time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBodies {
    pub primary: PrimaryBody,
    pub secondary: Vec<SecondaryBody>,
}

struct CelestialRow {
    id: &'static str,
    description: &'static str,
    star_count: u32,
    moon_count: u32,
}

static CELESTIAL_TABLE: [CelestialRow; 6] = [
    CelestialRow {
        id: "no_celestials",
        description: "Empty sky with only stars visible",
        star_count: 50_000,
        moon_count: 0,
    },
    CelestialRow {
        id: "single_sun",
        description: "Standard single star system",
        star_count: 15_000,
        moon_count: 0,
    },
    CelestialRow {
        id: "sun_and_earth",
        description: "Sun with Earth visible in the sky, moon-like view",
        star_count: 15_000,
        moon_count: 0,
    },
    CelestialRow {
        id: "two_moons",
        description: "Sun with two small moons, Mars-like view",
        star_count: 8_000,
        moon_count: 2,
    },
    CelestialRow {
        id: "binary_star",
        description: "Binary star system with two suns",
        star_count: 25_000,
        moon_count: 0,
    },
    CelestialRow {
        id: "ring_system",
        description: "Planet with visible ring system and several small moons",
        star_count: 12_000,
        moon_count: 3,
    },
];

const SUN_WHITE: u32 = 16777215;

fn texture(name: &str) -> String {
    format!("{}:textures/celestial/{}.png", PLANET_NAMESPACE, name)
}

fn sun(name: &str, scale: f32, color: u32) -> PrimaryBody {
    PrimaryBody {
        texture: texture(name),
        scale,
        color,
        visible: scale > 0.0,
    }
}

fn moon(name: &str, scale: f32, color: u32, horizontal: f32, vertical: f32) -> SecondaryBody {
    SecondaryBody {
        kind: SecondaryKind::Moon,
        texture: texture(name),
        scale,
        color,
        horizontal_position: horizontal,
        vertical_position: vertical,
        moves_with_time: true,
    }
}

impl CelestialTemplate {
    pub const ALL: [CelestialTemplate; 6] = [
        CelestialTemplate::NoCelestials,
        CelestialTemplate::SingleSun,
        CelestialTemplate::SunAndEarth,
        CelestialTemplate::TwoMoons,
        CelestialTemplate::BinaryStar,
        CelestialTemplate::RingSystem,
    ];

    fn row(self) -> &'static CelestialRow {
        &CELESTIAL_TABLE[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.row().id
    }

    pub fn description(self) -> &'static str {
        self.row().description
    }

    pub fn star_count(self) -> u32 {
        self.row().star_count
    }

    pub fn moon_count(self) -> u32 {
        self.row().moon_count
    }

    pub fn from_id(id: &str) -> Result<Self, TemplateLookupError> {
        Self::ALL
            .into_iter()
            .find(|template| template.id() == id)
            .ok_or_else(|| TemplateLookupError::UnknownCelestial(id.to_string()))
    }

    /// Uniform pick; celestial presets carry no weights.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Sky palette for this preset under the given effects template.
    pub fn sky_config(self, effects: EffectsTemplate) -> SkyConfig {
        let palette = effects.profile().sky;
        SkyConfig {
            sky_color: palette.sky_color,
            sunrise_color: palette.sunrise_color,
            star_count: self.star_count(),
            star_brightness: palette.star_brightness,
            star_visibility: if palette.stars_always_visible {
                StarVisibility::Constant
            } else {
                StarVisibility::NightOnly
            },
        }
    }

    pub fn bodies(self) -> CelestialBodies {
        match self {
            CelestialTemplate::NoCelestials => CelestialBodies {
                primary: sun("sun", 0.0, SUN_WHITE),
                secondary: Vec::new(),
            },
            CelestialTemplate::SingleSun => CelestialBodies {
                primary: sun("sun", 1.0, SUN_WHITE),
                secondary: Vec::new(),
            },
            CelestialTemplate::SunAndEarth => CelestialBodies {
                primary: sun("sun", 0.3, SUN_WHITE),
                secondary: vec![SecondaryBody {
                    kind: SecondaryKind::Planet,
                    texture: texture("earth"),
                    scale: 0.5,
                    color: 6737151,
                    horizontal_position: 0.3,
                    vertical_position: 0.8,
                    moves_with_time: true,
                }],
            },
            CelestialTemplate::TwoMoons => CelestialBodies {
                primary: sun("sun", 1.0, SUN_WHITE),
                secondary: vec![
                    moon("phobos", 0.3, 11184810, 0.4, 0.15),
                    moon("deimos", 0.2, 9474192, -0.3, 1.30),
                ],
            },
            CelestialTemplate::BinaryStar => CelestialBodies {
                primary: sun("binary_star", 1.2, 16755200),
                secondary: vec![SecondaryBody {
                    kind: SecondaryKind::Planet,
                    texture: texture("binary_companion"),
                    scale: 0.4,
                    color: 16744448,
                    horizontal_position: -0.7,
                    vertical_position: 0.3,
                    moves_with_time: false,
                }],
            },
            CelestialTemplate::RingSystem => CelestialBodies {
                primary: sun("sun", 1.0, SUN_WHITE),
                secondary: (0..3)
                    .map(|i| {
                        let i = i as f32;
                        moon(
                            "ring_moon",
                            0.15 + i * 0.05,
                            12632256,
                            -0.5 + i * 0.5,
                            0.2 + i * 0.3,
                        )
                    })
                    .collect(),
            },
        }
    }
}

impl fmt::Display for CelestialTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.description())
    }
}
