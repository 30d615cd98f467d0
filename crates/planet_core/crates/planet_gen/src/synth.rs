use crate::config::GenerationConfig;
use planet_objects::{CelestialTemplate, EffectsTemplate, PlanetDescriptor, PlanetEntity, PlanetId};
use planet_utils::time::Millis;
use rand::Rng;

fn jitter<R: Rng + ?Sized>(rng: &mut R, factor: f32) -> f32 {
    1.0 + (rng.random::<f32>() - 0.5) * factor
}

/// Template defaults with independent jitter per property and a fresh orbit.
pub fn synthesize<R: Rng + ?Sized>(
    id: PlanetId,
    display_name: String,
    effects: EffectsTemplate,
    celestial: CelestialTemplate,
    config: &GenerationConfig,
    rng: &mut R,
    now: Millis,
) -> PlanetEntity {
    let orbit = rng.random_range(config.orbit_min..config.orbit_max);
    let mut descriptor = PlanetDescriptor::from_defaults(id, display_name, effects, celestial, orbit);
    let physics = &mut descriptor.physics;
    physics.gravity *= jitter(rng, config.gravity_jitter);
    physics.temperature *= jitter(rng, config.temperature_jitter);
    physics.day_length *= jitter(rng, config.day_length_jitter);
    PlanetEntity::new(descriptor, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_jitter_stays_in_band() {
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(2024);
        for sequence in 1..=500 {
            let effects = EffectsTemplate::ALL[sequence as usize % 7];
            let entity = synthesize(
                PlanetId::from_sequence(sequence),
                "TOI-700d".into(),
                effects,
                CelestialTemplate::SingleSun,
                &config,
                &mut rng,
                5,
            );
            let defaults = effects.profile().physics;
            let p = entity.descriptor.physics;
            let ratio = p.gravity / defaults.gravity;
            assert!((0.8..=1.2).contains(&ratio), "gravity ratio {ratio}");
            let ratio = p.temperature / defaults.temperature;
            assert!((0.7..=1.3).contains(&ratio), "temperature ratio {ratio}");
            let ratio = p.day_length / defaults.day_length;
            assert!((0.6..=1.4).contains(&ratio), "day length ratio {ratio}");
            assert!((50..1000).contains(&p.orbit_distance));
            assert_eq!(entity.runtime.created_at, 5);
            assert_eq!(entity.descriptor.atmosphere.pressure, effects.profile().atmosphere.pressure);
        }
    }
}
