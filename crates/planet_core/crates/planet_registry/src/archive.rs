//! Archive codec: bincode + gzip payloads for idle planets.
//!
//! Timestamps, display name and both template tags stay in the clear on the
//! record so queries and deletion checks never touch the payload.

use crate::config::ArchiveFidelity;
use crate::error::CodecError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use planet_objects::{CelestialTemplate, EffectsTemplate, PlanetDescriptor, PlanetEntity};
use planet_utils::time::Millis;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::debug;

/// Orbit range used when an approximate reconstruction re-rolls the orbit.
pub const RESTORED_ORBIT_RANGE: std::ops::Range<u32> = 100..1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub payload: Vec<u8>,
    pub last_accessed: Millis,
    pub created_at: Millis,
    pub display_name: String,
    pub effects: EffectsTemplate,
    pub celestial: CelestialTemplate,
}

impl ArchivedRecord {
    pub fn idle_for(&self, now: Millis) -> Millis {
        now.saturating_sub(self.last_accessed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveCodec {
    fidelity: ArchiveFidelity,
}

impl ArchiveCodec {
    pub fn new(fidelity: ArchiveFidelity) -> Self {
        Self { fidelity }
    }

    pub fn compress(&self, entity: &PlanetEntity) -> Result<ArchivedRecord, CodecError> {
        let raw = bincode::serialize(entity).map_err(CodecError::Encode)?;
        let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
        encoder.write_all(&raw)?;
        let payload = encoder.finish()?;

        debug!(
            id = %entity.id(),
            raw = raw.len(),
            compressed = payload.len(),
            "planet archived"
        );

        Ok(ArchivedRecord {
            payload,
            last_accessed: entity.runtime.last_accessed,
            created_at: entity.runtime.created_at,
            display_name: entity.display_name().to_string(),
            effects: entity.effects(),
            celestial: entity.celestial(),
        })
    }

    /// Restores an archived planet. The result is always unloaded.
    ///
    /// The payload is fully decoded in both modes, so a corrupt payload fails
    /// here instead of silently producing defaults.
    pub fn decompress<R: Rng + ?Sized>(
        &self,
        record: &ArchivedRecord,
        rng: &mut R,
    ) -> Result<PlanetEntity, CodecError> {
        let mut raw = Vec::new();
        GzDecoder::new(record.payload.as_slice()).read_to_end(&mut raw)?;
        let decoded: PlanetEntity = bincode::deserialize(&raw).map_err(CodecError::Decode)?;

        let mut entity = match self.fidelity {
            ArchiveFidelity::Lossless => decoded,
            ArchiveFidelity::Approximate => {
                let descriptor = PlanetDescriptor::from_defaults(
                    decoded.descriptor.id,
                    record.display_name.clone(),
                    record.effects,
                    record.celestial,
                    rng.random_range(RESTORED_ORBIT_RANGE),
                );
                PlanetEntity {
                    descriptor,
                    runtime: decoded.runtime,
                }
            }
        };
        entity.runtime.loaded = false;
        entity.runtime.created_at = record.created_at;
        entity.runtime.last_accessed = record.last_accessed;
        Ok(entity)
    }

    pub fn can_delete(&self, record: &ArchivedRecord, now: Millis, delete_after: Millis) -> bool {
        record.idle_for(now) > delete_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_objects::{PlanetId, RuntimeState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn jittered(rng: &mut StdRng, sequence: u32) -> PlanetEntity {
        let effects = EffectsTemplate::pick_weighted(rng);
        let celestial = CelestialTemplate::pick(rng);
        let mut descriptor = PlanetDescriptor::from_defaults(
            PlanetId::from_sequence(sequence),
            format!("Kepler-{}b", 100 + sequence),
            effects,
            celestial,
            rng.random_range(50..1000),
        );
        descriptor.physics.gravity *= 1.0 + (rng.random::<f32>() - 0.5) * 0.4;
        descriptor.physics.temperature *= 1.0 + (rng.random::<f32>() - 0.5) * 0.6;
        let mut runtime = RuntimeState::new(1_000 + sequence as Millis);
        runtime.loaded = true;
        PlanetEntity { descriptor, runtime }
    }

    #[test]
    fn test_approximate_roundtrip_keeps_identity_and_tags() {
        let codec = ArchiveCodec::new(ArchiveFidelity::Approximate);
        let mut rng = StdRng::seed_from_u64(42);
        for sequence in 1..=200 {
            let entity = jittered(&mut rng, sequence);
            let record = codec.compress(&entity).unwrap();
            assert_eq!(record.display_name, entity.display_name());
            assert_eq!(record.created_at, entity.runtime.created_at);

            let restored = codec.decompress(&record, &mut rng).unwrap();
            assert_eq!(restored.id(), entity.id());
            assert_eq!(restored.display_name(), entity.display_name());
            assert_eq!(restored.effects(), entity.effects());
            assert_eq!(restored.celestial(), entity.celestial());
            assert_eq!(restored.runtime.created_at, entity.runtime.created_at);
            assert!(!restored.is_loaded());
            assert!(RESTORED_ORBIT_RANGE.contains(&restored.descriptor.physics.orbit_distance));
            assert_eq!(
                restored.descriptor.physics.gravity,
                entity.effects().profile().physics.gravity
            );
        }
    }

    #[test]
    fn test_lossless_roundtrip_is_exact() {
        let codec = ArchiveCodec::new(ArchiveFidelity::Lossless);
        let mut rng = StdRng::seed_from_u64(7);
        let entity = jittered(&mut rng, 12);
        let record = codec.compress(&entity).unwrap();
        let restored = codec.decompress(&record, &mut rng).unwrap();
        assert_eq!(restored.descriptor, entity.descriptor);
        assert!(!restored.is_loaded());
    }

    #[test]
    fn test_corrupt_payload_is_reported() {
        let codec = ArchiveCodec::default();
        let mut rng = StdRng::seed_from_u64(1);
        let entity = jittered(&mut rng, 3);
        let mut record = codec.compress(&entity).unwrap();
        record.payload.truncate(record.payload.len() / 2);
        assert!(codec.decompress(&record, &mut rng).is_err());
    }

    #[test]
    fn test_can_delete_threshold() {
        let codec = ArchiveCodec::default();
        let mut rng = StdRng::seed_from_u64(5);
        let record = codec.compress(&jittered(&mut rng, 1)).unwrap();
        let at = record.last_accessed;
        assert!(!codec.can_delete(&record, at + 100, 100));
        assert!(codec.can_delete(&record, at + 101, 100));
        assert!(!codec.can_delete(&record, 0, 100));
    }
}
