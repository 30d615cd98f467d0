use crate::error::ProtocolError;
use planet_core::objects::{
    CelestialTemplate, EffectsTemplate, PlanetDescriptor, PlanetEntity, PlanetId,
};
use serde::{Deserialize, Serialize};

/// Messages pushed from the registry host to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// Sent on connect. The receiver drops its state and registers each entry.
    FullSnapshot { planets: Vec<PlanetSyncDescriptor> },
    Delta {
        planet: PlanetSyncDescriptor,
        action: DeltaAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaAction {
    Upsert,
    /// Only the descriptor's ID is meaningful.
    Remove,
}

/// What an observer knows about one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSyncDescriptor {
    pub descriptor: PlanetDescriptor,
    pub loaded: bool,
}

impl PlanetSyncDescriptor {
    /// Placeholder carrying `id`; every other field is filler.
    pub fn removal(id: PlanetId) -> Self {
        Self {
            descriptor: PlanetDescriptor::from_defaults(
                id,
                String::new(),
                EffectsTemplate::MoonLike,
                CelestialTemplate::NoCelestials,
                0,
            ),
            loaded: false,
        }
    }

    pub fn id(&self) -> &PlanetId {
        &self.descriptor.id
    }
}

impl From<&PlanetEntity> for PlanetSyncDescriptor {
    fn from(entity: &PlanetEntity) -> Self {
        Self {
            descriptor: entity.descriptor.clone(),
            loaded: entity.is_loaded(),
        }
    }
}

impl SyncMessage {
    pub fn upsert(entity: &PlanetEntity) -> Self {
        SyncMessage::Delta {
            planet: entity.into(),
            action: DeltaAction::Upsert,
        }
    }

    pub fn remove(id: PlanetId) -> Self {
        SyncMessage::Delta {
            planet: PlanetSyncDescriptor::removal(id),
            action: DeltaAction::Remove,
        }
    }
}

pub fn encode(message: &SyncMessage) -> Result<Vec<u8>, ProtocolError> {
    bincode::serialize(message).map_err(ProtocolError::Encode)
}

pub fn decode(frame: &[u8]) -> Result<SyncMessage, ProtocolError> {
    bincode::deserialize(frame).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_frame_keeps_id() {
        let id = PlanetId::from_sequence(33);
        let frame = encode(&SyncMessage::remove(id.clone())).unwrap();
        match decode(&frame).unwrap() {
            SyncMessage::Delta { planet, action } => {
                assert_eq!(action, DeltaAction::Remove);
                assert_eq!(planet.id(), &id);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_truncated_frame_is_rejected() {
        let entity = PlanetEntity::new(
            PlanetDescriptor::from_defaults(
                PlanetId::from_sequence(2),
                "Zeta-880e".into(),
                EffectsTemplate::Volcanic,
                CelestialTemplate::BinaryStar,
                410,
            ),
            0,
        );
        let frame = encode(&SyncMessage::upsert(&entity)).unwrap();
        assert!(matches!(
            decode(&frame[..frame.len() / 2]),
            Err(ProtocolError::Decode(_))
        ));
    }
}
