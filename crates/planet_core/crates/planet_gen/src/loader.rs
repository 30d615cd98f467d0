use crate::error::LoaderError;
use planet_objects::{PlanetEntity, PlanetId};

/// Handle returned by the host world runtime for a live planet instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHandle {
    pub id: PlanetId,
    pub instance: String,
}

/// Host runtime that turns a registered planet into a live space.
pub trait WorldLoader: Send + Sync {
    fn instantiate(&self, id: &PlanetId, entity: &PlanetEntity) -> Result<InstanceHandle, LoaderError>;
}
