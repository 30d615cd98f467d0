use planet_core::gen::{InstanceHandle, LoaderError, WorldLoader};
use planet_core::objects::{PlanetEntity, PlanetId};
use tracing::info;

/// Stand-in host: records the instantiation and hands back a handle named
/// after the planet's dimension.
#[derive(Debug, Default)]
pub struct LoggingWorldLoader;

impl WorldLoader for LoggingWorldLoader {
    fn instantiate(&self, id: &PlanetId, entity: &PlanetEntity) -> Result<InstanceHandle, LoaderError> {
        if id != entity.id() {
            return Err(LoaderError {
                id: id.to_string(),
                reason: format!("entity carries id {}", entity.id()),
            });
        }
        info!(
            %id,
            name = entity.display_name(),
            effects = entity.effects().id(),
            "planet instantiated"
        );
        Ok(InstanceHandle {
            id: id.clone(),
            instance: format!("dimension/{}", id.path()),
        })
    }
}
