use planet_objects::TemplateLookupError;
use planet_registry::{RegistryError, StoreError};
use planet_utils::ThreadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    TemplateLookup(#[from] TemplateLookupError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("artifact write failed: {0}")]
    ArtifactWrite(#[source] StoreError),
    #[error("artifact rendering failed: {0}")]
    Render(#[from] serde_json::Error),
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Worker(#[from] ThreadError),
}

#[derive(Debug, Error)]
#[error("world loader failed for {id}: {reason}")]
pub struct LoaderError {
    pub id: String,
    pub reason: String,
}
