// Planet generation library - template selection, synthesis, artifact rendering and storage

pub mod artifacts;
pub mod config;
pub mod error;
pub mod loader;
pub mod names;
pub mod pipeline;
pub mod store;
pub mod synth;

// Re-export commonly used types
pub use artifacts::{render_bundle, ArtifactBundle, ArtifactDocument, RenderScope};
pub use config::GenerationConfig;
pub use error::{GenerationError, LoaderError};
pub use loader::{InstanceHandle, WorldLoader};
pub use pipeline::{
    GenerationHandle, GenerationOutcome, GenerationPipeline, GenerationStage, PlanetPreset,
    PlanetRequest,
};
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore, StagedBundle};
