// Planet registry - tiered storage, indices, archiving and snapshots

pub mod archive;
pub mod config;
pub mod error;
pub mod indices;
pub mod persistence;
pub mod registry;

pub use archive::{ArchiveCodec, ArchivedRecord};
pub use config::{ArchiveFidelity, RegistryConfig};
pub use error::{CapacityKind, CodecError, RegistryError, StoreError};
pub use persistence::{
    DocumentStore, FsDocumentStore, MemoryDocumentStore, RegistryPersistence, RegistrySnapshot,
};
pub use registry::{MaintenanceOutcome, MaintenanceReport, PlanetRegistry, RegistryStats, Tier};
