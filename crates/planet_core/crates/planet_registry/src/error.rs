use planet_objects::PlanetId;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode planet: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode planet: {0}")]
    Decode(#[source] bincode::Error),
    #[error("compression stream failed: {0}")]
    Compression(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    Population,
    Loaded,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind:?} capacity of {limit} reached")]
    CapacityExceeded { kind: CapacityKind, limit: usize },
    #[error("planet id {0} is already taken")]
    DuplicateIdentity(PlanetId),
    #[error("planet id sequence exhausted")]
    IdSpaceExhausted,
    #[error("planet {0} not found")]
    NotFound(PlanetId),
    #[error("archived planet {id} could not be restored: {source}")]
    DecodeFailure {
        id: PlanetId,
        #[source]
        source: CodecError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid document key '{0}'")]
    InvalidKey(String),
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot is invalid: {0}")]
    Corrupt(String),
}
