// Planet sync protocol - message shapes, binary framing and observer fan-out

pub mod error;
pub mod message;
pub mod sync;
pub mod transport;
pub mod ws;

// Re-export commonly used types
pub use error::ProtocolError;
pub use message::{decode, encode, DeltaAction, PlanetSyncDescriptor, SyncMessage};
pub use sync::{ObserverMirror, SyncService};
pub use transport::{ChannelTransport, ObserverId, Transport};
