use crate::transport::ObserverId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode sync message: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode sync frame: {0}")]
    Decode(#[source] bincode::Error),
    #[error("unknown observer {0}")]
    UnknownObserver(ObserverId),
    #[error("observer {0} has disconnected")]
    ObserverClosed(ObserverId),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
