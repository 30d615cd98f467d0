//! WebSocket bridge for remote observers.

use crate::error::ProtocolError;
use crate::sync::SyncService;
use crate::transport::ChannelTransport;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing::debug;

/// Serves one observer connection: the full snapshot first, then every frame
/// the transport routes to it. Inbound data is ignored apart from close.
pub async fn serve_observer<S>(
    stream: S,
    transport: &ChannelTransport,
    sync: &SyncService,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ws_stream = accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let (observer, mut frames) = transport.connect_with(|| sync.full_snapshot())?;
    debug!(observer, "full snapshot queued");

    let result = loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Some(data) => {
                    if let Err(err) = ws_tx.send(WsMessage::Binary(data)).await {
                        break Err(err.into());
                    }
                }
                None => break Ok(()),
            },
            incoming = ws_rx.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => break Ok(()),
                Some(Err(err)) => break Err(err.into()),
                Some(Ok(_)) => debug!(observer, "ignoring inbound observer message"),
            },
        }
    };

    transport.disconnect(observer);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{decode, SyncMessage};
    use crate::sync::ObserverMirror;
    use planet_core::objects::{CelestialTemplate, EffectsTemplate, PlanetDescriptor, PlanetEntity};
    use planet_core::registry::{PlanetRegistry, RegistryConfig};
    use planet_core::utils::SystemClock;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio_tungstenite::connect_async;

    #[tokio::test]
    async fn test_remote_observer_receives_snapshot_then_deltas() {
        let registry = Arc::new(PlanetRegistry::new(
            RegistryConfig::default(),
            Arc::new(SystemClock),
        ));
        let transport = Arc::new(ChannelTransport::new());
        let sync = Arc::new(SyncService::new(registry.clone(), transport.clone()));

        let entity = PlanetEntity::new(
            PlanetDescriptor::from_defaults(
                registry.generate_next_id().unwrap(),
                "TOI-700d".into(),
                EffectsTemplate::AlteredOverworld,
                CelestialTemplate::SingleSun,
                150,
            ),
            registry.now(),
        );
        registry.register(entity.clone()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = {
            let transport = transport.clone();
            let sync = sync.clone();
            tokio::spawn(async move {
                let (stream, _) = listener.accept().await.unwrap();
                serve_observer(stream, &transport, &sync).await
            })
        };

        let (mut client, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        let mut mirror = ObserverMirror::new();
        let Some(Ok(WsMessage::Binary(frame))) = client.next().await else {
            panic!("expected snapshot frame");
        };
        mirror.apply_frame(&frame).unwrap();
        assert_eq!(mirror.len(), 1);

        sync.publish_removal(entity.id()).unwrap();
        let Some(Ok(WsMessage::Binary(frame))) = client.next().await else {
            panic!("expected delta frame");
        };
        assert!(matches!(decode(&frame).unwrap(), SyncMessage::Delta { .. }));
        mirror.apply_frame(&frame).unwrap();
        assert!(mirror.is_empty());

        client.close(None).await.unwrap();
        server.await.unwrap().unwrap();
        assert_eq!(transport.observer_count(), 0);
    }
}
