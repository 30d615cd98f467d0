//! Observer fan-out.
//!
//! Messages are encoded once and handed to every observer as a binary frame.
//! Observers whose receiving side has gone away are dropped on the next send.
//! Broadcasts and greeted connects are serialized, so a greeting is always the
//! first frame an observer sees.

use crate::error::ProtocolError;
use crate::message::{encode, SyncMessage};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub type ObserverId = u32;

pub type Frame = Vec<u8>;

pub trait Transport: Send + Sync {
    /// Returns how many observers the message reached.
    fn broadcast(&self, message: &SyncMessage) -> Result<usize, ProtocolError>;
    fn send_to(&self, observer: ObserverId, message: &SyncMessage) -> Result<(), ProtocolError>;
}

#[derive(Debug)]
pub struct ChannelTransport {
    observers: DashMap<ObserverId, mpsc::UnboundedSender<Frame>>,
    next_observer_id: AtomicU32,
    gate: RwLock<()>,
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self {
            observers: DashMap::new(),
            next_observer_id: AtomicU32::new(1),
            gate: RwLock::new(()),
        }
    }

    pub fn connect(&self) -> (ObserverId, mpsc::UnboundedReceiver<Frame>) {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.insert(id, tx);
        info!(observer = id, "observer connected");
        (id, rx)
    }

    /// Connects an observer whose queue starts with `greeting`. No broadcast
    /// can interleave between building the greeting and registering the
    /// observer.
    pub fn connect_with<F>(
        &self,
        greeting: F,
    ) -> Result<(ObserverId, mpsc::UnboundedReceiver<Frame>), ProtocolError>
    where
        F: FnOnce() -> SyncMessage,
    {
        let _gate = self.gate.write().unwrap_or_else(|e| e.into_inner());
        let frame = encode(&greeting())?;
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(frame)
            .map_err(|_| ProtocolError::ObserverClosed(id))?;
        self.observers.insert(id, tx);
        info!(observer = id, "observer connected");
        Ok((id, rx))
    }

    pub fn disconnect(&self, observer: ObserverId) {
        if self.observers.remove(&observer).is_some() {
            info!(observer, "observer disconnected");
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Transport for ChannelTransport {
    fn broadcast(&self, message: &SyncMessage) -> Result<usize, ProtocolError> {
        let frame = encode(message)?;
        let _gate = self.gate.read().unwrap_or_else(|e| e.into_inner());
        let mut delivered = 0;
        let mut closed = Vec::new();
        for entry in self.observers.iter() {
            if entry.value().send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*entry.key());
            }
        }
        // Removal must wait until the iterator has released its shard locks.
        for observer in closed {
            debug!(observer, "dropping closed observer");
            self.observers.remove(&observer);
        }
        Ok(delivered)
    }

    fn send_to(&self, observer: ObserverId, message: &SyncMessage) -> Result<(), ProtocolError> {
        let frame = encode(message)?;
        let sent = match self.observers.get(&observer) {
            Some(tx) => tx.send(frame).is_ok(),
            None => return Err(ProtocolError::UnknownObserver(observer)),
        };
        if !sent {
            self.observers.remove(&observer);
            return Err(ProtocolError::ObserverClosed(observer));
        }
        Ok(())
    }
}
