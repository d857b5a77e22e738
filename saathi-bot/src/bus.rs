//! Async message bus decoupling channels from the router loop.
//!
//! Channels publish [`InboundEvent`]s onto a single queue consumed by the
//! router loop; replies are delivered to per-channel subscribers. The
//! single consumer is what makes update processing effectively sequential.

use crate::error::{BusError, BusResult};
use crate::events::{InboundEvent, OutboundMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace};

/// Default capacity for message queues.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Async message bus shared between channels and the router loop.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<MessageBusInner>,
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus").finish_non_exhaustive()
    }
}

struct MessageBusInner {
    /// Inbound event queue (channels → router).
    inbound_tx: mpsc::Sender<InboundEvent>,
    inbound_rx: RwLock<Option<mpsc::Receiver<InboundEvent>>>,

    /// Channel-specific subscribers for outbound delivery.
    subscribers: RwLock<HashMap<String, Vec<mpsc::Sender<OutboundMessage>>>>,

    /// Statistics.
    stats: RwLock<BusStats>,
}

/// Message bus statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusStats {
    /// Total inbound events processed.
    pub inbound_count: u64,
    /// Total outbound messages processed.
    pub outbound_count: u64,
}

impl MessageBus {
    /// Create a new message bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a new message bus with the given inbound queue capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);

        Self {
            inner: Arc::new(MessageBusInner {
                inbound_tx,
                inbound_rx: RwLock::new(Some(inbound_rx)),
                subscribers: RwLock::new(HashMap::new()),
                stats: RwLock::new(BusStats::default()),
            }),
        }
    }

    /// Publish an inbound event from a channel to the router.
    pub async fn publish_inbound(&self, event: InboundEvent) -> BusResult<()> {
        trace!(
            channel = %event.channel,
            sender = %event.sender_id,
            "publishing inbound event"
        );

        self.inner
            .inbound_tx
            .send(event)
            .await
            .map_err(|_| BusError::InboundClosed)?;

        self.inner.stats.write().await.inbound_count += 1;
        Ok(())
    }

    /// Consume the next inbound event, waiting at most `timeout`.
    ///
    /// This should only be called by the router loop. Returns `None` if no
    /// event arrives within the timeout or the bus is closed.
    pub async fn consume_inbound_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Option<InboundEvent> {
        let mut rx_guard = self.inner.inbound_rx.write().await;
        if let Some(rx) = rx_guard.as_mut() {
            tokio::time::timeout(timeout, rx.recv())
                .await
                .ok()
                .flatten()
        } else {
            None
        }
    }

    /// Publish an outbound message to the target channel's subscribers.
    pub async fn publish_outbound(&self, msg: OutboundMessage) -> BusResult<()> {
        trace!(
            channel = %msg.channel,
            chat_id = %msg.chat_id,
            "publishing outbound message"
        );

        let subscribers = self.inner.subscribers.read().await;
        if let Some(senders) = subscribers.get(&msg.channel) {
            for sender in senders {
                if sender.send(msg.clone()).await.is_err() {
                    debug!(channel = %msg.channel, "channel subscriber disconnected");
                }
            }
        }

        self.inner.stats.write().await.outbound_count += 1;
        Ok(())
    }

    /// Subscribe to outbound messages for a specific channel.
    pub async fn subscribe_channel(&self, channel: &str) -> mpsc::Receiver<OutboundMessage> {
        let (tx, rx) = mpsc::channel(DEFAULT_QUEUE_CAPACITY);

        let mut subscribers = self.inner.subscribers.write().await;
        subscribers.entry(channel.to_string()).or_default().push(tx);

        debug!(channel = %channel, "new channel subscriber registered");
        rx
    }

    /// Get current bus statistics.
    pub async fn stats(&self) -> BusStats {
        *self.inner.stats.read().await
    }

    /// Create a lightweight handle for publishing inbound events.
    #[must_use]
    pub fn inbound_handle(&self) -> InboundHandle {
        InboundHandle {
            tx: self.inner.inbound_tx.clone(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight handle for publishing inbound events without cloning the bus.
#[derive(Debug, Clone)]
pub struct InboundHandle {
    tx: mpsc::Sender<InboundEvent>,
}

impl InboundHandle {
    /// Publish an inbound event.
    pub async fn publish(&self, event: InboundEvent) -> BusResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| BusError::InboundClosed)
    }
}
