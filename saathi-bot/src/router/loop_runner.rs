//! Router loop: the single consumer of the inbound event queue.

use super::engine::{InteractionRouter, Reply};
use super::policy::PROCESSING_ERROR_REPLY;
use super::selector::Selector;
use crate::bus::MessageBus;
use crate::completion::CompletionService;
use crate::error::Result;
use crate::events::{InboundEvent, InboundKind, OutboundMessage};
use crate::session::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Configuration for the router loop.
#[derive(Debug, Clone, Copy)]
pub struct RouterLoopConfig {
    /// How long one bus poll waits before re-checking the running flag.
    pub poll_interval: Duration,
}

impl Default for RouterLoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Consumes inbound events from the bus and publishes router replies.
///
/// Events are handled to completion one at a time, including the awaited
/// completion-service call, so processing is sequential at the process
/// level.
pub struct RouterLoop<C> {
    bus: MessageBus,
    router: InteractionRouter<C>,
    config: RouterLoopConfig,
    running: Arc<RwLock<bool>>,
}

impl<C> std::fmt::Debug for RouterLoop<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterLoop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: CompletionService> RouterLoop<C> {
    /// Create a router loop over the given bus, sessions, and completion
    /// service.
    pub fn new(bus: MessageBus, sessions: SessionManager, completion: C) -> Self {
        Self {
            bus,
            router: InteractionRouter::new(sessions, completion),
            config: RouterLoopConfig::default(),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Access the interaction router.
    #[must_use]
    pub const fn router(&self) -> &InteractionRouter<C> {
        &self.router
    }

    /// Run the loop, processing events until stopped.
    pub async fn run(&self) -> Result<()> {
        *self.running.write().await = true;
        info!("router loop started");

        while *self.running.read().await {
            let Some(event) = self
                .bus
                .consume_inbound_timeout(self.config.poll_interval)
                .await
            else {
                continue;
            };

            // Any processing failure is logged and answered with the
            // generic error reply; the loop itself stays alive.
            match self.process_event(&event).await {
                Ok(Some(reply)) => {
                    let outbound = OutboundMessage::reply_to(&event, reply.text)
                        .with_keyboard(reply.keyboard);
                    if let Err(e) = self.bus.publish_outbound(outbound).await {
                        error!(error = %e, "failed to publish reply");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, event_id = %event.id, "failed to process event");
                    let outbound = OutboundMessage::reply_to(&event, PROCESSING_ERROR_REPLY);
                    let _ = self.bus.publish_outbound(outbound).await;
                }
            }
        }

        info!("router loop stopped");
        Ok(())
    }

    /// Stop the loop after the in-flight event finishes.
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// Check if the loop is running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Dispatch a single inbound event. `None` means no reply is owed.
    async fn process_event(&self, event: &InboundEvent) -> Result<Option<Reply>> {
        let key = event.session_key();

        match &event.kind {
            InboundKind::Command(command) if command == "start" => {
                self.router.on_start(&key).await.map(Some)
            }
            InboundKind::Command(command) => {
                debug!(command = %command, "ignoring unknown command");
                Ok(None)
            }
            InboundKind::MenuSelect(raw) => match Selector::parse(raw) {
                Some(selector) => self.router.on_menu_select(&key, selector).await.map(Some),
                None => {
                    debug!(selector = %raw, "ignoring unmatched selector");
                    Ok(None)
                }
            },
            InboundKind::Text(text) => self.router.on_text_message(&key, text).await.map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRequest;
    use crate::error::CompletionResult;
    use crate::session::MemoryStore;
    use async_trait::async_trait;

    #[derive(Debug, Clone)]
    struct EchoCompletion;

    #[async_trait]
    impl CompletionService for EchoCompletion {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
            Ok(format!("echo: {}", request.prompt))
        }
    }

    fn make_loop(bus: MessageBus) -> RouterLoop<EchoCompletion> {
        RouterLoop::new(bus, SessionManager::new(MemoryStore::new()), EchoCompletion)
    }

    #[tokio::test]
    async fn test_start_command_produces_welcome() {
        let runner = make_loop(MessageBus::new());
        let event = InboundEvent::command("telegram", "u", "c", "start");

        let reply = runner.process_event(&event).await.unwrap().unwrap();
        assert!(reply.text.contains("Welcome to Saathi"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let runner = make_loop(MessageBus::new());
        let event = InboundEvent::command("telegram", "u", "c", "help");

        assert!(runner.process_event(&event).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unmatched_selector_is_ignored() {
        let runner = make_loop(MessageBus::new());
        let event = InboundEvent::menu_select("telegram", "u", "c", "no:such:selector");

        assert!(runner.process_event(&event).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_flows_to_completion_and_bus() {
        let bus = MessageBus::new();
        let mut outbound_rx = bus.subscribe_channel("telegram").await;
        let runner = make_loop(bus.clone());

        bus.publish_inbound(InboundEvent::text("telegram", "u", "c", "hi there"))
            .await
            .unwrap();

        let handle = tokio::spawn(async move { runner.run().await });

        let reply = tokio::time::timeout(Duration::from_secs(2), outbound_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.text, "echo: hi there");
        assert_eq!(reply.chat_id, "c");

        handle.abort();
    }
}
