//! Gateway service for running the complete bot.
//!
//! The gateway is the unified entry point that wires together the message
//! bus, the channel manager, the session store, and the router loop.

use crate::bus::MessageBus;
use crate::channel::ChannelManager;
use crate::channels::{TelegramChannel, TelegramChannelConfig};
use crate::completion::CompletionService;
use crate::config::BotConfig;
use crate::error::Result;
use crate::router::RouterLoop;
use crate::session::{MemoryStore, SessionManager};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Bot configuration.
    pub bot_config: BotConfig,
}

/// Gateway service that runs the complete bot.
pub struct Gateway<C> {
    config: GatewayConfig,
    bus: MessageBus,
    channel_manager: ChannelManager,
    completion: C,
    running: Arc<RwLock<bool>>,
}

impl<C> std::fmt::Debug for Gateway<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<C: CompletionService + Clone + Send + Sync + 'static> Gateway<C> {
    /// Create a gateway with the given completion service and configuration.
    pub fn with_config(completion: C, config: GatewayConfig) -> Self {
        let bus = MessageBus::new();
        Self {
            channel_manager: ChannelManager::new(bus.clone()),
            bus,
            completion,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Get a reference to the message bus.
    #[must_use]
    pub const fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Register channels based on configuration.
    async fn setup_channels(&self) -> Result<()> {
        let telegram = &self.config.bot_config.channels.telegram;
        if telegram.enabled {
            if let Some(ref token) = telegram.token {
                let mut tg_config = TelegramChannelConfig::new(token);
                for user_id in &telegram.allowed_users {
                    tg_config = tg_config.allow_user(*user_id);
                }
                for chat_id in &telegram.allowed_chats {
                    tg_config = tg_config.allow_chat(*chat_id);
                }

                self.channel_manager
                    .register(TelegramChannel::new(tg_config))
                    .await;
                info!("telegram channel enabled");
            } else {
                error!("telegram enabled but no token configured");
            }
        }

        Ok(())
    }

    /// Run the gateway: start channels and drive the router loop until it
    /// stops.
    pub async fn run(&self) -> Result<()> {
        *self.running.write().await = true;
        info!("gateway starting...");

        self.setup_channels().await?;

        let channel_results = self.channel_manager.start_all().await;
        for result in &channel_results {
            if let Err(e) = result {
                error!(error = %e, "failed to start channel");
            }
        }

        let sessions = SessionManager::new(MemoryStore::new());
        let router_loop = RouterLoop::new(self.bus.clone(), sessions, self.completion.clone());

        info!("gateway started");

        let result = router_loop.run().await;

        info!("gateway stopping...");
        self.channel_manager.stop_all().await;
        *self.running.write().await = false;

        info!("gateway stopped");
        result
    }

    /// Check if the gateway is running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Get gateway status.
    pub async fn status(&self) -> GatewayStatus {
        let channel_statuses = self.channel_manager.status_all().await;
        let bus_stats = self.bus.stats().await;

        GatewayStatus {
            running: *self.running.read().await,
            channels: channel_statuses
                .into_iter()
                .map(|s| ChannelStatusInfo {
                    name: s.name,
                    state: format!("{:?}", s.state),
                    messages_received: s.messages_received,
                    messages_sent: s.messages_sent,
                    healthy: s.healthy,
                })
                .collect(),
            total_inbound: bus_stats.inbound_count,
            total_outbound: bus_stats.outbound_count,
        }
    }
}

/// Gateway status information.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GatewayStatus {
    /// Whether the gateway is running.
    pub running: bool,
    /// Channel statuses.
    pub channels: Vec<ChannelStatusInfo>,
    /// Total inbound events processed.
    pub total_inbound: u64,
    /// Total outbound messages processed.
    pub total_outbound: u64,
}

/// Channel status info for gateway status.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChannelStatusInfo {
    /// Channel name.
    pub name: String,
    /// Channel state.
    pub state: String,
    /// Events received.
    pub messages_received: u64,
    /// Messages sent.
    pub messages_sent: u64,
    /// Whether the channel is healthy.
    pub healthy: bool,
}

/// Builder for creating a [`Gateway`].
pub struct GatewayBuilder<C> {
    completion: Option<C>,
    config: GatewayConfig,
}

impl<C> std::fmt::Debug for GatewayBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: CompletionService + Clone + Send + Sync + 'static> Default for GatewayBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CompletionService + Clone + Send + Sync + 'static> GatewayBuilder<C> {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            completion: None,
            config: GatewayConfig::default(),
        }
    }

    /// Set the completion service.
    #[must_use]
    pub fn completion(mut self, completion: C) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Set the bot configuration.
    #[must_use]
    pub fn bot_config(mut self, config: BotConfig) -> Self {
        self.config.bot_config = config;
        self
    }

    /// Build the gateway.
    ///
    /// # Panics
    ///
    /// Panics if the completion service is not set.
    #[must_use]
    pub fn build(self) -> Gateway<C> {
        let completion = self.completion.expect("completion service is required");
        Gateway::with_config(completion, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRequest;
    use crate::error::CompletionResult;
    use async_trait::async_trait;

    #[derive(Debug, Clone)]
    struct NoopCompletion;

    #[async_trait]
    impl CompletionService for NoopCompletion {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, _request: &CompletionRequest) -> CompletionResult<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_builder_and_status() {
        let gateway = GatewayBuilder::new().completion(NoopCompletion).build();

        let status = gateway.status().await;
        assert!(!status.running);
        assert!(status.channels.is_empty());
        assert_eq!(status.total_inbound, 0);
    }

    #[tokio::test]
    async fn test_setup_skips_telegram_without_token() {
        let gateway = GatewayBuilder::new().completion(NoopCompletion).build();
        gateway.setup_channels().await.unwrap();
        assert_eq!(gateway.channel_manager.channel_count().await, 0);
    }
}
