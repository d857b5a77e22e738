//! Saathi - a multilingual wellness companion bot for Telegram.
//!
//! Saathi routes user text and button interactions to canned menu flows
//! (mood check-in, wellness activities, crisis resources) or a remote
//! completion service, keeping a mutable per-user record in a pluggable
//! session store.
//!
//! # Architecture
//!
//! - **Message Bus** ([`bus`]) - async queue decoupling channels from the
//!   router loop
//! - **Channels** ([`channels`]) - platform integrations (Telegram)
//! - **Router** ([`router`]) - selector dispatch, mood/crisis policy, and
//!   the event-processing loop
//! - **Session** ([`session`]) - per-user conversation state
//! - **Completion** ([`completion`]) - external text-generation boundary
//! - **Gateway** ([`gateway`]) - unified orchestration of all components
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use saathi_bot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = load_config().await?;
//!     config.require_secrets()?;
//!
//!     let completion = GeminiClient::from_env();
//!     let gateway = GatewayBuilder::new()
//!         .completion(completion)
//!         .bot_config(config)
//!         .build();
//!     gateway.run().await
//! }
//! ```

pub mod bus;
pub mod catalog;
pub mod channel;
pub mod channels;
pub mod completion;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod router;
pub mod session;
pub mod util;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        BotError, BusError, BusResult, ChannelError, ChannelResult, CompletionError,
        CompletionResult, ConfigError, ConfigResult, Result, StorageError, StorageResult,
    };

    // Bus
    pub use crate::bus::{InboundHandle, MessageBus};

    // Channel
    pub use crate::channel::{Channel, ChannelBase, ChannelManager, ChannelState, ChannelStatus};
    pub use crate::channels::{TelegramChannel, TelegramChannelConfig};

    // Catalog
    pub use crate::catalog::Activity;

    // Completion
    pub use crate::completion::{
        CompletionRequest, CompletionService, GeminiClient, GenerationParams,
    };

    // Config
    pub use crate::config::{
        BotConfig, ConfigIssue, IssueLevel, TelegramConfig, config_path, init_config, load_config,
        save_config,
    };

    // Events
    pub use crate::events::{Button, InboundEvent, InboundKind, MessageFormat, OutboundMessage};

    // Gateway
    pub use crate::gateway::{Gateway, GatewayBuilder, GatewayConfig, GatewayStatus};

    // Router
    pub use crate::router::{InteractionRouter, Reply, RouterLoop, Selector, crisis_scan};

    // Session
    pub use crate::session::{
        Language, MemoryStore, Module, Mood, MoodEntry, SessionData, SessionManager, SessionStore,
    };

    // Utilities
    pub use crate::util::{generate_message_id, timestamp_ms, truncate_str};
}
