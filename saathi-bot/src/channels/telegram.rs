//! Telegram channel implementation using teloxide.
//!
//! Receives commands, free text, and inline-button callback queries, and
//! renders router replies as messages with inline keyboards.
//!
//! # Setup
//!
//! 1. Create a bot via `@BotFather`
//! 2. Export the token as `TELEGRAM_BOT_TOKEN`
//! 3. Start the gateway (long polling), or register a webhook with the
//!    `webhook` subcommand for production deployments

use crate::bus::MessageBus;
use crate::channel::{Channel, ChannelBase, ChannelState, ChannelStatus};
use crate::error::{ChannelError, ChannelResult};
use crate::events::{Button, InboundEvent, MessageFormat, OutboundMessage};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MediaKind, MessageKind, ParseMode,
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info};

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramChannelConfig {
    /// Bot token from `@BotFather`.
    pub token: String,
    /// Allowed user IDs. Empty means allow all.
    pub allowed_users: Vec<i64>,
    /// Allowed chat IDs. Empty means allow all.
    pub allowed_chats: Vec<i64>,
    /// Whether to convert Markdown replies to Telegram HTML.
    pub parse_markdown: bool,
    /// Maximum message length before splitting.
    pub max_message_length: usize,
}

impl TelegramChannelConfig {
    /// Create a new Telegram channel config with the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            allowed_users: Vec::new(),
            allowed_chats: Vec::new(),
            parse_markdown: true,
            max_message_length: 4096, // Telegram's limit
        }
    }

    /// Try to create config from the `TELEGRAM_BOT_TOKEN` environment
    /// variable.
    #[must_use]
    pub fn try_from_env() -> Option<Self> {
        std::env::var(crate::config::TELEGRAM_TOKEN_ENV)
            .ok()
            .map(Self::new)
    }

    /// Add an allowed user ID.
    #[must_use]
    pub fn allow_user(mut self, user_id: i64) -> Self {
        self.allowed_users.push(user_id);
        self
    }

    /// Add an allowed chat ID.
    #[must_use]
    pub fn allow_chat(mut self, chat_id: i64) -> Self {
        self.allowed_chats.push(chat_id);
        self
    }

    /// Set whether to convert Markdown replies.
    #[must_use]
    pub const fn parse_markdown(mut self, enabled: bool) -> Self {
        self.parse_markdown = enabled;
        self
    }

    /// Check if a user is allowed.
    #[must_use]
    pub fn is_user_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }

    /// Check if a chat is allowed.
    #[must_use]
    pub fn is_chat_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }
}

/// Telegram channel implementation.
pub struct TelegramChannel {
    base: ChannelBase,
    config: TelegramChannelConfig,
    bot: RwLock<Option<Bot>>,
    shutdown_tx: RwLock<Option<mpsc::Sender<()>>>,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    /// Create a new Telegram channel with the given configuration.
    #[must_use]
    pub fn new(config: TelegramChannelConfig) -> Self {
        Self {
            base: ChannelBase::new("telegram"),
            config,
            bot: RwLock::new(None),
            shutdown_tx: RwLock::new(None),
        }
    }

    /// Extract the command name from a message like `/start@SomeBot args`.
    fn parse_command(text: &str) -> Option<String> {
        let stripped = text.strip_prefix('/')?;
        let name = stripped.split_whitespace().next()?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name.to_lowercase())
        }
    }

    /// Render button rows as a Telegram inline keyboard.
    fn build_keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(rows.iter().map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.selector.clone()))
                .collect::<Vec<_>>()
        }))
    }

    /// Convert Markdown to Telegram-safe HTML.
    fn markdown_to_telegram_html(text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let patterns = MarkdownPatterns::get();

        // Escape HTML special characters first.
        let mut result = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");

        // Bold before italic so ** is consumed before single *.
        result = patterns
            .bold_asterisk
            .replace_all(&result, "<b>$1</b>")
            .into_owned();
        result = patterns
            .bold_underscore
            .replace_all(&result, "<b>$1</b>")
            .into_owned();
        result = patterns
            .italic_asterisk
            .replace_all(&result, "<i>$1</i>")
            .into_owned();

        result
    }

    /// Split a long message into chunks on line boundaries.
    fn split_message(text: &str, max_len: usize) -> Vec<String> {
        if text.len() <= max_len {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for line in text.lines() {
            if current.len() + line.len() + 1 > max_len {
                if !current.is_empty() {
                    chunks.push(current);
                    current = String::new();
                }
                // A single line longer than the limit is chunked by chars.
                if line.len() > max_len {
                    let mut piece = String::new();
                    for ch in line.chars() {
                        if piece.len() + ch.len_utf8() > max_len {
                            chunks.push(piece);
                            piece = String::new();
                        }
                        piece.push(ch);
                    }
                    if !piece.is_empty() {
                        chunks.push(piece);
                    }
                    continue;
                }
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Deliver one outbound message: format, split, attach the keyboard to
    /// the final chunk.
    async fn deliver(
        bot: &Bot,
        msg: &OutboundMessage,
        parse_md: bool,
        max_len: usize,
    ) -> ChannelResult<()> {
        let chat_id: i64 = msg
            .chat_id
            .parse()
            .map_err(|_| ChannelError::send("invalid chat ID"))?;
        let chat_id = ChatId(chat_id);

        let content = if parse_md && msg.format == MessageFormat::Markdown {
            Self::markdown_to_telegram_html(&msg.text)
        } else {
            msg.text.clone()
        };

        let chunks = Self::split_message(&content, max_len);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut request = bot.send_message(chat_id, chunk);
            if parse_md {
                request = request.parse_mode(ParseMode::Html);
            }
            if i == last && !msg.keyboard.is_empty() {
                request = request.reply_markup(Self::build_keyboard(&msg.keyboard));
            }
            request
                .await
                .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        }

        Ok(())
    }
}

/// Cached regex patterns for Markdown to HTML conversion.
struct MarkdownPatterns {
    bold_asterisk: Regex,
    bold_underscore: Regex,
    italic_asterisk: Regex,
}

impl MarkdownPatterns {
    fn new() -> Self {
        Self {
            bold_asterisk: Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"),
            bold_underscore: Regex::new(r"__(.+?)__").expect("valid regex"),
            // Applied after bold, so remaining single asterisks pair up.
            italic_asterisk: Regex::new(r"\*([^*\n]+)\*").expect("valid regex"),
        }
    }

    fn get() -> &'static Self {
        static PATTERNS: OnceLock<MarkdownPatterns> = OnceLock::new();
        PATTERNS.get_or_init(Self::new)
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        self.base.name()
    }

    async fn start(&self, bus: &MessageBus) -> ChannelResult<()> {
        self.base.set_state(ChannelState::Starting).await;

        let bot = Bot::new(&self.config.token);
        *self.bot.write().await = Some(bot.clone());

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        *self.shutdown_tx.write().await = Some(shutdown_tx);

        let allowed_users = self.config.allowed_users.clone();
        let allowed_chats = self.config.allowed_chats.clone();
        let bus_handle = bus.inbound_handle();

        // Subscribe to outbound messages for this channel.
        let mut outbound_rx = bus.subscribe_channel("telegram").await;
        let bot_for_output = bot.clone();
        let max_len = self.config.max_message_length;
        let parse_md = self.config.parse_markdown;

        // Output handler task.
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(msg) = outbound_rx.recv() => {
                        if let Err(e) =
                            Self::deliver(&bot_for_output, &msg, parse_md, max_len).await
                        {
                            error!(error = %e, chat_id = %msg.chat_id, "failed to send telegram message");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("telegram output handler shutting down");
                        break;
                    }
                }
            }
        });

        // Message handler: commands and free text.
        let message_bus_handle = bus_handle.clone();
        let msg_allowed_users = allowed_users.clone();
        let msg_allowed_chats = allowed_chats.clone();
        let message_handler = Update::filter_message().endpoint(move |_bot: Bot, msg: Message| {
            let bus_handle = message_bus_handle.clone();
            let allowed_users = msg_allowed_users.clone();
            let allowed_chats = msg_allowed_chats.clone();

            async move {
                #[allow(clippy::cast_possible_wrap)] // User IDs fit in i64
                let user_id = msg.from.as_ref().map_or(0, |u| u.id.0 as i64);
                let chat_id = msg.chat.id.0;

                let user_allowed = allowed_users.is_empty() || allowed_users.contains(&user_id);
                let chat_allowed = allowed_chats.is_empty() || allowed_chats.contains(&chat_id);

                if !user_allowed || !chat_allowed {
                    debug!(user_id, chat_id, "message from unauthorized user/chat");
                    return Ok::<(), teloxide::RequestError>(());
                }

                let text = match &msg.kind {
                    MessageKind::Common(common) => match &common.media_kind {
                        MediaKind::Text(media) => media.text.clone(),
                        _ => return Ok(()),
                    },
                    _ => return Ok(()),
                };

                let event = match Self::parse_command(&text) {
                    Some(command) => InboundEvent::command(
                        "telegram",
                        user_id.to_string(),
                        chat_id.to_string(),
                        command,
                    ),
                    None => InboundEvent::text(
                        "telegram",
                        user_id.to_string(),
                        chat_id.to_string(),
                        text,
                    ),
                };

                if let Err(e) = bus_handle.publish(event).await {
                    error!(error = %e, "failed to publish telegram message to bus");
                }

                Ok(())
            }
        });

        // Callback-query handler: inline-button selectors.
        let callback_handler =
            Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                let bus_handle = bus_handle.clone();
                let allowed_users = allowed_users.clone();

                async move {
                    #[allow(clippy::cast_possible_wrap)]
                    let user_id = query.from.id.0 as i64;

                    if !(allowed_users.is_empty() || allowed_users.contains(&user_id)) {
                        debug!(user_id, "callback from unauthorized user");
                        return Ok::<(), teloxide::RequestError>(());
                    }

                    // Clear the client's loading state.
                    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                        debug!(error = %e, "failed to answer callback query");
                    }

                    let Some(selector) = query.data else {
                        return Ok(());
                    };

                    let chat_id = query
                        .message
                        .as_ref()
                        .map_or(user_id, |m| m.chat().id.0);

                    let event = InboundEvent::menu_select(
                        "telegram",
                        user_id.to_string(),
                        chat_id.to_string(),
                        selector,
                    );

                    if let Err(e) = bus_handle.publish(event).await {
                        error!(error = %e, "failed to publish callback to bus");
                    }

                    Ok(())
                }
            });

        let handler = dptree::entry()
            .branch(message_handler)
            .branch(callback_handler);

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build();

        tokio::spawn(async move {
            dispatcher.dispatch().await;
        });

        self.base.set_state(ChannelState::Running).await;
        info!("telegram channel started");

        Ok(())
    }

    async fn stop(&self) -> ChannelResult<()> {
        self.base.set_state(ChannelState::Stopping).await;

        {
            let guard = self.shutdown_tx.write().await;
            if let Some(tx) = &*guard {
                let _ = tx.send(()).await;
            }
        }

        *self.bot.write().await = None;

        self.base.set_state(ChannelState::Stopped).await;
        info!("telegram channel stopped");

        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> ChannelResult<()> {
        let bot = self.bot.read().await;
        let bot = bot.as_ref().ok_or(ChannelError::NotConnected)?;

        Self::deliver(
            bot,
            msg,
            self.config.parse_markdown,
            self.config.max_message_length,
        )
        .await?;

        self.base.record_sent().await;
        Ok(())
    }

    async fn status(&self) -> ChannelStatus {
        self.base.build_status().await
    }
}

/// Register a webhook URL with Telegram.
///
/// Pure configuration for production deployments: after this, Telegram
/// pushes updates to the URL instead of being long-polled.
pub async fn register_webhook(token: &str, webhook_url: &url::Url) -> ChannelResult<()> {
    let bot = Bot::new(token);
    bot.set_webhook(webhook_url.clone())
        .drop_pending_updates(true)
        .await
        .map_err(|e| ChannelError::Internal(e.to_string()))?;
    info!(url = %webhook_url, "webhook registered");
    Ok(())
}

/// Remove a previously registered webhook, returning to polling delivery.
pub async fn remove_webhook(token: &str) -> ChannelResult<()> {
    let bot = Bot::new(token);
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .map_err(|e| ChannelError::Internal(e.to_string()))?;
    info!("webhook removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = TelegramChannelConfig::new("token123")
            .allow_user(12345)
            .allow_chat(67890)
            .parse_markdown(false);

        assert_eq!(config.token, "token123");
        assert!(config.is_user_allowed(12345));
        assert!(!config.is_user_allowed(99999));
        assert!(config.is_chat_allowed(67890));
        assert!(!config.parse_markdown);
    }

    #[test]
    fn test_empty_allowlist_allows_all() {
        let config = TelegramChannelConfig::new("token");
        assert!(config.is_user_allowed(12345));
        assert!(config.is_chat_allowed(67890));
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            TelegramChannel::parse_command("/start"),
            Some("start".to_string())
        );
        assert_eq!(
            TelegramChannel::parse_command("/START@SaathiBot extra"),
            Some("start".to_string())
        );
        assert_eq!(TelegramChannel::parse_command("hello"), None);
        assert_eq!(TelegramChannel::parse_command("/"), None);
    }

    #[test]
    fn test_split_message() {
        let short = "Hello, world!";
        let chunks = TelegramChannel::split_message(short, 100);
        assert_eq!(chunks.len(), 1);

        let long = "Line 1\nLine 2\nLine 3\nLine 4";
        let chunks = TelegramChannel::split_message(long, 15);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 15));
    }

    #[test]
    fn test_markdown_to_html() {
        assert_eq!(
            TelegramChannel::markdown_to_telegram_html("**bold**"),
            "<b>bold</b>"
        );
        assert_eq!(
            TelegramChannel::markdown_to_telegram_html("*emphasis*"),
            "<i>emphasis</i>"
        );
        assert_eq!(
            TelegramChannel::markdown_to_telegram_html("<script>"),
            "&lt;script&gt;"
        );
        assert_eq!(
            TelegramChannel::markdown_to_telegram_html("a & b"),
            "a &amp; b"
        );
    }

    #[test]
    fn test_build_keyboard_shape() {
        let rows = vec![
            vec![
                Button::new("A", "sel:a"),
                Button::new("B", "sel:b"),
            ],
            vec![Button::new("C", "sel:c")],
        ];
        let markup = TelegramChannel::build_keyboard(&rows);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 1);
    }
}
