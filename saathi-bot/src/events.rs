//! Message events flowing between channels and the router.
//!
//! Inbound events carry one of three payload kinds (command, menu
//! selection, free text); outbound messages carry formatted text plus
//! optional rows of selector-tagged buttons for the channel to render.

use crate::util::generate_message_id;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Payload kind of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    /// A slash command, without the leading `/` (e.g. `start`).
    Command(String),
    /// A button press; the raw selector string as delivered by the platform.
    MenuSelect(String),
    /// A free-text message.
    Text(String),
}

/// An inbound event from a channel to the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Unique event ID.
    pub id: String,
    /// Channel identifier (e.g. "telegram").
    pub channel: String,
    /// Sender's identifier within the channel.
    pub sender_id: String,
    /// Chat/conversation identifier.
    pub chat_id: String,
    /// Event payload.
    pub kind: InboundKind,
    /// Timestamp when the event was received.
    pub timestamp: SystemTime,
}

impl InboundEvent {
    /// Create a new inbound event.
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        kind: InboundKind,
    ) -> Self {
        Self {
            id: generate_message_id(),
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            kind,
            timestamp: SystemTime::now(),
        }
    }

    /// Shorthand for a command event.
    pub fn command(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self::new(
            channel,
            sender_id,
            chat_id,
            InboundKind::Command(command.into()),
        )
    }

    /// Shorthand for a free-text event.
    pub fn text(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(channel, sender_id, chat_id, InboundKind::Text(content.into()))
    }

    /// Shorthand for a menu-selection event.
    pub fn menu_select(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self::new(
            channel,
            sender_id,
            chat_id,
            InboundKind::MenuSelect(selector.into()),
        )
    }

    /// Unique session key for this conversation.
    #[must_use]
    pub fn session_key(&self) -> String {
        format!("{}:{}", self.channel, self.chat_id)
    }
}

/// A labeled button tagged with a selector payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Text shown on the button.
    pub label: String,
    /// Opaque selector delivered back when the button is pressed.
    pub selector: String,
}

impl Button {
    /// Create a new button.
    pub fn new(label: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selector: selector.into(),
        }
    }
}

/// Message format hint for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// Plain text, no formatting.
    Plain,
    /// Markdown formatted text.
    #[default]
    Markdown,
}

/// An outbound message from the router to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Unique message ID.
    pub id: String,
    /// Target channel identifier.
    pub channel: String,
    /// Target chat/conversation identifier.
    pub chat_id: String,
    /// Message text content.
    pub text: String,
    /// Button rows to render under the message. Empty means no keyboard.
    #[serde(default)]
    pub keyboard: Vec<Vec<Button>>,
    /// Message format hint for the channel.
    pub format: MessageFormat,
}

impl OutboundMessage {
    /// Create a new outbound message.
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_message_id(),
            channel: channel.into(),
            chat_id: chat_id.into(),
            text: text.into(),
            keyboard: Vec::new(),
            format: MessageFormat::default(),
        }
    }

    /// Create a response addressed to the sender of an inbound event.
    pub fn reply_to(event: &InboundEvent, text: impl Into<String>) -> Self {
        Self::new(event.channel.clone(), event.chat_id.clone(), text)
    }

    /// Attach button rows.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Set the message format.
    #[must_use]
    pub const fn with_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_event_creation() {
        let event = InboundEvent::text("telegram", "user123", "chat456", "Hello!");
        assert_eq!(event.channel, "telegram");
        assert_eq!(event.sender_id, "user123");
        assert_eq!(event.chat_id, "chat456");
        assert_eq!(event.kind, InboundKind::Text("Hello!".to_string()));
        assert_eq!(event.session_key(), "telegram:chat456");
    }

    #[test]
    fn test_command_event() {
        let event = InboundEvent::command("telegram", "u", "c", "start");
        assert_eq!(event.kind, InboundKind::Command("start".to_string()));
    }

    #[test]
    fn test_outbound_reply_addresses_sender() {
        let inbound = InboundEvent::menu_select("telegram", "user123", "chat456", "menu:main");
        let outbound = OutboundMessage::reply_to(&inbound, "Welcome back")
            .with_keyboard(vec![vec![Button::new("Main Menu", "menu:main")]]);

        assert_eq!(outbound.channel, "telegram");
        assert_eq!(outbound.chat_id, "chat456");
        assert_eq!(outbound.keyboard.len(), 1);
        assert_eq!(outbound.keyboard[0][0].selector, "menu:main");
    }

    #[test]
    fn test_event_id_uniqueness() {
        let a = InboundEvent::text("t", "u", "c", "x");
        let b = InboundEvent::text("t", "u", "c", "x");
        assert_ne!(a.id, b.id);
    }
}
