//! Unified error types for saathi-bot.
//!
//! Module-specific errors convert into the umbrella [`BotError`] type, so
//! callers near the top of the stack can use the [`Result`] alias while
//! lower layers keep narrow error enums.

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for saathi-bot operations.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Message bus error.
    #[error("bus: {0}")]
    Bus(#[from] BusError),

    /// Channel error.
    #[error("channel: {0}")]
    Channel(#[from] ChannelError),

    /// Completion-service error.
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Session/storage error.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl BotError {
    /// Create a config error from a string.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(ConfigError::Invalid(msg.into()))
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias for saathi-bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

// ============================================================================
// Message Bus Errors
// ============================================================================

/// Error type for message bus operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Failed to send an inbound event.
    #[error("inbound channel closed")]
    InboundClosed,

    /// Failed to send an outbound message.
    #[error("outbound channel closed")]
    OutboundClosed,
}

/// Result type for message bus operations.
pub type BusResult<T> = std::result::Result<T, BusError>;

// ============================================================================
// Channel Errors
// ============================================================================

/// Error type for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to start the channel.
    #[error("start failed: {0}")]
    StartFailed(String),

    /// Failed to stop the channel.
    #[error("stop failed: {0}")]
    StopFailed(String),

    /// Failed to send a message.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Configuration error.
    #[error("config: {0}")]
    Config(String),

    /// Channel is not connected.
    #[error("not connected")]
    NotConnected,

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl ChannelError {
    /// Create a start failed error.
    #[inline]
    pub fn start(msg: impl Into<String>) -> Self {
        Self::StartFailed(msg.into())
    }

    /// Create a send failed error.
    #[inline]
    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

/// Result type for channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

// ============================================================================
// Completion Service Errors
// ============================================================================

/// Error type for completion-service calls.
///
/// Each variant maps to a distinct user-facing fallback string; see
/// [`crate::router::fallback_message`].
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// API key not configured.
    #[error("API key not configured")]
    MissingApiKey,

    /// The call exceeded its deadline and was abandoned.
    #[error("timeout after {0}s")]
    Timeout(u64),

    /// Non-success HTTP status from the service.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Transport-level failure (DNS, TLS, connect, ...).
    #[error("transport: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for completion-service calls.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field or secret.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Storage Errors
// ============================================================================

/// Error type for session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let bus_err = BusError::InboundClosed;
        let bot_err: BotError = bus_err.into();
        assert!(matches!(bot_err, BotError::Bus(_)));

        let channel_err = ChannelError::NotConnected;
        let bot_err: BotError = channel_err.into();
        assert!(matches!(bot_err, BotError::Channel(_)));

        let completion_err = CompletionError::Timeout(30);
        let bot_err: BotError = completion_err.into();
        assert!(matches!(bot_err, BotError::Completion(_)));
    }

    #[test]
    fn test_error_helpers() {
        let err = BotError::config("invalid value");
        assert!(matches!(err, BotError::Config(_)));

        let err = ChannelError::send("failed");
        assert!(matches!(err, ChannelError::SendFailed(_)));
    }

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: overloaded");
    }
}
