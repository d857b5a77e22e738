//! Channel implementations.

pub mod telegram;

pub use telegram::{TelegramChannel, TelegramChannelConfig};
