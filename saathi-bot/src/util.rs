//! Small shared utilities.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in milliseconds.
#[must_use]
pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Generate a unique message ID.
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg-{}", uuid::Uuid::new_v4().simple())
}

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis when anything was cut.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
