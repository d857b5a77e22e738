//! Interaction routing: selector decoding, menu flows, the mood/crisis
//! response policy, and the loop that drives it all from the bus.

mod engine;
mod loop_runner;
mod policy;
mod screening;
mod selector;

pub use engine::{InteractionRouter, Reply};
pub use loop_runner::{RouterLoop, RouterLoopConfig};
pub use policy::{
    CRISIS_CAUTION_LINE, FALLBACK_GENERIC, FALLBACK_MALFORMED, FALLBACK_SERVICE, FALLBACK_TIMEOUT,
    HISTORY_WINDOW, PROCESSING_ERROR_REPLY, TREND_WINDOW, context_summary, empathy_message,
    fallback_message, history_text, needs_crisis_support, suggested_activities, trend_summary,
};
pub use screening::{CRISIS_KEYWORDS, crisis_scan};
pub use selector::Selector;
