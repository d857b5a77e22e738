//! Mood and crisis response policy.
//!
//! The canned empathic messages, the mood→activity suggestion table, the
//! crisis escalation gate, mood trend/history summaries, and the mapping
//! from completion failures to fallback replies.

use crate::catalog::Activity;
use crate::error::CompletionError;
use crate::session::{Mood, SessionData};

/// How many history entries the history view shows.
pub const HISTORY_WINDOW: usize = 10;

/// How many recent entries feed the trend summary.
pub const TREND_WINDOW: usize = 7;

/// Cautionary line appended when the crisis gate fires on a check-in.
pub const CRISIS_CAUTION_LINE: &str =
    "⚠️ *I notice you're experiencing intense emotions. Please know that support is available.*";

/// Fallback reply for a completion-service timeout.
pub const FALLBACK_TIMEOUT: &str = "⏰ I'm taking a bit longer to respond. Please try again.";

/// Fallback reply for an HTTP-level completion failure.
pub const FALLBACK_SERVICE: &str =
    "🔧 I'm experiencing technical difficulties. Please try again later.";

/// Fallback reply for a malformed completion response.
pub const FALLBACK_MALFORMED: &str =
    "I'm having trouble processing your request right now. Please try again.";

/// Fallback reply for any other completion failure.
pub const FALLBACK_GENERIC: &str = "❌ Something went wrong. Please try again.";

/// Reply sent when event processing itself fails.
pub const PROCESSING_ERROR_REPLY: &str =
    "🔧 I encountered an error. Please try again or contact support if the issue persists.";

/// Map a completion failure to its canned fallback string.
#[must_use]
pub fn fallback_message(error: &CompletionError) -> &'static str {
    match error {
        CompletionError::Timeout(_) => FALLBACK_TIMEOUT,
        CompletionError::Status { .. } | CompletionError::MissingApiKey => FALLBACK_SERVICE,
        CompletionError::Malformed(_) => FALLBACK_MALFORMED,
        CompletionError::Transport(_) => FALLBACK_GENERIC,
    }
}

/// Whether a check-in should surface the crisis-support affordance.
///
/// This threshold gates escalation to crisis resources: heavy negative
/// moods at high intensity, or maximum intensity for any mood.
#[must_use]
pub fn needs_crisis_support(mood: Mood, level: u8) -> bool {
    (matches!(mood, Mood::Sad | Mood::Angry | Mood::Overwhelmed) && level >= 4) || level == 5
}

/// Canned empathic message for a `(mood, intensity)` pair.
///
/// Intensity buckets into high (≥ 4) and low; each mood has one message
/// per bucket.
#[must_use]
pub const fn empathy_message(mood: Mood, level: u8) -> &'static str {
    let high = level >= 4;
    match mood {
        Mood::Happy => {
            if high {
                "🌟 Wonderful! Your happiness is radiating. What's bringing you such joy today?"
            } else {
                "😊 I'm glad you're feeling happy! Even small moments of joy are precious."
            }
        }
        Mood::Sad => {
            if high {
                "💙 I can feel your sadness, and I want you to know you're not alone. Let's work through this together."
            } else {
                "😢 It's okay to feel sad sometimes. Your emotions are valid. Would you like to talk about it?"
            }
        }
        Mood::Anxious => {
            if high {
                "🫂 Anxiety can be overwhelming. Let's focus on grounding techniques to help you feel safer."
            } else {
                "😰 A little anxiety is normal. Let's try some calming techniques."
            }
        }
        Mood::Angry => {
            if high {
                "🔥 I can sense your anger is intense. Let's find healthy ways to process these feelings."
            } else {
                "😡 It's natural to feel frustrated sometimes. What's bothering you?"
            }
        }
        Mood::Peaceful => {
            if high {
                "🕊️ What a wonderful state of peace! This is your inner strength shining through."
            } else {
                "😌 A sense of peace is beautiful. Cherish this calm moment."
            }
        }
        Mood::Tired => {
            if high {
                "💤 You sound exhausted. Rest is not selfish - it's necessary for your wellbeing."
            } else {
                "😴 A little tiredness is normal. Make sure you're getting enough rest."
            }
        }
        Mood::Overwhelmed => {
            if high {
                "🌊 Overwhelm can feel like drowning. Let's find your life raft with some grounding techniques."
            } else {
                "😵‍💫 Feeling a bit overwhelmed? Let's break things down into smaller steps."
            }
        }
        Mood::Grateful => {
            if high {
                "✨ Your gratitude is powerful! This positive energy will attract more good things."
            } else {
                "🙏 Gratitude is a beautiful feeling, even in small doses."
            }
        }
    }
}

/// Follow-up activities suggested for a mood.
#[must_use]
pub const fn suggested_activities(mood: Mood) -> &'static [Activity] {
    match mood {
        Mood::Anxious | Mood::Overwhelmed => &[Activity::Breathing, Activity::Grounding],
        Mood::Sad | Mood::Angry => &[Activity::Movement, Activity::Gratitude],
        Mood::Tired => &[Activity::Movement, Activity::Affirmations],
        Mood::Happy | Mood::Peaceful | Mood::Grateful => {
            &[Activity::Gratitude, Activity::Breathing]
        }
    }
}

/// One-line mood trend summary over the most recent entries.
#[must_use]
pub fn trend_summary(session: &SessionData) -> String {
    if session.mood_history.is_empty() {
        return "📊 Start tracking your mood to see patterns and insights.".to_string();
    }

    let recent: Vec<_> = session.recent_moods(TREND_WINDOW).collect();
    if recent.len() < 3 {
        return "📊 Keep tracking to see your mood patterns.".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let avg = recent.iter().map(|e| f64::from(e.intensity)).sum::<f64>() / recent.len() as f64;

    if avg >= 4.0 {
        "📈 Your recent mood trend shows high intensity emotions. Consider wellness activities."
            .to_string()
    } else if avg >= 3.0 {
        "📊 Your mood has been moderate recently. You're doing well!".to_string()
    } else {
        "📉 Your recent moods show lower intensity. Let's work on some uplifting activities."
            .to_string()
    }
}

/// Mood history view text: up to [`HISTORY_WINDOW`] most recent entries,
/// newest first, one line each.
#[must_use]
pub fn history_text(session: &SessionData) -> String {
    if session.mood_history.is_empty() {
        return "No mood entries yet. Start tracking to see your patterns!".to_string();
    }

    session
        .recent_moods(HISTORY_WINDOW)
        .map(|entry| {
            format!(
                "• {}: {} ({}/5)",
                entry.recorded_at.format("%m/%d %H:%M"),
                entry.mood.name(),
                entry.intensity
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Context summary passed along with free text to the completion service.
#[must_use]
pub fn context_summary(session: &SessionData) -> String {
    let mut context = String::new();

    if let Some(module) = session.active_module {
        context.push_str(&format!("Active module: {}. ", module.key()));
    }

    if let Some(entry) = session.last_mood() {
        context.push_str(&format!(
            "Recent mood: {} (intensity: {}/5). ",
            entry.mood.name(),
            entry.intensity
        ));
    }

    if session.wellness_streak > 0 {
        context.push_str(&format!(
            "Wellness streak: {} activities. ",
            session.wellness_streak
        ));
    }

    context.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Module;

    #[test]
    fn test_crisis_gate_exact_boundary() {
        let heavy = [Mood::Sad, Mood::Angry, Mood::Overwhelmed];
        for mood in Mood::ALL {
            for level in 1..=5u8 {
                let expected = (heavy.contains(&mood) && level >= 4) || level == 5;
                assert_eq!(
                    needs_crisis_support(mood, level),
                    expected,
                    "mood {mood:?} level {level}"
                );
            }
        }
    }

    #[test]
    fn test_empathy_buckets_differ() {
        for mood in Mood::ALL {
            assert_ne!(empathy_message(mood, 1), empathy_message(mood, 5));
            // Bucket boundary sits between 3 and 4.
            assert_eq!(empathy_message(mood, 4), empathy_message(mood, 5));
            assert_eq!(empathy_message(mood, 1), empathy_message(mood, 3));
        }
    }

    #[test]
    fn test_suggestions_are_bounded() {
        for mood in Mood::ALL {
            let suggestions = suggested_activities(mood);
            assert!(suggestions.len() <= 2);
        }
    }

    #[test]
    fn test_trend_summary_thresholds() {
        let mut session = SessionData::new("t:1");
        assert!(trend_summary(&session).contains("Start tracking"));

        session.record_mood(Mood::Happy, 3);
        session.record_mood(Mood::Happy, 3);
        assert!(trend_summary(&session).contains("Keep tracking"));

        session.record_mood(Mood::Happy, 3);
        assert!(trend_summary(&session).contains("moderate"));

        for _ in 0..7 {
            session.record_mood(Mood::Overwhelmed, 5);
        }
        assert!(trend_summary(&session).contains("high intensity"));

        let mut low = SessionData::new("t:2");
        for _ in 0..4 {
            low.record_mood(Mood::Tired, 1);
        }
        assert!(trend_summary(&low).contains("lower intensity"));
    }

    #[test]
    fn test_history_windowing() {
        let mut session = SessionData::new("t:1");
        for _ in 0..15 {
            session.record_mood(Mood::Happy, 2);
        }
        session.record_mood(Mood::Sad, 4);

        let text = history_text(&session);
        assert_eq!(text.lines().count(), HISTORY_WINDOW);
        // Newest entry first.
        assert!(text.lines().next().unwrap().contains("Sad"));
    }

    #[test]
    fn test_history_smaller_than_window() {
        let mut session = SessionData::new("t:1");
        session.record_mood(Mood::Happy, 2);
        session.record_mood(Mood::Tired, 3);

        let text = history_text(&session);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("Tired"));
    }

    #[test]
    fn test_context_summary_parts() {
        let mut session = SessionData::new("t:1");
        assert!(context_summary(&session).is_empty());

        session.set_module(Some(Module::Mitra));
        session.record_mood(Mood::Anxious, 4);
        session.complete_activity();

        let context = context_summary(&session);
        assert!(context.contains("Active module: mitra."));
        assert!(context.contains("Recent mood: Anxious (intensity: 4/5)."));
        assert!(context.contains("Wellness streak: 1 activities."));
    }

    #[test]
    fn test_fallback_mapping_is_distinct() {
        assert_eq!(
            fallback_message(&CompletionError::Timeout(30)),
            FALLBACK_TIMEOUT
        );
        assert_eq!(
            fallback_message(&CompletionError::Status {
                status: 500,
                body: String::new()
            }),
            FALLBACK_SERVICE
        );
        assert_eq!(
            fallback_message(&CompletionError::Malformed(String::new())),
            FALLBACK_MALFORMED
        );
        assert_ne!(FALLBACK_TIMEOUT, FALLBACK_SERVICE);
        assert_ne!(FALLBACK_TIMEOUT, FALLBACK_MALFORMED);
        assert_ne!(FALLBACK_SERVICE, FALLBACK_MALFORMED);
    }
}
