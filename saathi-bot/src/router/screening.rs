//! Crisis keyword screening for free-text messages.
//!
//! A case-insensitive substring match against a fixed English denylist.
//! No stemming, no negation handling, no multilingual coverage; both
//! false negatives (paraphrase, non-English phrasing) and false positives
//! are possible and accepted.

/// Phrases that short-circuit free text into the crisis-alert path.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "hurt myself",
    "self harm",
    "cutting",
    "overdose",
    "jump",
    "hanging",
    "worthless",
    "hopeless",
    "can't go on",
    "better off dead",
    "no point living",
];

/// Returns true if `text` contains any denylist phrase, case-insensitively.
#[must_use]
pub fn crisis_scan(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_keywords_case_insensitively() {
        assert!(crisis_scan("I want to KILL MYSELF now"));
        assert!(crisis_scan("everything feels hopeless"));
        assert!(crisis_scan("I keep thinking about Suicide"));
        assert!(crisis_scan("i just can't go on like this"));
    }

    #[test]
    fn test_ignores_benign_text() {
        assert!(!crisis_scan("I had a great day"));
        assert!(!crisis_scan(""));
        assert!(!crisis_scan("what's for dinner?"));
    }

    #[test]
    fn test_substring_matching_has_known_false_positives() {
        // Phrase-level matching, not intent detection.
        assert!(crisis_scan("that exam made me want to end it all, lol"));
    }
}
