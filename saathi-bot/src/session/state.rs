//! Session domain types: modules, languages, moods, and the per-user record.

use crate::util::timestamp_ms;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level companion module a conversation can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Menstrual and hormonal health companion.
    Sakhi,
    /// Learning assistant.
    Educare,
    /// Mental health support.
    Mitra,
}

impl Module {
    /// All modules, in menu order.
    pub const ALL: [Self; 3] = [Self::Sakhi, Self::Educare, Self::Mitra];

    /// Stable key used in selector payloads.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sakhi => "sakhi",
            Self::Educare => "educare",
            Self::Mitra => "mitra",
        }
    }

    /// Parse a module from its selector key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Menu label including the module emoji.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sakhi => "🌸 Sakhi - Menstrual Health",
            Self::Educare => "📚 EduCare - Learning Assistant",
            Self::Mitra => "💚 Mitra - Mental Health Support",
        }
    }
}

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English (default).
    #[default]
    English,
    /// Hindi.
    Hindi,
    /// Bengali.
    Bengali,
    /// Tamil.
    Tamil,
    /// Telugu.
    Telugu,
    /// Marathi.
    Marathi,
    /// Gujarati.
    Gujarati,
    /// Kannada.
    Kannada,
    /// Malayalam.
    Malayalam,
    /// Punjabi.
    Punjabi,
}

impl Language {
    /// All supported languages, in menu order.
    pub const ALL: [Self; 10] = [
        Self::English,
        Self::Hindi,
        Self::Bengali,
        Self::Tamil,
        Self::Telugu,
        Self::Marathi,
        Self::Gujarati,
        Self::Kannada,
        Self::Malayalam,
        Self::Punjabi,
    ];

    /// Stable key used in selector payloads and config files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hindi => "hindi",
            Self::Bengali => "bengali",
            Self::Tamil => "tamil",
            Self::Telugu => "telugu",
            Self::Marathi => "marathi",
            Self::Gujarati => "gujarati",
            Self::Kannada => "kannada",
            Self::Malayalam => "malayalam",
            Self::Punjabi => "punjabi",
        }
    }

    /// Parse a language from its selector key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.key() == key)
    }

    /// Native display name.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "हिंदी",
            Self::Bengali => "বাংলা",
            Self::Tamil => "தமிழ்",
            Self::Telugu => "తెలుగు",
            Self::Marathi => "मराठी",
            Self::Gujarati => "ગુજરાતી",
            Self::Kannada => "ಕನ್ನಡ",
            Self::Malayalam => "മലയാളം",
            Self::Punjabi => "ਪੰਜਾਬੀ",
        }
    }

    /// BCP 47 locale code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Bengali => "bn",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Marathi => "mr",
            Self::Gujarati => "gu",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Punjabi => "pa",
        }
    }
}

/// Emotions offered in the mood check-in grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Happy.
    Happy,
    /// Sad.
    Sad,
    /// Anxious.
    Anxious,
    /// Angry.
    Angry,
    /// Peaceful.
    Peaceful,
    /// Tired.
    Tired,
    /// Overwhelmed.
    Overwhelmed,
    /// Grateful.
    Grateful,
}

impl Mood {
    /// All moods, in check-in grid order.
    pub const ALL: [Self; 8] = [
        Self::Happy,
        Self::Sad,
        Self::Anxious,
        Self::Angry,
        Self::Peaceful,
        Self::Tired,
        Self::Overwhelmed,
        Self::Grateful,
    ];

    /// Stable key used in selector payloads.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Angry => "angry",
            Self::Peaceful => "peaceful",
            Self::Tired => "tired",
            Self::Overwhelmed => "overwhelmed",
            Self::Grateful => "grateful",
        }
    }

    /// Parse a mood from its selector key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Title-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Anxious => "Anxious",
            Self::Angry => "Angry",
            Self::Peaceful => "Peaceful",
            Self::Tired => "Tired",
            Self::Overwhelmed => "Overwhelmed",
            Self::Grateful => "Grateful",
        }
    }

    /// Emoji shown on the check-in button.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Anxious => "😰",
            Self::Angry => "😡",
            Self::Peaceful => "😌",
            Self::Tired => "😴",
            Self::Overwhelmed => "😵‍💫",
            Self::Grateful => "🤗",
        }
    }
}

/// A single logged mood check-in. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// The selected emotion.
    pub mood: Mood,
    /// Intensity on a 1–5 scale.
    pub intensity: u8,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl MoodEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(mood: Mood, intensity: u8) -> Self {
        Self {
            mood,
            intensity,
            recorded_at: Utc::now(),
        }
    }
}

/// Per-user mutable conversation record.
///
/// Created lazily on first contact; lives only in the configured store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Session key (e.g. `"telegram:123456"`).
    pub key: String,
    /// Which top-level module is active, if any.
    pub active_module: Option<Module>,
    /// Preferred language for completion replies.
    pub language: Language,
    /// Append-only mood log, insertion order = chronological.
    pub mood_history: Vec<MoodEntry>,
    /// Count of completed wellness activities. Only ever increases.
    pub wellness_streak: u32,
    /// Ordered free-text notes.
    pub notes: Vec<String>,
    /// Whether crisis resources have been shown to this user.
    pub crisis_support_shown: bool,
    /// Session creation timestamp (Unix milliseconds).
    pub created_at: u64,
    /// Last activity timestamp (Unix milliseconds).
    pub updated_at: u64,
}

impl SessionData {
    /// Create a new session with default field values.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let now = timestamp_ms();
        Self {
            key: key.into(),
            active_module: None,
            language: Language::default(),
            mood_history: Vec::new(),
            wellness_streak: 0,
            notes: Vec::new(),
            crisis_support_shown: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reset every field to its default, keeping the key and creation time.
    pub fn reset(&mut self) {
        let key = std::mem::take(&mut self.key);
        let created_at = self.created_at;
        *self = Self::new(key);
        self.created_at = created_at;
    }

    fn touch(&mut self) {
        self.updated_at = timestamp_ms();
    }

    /// Set the active module.
    pub fn set_module(&mut self, module: Option<Module>) {
        self.active_module = module;
        self.touch();
    }

    /// Set the preferred language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.touch();
    }

    /// Append a mood entry stamped with the current time.
    pub fn record_mood(&mut self, mood: Mood, intensity: u8) {
        debug_assert!((1..=5).contains(&intensity));
        self.mood_history.push(MoodEntry::new(mood, intensity));
        self.touch();
    }

    /// Record a completed wellness activity.
    pub fn complete_activity(&mut self) {
        self.wellness_streak += 1;
        self.touch();
    }

    /// Append a free-text note.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
        self.touch();
    }

    /// Mark that crisis resources have been displayed.
    pub fn mark_crisis_shown(&mut self) {
        self.crisis_support_shown = true;
        self.touch();
    }

    /// The most recent mood entry, if any.
    #[must_use]
    pub fn last_mood(&self) -> Option<&MoodEntry> {
        self.mood_history.last()
    }

    /// Up to `n` most recent mood entries, newest first.
    pub fn recent_moods(&self, n: usize) -> impl Iterator<Item = &MoodEntry> {
        self.mood_history.iter().rev().take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = SessionData::new("telegram:1");
        assert_eq!(session.active_module, None);
        assert_eq!(session.language, Language::English);
        assert!(session.mood_history.is_empty());
        assert_eq!(session.wellness_streak, 0);
        assert!(!session.crisis_support_shown);
    }

    #[test]
    fn test_reset_keeps_key() {
        let mut session = SessionData::new("telegram:1");
        session.set_module(Some(Module::Mitra));
        session.record_mood(Mood::Happy, 3);
        session.complete_activity();

        session.reset();
        assert_eq!(session.key, "telegram:1");
        assert_eq!(session.active_module, None);
        assert!(session.mood_history.is_empty());
        assert_eq!(session.wellness_streak, 0);
    }

    #[test]
    fn test_streak_only_grows() {
        let mut session = SessionData::new("t:1");
        session.complete_activity();
        session.complete_activity();
        assert_eq!(session.wellness_streak, 2);
    }

    #[test]
    fn test_recent_moods_newest_first() {
        let mut session = SessionData::new("t:1");
        session.record_mood(Mood::Sad, 2);
        session.record_mood(Mood::Happy, 4);
        session.record_mood(Mood::Tired, 1);

        let recent: Vec<_> = session.recent_moods(2).collect();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].mood, Mood::Tired);
        assert_eq!(recent[1].mood, Mood::Happy);
    }

    #[test]
    fn test_notes_preserve_order() {
        let mut session = SessionData::new("t:1");
        session.add_note("first");
        session.add_note("second");
        assert_eq!(session.notes, vec!["first", "second"]);
    }

    #[test]
    fn test_key_roundtrips() {
        for module in Module::ALL {
            assert_eq!(Module::from_key(module.key()), Some(module));
        }
        for language in Language::ALL {
            assert_eq!(Language::from_key(language.key()), Some(language));
        }
        for mood in Mood::ALL {
            assert_eq!(Mood::from_key(mood.key()), Some(mood));
        }
        assert_eq!(Mood::from_key("bored"), None);
    }

    #[test]
    fn test_language_metadata() {
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::Hindi.native_name(), "हिंदी");
        assert_eq!(Language::ALL.len(), 10);
    }
}
