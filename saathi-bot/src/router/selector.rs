//! Button selector vocabulary.
//!
//! Selectors travel over the wire as opaque strings in a hierarchical
//! prefix namespace (`mood:…`, `intensity:…`, `activity:…`, …). They are
//! decoded into [`Selector`] exactly once at the router boundary so the
//! dispatch match is exhaustive; strings that decode to nothing are
//! dropped there.

use crate::catalog::Activity;
use crate::session::{Language, Module, Mood};

/// A decoded button selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Open the mood check-in grid.
    MoodMenu,
    /// A mood was picked; ask for intensity.
    Mood(Mood),
    /// A mood/intensity pair was picked; log the entry.
    Intensity {
        /// The selected emotion.
        mood: Mood,
        /// Intensity on the 1–5 scale.
        level: u8,
    },
    /// Show the mood history window.
    MoodHistory,
    /// Open the wellness activities menu.
    WellnessMenu,
    /// Show instructions for one activity.
    Activity(Activity),
    /// An activity was completed.
    Completed(Activity),
    /// Show crisis support resources.
    CrisisSupport,
    /// Show the regional crisis-line listing.
    LocalResources,
    /// Open the language picker.
    LanguageMenu,
    /// Set the preferred language.
    SetLanguage(Language),
    /// Enter a top-level module.
    Module(Module),
    /// Return to the root menu.
    MainMenu,
    /// Show the about blurb.
    About,
}

impl Selector {
    /// Decode a raw selector string.
    ///
    /// Families are tried in a fixed priority order, first match wins;
    /// anything left over decodes to `None` and is ignored upstream.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        // Mood family.
        if let Some(key) = raw.strip_prefix("mood:") {
            return Mood::from_key(key).map(Self::Mood);
        }

        // Intensity family: "intensity:<mood>:<level>".
        if let Some(rest) = raw.strip_prefix("intensity:") {
            let (mood_key, level_str) = rest.split_once(':')?;
            let mood = Mood::from_key(mood_key)?;
            let level: u8 = level_str.parse().ok()?;
            if !(1..=5).contains(&level) {
                return None;
            }
            return Some(Self::Intensity { mood, level });
        }

        // Activity family.
        if let Some(key) = raw.strip_prefix("activity:") {
            return Activity::from_key(key).map(Self::Activity);
        }
        if let Some(key) = raw.strip_prefix("completed:") {
            return Activity::from_key(key).map(Self::Completed);
        }

        // Crisis family.
        match raw {
            "crisis:support" => return Some(Self::CrisisSupport),
            "crisis:resources" => return Some(Self::LocalResources),
            _ => {}
        }

        // Language-set family.
        if let Some(key) = raw.strip_prefix("lang:") {
            return Language::from_key(key).map(Self::SetLanguage);
        }

        // Navigation.
        if let Some(key) = raw.strip_prefix("module:") {
            return Module::from_key(key).map(Self::Module);
        }
        match raw {
            "menu:main" => Some(Self::MainMenu),
            "menu:mood" => Some(Self::MoodMenu),
            "menu:history" => Some(Self::MoodHistory),
            "menu:wellness" => Some(Self::WellnessMenu),
            "menu:language" => Some(Self::LanguageMenu),
            "about" => Some(Self::About),
            _ => None,
        }
    }

    /// Encode this selector back to its wire string.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::MoodMenu => "menu:mood".to_string(),
            Self::Mood(mood) => format!("mood:{}", mood.key()),
            Self::Intensity { mood, level } => format!("intensity:{}:{level}", mood.key()),
            Self::MoodHistory => "menu:history".to_string(),
            Self::WellnessMenu => "menu:wellness".to_string(),
            Self::Activity(activity) => format!("activity:{}", activity.key()),
            Self::Completed(activity) => format!("completed:{}", activity.key()),
            Self::CrisisSupport => "crisis:support".to_string(),
            Self::LocalResources => "crisis:resources".to_string(),
            Self::LanguageMenu => "menu:language".to_string(),
            Self::SetLanguage(language) => format!("lang:{}", language.key()),
            Self::Module(module) => format!("module:{}", module.key()),
            Self::MainMenu => "menu:main".to_string(),
            Self::About => "about".to_string(),
        }
    }
}
