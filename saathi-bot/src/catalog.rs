//! Static content catalogs: wellness activities and crisis resources.

use serde::{Deserialize, Serialize};

/// Wellness techniques offered from the activities menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// 4-7-8 breathing.
    Breathing,
    /// 5-4-3-2-1 grounding.
    Grounding,
    /// Gratitude practice.
    Gratitude,
    /// Gentle movement.
    Movement,
    /// Calming music.
    Music,
    /// Positive affirmations.
    Affirmations,
}

impl Activity {
    /// All activities, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Breathing,
        Self::Grounding,
        Self::Gratitude,
        Self::Movement,
        Self::Music,
        Self::Affirmations,
    ];

    /// Stable key used in selector payloads.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Breathing => "breathing",
            Self::Grounding => "grounding",
            Self::Gratitude => "gratitude",
            Self::Movement => "movement",
            Self::Music => "music",
            Self::Affirmations => "affirmations",
        }
    }

    /// Parse an activity from its selector key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Title shown in menus and instruction payloads.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Breathing => "🫁 Deep Breathing Exercise",
            Self::Grounding => "🌱 5-4-3-2-1 Grounding Technique",
            Self::Gratitude => "🙏 Gratitude Practice",
            Self::Movement => "🚶 Gentle Movement",
            Self::Music => "🎵 Calming Music Therapy",
            Self::Affirmations => "📖 Positive Affirmations",
        }
    }

    /// Short display name without the emoji, for streak congratulations.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Breathing => "Breathing Exercise",
            Self::Grounding => "Grounding Technique",
            Self::Gratitude => "Gratitude Practice",
            Self::Movement => "Gentle Movement",
            Self::Music => "Calming Music",
            Self::Affirmations => "Positive Affirmations",
        }
    }
}

/// Full instructional text for a wellness activity.
#[must_use]
pub fn activity_instructions(activity: Activity) -> String {
    let (description, steps): (&str, &[&str]) = match activity {
        Activity::Breathing => (
            "A simple 4-7-8 breathing technique to calm anxiety",
            &[
                "1. Sit comfortably and close your eyes",
                "2. Inhale through nose for 4 counts",
                "3. Hold your breath for 7 counts",
                "4. Exhale through mouth for 8 counts",
                "5. Repeat 3-4 times",
            ],
        ),
        Activity::Grounding => (
            "Ground yourself in the present moment",
            &[
                "5 things you can SEE around you",
                "4 things you can TOUCH",
                "3 things you can HEAR",
                "2 things you can SMELL",
                "1 thing you can TASTE",
            ],
        ),
        Activity::Gratitude => (
            "Shift focus to positive aspects of life",
            &[
                "1. Think of 3 things you're grateful for today",
                "2. Write them down or say them aloud",
                "3. Feel the emotion of gratitude",
                "4. Notice how this changes your mood",
            ],
        ),
        Activity::Movement => (
            "Light physical activity to boost mood",
            &[
                "1. Stand up and stretch your arms",
                "2. Take 10 deep breaths while moving",
                "3. Walk around for 2-3 minutes",
                "4. Notice how your body feels",
            ],
        ),
        Activity::Music => (
            "Let sound slow your thoughts down",
            &[
                "1. Put on soft, calming music",
                "2. Listen for 5-10 minutes",
                "3. Focus on the melody and let it wash over you",
            ],
        ),
        Activity::Affirmations => (
            "Replace the inner critic with kinder words",
            &[
                "Repeat these affirmations:",
                "• I am worthy of love and respect",
                "• I am stronger than my challenges",
                "• I choose peace over worry",
                "• I am enough, just as I am",
            ],
        ),
    };

    format!(
        "{}\n\n{}\n\n*Instructions:*\n{}\n\nTake your time and be gentle with yourself. 💚",
        activity.title(),
        description,
        steps.join("\n")
    )
}

/// Fixed block of hotline numbers and immediate-action guidance.
///
/// Deliberately independent of language and mood state.
pub const CRISIS_SUPPORT_TEXT: &str = "\
🆘 *Immediate Crisis Support*

**You are not alone. Your life has value.**

If you're having thoughts of self-harm or suicide, please reach out immediately:

🇺🇸 **US Crisis Lifeline:** 988
🇬🇧 **UK Samaritans:** 116 123
🇮🇳 **India AASRA:** 91-9820466726
🌍 **International:** befrienders.org

**Right now, you can:**
• Call a crisis hotline
• Go to your nearest emergency room
• Call emergency services (911, 999, 112)
• Reach out to a trusted friend or family member

**Remember:**
• This feeling is temporary
• You matter and are loved
• Professional help is available
• Recovery is possible

*Please don't hesitate to seek immediate professional help if you're in crisis.*";

/// A regional crisis-line listing.
#[derive(Debug, Clone, Copy)]
pub struct CrisisResource {
    /// Region or service name.
    pub name: &'static str,
    /// Phone numbers, already formatted for display.
    pub numbers: &'static [&'static str],
    /// One-line description of the service.
    pub description: &'static str,
}

/// Regional crisis lines shown from the "local resources" view.
pub const CRISIS_RESOURCES: &[CrisisResource] = &[
    CrisisResource {
        name: "International Crisis Lines",
        numbers: &["988 (US)", "116 123 (UK)", "13 11 14 (AU)"],
        description: "24/7 crisis support and suicide prevention",
    },
    CrisisResource {
        name: "India Crisis Support",
        numbers: &["9152987821", "022-25521111"],
        description: "AASRA - 24/7 emotional support",
    },
];

/// Render the regional crisis-line listing.
#[must_use]
pub fn local_resources_text() -> String {
    let mut text = String::from("📞 *Local Crisis Resources*\n");
    for resource in CRISIS_RESOURCES {
        text.push_str(&format!(
            "\n**{}**\n{}\n{}\n",
            resource.name,
            resource.description,
            resource.numbers.join(", ")
        ));
    }
    text.push_str("\n*If you are in immediate danger, call your local emergency number.*");
    text
}
