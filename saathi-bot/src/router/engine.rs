//! The interaction router: one entry point per event kind.
//!
//! `on_start` resets the session and shows the root menu, `on_menu_select`
//! maps a decoded [`Selector`] to a (state mutation, reply) pair, and
//! `on_text_message` runs crisis screening before delegating to the
//! completion service. No selector is ever rejected because of prior
//! state; the only persistent "mode" is the active module.

use super::policy::{
    CRISIS_CAUTION_LINE, context_summary, empathy_message, fallback_message, history_text,
    needs_crisis_support, suggested_activities, trend_summary,
};
use super::screening::crisis_scan;
use super::selector::Selector;
use crate::catalog::{self, Activity};
use crate::completion::{CompletionRequest, CompletionService};
use crate::error::Result;
use crate::events::Button;
use crate::session::{Language, Module, Mood, SessionData, SessionManager};
use tracing::{debug, warn};

/// Intensity scale labels, in order.
const INTENSITY_LABELS: [&str; 5] = [
    "1️⃣ Very Low",
    "2️⃣ Low",
    "3️⃣ Moderate",
    "4️⃣ High",
    "5️⃣ Very High",
];

/// A rendered reply: text plus optional button rows.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Markdown-formatted reply text.
    pub text: String,
    /// Button rows; empty means no keyboard.
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Shorthand for a selector-tagged button.
fn btn(label: impl Into<String>, selector: Selector) -> Button {
    Button::new(label, selector.encode())
}

/// Routes inbound events to menu flows, the mood/crisis policy, or the
/// completion service.
pub struct InteractionRouter<C> {
    sessions: SessionManager,
    completion: C,
}

impl<C> std::fmt::Debug for InteractionRouter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRouter").finish_non_exhaustive()
    }
}

impl<C: CompletionService> InteractionRouter<C> {
    /// Create a router over the given session manager and completion service.
    pub const fn new(sessions: SessionManager, completion: C) -> Self {
        Self {
            sessions,
            completion,
        }
    }

    /// Access the underlying session manager.
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Handle the start command: reset the session and show the root menu.
    pub async fn on_start(&self, key: &str) -> Result<Reply> {
        self.sessions.reset(key).await?;
        debug!(key = %key, "session reset by start command");
        Ok(Self::welcome_reply())
    }

    /// Handle a decoded menu selection.
    pub async fn on_menu_select(&self, key: &str, selector: Selector) -> Result<Reply> {
        let reply = match selector {
            Selector::MoodMenu => Self::mood_menu_reply(),
            Selector::Mood(mood) => Self::intensity_menu_reply(mood),
            Selector::Intensity { mood, level } => {
                self.sessions
                    .update(key, |s| s.record_mood(mood, level))
                    .await?;
                Self::mood_logged_reply(mood, level)
            }
            Selector::MoodHistory => {
                let session = self.sessions.get_or_create(key).await?;
                Self::history_reply(&session)
            }
            Selector::WellnessMenu => Self::wellness_menu_reply(),
            Selector::Activity(activity) => Self::activity_reply(activity),
            Selector::Completed(activity) => {
                let session = self
                    .sessions
                    .update(key, SessionData::complete_activity)
                    .await?;
                Self::completed_reply(activity, session.wellness_streak)
            }
            Selector::CrisisSupport => {
                self.sessions
                    .update(key, SessionData::mark_crisis_shown)
                    .await?;
                Self::crisis_support_reply()
            }
            Selector::LocalResources => Self::local_resources_reply(),
            Selector::LanguageMenu => Self::language_menu_reply(),
            Selector::SetLanguage(language) => {
                self.sessions
                    .update(key, |s| s.set_language(language))
                    .await?;
                Self::language_set_reply(language)
            }
            Selector::Module(module) => {
                let session = self
                    .sessions
                    .update(key, |s| s.set_module(Some(module)))
                    .await?;
                Self::module_reply(module, &session)
            }
            Selector::MainMenu => {
                self.sessions.update(key, |s| s.set_module(None)).await?;
                Self::main_menu_reply()
            }
            Selector::About => Self::about_reply(),
        };

        Ok(reply)
    }

    /// Handle a free-text message: crisis screen, then completion call.
    pub async fn on_text_message(&self, key: &str, text: &str) -> Result<Reply> {
        let session = self.sessions.get_or_create(key).await?;

        if crisis_scan(text) {
            warn!(key = %key, "crisis keywords detected in message");
            return Ok(Self::crisis_alert_reply());
        }

        let request = CompletionRequest::new(text)
            .with_context(context_summary(&session))
            .with_language(session.language);

        let reply_text = match self.completion.complete(&request).await {
            Ok(generated) => generated,
            Err(e) => {
                warn!(key = %key, error = %e, "completion call failed");
                fallback_message(&e).to_string()
            }
        };

        let keyboard = match session.active_module {
            Some(Module::Mitra) => vec![
                vec![btn("💭 Check Mood", Selector::MoodMenu)],
                vec![btn("🧘 Wellness Activity", Selector::WellnessMenu)],
            ],
            Some(_) => Vec::new(),
            None => vec![
                vec![btn("💚 Mitra Support", Selector::Module(Module::Mitra))],
                vec![btn("🌟 Main Menu", Selector::MainMenu)],
            ],
        };

        Ok(Reply::new(reply_text).with_keyboard(keyboard))
    }

    // ------------------------------------------------------------------
    // Menu payload builders
    // ------------------------------------------------------------------

    fn root_keyboard() -> Vec<Vec<Button>> {
        let mut keyboard: Vec<Vec<Button>> = Module::ALL
            .into_iter()
            .map(|m| vec![btn(m.label(), Selector::Module(m))])
            .collect();
        keyboard.push(vec![btn("🌍 Language Settings", Selector::LanguageMenu)]);
        keyboard.push(vec![btn("ℹ️ About Saathi", Selector::About)]);
        keyboard
    }

    fn welcome_reply() -> Reply {
        Reply::new(
            "🌟 *Welcome to Saathi!* 🌟\n\n\
             I'm your caring digital companion, here to support you through:\n\n\
             🌸 *Sakhi Module* - Menstrual & hormonal health tracking\n\
             📚 *EduCare Module* - Smart learning assistance\n\
             💚 *Mitra Module* - Mental health support in your language\n\n\
             Choose a module to get started, or just chat with me about anything! 💕\n\n\
             *Remember: You're never alone, and your feelings are always valid.*",
        )
        .with_keyboard(Self::root_keyboard())
    }

    fn main_menu_reply() -> Reply {
        Reply::new("🌟 *Welcome back to Saathi!*\n\nChoose a module or just chat with me:")
            .with_keyboard(Self::root_keyboard())
    }

    fn module_reply(module: Module, session: &SessionData) -> Reply {
        match module {
            Module::Mitra => {
                let streak_line = if session.wellness_streak > 0 {
                    format!("Wellness streak: {} activities", session.wellness_streak)
                } else {
                    String::new()
                };

                Reply::new(format!(
                    "💚 *Mitra Module - Your Mental Health Companion*\n\n\
                     I'm here to listen, support, and provide culturally sensitive mental \
                     health guidance.\n\n{}\n{}\n\n\
                     *Remember: Your mental health matters, and seeking support is a sign of \
                     strength.*\n\nHow can I support you today?",
                    trend_summary(session),
                    streak_line
                ))
                .with_keyboard(vec![
                    vec![btn("💭 Mood Check-in", Selector::MoodMenu)],
                    vec![btn("📊 Mood History", Selector::MoodHistory)],
                    vec![btn("🧘 Wellness Activities", Selector::WellnessMenu)],
                    vec![btn("🆘 Crisis Support", Selector::CrisisSupport)],
                    vec![btn("🌍 Language Support", Selector::LanguageMenu)],
                    vec![btn("🏠 Main Menu", Selector::MainMenu)],
                ])
            }
            Module::Sakhi => Reply::new(
                "🌸 *Sakhi Module - Your Menstrual Health Companion*\n\n\
                 I'm here to answer questions about cycles, period care, and hormonal \
                 health - privately and without judgment.\n\n\
                 Just type your question and I'll do my best to help.",
            )
            .with_keyboard(vec![vec![btn("🏠 Main Menu", Selector::MainMenu)]]),
            Module::Educare => Reply::new(
                "📚 *EduCare Module - Your Learning Assistant*\n\n\
                 I can help with study techniques, note-taking strategies, and learning \
                 optimization.\n\n\
                 Tell me what you're working on and we'll figure it out together.",
            )
            .with_keyboard(vec![vec![btn("🏠 Main Menu", Selector::MainMenu)]]),
        }
    }

    fn mood_menu_reply() -> Reply {
        let mut keyboard: Vec<Vec<Button>> = Mood::ALL
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|m| btn(format!("{} {}", m.emoji(), m.name()), Selector::Mood(*m)))
                    .collect()
            })
            .collect();
        keyboard.push(vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))]);

        Reply::new(
            "💭 *How are you feeling right now?*\n\n\
             Take a moment to check in with yourself. Your emotions are valid, and I'm \
             here to listen and support you.\n\n\
             Choose the emotion that best describes how you're feeling:",
        )
        .with_keyboard(keyboard)
    }

    fn intensity_menu_reply(mood: Mood) -> Reply {
        let mut keyboard: Vec<Vec<Button>> = INTENSITY_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                #[allow(clippy::cast_possible_truncation)]
                let level = (i + 1) as u8;
                vec![btn(*label, Selector::Intensity { mood, level })]
            })
            .collect();
        keyboard.push(vec![btn("🔙 Back", Selector::MoodMenu)]);

        Reply::new(format!(
            "💭 *You're feeling {}*\n\n\
             On a scale of 1-5, how intense is this feeling right now?\n\n\
             1 = Very mild\n5 = Very intense",
            mood.name()
        ))
        .with_keyboard(keyboard)
    }

    fn mood_logged_reply(mood: Mood, level: u8) -> Reply {
        let mut text = format!(
            "*Mood logged: {} (Intensity: {level}/5)*\n\n{}",
            mood.name(),
            empathy_message(mood, level)
        );

        let mut keyboard: Vec<Vec<Button>> = Vec::new();

        if needs_crisis_support(mood, level) {
            keyboard.push(vec![btn("🆘 Get Immediate Support", Selector::CrisisSupport)]);
            text.push_str("\n\n");
            text.push_str(CRISIS_CAUTION_LINE);
        }

        for activity in suggested_activities(mood) {
            keyboard.push(vec![btn(
                format!("🧘 {}", activity.short_name()),
                Selector::Activity(*activity),
            )]);
        }

        keyboard.push(vec![btn("📊 View Mood History", Selector::MoodHistory)]);
        keyboard.push(vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))]);

        Reply::new(text).with_keyboard(keyboard)
    }

    fn history_reply(session: &SessionData) -> Reply {
        Reply::new(format!(
            "📊 *Your Mood History*\n\n{}\n\n{}",
            history_text(session),
            trend_summary(session)
        ))
        .with_keyboard(vec![
            vec![btn("🧘 Wellness Activities", Selector::WellnessMenu)],
            vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))],
        ])
    }

    fn wellness_menu_reply() -> Reply {
        let mut keyboard: Vec<Vec<Button>> = Activity::ALL
            .into_iter()
            .map(|a| vec![btn(a.title(), Selector::Activity(a))])
            .collect();
        keyboard.push(vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))]);

        Reply::new(
            "🧘 *Wellness Activities*\n\n\
             Choose an activity to help improve your mental well-being:\n\n\
             These evidence-based techniques can help you manage stress, anxiety, and \
             difficult emotions.",
        )
        .with_keyboard(keyboard)
    }

    fn activity_reply(activity: Activity) -> Reply {
        Reply::new(catalog::activity_instructions(activity)).with_keyboard(vec![
            vec![btn("✅ Completed Activity", Selector::Completed(activity))],
            vec![btn("🔄 Try Another Activity", Selector::WellnessMenu)],
            vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))],
        ])
    }

    fn completed_reply(activity: Activity, streak: u32) -> Reply {
        Reply::new(format!(
            "🎉 *Great job completing the {}!*\n\n\
             Wellness streak: {streak} activities\n\n\
             How are you feeling after this activity? Regular practice of wellness \
             activities can significantly improve your mental health over time.",
            activity.short_name()
        ))
        .with_keyboard(vec![
            vec![btn("💭 Check Mood Again", Selector::MoodMenu)],
            vec![btn("🧘 More Activities", Selector::WellnessMenu)],
            vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))],
        ])
    }

    fn crisis_support_reply() -> Reply {
        Reply::new(catalog::CRISIS_SUPPORT_TEXT).with_keyboard(vec![
            vec![btn("🫂 Talk to Someone Now", Selector::Module(Module::Mitra))],
            vec![btn("🧘 Immediate Coping", Selector::WellnessMenu)],
            vec![btn("📞 Local Resources", Selector::LocalResources)],
            vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))],
        ])
    }

    fn local_resources_reply() -> Reply {
        Reply::new(catalog::local_resources_text()).with_keyboard(vec![
            vec![btn("🆘 Crisis Support", Selector::CrisisSupport)],
            vec![btn("🔙 Back to Mitra", Selector::Module(Module::Mitra))],
        ])
    }

    fn crisis_alert_reply() -> Reply {
        Reply::new(
            "🚨 *I'm concerned about you*\n\n\
             I noticed you might be going through a really difficult time. Please know \
             that you're not alone and that help is available.\n\n\
             **If you're in immediate danger, please contact emergency services or a \
             crisis hotline right away.**\n\n\
             I'm here to support you. What would help you most right now?",
        )
        .with_keyboard(vec![
            vec![btn("🆘 Get Immediate Help", Selector::CrisisSupport)],
            vec![btn("🫂 Talk to Me", Selector::Module(Module::Mitra))],
            vec![btn("🧘 Coping Techniques", Selector::WellnessMenu)],
        ])
    }

    fn language_menu_reply() -> Reply {
        let mut keyboard: Vec<Vec<Button>> = Language::ALL
            .into_iter()
            .map(|l| vec![btn(l.native_name(), Selector::SetLanguage(l))])
            .collect();
        keyboard.push(vec![btn("🔙 Back", Selector::MainMenu)]);

        Reply::new(
            "🌍 *Choose Your Preferred Language*\n\n\
             I can provide mental health support in multiple regional languages to \
             ensure you feel comfortable and understood.\n\n\
             Select your preferred language:",
        )
        .with_keyboard(keyboard)
    }

    fn language_set_reply(language: Language) -> Reply {
        Reply::new(format!(
            "✅ *Language set to {}*\n\n\
             I'll now provide culturally appropriate mental health support in your \
             preferred language.\n\n\
             *Remember: Mental health support should always be culturally sensitive and \
             respectful of your background.*",
            language.native_name()
        ))
        .with_keyboard(vec![vec![btn(
            "🔙 Back to Mitra",
            Selector::Module(Module::Mitra),
        )]])
    }

    fn about_reply() -> Reply {
        Reply::new(
            "ℹ️ *About Saathi*\n\n\
             Saathi is a caring digital companion for women and students, offering \
             menstrual health tracking, learning assistance, and mental health support \
             in ten regional languages.\n\n\
             Your conversations stay private. Saathi is not a substitute for \
             professional medical or mental health care.",
        )
        .with_keyboard(vec![vec![btn("🏠 Main Menu", Selector::MainMenu)]])
    }
}

#[cfg(test)]
mod tests {
    use super::super::policy::{FALLBACK_MALFORMED, FALLBACK_SERVICE, FALLBACK_TIMEOUT};
    use super::*;
    use crate::error::{CompletionError, CompletionResult};
    use crate::session::MemoryStore;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// How a stub completion call should behave.
    #[derive(Debug, Clone)]
    enum StubMode {
        Reply(String),
        Timeout,
        Status,
        Malformed,
    }

    /// Recording completion stub.
    #[derive(Debug, Clone)]
    struct StubCompletion {
        mode: StubMode,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl StubCompletion {
        fn replying(text: &str) -> Self {
            Self::with_mode(StubMode::Reply(text.to_string()))
        }

        fn with_mode(mode: StubMode) -> Self {
            Self {
                mode,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionService for StubCompletion {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.mode {
                StubMode::Reply(text) => Ok(text.clone()),
                StubMode::Timeout => Err(CompletionError::Timeout(30)),
                StubMode::Status => Err(CompletionError::Status {
                    status: 503,
                    body: "overloaded".to_string(),
                }),
                StubMode::Malformed => Err(CompletionError::Malformed("empty".to_string())),
            }
        }
    }

    fn router(stub: StubCompletion) -> InteractionRouter<StubCompletion> {
        InteractionRouter::new(SessionManager::new(MemoryStore::new()), stub)
    }

    fn has_selector(reply: &Reply, selector: Selector) -> bool {
        let encoded = selector.encode();
        reply
            .keyboard
            .iter()
            .flatten()
            .any(|b| b.selector == encoded)
    }

    #[tokio::test]
    async fn test_start_resets_session_and_lists_modules() {
        let r = router(StubCompletion::replying("hi"));

        r.sessions()
            .update("t:1", |s| {
                s.set_module(Some(Module::Educare));
                s.record_mood(Mood::Sad, 3);
            })
            .await
            .unwrap();

        let reply = r.on_start("t:1").await.unwrap();
        assert!(reply.text.contains("Welcome to Saathi"));
        for module in Module::ALL {
            assert!(has_selector(&reply, Selector::Module(module)));
        }

        let session = r.sessions().get_or_create("t:1").await.unwrap();
        assert_eq!(session.active_module, None);
        assert!(session.mood_history.is_empty());
    }

    #[tokio::test]
    async fn test_crisis_gate_controls_affordance() {
        let r = router(StubCompletion::replying("hi"));
        let heavy = [Mood::Sad, Mood::Angry, Mood::Overwhelmed];

        for mood in Mood::ALL {
            for level in 1..=5u8 {
                let reply = r
                    .on_menu_select("t:gate", Selector::Intensity { mood, level })
                    .await
                    .unwrap();

                let expected = (heavy.contains(&mood) && level >= 4) || level == 5;
                assert_eq!(
                    has_selector(&reply, Selector::CrisisSupport),
                    expected,
                    "mood {mood:?} level {level}"
                );
                assert_eq!(
                    reply.text.contains(CRISIS_CAUTION_LINE),
                    expected,
                    "caution line for {mood:?} level {level}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_intensity_appends_mood_entry() {
        let r = router(StubCompletion::replying("hi"));

        r.on_menu_select(
            "t:2",
            Selector::Intensity {
                mood: Mood::Anxious,
                level: 2,
            },
        )
        .await
        .unwrap();

        let session = r.sessions().get_or_create("t:2").await.unwrap();
        assert_eq!(session.mood_history.len(), 1);
        assert_eq!(session.mood_history[0].mood, Mood::Anxious);
        assert_eq!(session.mood_history[0].intensity, 2);
    }

    #[tokio::test]
    async fn test_history_windowing_in_reply() {
        let r = router(StubCompletion::replying("hi"));

        for _ in 0..12 {
            r.sessions()
                .update("t:3", |s| s.record_mood(Mood::Happy, 2))
                .await
                .unwrap();
        }
        r.sessions()
            .update("t:3", |s| s.record_mood(Mood::Tired, 1))
            .await
            .unwrap();

        let reply = r.on_menu_select("t:3", Selector::MoodHistory).await.unwrap();
        let entry_lines: Vec<_> = reply.text.lines().filter(|l| l.starts_with('•')).collect();
        assert_eq!(entry_lines.len(), 10);
        assert!(entry_lines[0].contains("Tired"));
    }

    #[tokio::test]
    async fn test_completing_two_activities_increments_streak_twice() {
        let r = router(StubCompletion::replying("hi"));

        r.on_menu_select("t:4", Selector::Completed(Activity::Breathing))
            .await
            .unwrap();
        let reply = r
            .on_menu_select("t:4", Selector::Completed(Activity::Grounding))
            .await
            .unwrap();

        assert!(reply.text.contains("Wellness streak: 2 activities"));
        let session = r.sessions().get_or_create("t:4").await.unwrap();
        assert_eq!(session.wellness_streak, 2);
    }

    #[tokio::test]
    async fn test_crisis_support_sets_flag() {
        let r = router(StubCompletion::replying("hi"));

        let reply = r
            .on_menu_select("t:5", Selector::CrisisSupport)
            .await
            .unwrap();
        assert!(reply.text.contains("988"));

        let session = r.sessions().get_or_create("t:5").await.unwrap();
        assert!(session.crisis_support_shown);
    }

    #[tokio::test]
    async fn test_main_menu_resets_module_only() {
        let r = router(StubCompletion::replying("hi"));

        r.on_menu_select("t:6", Selector::Module(Module::Mitra))
            .await
            .unwrap();
        r.sessions()
            .update("t:6", |s| {
                s.record_mood(Mood::Grateful, 3);
                s.complete_activity();
            })
            .await
            .unwrap();

        let reply = r.on_menu_select("t:6", Selector::MainMenu).await.unwrap();
        assert!(reply.text.contains("Welcome back"));

        let session = r.sessions().get_or_create("t:6").await.unwrap();
        assert_eq!(session.active_module, None);
        assert_eq!(session.mood_history.len(), 1);
        assert_eq!(session.wellness_streak, 1);
    }

    #[tokio::test]
    async fn test_set_language_flows_into_completion_request() {
        let stub = StubCompletion::replying("नमस्ते");
        let r = router(stub.clone());

        r.on_menu_select("t:7", Selector::SetLanguage(Language::Hindi))
            .await
            .unwrap();
        r.on_text_message("t:7", "how are you?").await.unwrap();

        let request = stub.last_request().unwrap();
        assert_eq!(request.language, Language::Hindi);
    }

    #[tokio::test]
    async fn test_context_summary_reaches_completion() {
        let stub = StubCompletion::replying("ok");
        let r = router(stub.clone());

        r.on_menu_select("t:8", Selector::Module(Module::Mitra))
            .await
            .unwrap();
        r.on_menu_select(
            "t:8",
            Selector::Intensity {
                mood: Mood::Sad,
                level: 3,
            },
        )
        .await
        .unwrap();
        r.on_text_message("t:8", "I had a rough week").await.unwrap();

        let request = stub.last_request().unwrap();
        assert!(request.context.contains("Active module: mitra."));
        assert!(request.context.contains("Recent mood: Sad (intensity: 3/5)."));
    }

    #[tokio::test]
    async fn test_crisis_text_short_circuits_completion() {
        let stub = StubCompletion::replying("SHOULD NOT APPEAR");
        let r = router(stub.clone());

        let reply = r
            .on_text_message("t:9", "I want to KILL MYSELF now")
            .await
            .unwrap();

        assert_eq!(stub.request_count(), 0);
        assert!(reply.text.contains("I'm concerned about you"));
        assert!(has_selector(&reply, Selector::CrisisSupport));

        // Normal conversation state untouched.
        let session = r.sessions().get_or_create("t:9").await.unwrap();
        assert!(session.mood_history.is_empty());
        assert!(!session.crisis_support_shown);
    }

    #[tokio::test]
    async fn test_timeout_yields_designated_fallback_verbatim() {
        let r = router(StubCompletion::with_mode(StubMode::Timeout));

        let reply = r.on_text_message("t:10", "hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_TIMEOUT);
        assert_ne!(reply.text, FALLBACK_SERVICE);
    }

    #[tokio::test]
    async fn test_other_failures_map_to_their_own_fallbacks() {
        let r = router(StubCompletion::with_mode(StubMode::Status));
        let reply = r.on_text_message("t:11", "hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_SERVICE);

        let r = router(StubCompletion::with_mode(StubMode::Malformed));
        let reply = r.on_text_message("t:12", "hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_MALFORMED);
    }

    #[tokio::test]
    async fn test_text_reply_keyboard_follows_module_context() {
        let stub = StubCompletion::replying("sure");
        let r = router(stub);

        // No module: offer Mitra and the main menu.
        let reply = r.on_text_message("t:13", "hello").await.unwrap();
        assert!(has_selector(&reply, Selector::Module(Module::Mitra)));
        assert!(has_selector(&reply, Selector::MainMenu));

        // In Mitra: offer mood check-in and wellness activities.
        r.on_menu_select("t:13", Selector::Module(Module::Mitra))
            .await
            .unwrap();
        let reply = r.on_text_message("t:13", "hello again").await.unwrap();
        assert!(has_selector(&reply, Selector::MoodMenu));
        assert!(has_selector(&reply, Selector::WellnessMenu));
    }

    #[tokio::test]
    async fn test_activity_view_offers_completion() {
        let r = router(StubCompletion::replying("hi"));

        let reply = r
            .on_menu_select("t:14", Selector::Activity(Activity::Breathing))
            .await
            .unwrap();
        assert!(reply.text.contains("4-7-8"));
        assert!(has_selector(&reply, Selector::Completed(Activity::Breathing)));

        // Viewing instructions alone does not bump the streak.
        let session = r.sessions().get_or_create("t:14").await.unwrap();
        assert_eq!(session.wellness_streak, 0);
    }
}
