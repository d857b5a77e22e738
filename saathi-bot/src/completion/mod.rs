//! Completion-service boundary: the provider trait and request types.
//!
//! The router talks to a [`CompletionService`]; the production
//! implementation is the Gemini client in [`gemini`].

mod gemini;

pub use gemini::{GEMINI_API_BASE_URL, GeminiClient};

use crate::error::CompletionResult;
use crate::session::Language;
use async_trait::async_trait;

/// Sampling and length parameters for a generation call.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus-sampling probability mass.
    pub top_p: f64,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_tokens: 1024,
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The user's message.
    pub prompt: String,
    /// Conversation context summary (active module, recent mood, streak).
    pub context: String,
    /// Preferred reply language.
    pub language: Language,
}

impl CompletionRequest {
    /// Create a request with an empty context in the default language.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: String::new(),
            language: Language::default(),
        }
    }

    /// Set the context summary.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the reply language.
    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Trait for text-generation providers.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is configured and ready.
    fn is_available(&self) -> bool;

    /// Generate a reply for the given request.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert!((params.temperature - 0.7).abs() < f64::EPSILON);
        assert!((params.top_p - 0.95).abs() < f64::EPSILON);
        assert_eq!(params.top_k, 40);
        assert_eq!(params.max_tokens, 1024);
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("hello")
            .with_context("Active module: mitra.")
            .with_language(Language::Hindi);
        assert_eq!(request.prompt, "hello");
        assert_eq!(request.language, Language::Hindi);
        assert!(request.context.contains("mitra"));
    }
}
