//! Gemini `generateContent` client.
//!
//! One synchronous-looking call per user message, bounded by a fixed
//! timeout. There is no retry and no cancellation once a call is in
//! flight; failures map onto [`CompletionError`] variants the router turns
//! into canned fallback replies.

use super::{CompletionRequest, CompletionService, GenerationParams};
use crate::error::{CompletionError, CompletionResult};
use crate::session::Language;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model ID.
const DEFAULT_MODEL: &str = "gemini-pro";

/// Default call deadline in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Persona preamble sent ahead of every prompt.
const PERSONA_PREAMBLE: &str = "\
You are Saathi, a kind, multilingual, AI-powered digital companion that supports women and students.
You are emotionally intelligent, culturally aware, private and supportive with no judgments.
You provide help through three modules:
1. Sakhi Module - Menstrual and hormonal health tracking
2. EduCare Module - Voice-to-text notes and learning assistance
3. Mitra Module - Mental health support in regional languages";

/// Gemini completion client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    params: GenerationParams,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new client with the given API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            api_key: Some(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            params: GenerationParams::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: DEFAULT_MODEL.to_string(),
            params: GenerationParams::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the model ID.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (useful for tests against a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the generation parameters.
    #[must_use]
    pub const fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Override the call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> CompletionResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)
    }

    /// Assemble the full prompt: persona, language hint, context, message.
    fn build_prompt(request: &CompletionRequest) -> String {
        let mut prompt = String::from(PERSONA_PREAMBLE);

        if request.language != Language::English {
            prompt.push_str(&format!(
                "\n\nPlease respond in {} language when appropriate, while being culturally sensitive.",
                request.language.native_name()
            ));
        }

        if !request.context.is_empty() {
            prompt.push_str(&format!("\n\nContext: {}", request.context));
        }

        prompt.push_str(&format!("\nUser message: {}", request.prompt));
        prompt.push_str(
            "\n\nRespond as Saathi with empathy, cultural sensitivity, and helpful guidance. \
             If the user seems to be in crisis or mentions self-harm, provide immediate support \
             and crisis resources.",
        );

        prompt
    }

    /// Build the `generateContent` request body.
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": Self::build_prompt(request) }]
            }],
            "generationConfig": {
                "temperature": self.params.temperature,
                "topK": self.params.top_k,
                "topP": self.params.top_p,
                "maxOutputTokens": self.params.max_tokens,
            }
        })
    }

    /// Extract the reply text from a `generateContent` response.
    fn parse_response(json: &Value) -> CompletionResult<String> {
        json["candidates"]
            .get(0)
            .and_then(|c| c["content"]["parts"].get(0))
            .and_then(|p| p["text"].as_str())
            .map(str::to_string)
            .ok_or_else(|| CompletionError::Malformed("no candidate text in response".to_string()))
    }

    async fn send(&self, request: &CompletionRequest) -> CompletionResult<String> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let body = self.build_request_body(request);

        let response = self.http_client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        debug!(model = %self.model, "completion response received");

        Self::parse_response(&json)
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_availability() {
        let client = GeminiClient::new("test-key");
        assert!(client.is_available());
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_prompt_includes_language_hint() {
        let request = CompletionRequest::new("hello").with_language(Language::Tamil);
        let prompt = GeminiClient::build_prompt(&request);
        assert!(prompt.contains("தமிழ்"));

        let english = CompletionRequest::new("hello");
        let prompt = GeminiClient::build_prompt(&english);
        assert!(!prompt.contains("respond in"));
    }

    #[test]
    fn test_prompt_includes_context_and_message() {
        let request = CompletionRequest::new("I feel stuck")
            .with_context("Active module: mitra. Wellness streak: 2 activities.");
        let prompt = GeminiClient::build_prompt(&request);
        assert!(prompt.contains("Context: Active module: mitra."));
        assert!(prompt.contains("User message: I feel stuck"));
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::new("key");
        let body = client.build_request_body(&CompletionRequest::new("hi"));

        assert!(body["contents"][0]["parts"][0]["text"].is_string());
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello there" }] }
            }]
        });
        assert_eq!(GeminiClient::parse_response(&json).unwrap(), "Hello there");

        let empty = json!({ "candidates": [] });
        assert!(matches!(
            GeminiClient::parse_response(&empty),
            Err(CompletionError::Malformed(_))
        ));
    }
}
