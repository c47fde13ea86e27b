//! Optional text-interpretation capability.
//!
//! Wraps an OpenAI-compatible chat-completions API for the secondary
//! extraction path: structured-field guesses from free page text,
//! content classification, translation and date normalization. The
//! capability is present or absent at construction time; callers treat
//! absence exactly like a recoverable call failure.

mod analyzer;
mod config;
mod prompts;

pub use analyzer::{visible_text, PageAnalyzer};
pub use config::LlmConfig;

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error type for text-interpretation calls. Never fatal to callers;
/// every call site degrades to "field not available".
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl LlmClient {
    /// Build the client if the capability is configured; `None` is the
    /// first-class "not available" state.
    pub fn configured(config: LlmConfig) -> Option<Self> {
        if !config.enabled || config.api_key.is_none() {
            debug!("Text-interpretation capability not configured");
            return None;
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Some(Self { config, client })
    }

    /// Send one prompt and return the model's reply text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", response.status())));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Parse("response contained no choices".to_string()))?;

        Ok(content.trim().to_string())
    }

    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_content_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Guess structured fields from free-form text.
    ///
    /// The model is asked for a JSON object; an unparseable reply is
    /// wrapped under a single `raw` key instead of failing the call.
    pub async fn extract_fields(&self, text: &str) -> Result<BTreeMap<String, String>, LlmError> {
        let prompt = prompts::EXTRACT_FIELDS_PROMPT.replace("{text}", self.truncate_content(text));
        let response = self.complete(&prompt).await?;

        Ok(fields_from_response(&response))
    }

    /// Classify a text snippet as product, advert, article or spam.
    pub async fn classify(&self, text: &str) -> Result<String, LlmError> {
        let prompt = prompts::CLASSIFY_PROMPT.replace("{text}", self.truncate_content(text));
        self.complete(&prompt).await
    }

    /// Translate arbitrary text into `target_language`.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String, LlmError> {
        let prompt = prompts::TRANSLATE_PROMPT
            .replace("{language}", target_language)
            .replace("{text}", text);
        self.complete(&prompt).await
    }

    /// Normalize a date expression to ISO YYYY-MM-DD, or empty when none
    /// is detected.
    pub async fn normalize_date(&self, text: &str) -> Result<String, LlmError> {
        let prompt = prompts::NORMALIZE_DATE_PROMPT.replace("{text}", text);
        self.complete(&prompt).await
    }

    /// Suggest a robust selector for a described page element.
    pub async fn suggest_selector(&self, description: &str) -> Result<String, LlmError> {
        let prompt = prompts::SUGGEST_SELECTOR_PROMPT.replace("{description}", description);
        self.complete(&prompt).await
    }
}

/// Parse a field-extraction reply into a string map, falling back to a
/// `raw` wrapper when the reply is not a JSON object.
fn fields_from_response(response: &str) -> BTreeMap<String, String> {
    let stripped = strip_code_fence(response);

    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(stripped) {
        Ok(object) => object
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
        Err(_) => {
            let mut fields = BTreeMap::new();
            fields.insert("raw".to_string(), response.to_string());
            fields
        }
    }
}

/// Models often wrap JSON answers in a markdown code fence.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
