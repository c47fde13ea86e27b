//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the text-interpretation capability.
///
/// The capability is optional: a disabled or key-less config simply
/// means no client is constructed and every call site degrades the same
/// way it would on a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether AI-assisted extraction is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key for the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; extraction wants deterministic output.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum characters of page text sent per call.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_content_chars() -> usize {
    12000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true"/"false" (explicit value wins)
    /// - `LLM_ENDPOINT`: API endpoint
    /// - `LLM_API_KEY` or `OPENAI_API_KEY`: API key; finding one enables
    ///   the capability unless `LLM_ENABLED` says otherwise
    /// - `LLM_MODEL`: model name
    /// - `LLM_MAX_CONTENT_CHARS`: max page chars per call
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("LLM_MAX_CONTENT_CHARS") {
            if let Ok(n) = val.parse() {
                self.max_content_chars = n;
            }
        }

        if let Ok(key) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")) {
            if !key.is_empty() {
                self.api_key = Some(key);
                self.enabled = true;
            }
        }

        // Explicit enable/disable wins over key auto-detection.
        if let Ok(val) = std::env::var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        self
    }
}
