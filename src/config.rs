//! Application configuration.
//!
//! Every scraping heuristic (scroll passes, settle delays, wait bounds)
//! is a named, configurable value rather than a magic number buried in
//! an extractor. Values load from an optional TOML file with serde
//! defaults; the LLM section additionally honors environment overrides.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::render::RendererConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scrape: ScrapeTuning,

    #[serde(default)]
    pub browser: RendererConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, or defaults when no file is
    /// given. Environment overrides for the LLM section apply in both
    /// cases.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };

        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }
}

/// Per-source scraping heuristics.
///
/// The scroll/settle values are best-effort lazy-load triggers with no
/// confirmation that content actually arrived; tune them rather than
/// expecting the extractors to detect readiness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeTuning {
    /// Wait bound for the LinkedIn results list, in seconds.
    #[serde(default = "default_linkedin_wait_secs")]
    pub linkedin_wait_secs: u64,

    /// Scroll-to-bottom passes on the LinkedIn results page.
    #[serde(default = "default_linkedin_scroll_passes")]
    pub linkedin_scroll_passes: u32,

    /// Delay between scroll passes, in seconds.
    #[serde(default = "default_scroll_delay_secs")]
    pub scroll_delay_secs: u64,

    /// Timeout for the plain Indeed fetch, in seconds.
    #[serde(default = "default_indeed_http_timeout_secs")]
    pub indeed_http_timeout_secs: u64,

    /// Wait bound for Indeed job links after browser escalation.
    #[serde(default = "default_indeed_wait_secs")]
    pub indeed_wait_secs: u64,

    /// Wait bound for the Internshala list container, in seconds.
    #[serde(default = "default_internshala_wait_secs")]
    pub internshala_wait_secs: u64,

    /// Wait bound for the post search results container, in seconds.
    #[serde(default = "default_posts_wait_secs")]
    pub posts_wait_secs: u64,

    /// Scroll-to-bottom passes on the post search page.
    #[serde(default = "default_posts_scroll_passes")]
    pub posts_scroll_passes: u32,

    /// Cap on post elements processed per run; posts are free text, so
    /// scanning is bounded.
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,

    /// Settle delay after dismissing an overlay, in seconds.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

fn default_linkedin_wait_secs() -> u64 {
    10
}

fn default_linkedin_scroll_passes() -> u32 {
    3
}

fn default_scroll_delay_secs() -> u64 {
    3
}

fn default_indeed_http_timeout_secs() -> u64 {
    10
}

fn default_indeed_wait_secs() -> u64 {
    15
}

fn default_internshala_wait_secs() -> u64 {
    15
}

fn default_posts_wait_secs() -> u64 {
    15
}

fn default_posts_scroll_passes() -> u32 {
    2
}

fn default_max_posts() -> usize {
    10
}

fn default_settle_delay_secs() -> u64 {
    2
}

impl Default for ScrapeTuning {
    fn default() -> Self {
        Self {
            linkedin_wait_secs: default_linkedin_wait_secs(),
            linkedin_scroll_passes: default_linkedin_scroll_passes(),
            scroll_delay_secs: default_scroll_delay_secs(),
            indeed_http_timeout_secs: default_indeed_http_timeout_secs(),
            indeed_wait_secs: default_indeed_wait_secs(),
            internshala_wait_secs: default_internshala_wait_secs(),
            posts_wait_secs: default_posts_wait_secs(),
            posts_scroll_passes: default_posts_scroll_passes(),
            max_posts: default_max_posts(),
            settle_delay_secs: default_settle_delay_secs(),
        }
    }
}

#[cfg(test)]
impl ScrapeTuning {
    /// Tuning with zeroed delays so tests run instantly.
    pub fn instant() -> Self {
        Self {
            scroll_delay_secs: 0,
            settle_delay_secs: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let tuning = ScrapeTuning::default();

        assert_eq!(tuning.linkedin_wait_secs, 10);
        assert_eq!(tuning.linkedin_scroll_passes, 3);
        assert_eq!(tuning.indeed_http_timeout_secs, 10);
        assert_eq!(tuning.indeed_wait_secs, 15);
        assert_eq!(tuning.internshala_wait_secs, 15);
        assert_eq!(tuning.posts_scroll_passes, 2);
        assert_eq!(tuning.max_posts, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [scrape]
            max_posts = 5

            [browser]
            headless = false
            "#,
        )
        .unwrap();

        assert_eq!(config.scrape.max_posts, 5);
        assert_eq!(config.scrape.linkedin_wait_secs, 10);
        assert!(!config.browser.headless);
    }
}
