//! Page rendering capability used by the source extractors.
//!
//! The extractors never talk to a browser directly; they receive a
//! [`PageRenderer`] handle so tests can substitute a fixture-backed fake
//! and the orchestrator can own the single shared session.

mod chrome;
#[cfg(test)]
pub mod fake;

pub use chrome::ChromeRenderer;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for renderer operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out waiting for {0}")]
    WaitTimeout(String),

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("browser session unavailable: {0}")]
    Session(String),
}

/// Element locator as a (strategy, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    ClassName(String),
    Css(String),
}

impl Locator {
    pub fn id(value: &str) -> Self {
        Self::Id(value.to_string())
    }

    pub fn class_name(value: &str) -> Self {
        Self::ClassName(value.to_string())
    }

    pub fn css(value: &str) -> Self {
        Self::Css(value.to_string())
    }

    /// Render the locator as a CSS selector string.
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(value) => format!("#{}", value),
            Self::ClassName(value) => format!(".{}", value),
            Self::Css(value) => value.clone(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

/// Rendering session capability.
///
/// One live session at a time; the underlying automation protocol is not
/// safe for concurrent commands, so the orchestrator serializes access.
/// After [`close`](PageRenderer::close), every operation fails with
/// [`RenderError::Session`].
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate the session to a URL and let scripts settle.
    async fn navigate(&self, url: &str) -> Result<(), RenderError>;

    /// Rendered HTML of the current page.
    async fn html(&self) -> Result<String, RenderError>;

    /// Execute a script in the page (scrolling, overlay dismissal).
    async fn run_script(&self, js: &str) -> Result<(), RenderError>;

    /// Wait until an element matching `locator` is present, bounded by
    /// `timeout`. Expiry yields [`RenderError::WaitTimeout`].
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<(), RenderError>;

    /// Outer HTML of every element currently matching `locator`.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<String>, RenderError>;

    /// Tear down the session.
    async fn close(&self);
}

/// Browser session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g. "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Navigation settle timeout in seconds.
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

fn default_headless() -> bool {
    true
}

fn default_nav_timeout() -> u64 {
    30
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            nav_timeout_secs: default_nav_timeout(),
            chrome_args: Vec::new(),
        }
    }
}
