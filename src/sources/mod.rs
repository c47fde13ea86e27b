//! Source extractors for the supported listing sites.
//!
//! Each source owns its URL construction, load/wait strategy, card
//! discovery and field extraction, and produces normalized
//! [`JobRecord`]s. Parsing is kept as a pure function of the rendered
//! HTML so it can be exercised against static fixtures.

pub mod indeed;
pub mod internshala;
pub mod linkedin;
pub mod linkedin_posts;

pub use indeed::Indeed;
pub use internshala::Internshala;
pub use linkedin::LinkedInJobs;
pub use linkedin_posts::LinkedInPosts;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::ScrapeTuning;
use crate::models::{JobRecord, SearchQuery};
use crate::render::{PageRenderer, RenderError};

/// Scroll the page to the bottom to trigger lazy-loaded results.
pub(crate) const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Error type for source extraction.
///
/// Only [`ScrapeError::Session`] crosses the extractor boundary; every
/// other condition is recoverable and absorbed inside the source, which
/// then returns whatever it had collected.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("blocked by anti-automation interstitial: {0}")]
    Blocked(String),

    #[error("renderer failed: {0}")]
    Render(String),

    #[error("browser session unavailable: {0}")]
    Session(String),
}

impl From<RenderError> for ScrapeError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Session(msg) => Self::Session(msg),
            RenderError::WaitTimeout(what) => Self::Timeout(what),
            other => Self::Render(other.to_string()),
        }
    }
}

/// Trait for pluggable listing sources.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Unique identifier for this source (e.g. "linkedin-jobs").
    fn name(&self) -> &str;

    /// Scrape listings for one query.
    ///
    /// Recoverable failures (wait timeouts, missing containers, blocked
    /// or failed fetches) are logged and yield `Ok` with partial or
    /// empty results; only a dead renderer session surfaces as
    /// `Err(ScrapeError::Session)`.
    async fn scrape(
        &self,
        renderer: &dyn PageRenderer,
        query: &SearchQuery,
        tuning: &ScrapeTuning,
    ) -> Result<Vec<JobRecord>, ScrapeError>;
}

/// The fixed extraction sequence for one query.
pub fn default_sources() -> Vec<Arc<dyn JobSource>> {
    vec![
        Arc::new(LinkedInJobs::new()),
        Arc::new(Indeed::new()),
        Arc::new(Internshala::new()),
        Arc::new(LinkedInPosts::new()),
    ]
}

/// Resolve a renderer failure inside a source: a dead session is fatal
/// to the run, everything else is logged and yields an empty pass.
pub(crate) fn recover_render(
    err: RenderError,
    source: &str,
) -> Result<Vec<JobRecord>, ScrapeError> {
    match ScrapeError::from(err) {
        ScrapeError::Session(msg) => Err(ScrapeError::Session(msg)),
        recoverable => {
            warn!("{}: {}", source, recoverable);
            Ok(Vec::new())
        }
    }
}
