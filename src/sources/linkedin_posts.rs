//! LinkedIn content search extractor.
//!
//! Searches public posts for hiring announcements. Posts are free text:
//! the emitted records carry the query's designation and city verbatim
//! and a sentinel company, with only the permalink extracted from the
//! post itself. No relevance filtering is applied, so posts that merely
//! match the keywords still produce records.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::{recover_render, JobSource, ScrapeError, SCROLL_TO_BOTTOM};
use crate::config::ScrapeTuning;
use crate::dom;
use crate::models::{JobRecord, SearchQuery, NA, NA_POST};
use crate::render::{Locator, PageRenderer};

const ORIGIN: &str = "https://www.linkedin.com";

/// Content search results container. Usually requires an authenticated
/// session; without one the wait simply times out.
const RESULTS_LIST_CLASS: &str = "reusable-search__entity-result-list";

const POST_SELECTOR: &str = "li.reusable-search__result-container";
const POST_FALLBACK_SELECTOR: &str = "div.feed-shared-update-v2";

const TEXT_BOX_SELECTORS: &str =
    "div.feed-shared-update-v2__description-wrapper, div.update-components-text";

/// Permalinks carry either an activity identifier or a feed-highlight
/// marker.
const PERMALINK_SELECTORS: &str =
    r#"a[href*="urn:li:activity:"], a[href*="feed_highlight"]"#;

/// Extractor for LinkedIn post search.
#[derive(Default)]
pub struct LinkedInPosts {}

impl LinkedInPosts {
    pub fn new() -> Self {
        Self {}
    }

    fn search_url(query: &SearchQuery) -> String {
        let keywords = format!("hiring {} {}", query.designation, query.city);
        format!(
            "{}/search/results/content/?keywords={}&origin=GLOBAL_SEARCH_HEADER&sid=~",
            ORIGIN,
            urlencoding::encode(keywords.trim())
        )
    }
}

fn parse_posts(html: &str, query: &SearchQuery, max_posts: usize) -> Vec<JobRecord> {
    let document = Html::parse_document(html);

    discover_posts(&document)
        .into_iter()
        .take(max_posts)
        .map(|post| parse_post(post, query))
        .collect()
}

fn discover_posts(document: &Html) -> Vec<ElementRef<'_>> {
    let posts: Vec<_> = document.select(&dom::sel(POST_SELECTOR)).collect();
    if !posts.is_empty() {
        return posts;
    }

    document.select(&dom::sel(POST_FALLBACK_SELECTOR)).collect()
}

fn parse_post(post: ElementRef<'_>, query: &SearchQuery) -> JobRecord {
    let text = post_text(post);
    debug!("Post text: {} chars", text.len());

    let permalink = dom::first_attr(post, &[PERMALINK_SELECTORS], "href")
        .map(|href| dom::absolutize(ORIGIN, &href))
        .unwrap_or_else(|| NA.to_string());

    // Posts have no structured fields; title and location are the query
    // inputs, company is a sentinel.
    JobRecord::new(
        query.designation.clone(),
        NA_POST,
        query.city.clone(),
        permalink,
    )
}

/// Post body text: the directionally-marked span when present, else the
/// description container's text, else the whole post as a last resort.
fn post_text(post: ElementRef<'_>) -> String {
    match dom::select_first(post, TEXT_BOX_SELECTORS) {
        Some(text_box) => dom::first_text(text_box, &[r#"span[dir="ltr"]"#])
            .unwrap_or_else(|| dom::text_of(text_box)),
        None => dom::text_of(post),
    }
}

#[async_trait]
impl JobSource for LinkedInPosts {
    fn name(&self) -> &str {
        "linkedin-posts"
    }

    async fn scrape(
        &self,
        renderer: &dyn PageRenderer,
        query: &SearchQuery,
        tuning: &ScrapeTuning,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = Self::search_url(query);
        info!("Scraping LinkedIn posts: {}", url);

        if let Err(err) = renderer.navigate(&url).await {
            return recover_render(err, self.name());
        }

        let wait = Duration::from_secs(tuning.posts_wait_secs);
        if let Err(err) = renderer
            .wait_for(&Locator::class_name(RESULTS_LIST_CLASS), wait)
            .await
        {
            return recover_render(err, self.name());
        }

        for _ in 0..tuning.posts_scroll_passes {
            if let Err(err) = renderer.run_script(SCROLL_TO_BOTTOM).await {
                return recover_render(err, self.name());
            }
            tokio::time::sleep(Duration::from_secs(tuning.scroll_delay_secs)).await;
        }

        let html = match renderer.html().await {
            Ok(html) => html,
            Err(err) => return recover_render(err, self.name()),
        };

        let records = parse_posts(&html, query, tuning.max_posts);
        debug!("LinkedIn posts: parsed {} posts", records.len());

        Ok(records)
    }
}
