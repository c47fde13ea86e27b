//! LinkedIn public job board extractor.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::{recover_render, JobSource, ScrapeError, SCROLL_TO_BOTTOM};
use crate::config::ScrapeTuning;
use crate::dom;
use crate::models::{JobRecord, SearchQuery, NA};
use crate::render::{Locator, PageRenderer};

const ORIGIN: &str = "https://www.linkedin.com";

/// Restrict results to listings posted within the last 24 hours.
const RECENCY_FILTER: &str = "f_TPR=r86400";

/// Results list container the page renders once listings arrive.
const RESULTS_LIST_CLASS: &str = "jobs-search__results-list";

/// The board ships two card layouts depending on rollout bucket.
const CARD_SELECTORS: &str = "div.base-card, div.job-card-container--clickable";

/// Extractor for LinkedIn's public job search.
#[derive(Default)]
pub struct LinkedInJobs {}

impl LinkedInJobs {
    pub fn new() -> Self {
        Self {}
    }

    fn search_url(query: &SearchQuery) -> String {
        format!(
            "{}/jobs/search/?keywords={}&location={}&{}",
            ORIGIN,
            urlencoding::encode(&query.designation),
            urlencoding::encode(&query.city),
            RECENCY_FILTER
        )
    }
}

/// Parse every job card out of a rendered results page.
fn parse_listing(html: &str) -> Vec<JobRecord> {
    let document = Html::parse_document(html);
    let cards = dom::sel(CARD_SELECTORS);

    document.select(&cards).map(parse_card).collect()
}

fn parse_card(card: ElementRef<'_>) -> JobRecord {
    let title = dom::first_text(card, &["h3.base-search-card__title"])
        .unwrap_or_else(|| NA.to_string());

    let company = dom::first_text(
        card,
        &["h4.base-search-card__subtitle", "a.hidden-nested-link"],
    )
    .unwrap_or_else(|| NA.to_string());

    let location = dom::first_text(card, &["span.job-search-card__location"])
        .unwrap_or_else(|| NA.to_string());

    let link = dom::first_attr(card, &["a.base-card__full-link"], "href")
        .map(|href| dom::absolutize(ORIGIN, &href))
        .unwrap_or_else(|| NA.to_string());

    JobRecord::new(title, company, location, link)
}

#[async_trait]
impl JobSource for LinkedInJobs {
    fn name(&self) -> &str {
        "linkedin-jobs"
    }

    async fn scrape(
        &self,
        renderer: &dyn PageRenderer,
        query: &SearchQuery,
        tuning: &ScrapeTuning,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = Self::search_url(query);
        info!("Scraping LinkedIn jobs: {}", url);

        if let Err(err) = renderer.navigate(&url).await {
            return recover_render(err, self.name());
        }

        let wait = Duration::from_secs(tuning.linkedin_wait_secs);
        if let Err(err) = renderer
            .wait_for(&Locator::class_name(RESULTS_LIST_CLASS), wait)
            .await
        {
            return recover_render(err, self.name());
        }

        // Best-effort lazy-load trigger; parsing happens once afterwards
        // with no confirmation that more content actually arrived.
        for _ in 0..tuning.linkedin_scroll_passes {
            if let Err(err) = renderer.run_script(SCROLL_TO_BOTTOM).await {
                return recover_render(err, self.name());
            }
            tokio::time::sleep(Duration::from_secs(tuning.scroll_delay_secs)).await;
        }

        let html = match renderer.html().await {
            Ok(html) => html,
            Err(err) => return recover_render(err, self.name()),
        };

        let records = parse_listing(&html);
        debug!("LinkedIn jobs: parsed {} cards", records.len());

        Ok(records)
    }
}
