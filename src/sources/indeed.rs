//! Indeed extractor.
//!
//! Request-first: the search page is fetched with a plain HTTP request
//! and the browser session is only escalated to when the response turns
//! out to be the anti-automation interstitial. This keeps the expensive
//! rendered path out of the common case.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use super::{JobSource, ScrapeError};
use crate::config::ScrapeTuning;
use crate::dom;
use crate::http::HttpClient;
use crate::models::{JobRecord, SearchQuery, NA};
use crate::render::{Locator, PageRenderer};

const ORIGIN: &str = "https://www.indeed.com";

/// Page title of the challenge interstitial.
const INTERSTITIAL_TITLE: &str = "Just a moment...";

/// Job title links the rendered page exposes in either layout.
const JOB_LINK_SELECTORS: &str = "h2.jobTitle > a[data-jk], a.jcs-JobTitle";

/// Card discovery strategies, most specific first.
const CARD_STRATEGIES: &[&str] = &[
    "div.job_seen_beacon",
    "td.resultContent",
    r#"div[class*="jobsearch-SerpJobCard"], div[class*="tapItem"]"#,
];

/// Dismiss a consent/promotional overlay if one is up. Absence of the
/// button is not an error.
const DISMISS_OVERLAY_SCRIPT: &str = r#"
    const btn = document.querySelector(
        "button.popover-x-button-close, button.icl-CloseButton, [aria-label='close'], [aria-label='Close']"
    );
    if (btn) { btn.click(); }
"#;

/// Extractor for Indeed job search.
#[derive(Default)]
pub struct Indeed {}

impl Indeed {
    pub fn new() -> Self {
        Self {}
    }

    fn search_url(query: &SearchQuery) -> String {
        format!(
            "{}/jobs?q={}&l={}",
            ORIGIN,
            urlencoding::encode(&query.designation),
            urlencoding::encode(&query.city)
        )
    }

    /// Escalate to the rendered-browser path after an interstitial.
    async fn render_listing(
        &self,
        renderer: &dyn PageRenderer,
        url: &str,
        tuning: &ScrapeTuning,
    ) -> Result<String, ScrapeError> {
        renderer.navigate(url).await?;

        let wait = Duration::from_secs(tuning.indeed_wait_secs);
        renderer
            .wait_for(&Locator::css(JOB_LINK_SELECTORS), wait)
            .await?;

        if let Err(err) = renderer.run_script(DISMISS_OVERLAY_SCRIPT).await {
            debug!("No overlay dismissed on Indeed: {}", err);
        } else {
            tokio::time::sleep(Duration::from_secs(tuning.settle_delay_secs)).await;
        }

        let html = renderer.html().await?;
        if is_interstitial(&html) {
            return Err(ScrapeError::Blocked(url.to_string()));
        }

        Ok(html)
    }
}

/// Whether the page is the known challenge interstitial.
fn is_interstitial(html: &str) -> bool {
    let document = Html::parse_document(html);

    document
        .select(&dom::sel("title"))
        .next()
        .map(|title| dom::text_of(title).contains(INTERSTITIAL_TITLE))
        .unwrap_or(false)
}

fn parse_listing(html: &str) -> Vec<JobRecord> {
    let document = Html::parse_document(html);

    discover_cards(&document).into_iter().map(parse_card).collect()
}

/// Try each discovery strategy in order, stopping at the first that
/// yields any matches.
fn discover_cards(document: &Html) -> Vec<ElementRef<'_>> {
    for strategy in CARD_STRATEGIES {
        let cards: Vec<_> = document.select(&dom::sel(strategy)).collect();
        if !cards.is_empty() {
            return cards;
        }
    }

    Vec::new()
}

fn parse_card(card: ElementRef<'_>) -> JobRecord {
    // The title element doubles as the link carrier: an anchor nested in
    // the heading, or an accessibility span when the anchor is absent.
    let heading = dom::select_first(card, r#"h2[class*="jobTitle"]"#);
    let title_element = heading.and_then(|h2| {
        dom::select_first(h2, "a").or_else(|| dom::select_first(h2, r#"span[aria-hidden="true"]"#))
    });
    let resolved_title = title_element.or(heading);

    let title = resolved_title
        .map(dom::text_of)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NA.to_string());

    let company = dom::first_text(
        card,
        &[r#"span[data-testid="company-name"]"#, "span.companyName"],
    )
    .unwrap_or_else(|| NA.to_string());

    let location = dom::first_text(
        card,
        &[r#"div[data-testid="text-location"]"#, "div.companyLocation"],
    )
    .unwrap_or_else(|| NA.to_string());

    let link = title_element
        .and_then(|element| element.value().attr("href"))
        .map(str::to_string)
        .or_else(|| dom::first_attr(card, &["h2.jobTitle > a[data-jk]"], "href"))
        .or_else(|| dom::first_attr(card, &["a.jcs-JobTitle"], "href"))
        .map(|href| dom::absolutize(ORIGIN, &href))
        .unwrap_or_else(|| NA.to_string());

    JobRecord::new(title, company, location, link)
}

#[async_trait]
impl JobSource for Indeed {
    fn name(&self) -> &str {
        "indeed"
    }

    async fn scrape(
        &self,
        renderer: &dyn PageRenderer,
        query: &SearchQuery,
        tuning: &ScrapeTuning,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = Self::search_url(query);
        info!("Scraping Indeed: {}", url);

        let client = HttpClient::new(Duration::from_secs(tuning.indeed_http_timeout_secs));
        let (status, body) = match client.fetch(&url).await {
            Ok(response) => response,
            Err(err) => {
                warn!("{}: {}", self.name(), ScrapeError::from(err));
                return Ok(Vec::new());
            }
        };

        if !status.is_success() {
            warn!("Indeed returned {}", status);
            return Ok(Vec::new());
        }

        let html = if is_interstitial(&body) {
            info!("Indeed served an interstitial; escalating to the browser");
            match self.render_listing(renderer, &url, tuning).await {
                Ok(rendered) => rendered,
                Err(ScrapeError::Session(msg)) => return Err(ScrapeError::Session(msg)),
                Err(err) => {
                    warn!("{}: {}", self.name(), err);
                    return Ok(Vec::new());
                }
            }
        } else {
            body
        };

        let records = parse_listing(&html);
        debug!("Indeed: parsed {} cards", records.len());

        Ok(records)
    }
}
