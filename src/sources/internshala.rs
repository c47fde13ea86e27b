//! Internshala extractor.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::{recover_render, JobSource, ScrapeError};
use crate::config::ScrapeTuning;
use crate::dom;
use crate::models::{JobRecord, SearchQuery, NA};
use crate::render::{Locator, PageRenderer};

const ORIGIN: &str = "https://internshala.com";

/// Results list container id.
const LIST_CONTAINER_ID: &str = "internship_list_container";

/// Marker the page renders for a known-empty result, distinct from the
/// container simply never appearing.
const NO_RESULTS_ID: &str = "no_result_found_header";

/// Exact class token for one internship card; falls back to the meta
/// block when the outer card class is absent.
const CARD_SELECTOR: &str = "div.individual_internship";
const CARD_FALLBACK_SELECTOR: &str = ".internship_meta";

const TITLE_SELECTORS: &str = "div.profile, div.heading_4_5, div.job-internship-name, \
     h3.profile, h3.heading_4_5, h3.job-internship-name";

const COMPANY_SELECTORS: &str = "div.company_name, div.heading_6, div.link_display_like_text, \
     a.company_name, a.heading_6, a.link_display_like_text";

/// Extractor for Internshala internship search.
#[derive(Default)]
pub struct Internshala {}

impl Internshala {
    pub fn new() -> Self {
        Self {}
    }

    /// Keywords go into a single hyphenated path segment, not a query
    /// string.
    fn search_url(query: &SearchQuery) -> String {
        let keywords = format!("{} {}", query.designation, query.city);
        format!(
            "{}/internships/keywords-{}",
            ORIGIN,
            urlencoding::encode(keywords.trim())
        )
    }
}

fn parse_listing(html: &str) -> Vec<JobRecord> {
    let document = Html::parse_document(html);

    discover_cards(&document).into_iter().map(parse_card).collect()
}

fn discover_cards(document: &Html) -> Vec<ElementRef<'_>> {
    let cards: Vec<_> = document.select(&dom::sel(CARD_SELECTOR)).collect();
    if !cards.is_empty() {
        return cards;
    }

    document.select(&dom::sel(CARD_FALLBACK_SELECTOR)).collect()
}

fn parse_card(card: ElementRef<'_>) -> JobRecord {
    let title_element = dom::select_first(card, TITLE_SELECTORS);

    let title = title_element
        .map(dom::text_of)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NA.to_string());

    // Sites sometimes append secondary info after a pipe; keep the name.
    let company = dom::first_text(card, &[COMPANY_SELECTORS])
        .map(|raw| {
            raw.split('|')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| NA.to_string());

    let location = location_text(card).unwrap_or_else(|| NA.to_string());

    let link = dom::first_attr(card, &["a.view_detail_button"], "href")
        .or_else(|| {
            title_element
                .and_then(|title| dom::select_first(title, "a"))
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::to_string)
        })
        .or_else(|| card.value().attr("data-href").map(str::to_string))
        .or_else(|| dom::first_attr(card, &["a[href]"], "href"))
        .map(|href| dom::absolutize(ORIGIN, &href))
        .unwrap_or_else(|| NA.to_string());

    JobRecord::new(title, company, location, link)
}

/// Multi-location cards list their locations as links inside a container
/// with a known id prefix; join them comma-separated. A container with
/// no links but its own text is used verbatim.
fn location_text(card: ElementRef<'_>) -> Option<String> {
    if let Some(container) = dom::select_first(card, r#"div[id^="location_names"]"#) {
        let locations: Vec<String> = container
            .select(&dom::sel("a.location_link"))
            .map(dom::text_of)
            .filter(|text| !text.is_empty())
            .collect();

        if !locations.is_empty() {
            return Some(locations.join(", "));
        }

        let own_text = dom::text_of(container);
        if !own_text.is_empty() {
            return Some(own_text);
        }

        return None;
    }

    dom::first_text(card, &["a.location_link"])
}

#[async_trait]
impl JobSource for Internshala {
    fn name(&self) -> &str {
        "internshala"
    }

    async fn scrape(
        &self,
        renderer: &dyn PageRenderer,
        query: &SearchQuery,
        tuning: &ScrapeTuning,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = Self::search_url(query);
        info!("Scraping Internshala: {}", url);

        if let Err(err) = renderer.navigate(&url).await {
            return recover_render(err, self.name());
        }

        let wait = Duration::from_secs(tuning.internshala_wait_secs);
        if let Err(err) = renderer
            .wait_for(&Locator::id(LIST_CONTAINER_ID), wait)
            .await
        {
            return recover_render(err, self.name());
        }

        // A rendered no-results marker is a legitimate empty answer, not
        // a failure.
        match renderer.find_all(&Locator::id(NO_RESULTS_ID)).await {
            Ok(markers) if !markers.is_empty() => {
                info!(
                    "Internshala reports no results for '{} {}'",
                    query.designation, query.city
                );
                return Ok(Vec::new());
            }
            Ok(_) => {}
            Err(err) => return recover_render(err, self.name()),
        }

        let html = match renderer.html().await {
            Ok(html) => html,
            Err(err) => return recover_render(err, self.name()),
        };

        let records = parse_listing(&html);
        debug!("Internshala: parsed {} cards", records.len());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fake::FakeRenderer;

    const LISTING: &str = r##"
        <html><body>
        <div id="internship_list_container">
        <div class="individual_internship" data-href="/internship/detail/789">
            <h3 class="profile">Web Development Intern</h3>
            <div class="company_name">Acme Labs | Actively hiring</div>
            <div id="location_names_1">
                <a class="location_link" href="#">Delhi</a>
                <a class="location_link" href="#">Mumbai</a>
            </div>
        </div>
        <div class="individual_internship">
            <div class="job-internship-name">Design Intern <a href="/internship/detail/456"></a></div>
            <a class="link_display_like_text">Beta Studio</a>
            <div id="location_names_2">Work From Home</div>
            <a class="view_detail_button" href="/internship/detail/123">View details</a>
        </div>
        </div>
        </body></html>
    "##;

    const NO_RESULTS: &str = r#"
        <html><body>
        <div id="internship_list_container">
            <div id="no_result_found_header">No internships found</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn company_name_is_split_on_pipe() {
        let records = parse_listing(LISTING);

        assert_eq!(records[0].company, "Acme Labs");
    }

    #[test]
    fn multi_locations_join_comma_separated() {
        let records = parse_listing(LISTING);

        assert_eq!(records[0].location, "Delhi, Mumbai");
    }

    #[test]
    fn location_container_text_used_when_no_links() {
        let records = parse_listing(LISTING);

        assert_eq!(records[1].location, "Work From Home");
    }

    #[test]
    fn view_details_button_wins_over_title_anchor() {
        let records = parse_listing(LISTING);

        assert_eq!(
            records[1].source_url,
            "https://internshala.com/internship/detail/123"
        );
    }

    #[test]
    fn card_data_href_used_when_no_anchor_matches() {
        // First card: no view button, no anchor nested in the title; the
        // location anchors have href="#", but the data-href attribute on
        // the card itself is ranked above the any-anchor fallback.
        let records = parse_listing(LISTING);

        assert_eq!(
            records[0].source_url,
            "https://internshala.com/internship/detail/789"
        );
    }

    #[test]
    fn meta_fallback_discovers_cards_without_outer_class() {
        let html = r#"
            <div class="internship_meta">
                <h3 class="heading_4_5">Marketing Intern</h3>
                <div class="heading_6">Gamma Inc</div>
            </div>
        "#;

        let records = parse_listing(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Marketing Intern");
        assert_eq!(records[0].company, "Gamma Inc");
    }

    #[test]
    fn search_url_is_a_single_keyword_path_segment() {
        let query = SearchQuery::new("Web Development", "Delhi").unwrap();

        assert_eq!(
            Internshala::search_url(&query),
            "https://internshala.com/internships/keywords-Web%20Development%20Delhi"
        );
    }

    #[tokio::test]
    async fn no_results_marker_short_circuits_to_empty() {
        let query = SearchQuery::new("Underwater Basket Weaving", "Atlantis").unwrap();
        let tuning = ScrapeTuning::instant();
        let url = Internshala::search_url(&query);
        let renderer = FakeRenderer::new().with_page(&url, NO_RESULTS);

        let records = Internshala::new()
            .scrape(&renderer, &query, &tuning)
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_container_times_out_to_empty() {
        let query = SearchQuery::new("Web Development", "Delhi").unwrap();
        let tuning = ScrapeTuning::instant();
        let url = Internshala::search_url(&query);
        let renderer = FakeRenderer::new().with_page(&url, "<html><body></body></html>");

        let records = Internshala::new()
            .scrape(&renderer, &query, &tuning)
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn full_pass_over_fixture_listing() {
        let query = SearchQuery::new("Web Development", "Delhi").unwrap();
        let tuning = ScrapeTuning::instant();
        let url = Internshala::search_url(&query);
        let renderer = FakeRenderer::new().with_page(&url, LISTING);

        let records = Internshala::new()
            .scrape(&renderer, &query, &tuning)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
    }
}
