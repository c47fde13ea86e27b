//! DOM extraction helpers shared by the source extractors.
//!
//! Listing pages change markup frequently, so every field is extracted
//! through an ordered list of selector strategies: apply in order, take
//! the first non-empty result, let the caller fall back to a sentinel.

use scraper::{ElementRef, Selector};
use url::Url;

/// Parse a selector known to be valid at compile time.
pub fn sel(selectors: &str) -> Selector {
    Selector::parse(selectors).expect("static selector must parse")
}

/// Collect an element's text with normalized whitespace.
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element under `scope` matching `selectors`.
pub fn select_first<'a>(scope: ElementRef<'a>, selectors: &str) -> Option<ElementRef<'a>> {
    scope.select(&sel(selectors)).next()
}

/// Evaluate selector strategies in order; return the first non-empty
/// text found under `scope`.
pub fn first_text(scope: ElementRef<'_>, strategies: &[&str]) -> Option<String> {
    for selectors in strategies {
        for element in scope.select(&sel(selectors)) {
            let text = text_of(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Evaluate selector strategies in order; return the first non-empty
/// value of `attr` found under `scope`.
pub fn first_attr(scope: ElementRef<'_>, strategies: &[&str], attr: &str) -> Option<String> {
    for selectors in strategies {
        for element in scope.select(&sel(selectors)) {
            if let Some(value) = element.value().attr(attr) {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Rewrite an origin-relative link against the source's canonical
/// origin. Already-absolute links pass through unchanged.
pub fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    match Url::parse(origin).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn root(html: &Html) -> ElementRef<'_> {
        html.root_element()
    }

    #[test]
    fn absolutize_rewrites_relative_links() {
        assert_eq!(
            absolutize("https://www.linkedin.com", "/jobs/view/123"),
            "https://www.linkedin.com/jobs/view/123"
        );
    }

    #[test]
    fn absolutize_passes_absolute_links_through() {
        let href = "https://www.linkedin.com/jobs/view/123";
        assert_eq!(absolutize("https://internshala.com", href), href);
    }

    #[test]
    fn absolutize_handles_protocol_relative_links() {
        assert_eq!(
            absolutize("https://www.indeed.com", "//cdn.indeed.com/x"),
            "https://cdn.indeed.com/x"
        );
    }

    #[test]
    fn first_text_takes_first_non_empty_strategy() {
        let html = Html::parse_fragment(
            r#"<div><h4 class="subtitle"></h4><a class="fallback">Acme Corp</a></div>"#,
        );

        let text = first_text(root(&html), &["h4.subtitle", "a.fallback"]);
        assert_eq!(text, Some("Acme Corp".to_string()));
    }

    #[test]
    fn first_text_returns_none_when_all_strategies_miss() {
        let html = Html::parse_fragment("<div><p>unrelated</p></div>");

        assert_eq!(first_text(root(&html), &["h3.title", "h4.subtitle"]), None);
    }

    #[test]
    fn first_attr_skips_elements_without_the_attribute() {
        let html = Html::parse_fragment(r#"<div><a class="link"></a><a class="link" href="/jobs/1">x</a></div>"#);

        let href = first_attr(root(&html), &["a.link"], "href");
        assert_eq!(href, Some("/jobs/1".to_string()));
    }

    #[test]
    fn text_of_collapses_whitespace() {
        let html = Html::parse_fragment("<p>  Acme \n  Corp  </p>");
        let p = select_first(root(&html), "p").unwrap();

        assert_eq!(text_of(p), "Acme Corp");
    }
}
