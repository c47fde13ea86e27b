//! AI-assisted page analysis.
//!
//! Secondary extraction path for pages without a stable structure: pull
//! the rendered page's visible text and let the text-interpretation
//! capability infer fields. Service failures never cross this module's
//! boundary; each one degrades the result to a partial or empty map.

use std::collections::BTreeMap;

use scraper::Html;
use tracing::{debug, info, warn};

use super::LlmClient;
use crate::render::{PageRenderer, RenderError};

/// Language field values are left in when no translation is requested.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Analyzer over a renderer handle and an optional interpretation
/// capability.
pub struct PageAnalyzer {
    client: Option<LlmClient>,
}

impl PageAnalyzer {
    pub fn new(client: Option<LlmClient>) -> Self {
        Self { client }
    }

    /// Navigate to `url` and infer structured fields from its text.
    ///
    /// Renderer failures propagate; interpretation failures are logged
    /// and leave the affected field out (or untranslated).
    pub async fn analyze(
        &self,
        renderer: &dyn PageRenderer,
        url: &str,
        target_language: &str,
    ) -> Result<BTreeMap<String, String>, RenderError> {
        renderer.navigate(url).await?;
        let html = renderer.html().await?;
        let text = visible_text(&html);

        let mut fields = BTreeMap::new();

        let Some(client) = &self.client else {
            info!("Text-interpretation capability not available; returning empty analysis");
            return Ok(fields);
        };

        match client.extract_fields(&text).await {
            Ok(extracted) => fields = extracted,
            Err(err) => warn!("Field extraction failed: {}", err),
        }

        match client.classify(&text).await {
            Ok(classification) => {
                fields.insert("classification".to_string(), classification);
            }
            Err(err) => warn!("Classification failed: {}", err),
        }

        if !target_language.eq_ignore_ascii_case(DEFAULT_LANGUAGE) {
            let keys: Vec<String> = fields.keys().cloned().collect();
            for key in keys {
                let value = fields[&key].clone();
                if value.is_empty() {
                    continue;
                }
                match client.translate(&value, target_language).await {
                    Ok(translated) => {
                        fields.insert(key, translated);
                    }
                    Err(err) => {
                        // Keep the original value for this field.
                        warn!("Translation failed for {}: {}", key, err);
                    }
                }
            }
        }

        debug!("Analysis produced {} fields", fields.len());
        Ok(fields)
    }
}

/// Visible text of a page: every text node outside script/style blocks,
/// newline-joined with surrounding whitespace stripped.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|element| {
                matches!(element.name(), "script" | "style" | "noscript")
            }))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fake::FakeRenderer;

    const PAGE: &str = r#"
        <html><head>
        <title>Widget</title>
        <style>body { color: red; }</style>
        <script>console.log("tracking");</script>
        </head><body>
        <h1>Widget Deluxe</h1>
        <p>Price: 19.99</p>
        </body></html>
    "#;

    #[test]
    fn visible_text_skips_script_and_style() {
        let text = visible_text(PAGE);

        assert!(text.contains("Widget Deluxe"));
        assert!(text.contains("Price: 19.99"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("tracking"));
    }

    #[tokio::test]
    async fn analysis_without_capability_is_empty_not_an_error() {
        let renderer = FakeRenderer::new().with_page("https://example.com/widget", PAGE);
        let analyzer = PageAnalyzer::new(None);

        let fields = analyzer
            .analyze(&renderer, "https://example.com/widget", DEFAULT_LANGUAGE)
            .await
            .unwrap();

        assert!(fields.is_empty());
    }
}
