//! Fixture-backed renderer for tests.
//!
//! Serves pre-registered HTML per URL and resolves waits and element
//! queries against the fixture markup itself, so extractor tests never
//! touch a real browser or the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use super::{Locator, PageRenderer, RenderError};
use crate::dom;

#[derive(Default)]
pub struct FakeRenderer {
    pages: HashMap<String, String>,
    current: Mutex<Option<String>>,
    scripts: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the HTML served for a URL.
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Scripts executed so far, in order.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    pub fn close_now(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<(), RenderError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RenderError::Session("renderer has been closed".to_string()));
        }
        Ok(())
    }

    fn current_html(&self) -> Result<String, RenderError> {
        self.guard()?;
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RenderError::Navigation("no page loaded".to_string()))
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn navigate(&self, url: &str) -> Result<(), RenderError> {
        self.guard()?;
        let html = self.pages.get(url).cloned().unwrap_or_default();
        *self.current.lock().unwrap() = Some(html);
        Ok(())
    }

    async fn html(&self) -> Result<String, RenderError> {
        self.current_html()
    }

    async fn run_script(&self, js: &str) -> Result<(), RenderError> {
        self.guard()?;
        self.scripts.lock().unwrap().push(js.to_string());
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<(), RenderError> {
        let html = self.current_html()?;
        let document = Html::parse_document(&html);
        let selector = locator.to_css();

        if document.select(&dom::sel(&selector)).next().is_some() {
            Ok(())
        } else {
            Err(RenderError::WaitTimeout(selector))
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<String>, RenderError> {
        let html = self.current_html()?;
        let document = Html::parse_document(&html);

        Ok(document
            .select(&dom::sel(&locator.to_css()))
            .map(|element| element.html())
            .collect())
    }

    async fn close(&self) {
        self.close_now();
    }
}
