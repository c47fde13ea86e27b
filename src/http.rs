//! Plain HTTP client for the request-first fetch path.
//!
//! Some boards serve complete listing markup to a well-identified plain
//! request, which is far cheaper than driving the browser session. The
//! client here carries a realistic browser identity and a bounded
//! timeout; callers fall back to the rendered-browser path when the
//! response turns out to be an anti-automation interstitial.

use std::time::Duration;

use reqwest::{Client, StatusCode};

/// Realistic browser identity for plain requests.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client with a browser user agent and bounded timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch a page, returning the response status and body text.
    pub async fn fetch(&self, url: &str) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok((status, body))
    }
}
