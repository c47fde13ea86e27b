//! Chromium-backed renderer.
//!
//! Uses chromiumoxide (CDP) with automation-hiding launch arguments and a
//! realistic user agent, since several of the boards gate their listing
//! markup behind bot detection.

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use async_trait::async_trait;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::{Locator, PageRenderer, RenderError, RendererConfig};
#[cfg(not(feature = "browser"))]
use super::RendererConfig;
#[cfg(feature = "browser")]
use crate::http::BROWSER_USER_AGENT;

/// Interval between element-presence probes while waiting.
#[cfg(feature = "browser")]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resolves document readiness without assuming the page fires load
/// events; falls back to a bounded timer.
#[cfg(feature = "browser")]
const READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Renderer over a launched Chromium instance.
#[cfg(feature = "browser")]
pub struct ChromeRenderer {
    config: RendererConfig,
    inner: Mutex<Inner>,
}

#[cfg(feature = "browser")]
struct Inner {
    browser: Option<Browser>,
    page: Option<Page>,
    closed: bool,
}

#[cfg(feature = "browser")]
impl ChromeRenderer {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a renderer; the browser launches lazily on first use.
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                browser: None,
                page: None,
                closed: false,
            }),
        }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf, RenderError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(RenderError::Session(
            "Chrome/Chromium not found; install chromium or google-chrome".to_string(),
        ))
    }

    /// Launch the browser and open the session page if not already up.
    async fn ensure_page(&self, inner: &mut Inner) -> Result<(), RenderError> {
        if inner.closed {
            return Err(RenderError::Session("renderer has been closed".to_string()));
        }
        if inner.page.is_some() {
            return Ok(());
        }

        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu"); // Recommended for headless

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| RenderError::Session(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Session(format!("Failed to launch browser: {}", e)))?;

        // Drive the CDP connection until it drops
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Session(format!("Failed to open page: {}", e)))?;

        page.execute(SetUserAgentOverrideParams::new(
            BROWSER_USER_AGENT.to_string(),
        ))
        .await
        .map_err(|e| RenderError::Session(format!("Failed to set user agent: {}", e)))?;

        inner.browser = Some(browser);
        inner.page = Some(page);

        Ok(())
    }
}

#[cfg(feature = "browser")]
fn page_of(inner: &Inner) -> Result<&Page, RenderError> {
    if inner.closed {
        return Err(RenderError::Session("renderer has been closed".to_string()));
    }
    inner
        .page
        .as_ref()
        .ok_or_else(|| RenderError::Session("no page open".to_string()))
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn navigate(&self, url: &str) -> Result<(), RenderError> {
        let mut inner = self.inner.lock().await;
        self.ensure_page(&mut inner).await?;
        let page = page_of(&inner)?;

        info!("Navigating to {}", url);
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| RenderError::Navigation(format!("Invalid URL: {}", e)))?;

        page.execute(params)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let ready_timeout = Duration::from_secs(self.config.nav_timeout_secs);
        match tokio::time::timeout(ready_timeout, page.evaluate(READY_SCRIPT.to_string())).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }

        // Small additional delay for late-loading scripts
        tokio::time::sleep(Duration::from_millis(500)).await;

        Ok(())
    }

    async fn html(&self) -> Result<String, RenderError> {
        let inner = self.inner.lock().await;
        let page = page_of(&inner)?;

        page.content()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }

    async fn run_script(&self, js: &str) -> Result<(), RenderError> {
        let inner = self.inner.lock().await;
        let page = page_of(&inner)?;

        page.evaluate(js.to_string())
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;

        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<(), RenderError> {
        let selector = locator.to_css();

        let probe = async {
            loop {
                {
                    let inner = self.inner.lock().await;
                    let page = page_of(&inner)?;
                    if page.find_element(selector.as_str()).await.is_ok() {
                        return Ok(());
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout, probe).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::WaitTimeout(selector)),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<String>, RenderError> {
        let inner = self.inner.lock().await;
        let page = page_of(&inner)?;

        let selector_json = serde_json::to_string(&locator.to_css())
            .map_err(|e| RenderError::Script(e.to_string()))?;
        let script = format!(
            "Array.from(document.querySelectorAll({})).map((el) => el.outerHTML)",
            selector_json
        );

        let result = page
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;

        result
            .into_value::<Vec<String>>()
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.closed = true;

        if let Some(page) = inner.page.take() {
            let _ = page.close().await;
        }
        inner.browser = None;
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromeRenderer {
    #[allow(dead_code)]
    config: RendererConfig,
}

#[cfg(not(feature = "browser"))]
impl ChromeRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait::async_trait]
impl super::PageRenderer for ChromeRenderer {
    async fn navigate(&self, _url: &str) -> Result<(), super::RenderError> {
        Err(not_compiled())
    }

    async fn html(&self) -> Result<String, super::RenderError> {
        Err(not_compiled())
    }

    async fn run_script(&self, _js: &str) -> Result<(), super::RenderError> {
        Err(not_compiled())
    }

    async fn wait_for(
        &self,
        _locator: &super::Locator,
        _timeout: std::time::Duration,
    ) -> Result<(), super::RenderError> {
        Err(not_compiled())
    }

    async fn find_all(&self, _locator: &super::Locator) -> Result<Vec<String>, super::RenderError> {
        Err(not_compiled())
    }

    async fn close(&self) {}
}

#[cfg(not(feature = "browser"))]
fn not_compiled() -> super::RenderError {
    super::RenderError::Session(
        "Browser support not compiled. Rebuild with: cargo build --features browser".to_string(),
    )
}
