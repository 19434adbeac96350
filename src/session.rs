//! Chromium-backed browser session.
//!
//! Owns one browser process and one page for the lifetime of a run. The
//! session is torn down exactly once through [`BrowserSession::close`],
//! on every exit path.

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{BrowserOptions, NAVIGATION_TIMEOUT};
use crate::scraper::{PageDriver, ScrapeError};

const VIEWPORT_WIDTH: u32 = 1280;
const VIEWPORT_HEIGHT: u32 = 720;
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One browser process plus its single page.
pub struct BrowserSession {
    browser: Browser,
    page: BrowserPage,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch the browser and open a blank page. Failure here is fatal
    /// and propagates; there is no retry for session setup.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let executable = options
            .executable
            .clone()
            .or_else(find_chrome)
            .context("Chrome/Chromium not found. Install one or set BANKIN_BROWSER.")?;

        info!(%executable, headless = options.headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .viewport(Some(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Default::default()
            }))
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--no-first-run")
            .arg("--disable-gpu")
            .arg("--disable-background-timer-throttling")
            .arg("--disable-backgrounding-occluded-windows")
            .arg("--disable-renderer-backgrounding");

        if !options.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to configure browser: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        info!("browser session ready");

        Ok(Self {
            browser,
            page: BrowserPage { page },
            handler_task,
        })
    }

    /// The session's page, as a [`PageDriver`].
    pub fn page(&self) -> &BrowserPage {
        &self.page
    }

    /// Tear the session down. Consumes the session so it can only
    /// happen once.
    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "browser did not close cleanly");
        }
        self.handler_task.abort();
        info!("browser session closed");
    }
}

/// [`PageDriver`] implementation over a chromiumoxide [`Page`].
pub struct BrowserPage {
    page: Page,
}

fn driver_err(err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Driver(err.to_string())
}

#[async_trait::async_trait]
impl PageDriver for BrowserPage {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.goto(url))
            .await
            .map_err(|_| {
                ScrapeError::Driver(format!(
                    "navigation to {url} timed out after {NAVIGATION_TIMEOUT:?}"
                ))
            })?
            .map_err(driver_err)?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), ScrapeError> {
        tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.wait_for_navigation())
            .await
            .map_err(|_| {
                ScrapeError::Driver(format!(
                    "navigation wait timed out after {NAVIGATION_TIMEOUT:?}"
                ))
            })?
            .map_err(driver_err)?;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        // CDP has no built-in selector wait; poll until the bound.
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ScrapeError::ElementTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<(), ScrapeError> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| ScrapeError::MissingElement {
                    selector: selector.to_string(),
                })?;
        element.click().await.map_err(driver_err)?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| ScrapeError::MissingElement {
                    selector: selector.to_string(),
                })?;
        element.click().await.map_err(driver_err)?;
        element.type_str(text).await.map_err(driver_err)?;
        Ok(())
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        match self.page.find_element(selector).await {
            Ok(element) => element.inner_text().await.map_err(driver_err),
            Err(_) => Ok(None),
        }
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .unwrap_or_default();

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(
                element
                    .inner_text()
                    .await
                    .map_err(driver_err)?
                    .unwrap_or_default(),
            );
        }
        Ok(texts)
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), ScrapeError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|_| ScrapeError::MissingElement {
                selector: selector.to_string(),
            })?;
        let element = elements
            .get(index)
            .ok_or_else(|| ScrapeError::MissingElement {
                selector: format!("{selector} (index {index})"),
            })?;
        element.click().await.map_err(driver_err)?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(driver_err)?
            .unwrap_or_default())
    }
}

/// Find a Chrome/Chromium executable.
fn find_chrome() -> Option<String> {
    for name in ["google-chrome", "chromium"] {
        if let Ok(output) = std::process::Command::new("which").arg(name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/run/current-system/sw/bin/google-chrome",
        "/run/current-system/sw/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }
    None
}
