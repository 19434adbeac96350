//! Browser-driving core: the page abstraction, retrying navigation, and
//! the login/extraction orchestrator.
//!
//! Everything network-facing in this module is written against the
//! [`PageDriver`] trait so the retry and recovery logic is testable
//! without a browser; the chromiumoxide implementation lives in
//! [`crate::session`].

mod navigate;
mod orchestrator;

pub use navigate::{
    await_navigation_with_retry, navigate_with_retry, Backoff, NavigationOutcome, RetryPolicy,
    SuccessOverride,
};
pub use orchestrator::Scraper;

use std::time::Duration;

/// Errors produced while driving the page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Every navigation attempt failed.
    #[error("navigation to {url} failed after {attempts} attempts: {last_error}")]
    NavigationExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// A required control did not appear within its bound.
    #[error("timed out after {timeout:?} waiting for {selector:?}")]
    ElementTimeout { selector: String, timeout: Duration },

    /// A control expected to be present right now is missing.
    #[error("element {selector:?} not found")]
    MissingElement { selector: String },

    /// The target month has no matching entry and no entry is marked
    /// active.
    #[error("no month entry matches {target:?} and no active month is marked")]
    MonthUnresolved { target: String },

    /// Underlying browser/CDP failure.
    #[error("browser error: {0}")]
    Driver(String),
}

/// Minimal surface of one browser page, as consumed by the scraper.
///
/// Methods mirror the handful of operations the pipeline needs:
/// navigate, wait, click, type, read. Implementations must be safe to
/// call sequentially from a single task; nothing here is ever invoked
/// concurrently.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and wait for the page load to complete.
    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    /// Wait for an in-flight navigation (e.g. after a form submit).
    async fn wait_for_navigation(&self) -> Result<(), ScrapeError>;

    /// Block until `selector` appears, up to `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<(), ScrapeError>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), ScrapeError>;

    /// Type `text` into the first element matching `selector`.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError>;

    /// Inner text of the first match, or `None` when absent.
    async fn element_text(&self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// Inner texts of all matches, in document order.
    async fn element_texts(&self, selector: &str) -> Result<Vec<String>, ScrapeError>;

    /// Click the `index`-th element matching `selector`.
    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), ScrapeError>;

    /// The page's current URL.
    async fn current_url(&self) -> Result<String, ScrapeError>;
}
