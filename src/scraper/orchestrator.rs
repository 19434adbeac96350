//! Login and extraction orchestration.
//!
//! Both entry points catch every error at their boundary and fold it
//! into a result record; callers never need error handling for the
//! expected failure modes.

use secrecy::ExposeSecret;
use tracing::{error, info, warn};

use crate::config::{
    selectors, AUTHENTICATED_URL_MARKERS, LOGIN_SUCCESS_MARKERS, SELECTOR_TIMEOUT, SETTLE_DELAY,
    SIGNIN_URL,
};
use crate::models::{Credentials, FinancialFigure, LoginResult, ReportView};

use super::{
    await_navigation_with_retry, navigate_with_retry, PageDriver, RetryPolicy, ScrapeError,
    SuccessOverride,
};

/// Drives one page through the login and extraction sequences.
pub struct Scraper<'a> {
    driver: &'a dyn PageDriver,
}

impl<'a> Scraper<'a> {
    pub fn new(driver: &'a dyn PageDriver) -> Self {
        Self { driver }
    }

    /// Run the full sign-in sequence: navigate, wait for the form, fill
    /// it, submit, verify. Never fails; errors become a failure result
    /// with a best-effort current URL.
    pub async fn login(&self, credentials: &Credentials) -> LoginResult {
        match self.login_inner(credentials).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "login sequence failed");
                let current_url = self.driver.current_url().await.unwrap_or_default();
                LoginResult::failure(current_url, format!("login error: {err}"))
            }
        }
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<LoginResult, ScrapeError> {
        info!(url = SIGNIN_URL, "navigating to sign-in page");
        navigate_with_retry(self.driver, SIGNIN_URL, &RetryPolicy::page_load()).await?;

        info!("waiting for login form");
        self.driver
            .wait_for_selector(selectors::EMAIL_INPUT, SELECTOR_TIMEOUT)
            .await?;
        self.driver
            .wait_for_selector(selectors::PASSWORD_INPUT, SELECTOR_TIMEOUT)
            .await?;

        info!(email = %credentials.email, "filling login form");
        self.driver
            .type_text(selectors::EMAIL_INPUT, &credentials.email)
            .await?;
        self.driver
            .type_text(selectors::PASSWORD_INPUT, credentials.password.expose_secret())
            .await?;

        info!("submitting login form");
        self.driver.click(selectors::SUBMIT_BUTTON).await?;

        let landed_authenticated = SuccessOverride::new(AUTHENTICATED_URL_MARKERS.iter().copied());
        await_navigation_with_retry(
            self.driver,
            &RetryPolicy::post_submit(),
            &landed_authenticated,
        )
        .await?;

        let current_url = self.driver.current_url().await?;
        let success = LOGIN_SUCCESS_MARKERS
            .iter()
            .any(|marker| current_url.contains(marker));

        let message = if success {
            info!(url = %current_url, "login succeeded");
            "login succeeded".to_string()
        } else {
            warn!(url = %current_url, "login appears to have failed");
            "login appears to have failed; the page never left the sign-in area".to_string()
        };

        Ok(LoginResult {
            success,
            current_url,
            message,
        })
    }

    /// Extract the monthly total from one report view. Never fails;
    /// errors become a failure figure with a zeroed total.
    pub async fn fetch_total(&self, view: &ReportView, target_month: &str) -> FinancialFigure {
        match self.fetch_total_inner(view, target_month).await {
            Ok(figure) => figure,
            Err(err) => {
                error!(view = view.label, error = %err, "extraction failed");
                FinancialFigure::failed(format!("{} extraction failed: {err}", view.label))
            }
        }
    }

    async fn fetch_total_inner(
        &self,
        view: &ReportView,
        target_month: &str,
    ) -> Result<FinancialFigure, ScrapeError> {
        info!(view = view.label, url = view.url, "navigating to report page");
        navigate_with_retry(self.driver, view.url, &RetryPolicy::page_load()).await?;

        self.driver
            .wait_for_selector(selectors::MONTH_PICKER, SELECTOR_TIMEOUT)
            .await?;

        let month = self.select_month(target_month).await?;

        // Let the report refresh after the month switch.
        tokio::time::sleep(SETTLE_DELAY).await;

        let total = self
            .driver
            .element_text(selectors::TOTAL_DISPLAY)
            .await?
            .ok_or_else(|| ScrapeError::MissingElement {
                selector: selectors::TOTAL_DISPLAY.to_string(),
            })?;
        let total = total.trim().to_string();

        info!(view = view.label, %month, %total, "extracted monthly total");

        Ok(FinancialFigure {
            success: true,
            total: total.clone(),
            month: month.clone(),
            message: format!("{} total for {month}: {total}", view.label),
        })
    }

    /// Activate the month entry matching `target` (trimmed,
    /// case-insensitive substring, first hit wins). Falls back to the
    /// entry marked active; neither is an unrecoverable error for this
    /// extraction.
    async fn select_month(&self, target: &str) -> Result<String, ScrapeError> {
        let needle = target.trim().to_lowercase();
        let entries = self.driver.element_texts(selectors::MONTH_ENTRIES).await?;

        for (index, label) in entries.iter().enumerate() {
            let label = label.trim();
            if label.to_lowercase().contains(&needle) {
                self.driver
                    .click_nth(selectors::MONTH_ENTRIES, index)
                    .await?;
                info!(month = label, "month selected");
                return Ok(label.to_string());
            }
        }

        let active = self
            .driver
            .element_text(selectors::ACTIVE_MONTH)
            .await?
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .ok_or_else(|| ScrapeError::MonthUnresolved {
                target: target.to_string(),
            })?;

        warn!(
            target,
            active = %active,
            "target month not found, falling back to the active month"
        );
        Ok(active)
    }
}
