//! Bounded-retry navigation with progressive backoff.

use std::time::Duration;

use tracing::{info, warn};

use super::{PageDriver, ScrapeError};

/// Spacing between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Attempt `n` waits `n * base` before retrying (2s, 4s, ... for a
    /// 2s base).
    Linear(Duration),

    /// Every retry waits the same fixed delay.
    Fixed(Duration),
}

/// Bounded retry configuration. Counters reset on every call; there is
/// no cross-call retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Ordinary page loads: 3 attempts, linear 2s backoff.
    pub fn page_load() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear(Duration::from_secs(2)),
        }
    }

    /// Post-submit navigation: 2 attempts, fixed 3s delay.
    pub fn post_submit() -> Self {
        Self {
            max_attempts: 2,
            backoff: Backoff::Fixed(Duration::from_secs(3)),
        }
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear(base) => base * attempt,
            Backoff::Fixed(delay) => delay,
        }
    }
}

/// A navigation that eventually succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// URL the page landed on.
    pub url: String,

    /// How many attempts it took, counting the successful one.
    pub attempts: u32,
}

/// Policy for reclassifying an exhausted post-submit navigation as a
/// success when the page already landed in the authenticated area.
///
/// The wait can lose the race against a page that transitioned before
/// the wait started; this override tolerates that false negative. It is
/// an approximation, not a correctness guarantee, and applies only
/// where explicitly passed in.
#[derive(Debug, Clone)]
pub struct SuccessOverride {
    markers: Vec<String>,
}

impl SuccessOverride {
    pub fn new<S: AsRef<str>>(markers: impl IntoIterator<Item = S>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .collect(),
        }
    }

    /// True when `url` contains any of the configured markers.
    pub fn matches(&self, url: &str) -> bool {
        self.markers.iter().any(|marker| url.contains(marker))
    }
}

/// Navigate to `url`, retrying per `policy`.
pub async fn navigate_with_retry(
    driver: &dyn PageDriver,
    url: &str,
    policy: &RetryPolicy,
) -> Result<NavigationOutcome, ScrapeError> {
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        match driver.goto(url).await {
            Ok(()) => {
                let landed = driver.current_url().await?;
                info!(url, attempt, "navigation succeeded");
                return Ok(NavigationOutcome {
                    url: landed,
                    attempts: attempt,
                });
            }
            Err(err) => {
                warn!(
                    url,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "navigation attempt failed"
                );
                last_error = err.to_string();
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
            }
        }
    }

    Err(ScrapeError::NavigationExhausted {
        url: url.to_string(),
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Await an in-flight navigation (after a form submit), retrying per
/// `policy`. On exhaustion, consult `success_override` against the
/// page's current URL before giving up.
pub async fn await_navigation_with_retry(
    driver: &dyn PageDriver,
    policy: &RetryPolicy,
    success_override: &SuccessOverride,
) -> Result<NavigationOutcome, ScrapeError> {
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        match driver.wait_for_navigation().await {
            Ok(()) => {
                let landed = driver.current_url().await?;
                info!(attempt, "post-submit navigation completed");
                return Ok(NavigationOutcome {
                    url: landed,
                    attempts: attempt,
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "post-submit navigation wait failed"
                );
                last_error = err.to_string();
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
            }
        }
    }

    // The page may have transitioned before the wait started.
    let current = driver.current_url().await.unwrap_or_default();
    if success_override.matches(&current) {
        info!(url = %current, "navigation wait timed out but page is in the authenticated area");
        return Ok(NavigationOutcome {
            url: current,
            attempts: policy.max_attempts,
        });
    }

    Err(ScrapeError::NavigationExhausted {
        url: current,
        attempts: policy.max_attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_backoff_scales_with_attempt() {
        let policy = RetryPolicy::page_load();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let policy = RetryPolicy::post_submit();
        assert_eq!(policy.delay_after(1), Duration::from_secs(3));
    }

    #[test]
    fn override_matches_any_marker() {
        let policy = SuccessOverride::new(["accounts", "dashboard"]);
        assert!(policy.matches("https://app2.bankin.com/accounts"));
        assert!(policy.matches("https://app2.bankin.com/dashboard?x=1"));
        assert!(!policy.matches("https://app2.bankin.com/signin"));
    }
}
