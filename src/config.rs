//! Environment-sourced configuration and the fixed Bankin endpoints.
//!
//! All knobs come from environment variables with documented defaults.
//! The credential and Discord defaults double as "not configured"
//! sentinels so a fresh checkout runs (and fails) predictably.

use std::time::Duration;

use secrecy::SecretString;

use crate::models::Credentials;

/// Bankin sign-in page.
pub const SIGNIN_URL: &str = "https://app2.bankin.com/signin";

/// Expenses report page (category overview).
pub const EXPENSES_URL: &str = "https://app2.bankin.com/categories";

/// Income report page.
pub const INCOMES_URL: &str = "https://app2.bankin.com/categories/2";

/// URL substrings that confirm a successful login.
pub const LOGIN_SUCCESS_MARKERS: &[&str] = &["accounts"];

/// URL substrings marking the authenticated area of the app. Broader than
/// [`LOGIN_SUCCESS_MARKERS`]: used to reclassify a post-submit navigation
/// timeout as a false negative when the page already transitioned.
pub const AUTHENTICATED_URL_MARKERS: &[&str] = &["accounts", "dashboard"];

/// CSS selectors for the page controls we drive.
pub mod selectors {
    pub const EMAIL_INPUT: &str = "#signin_email";
    pub const PASSWORD_INPUT: &str = "#signin_password";
    pub const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";

    pub const MONTH_PICKER: &str = "#monthSelector";
    pub const MONTH_ENTRIES: &str = "#monthSelector a";
    pub const ACTIVE_MONTH: &str = "#monthSelector a.active";

    /// The single totals display on both report pages.
    pub const TOTAL_DISPLAY: &str = ".dbl.fs2.fw7";
}

/// Per-attempt bound on page navigation.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on waiting for a page control to appear.
pub const SELECTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause after selecting a month, letting the report refresh. The page
/// exposes no load-completion signal for the month switch, so this is a
/// fixed heuristic delay.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_EMAIL: &str = "your-email@example.com";
const DEFAULT_PASSWORD: &str = "your-password";
const DEFAULT_DISCORD_TOKEN: &str = "your-discord-bot-token";
const DEFAULT_DISCORD_CHANNEL: &str = "your-discord-channel-id";

/// Browser launch options.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window. Disabled by `HEADLESS=false`.
    pub headless: bool,

    /// Explicit Chrome/Chromium executable (`BANKIN_BROWSER`), for
    /// deployments where discovery fails.
    pub executable: Option<String>,
}

/// Discord delivery settings, present only when actually configured.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: String,
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub browser: BrowserOptions,
    pub discord: Option<DiscordConfig>,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Recognized variables: `BANKIN_EMAIL`, `BANKIN_PASSWORD`,
    /// `HEADLESS`, `BANKIN_BROWSER`, `DISCORD_TOKEN`,
    /// `DISCORD_CHANNEL_ID`.
    pub fn from_env() -> Self {
        let email = std::env::var("BANKIN_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
        let password =
            std::env::var("BANKIN_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

        let headless = std::env::var("HEADLESS")
            .map(|v| v != "false")
            .unwrap_or(true);

        let discord = match (
            std::env::var("DISCORD_TOKEN").ok(),
            std::env::var("DISCORD_CHANNEL_ID").ok(),
        ) {
            (Some(token), Some(channel_id))
                if token != DEFAULT_DISCORD_TOKEN && channel_id != DEFAULT_DISCORD_CHANNEL =>
            {
                Some(DiscordConfig { token, channel_id })
            }
            _ => None,
        };

        Self {
            credentials: Credentials::new(email, SecretString::from(password)),
            browser: BrowserOptions {
                headless,
                executable: std::env::var("BANKIN_BROWSER").ok(),
            },
            discord,
        }
    }

    /// True when the sentinel credentials are still in place.
    pub fn uses_placeholder_credentials(&self) -> bool {
        self.credentials.email == DEFAULT_EMAIL
    }
}
