//! The run pipeline: login, extract both figures, summarize, notify.
//!
//! [`run_pipeline`] is side-effect-free with respect to the process: it
//! returns a [`RunOutcome`] and the binary alone maps that to an exit
//! code. [`run`] wraps it with the real browser session and guarantees
//! teardown on every path, including Ctrl-C.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{
    Credentials, FinancialSummary, LoginResult, EXPENSES_VIEW, INCOMES_VIEW,
};
use crate::notify::DiscordNotifier;
use crate::scraper::{PageDriver, Scraper};
use crate::session::BrowserSession;

/// What one run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub login: LoginResult,

    /// Present when login succeeded and extraction was attempted.
    pub summary: Option<FinancialSummary>,
}

impl RunOutcome {
    /// 0 when login succeeded and the run completed, 1 otherwise.
    /// Extraction failures are reported through the summary and the
    /// notification, not the exit code.
    pub fn exit_code(&self) -> u8 {
        if self.login.success {
            0
        } else {
            1
        }
    }
}

/// Execute the full pipeline against an already-running page.
pub async fn run_pipeline(
    driver: &dyn PageDriver,
    notifier: Option<&DiscordNotifier>,
    credentials: &Credentials,
    target_month: &str,
) -> RunOutcome {
    let scraper = Scraper::new(driver);

    let login = scraper.login(credentials).await;
    info!(success = login.success, url = %login.current_url, "login finished");

    if !login.success {
        if let Some(notifier) = notifier {
            let report = format!("Échec de la connexion: {}", login.message);
            if let Err(err) = notifier.send_error(&report).await {
                warn!(error = %err, "failed to deliver the error notification");
            }
        }
        return RunOutcome {
            login,
            summary: None,
        };
    }

    let expenses = scraper.fetch_total(&EXPENSES_VIEW, target_month).await;
    let incomes = scraper.fetch_total(&INCOMES_VIEW, target_month).await;

    let summary = FinancialSummary::new(&expenses, &incomes);
    print_summary(&summary);

    if let Some(notifier) = notifier {
        if let Err(err) = notifier.send_summary(&summary).await {
            warn!(error = %err, "failed to deliver the summary notification");
        }
    }

    RunOutcome {
        login,
        summary: Some(summary),
    }
}

/// Launch a browser session, run the pipeline, and close the session on
/// every path. An interrupt closes the session before surfacing as an
/// error.
pub async fn run(config: &Config, target_month: &str) -> Result<RunOutcome> {
    let session = BrowserSession::launch(&config.browser).await?;

    let notifier = config
        .discord
        .as_ref()
        .map(|discord| DiscordNotifier::new(&discord.token, &discord.channel_id));
    if notifier.is_none() {
        info!("Discord is not configured; skipping notifications");
    }

    let outcome = tokio::select! {
        outcome = run_pipeline(
            session.page(),
            notifier.as_ref(),
            &config.credentials,
            target_month,
        ) => Some(outcome),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupt received, closing the browser session");
            None
        }
    };

    session.close().await;

    match outcome {
        Some(outcome) => Ok(outcome),
        None => anyhow::bail!("interrupted"),
    }
}

fn print_summary(summary: &FinancialSummary) {
    println!("\nMonthly report for {}", summary.month);
    println!("  Expenses: {}", summary.expenses);
    println!("  Income:   {}", summary.revenues);
    match summary.net_balance_display() {
        Some(net) => println!("  Net:      {net} €"),
        None => println!(
            "  Net:      unavailable ({})",
            summary.message.as_deref().unwrap_or("extraction failed")
        ),
    }
}
