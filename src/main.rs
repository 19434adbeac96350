use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bankin_report::app;
use bankin_report::config::Config;

#[derive(Parser)]
#[command(name = "bankin-report")]
#[command(about = "Logs into Bankin, extracts monthly totals, and reports them to Discord")]
struct Cli {
    /// Month label to select on the report pages (e.g. "février").
    /// Defaults to the current month in French.
    #[arg(long, env = "BANKIN_MONTH")]
    month: Option<String>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headed: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "info,chromiumoxide=warn,chromiumoxide::conn=off,chromiumoxide::handler=off",
            )
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn current_month_label() -> String {
    chrono::Local::now()
        .format_localized("%B", chrono::Locale::fr_FR)
        .to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if cli.headed {
        config.browser.headless = false;
    }

    if config.uses_placeholder_credentials() {
        warn!("BANKIN_EMAIL/BANKIN_PASSWORD are not set; using placeholder credentials");
    }

    let month = cli.month.unwrap_or_else(current_month_label);

    match app::run(&config, &month).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            error!(error = %err, "fatal error");
            ExitCode::from(1)
        }
    }
}
