//! Discord notification delivery.
//!
//! Posts rich embeds to a channel through the Discord REST API. Delivery
//! failures are reported to the caller, which logs them; they never
//! affect the run's overall outcome.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

use crate::models::FinancialSummary;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const COLOR_POSITIVE: u32 = 0x00ff00;
const COLOR_NEGATIVE: u32 = 0xff6b6b;
const COLOR_ERROR: u32 = 0xff0000;

const FOOTER_TEXT: &str = "Bankin Finance Scraper";

/// Sends financial summaries and error reports to one Discord channel.
pub struct DiscordNotifier {
    client: reqwest::Client,
    token: String,
    channel_id: String,
    api_base: String,
}

impl DiscordNotifier {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            channel_id: channel_id.into(),
            api_base: DISCORD_API_BASE.to_string(),
        }
    }

    /// Point the notifier at a different API base (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Post the monthly summary embed.
    pub async fn send_summary(&self, summary: &FinancialSummary) -> Result<()> {
        self.post_embed(summary_embed(summary)).await
    }

    /// Post a plain error report as a red embed.
    pub async fn send_error(&self, message: &str) -> Result<()> {
        let embed = json!({
            "title": "❌ Erreur Bankin Scraper",
            "description": message,
            "color": COLOR_ERROR,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "footer": { "text": FOOTER_TEXT },
        });
        self.post_embed(embed).await
    }

    async fn post_embed(&self, embed: Value) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.api_base, self.channel_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await
            .context("Failed to reach the Discord API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord API returned {status}: {body}");
        }

        info!(channel_id = %self.channel_id, "notification delivered");
        Ok(())
    }
}

fn summary_embed(summary: &FinancialSummary) -> Value {
    if !summary.success {
        return json!({
            "title": "💰 Résumé Financier Bankin",
            "description": "❌ Échec de la récupération des données financières",
            "color": COLOR_ERROR,
            "fields": [
                {
                    "name": "Erreur",
                    "value": summary.message.as_deref().unwrap_or("Erreur inconnue"),
                    "inline": false,
                },
            ],
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "footer": { "text": FOOTER_TEXT },
        });
    }

    let net = summary.net_balance.unwrap_or(Decimal::ZERO);
    let positive = net >= Decimal::ZERO;
    let color = if positive {
        COLOR_POSITIVE
    } else {
        COLOR_NEGATIVE
    };
    let (status_name, status) = if positive {
        ("📈 Statut", "✅ Solde positif")
    } else {
        ("📉 Statut", "⚠️ Solde négatif")
    };
    let net_display = summary
        .net_balance_display()
        .unwrap_or_else(|| "0.00".to_string());

    json!({
        "title": "💰 Résumé Financier Bankin",
        "description": format!("📅 **Mois:** {}", summary.month),
        "color": color,
        "fields": [
            { "name": "💸 Dépenses", "value": summary.expenses, "inline": true },
            { "name": "💰 Revenus", "value": summary.revenues, "inline": true },
            { "name": "📊 Solde Net", "value": format!("{net_display} €"), "inline": true },
            { "name": status_name, "value": status, "inline": false },
        ],
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "footer": { "text": FOOTER_TEXT },
    })
}
