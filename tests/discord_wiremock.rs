use bankin_report::models::{FinancialFigure, FinancialSummary};
use bankin_report::notify::DiscordNotifier;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn figure(total: &str) -> FinancialFigure {
    FinancialFigure {
        success: true,
        total: total.to_string(),
        month: "Février".to_string(),
        message: String::new(),
    }
}

#[tokio::test]
async fn summary_is_posted_as_an_embed_with_bot_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/42/messages"))
        .and(header("authorization", "Bot test-token"))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "💰 Résumé Financier Bankin",
                "description": "📅 **Mois:** Février",
                "fields": [
                    { "name": "💸 Dépenses", "value": "1 200,00 €" },
                    { "name": "💰 Revenus", "value": "2 000,00 €" },
                    { "name": "📊 Solde Net", "value": "800.00 €" },
                ],
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let summary = FinancialSummary::new(&figure("1 200,00 €"), &figure("2 000,00 €"));
    let notifier = DiscordNotifier::new("test-token", "42").with_api_base(server.uri());

    notifier.send_summary(&summary).await.unwrap();
}

#[tokio::test]
async fn error_report_is_posted_as_a_red_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/42/messages"))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "❌ Erreur Bankin Scraper",
                "description": "Échec de la connexion: login appears to have failed",
                "color": 0xff0000,
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new("test-token", "42").with_api_base(server.uri());

    notifier
        .send_error("Échec de la connexion: login appears to have failed")
        .await
        .unwrap();
}

#[tokio::test]
async fn api_rejection_surfaces_as_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/42/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_raw(
            r#"{"message": "Missing Access", "code": 50001}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new("test-token", "42").with_api_base(server.uri());
    let summary = FinancialSummary::new(&figure("1 200,00 €"), &figure("2 000,00 €"));

    let err = notifier.send_summary(&summary).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}
