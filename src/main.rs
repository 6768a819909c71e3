use std::sync::Arc;

use sweepscan::config::Config;
use sweepscan::notify::{RecipientStore, TelegramNotifier};
use sweepscan::services::{run_scheduler, Scanner};
use sweepscan::sources::OandaClient;
use sweepscan::{api, AppState};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweepscan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!(
        "Starting sweepscan on {}:{} ({} instruments, {}s interval)",
        config.host,
        config.port,
        config.instruments.len(),
        config.scan_interval_secs
    );

    let candle_source = Arc::new(OandaClient::new(
        config.candle_api_url.clone(),
        config.candle_api_key.clone(),
    ));
    let scanner = Scanner::new(candle_source.clone(), config.clone());
    let recipients = Arc::new(RecipientStore::new());

    let notifier = config.telegram_bot_token.as_ref().map(|token| {
        info!("Telegram token found, enabling signal alerts");
        TelegramNotifier::new(token)
    });

    // Start the periodic scan scheduler
    {
        let scanner = scanner.clone();
        let recipients = recipients.clone();
        tokio::spawn(async move {
            run_scheduler(scanner, notifier, recipients).await;
        });
    }

    // Create application state
    let state = AppState {
        config: config.clone(),
        scanner,
        candle_source,
        recipients,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("sweepscan listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
