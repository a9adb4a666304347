use augur::config::Config;
use augur::services::SignalEngine;
use augur::sources::{DerivClient, YahooFinanceClient};
use augur::{api, AppState};
use std::sync::Arc;
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
                .unwrap_or_else(|_| "augur=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Augur server on {}:{}", config.host, config.port);
    info!(
        "Signal policy {}, timeframes {:?}, priority {:?}",
        config.engine.policy, config.engine.timeframes, config.engine.priority
    );

    // Primary bulk-history provider
    let yahoo = Arc::new(YahooFinanceClient::new(config.yahoo.clone())?);

    // Secondary provider for gaps
    if config.deriv.api_token.is_some() {
        info!("Deriv API token found, authorizing secondary requests by default");
    }
    let deriv = Arc::new(DerivClient::new(config.deriv.clone()));

    let engine = Arc::new(SignalEngine::new(yahoo, deriv, config.engine.clone()));

    // Create application state
    let state = AppState {
        config: config.clone(),
        engine,
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
    info!("Augur server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
