// API server binary entry point
//
// Usage: cargo run --bin api_server
// Configuration comes from environment variables; see config::Settings.

use farm_advisor_rust::{create_router, AppState, Settings};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "farm_advisor_rust=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let settings = Settings::from_env();
    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", settings.port);
    tracing::info!("  RATE_LIMIT_PER_MIN: {}", settings.rate_limit);
    tracing::info!("  ALLOWED_ORIGINS: {:?}", settings.allowed_origins);
    tracing::info!("  MOCK_CHAT: {}", settings.mock_chat);

    let port = settings.port;
    let state = AppState::new(settings)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
