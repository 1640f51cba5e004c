use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use storefront_chat::{config::AppConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront_chat=debug")),
        )
        .init();

    let config = AppConfig::from_env();
    let state = Arc::new(AppState::from_config(&config)?);

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router(state, &config.static_dir).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "storefront chat running");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
