mod articles;
mod config;
mod db;
mod errors;
mod images;
mod models;
mod payments;
mod publishers;
mod routes;
mod session;
mod state;
mod users;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, create_redis_client};
use crate::images::client::ImageHostClient;
use crate::payments::client::PaymentClient;
use crate::routes::build_router;
use crate::session::verifier::HsVerifier;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Insightly API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (user-record cache)
    let redis = create_redis_client(&config.redis_url)?;

    // Bearer-token verifier for the external identity provider
    let verifier = Arc::new(HsVerifier::new(config.auth_token_secret.as_bytes()));
    info!("Identity verifier initialized");

    // External collaborators: payment gateway and image host
    let payments = PaymentClient::new(
        config.payment_api_url.clone(),
        config.payment_secret_key.clone(),
    );
    info!("Payment gateway client initialized");

    let images = ImageHostClient::new(
        config.image_host_endpoint.clone(),
        config.image_host_key.clone(),
    );
    info!("Image host client initialized");

    // Build app state
    let state = AppState {
        db,
        redis,
        verifier,
        payments,
        images,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
