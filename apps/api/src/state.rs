use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::images::client::ImageHostClient;
use crate::payments::client::PaymentClient;
use crate::session::verifier::IdentityVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Session-scoped user-record cache (see `session::cache`).
    pub redis: RedisClient,
    /// Pluggable bearer-token verifier. Default: HS256 shared secret.
    pub verifier: Arc<dyn IdentityVerifier>,
    pub payments: PaymentClient,
    pub images: ImageHostClient,
    pub config: Config,
}
