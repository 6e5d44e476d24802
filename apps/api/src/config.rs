use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Shared secret the identity provider signs bearer tokens with.
    pub auth_token_secret: String,
    pub image_host_endpoint: String,
    pub image_host_key: String,
    pub payment_api_url: String,
    pub payment_secret_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            auth_token_secret: require_env("AUTH_TOKEN_SECRET")?,
            image_host_endpoint: require_env("IMAGE_HOST_ENDPOINT")?,
            image_host_key: require_env("IMAGE_HOST_KEY")?,
            payment_api_url: require_env("PAYMENT_API_URL")?,
            payment_secret_key: require_env("PAYMENT_SECRET_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
