use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the Redis client backing the user-record cache. Connections are
/// established lazily per use, so an unreachable Redis degrades to cache
/// misses instead of failing startup.
pub fn create_redis_client(redis_url: &str) -> Result<redis::Client> {
    let client = redis::Client::open(redis_url)?;
    info!("Redis client initialized");
    Ok(client)
}
