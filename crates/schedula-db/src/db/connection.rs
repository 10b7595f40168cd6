use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// Connection pool bounds, configured once at startup.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub max_size: u32,
    pub min_idle: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

/// ## Summary
/// Creates a new database connection pool with the given bounds.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the provided database URL.
#[tracing::instrument(skip(database_url), fields(pool_size = options.max_size))]
pub async fn create_pool(database_url: &str, options: PoolOptions) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(options.max_size)
        .min_idle(Some(options.min_idle.min(options.max_size)))
        .max_lifetime(Some(options.max_lifetime))
        .idle_timeout(Some(options.idle_timeout))
        .test_on_check_out(false)
        .build(config)
        .await?;

    tracing::info!(
        pool_size = options.max_size,
        "Database connection pool created successfully"
    );

    Ok(pool)
}
