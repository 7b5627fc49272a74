use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;

/// Create the Postgres pool.
///
/// Every connection gets a session `statement_timeout` so that slow blob
/// transfers are bounded without cutting off large uploads.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout = format!("SET statement_timeout = '{}s'", config.statement_timeout_secs);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .after_connect(move |conn, _meta| {
            let statement_timeout = statement_timeout.clone();
            Box::pin(async move {
                conn.execute(statement_timeout.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
