//! Database pool bootstrap: connect with retry, then migrate

use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Delay before the attempt following one that waited `current`
pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Connect to PostgreSQL, waiting for it to come up, and run migrations.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = connect_with_retry(config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");
    Ok(pool)
}

async fn connect_with_retry(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = config
        .connect_options()
        .context("Invalid database configuration")?;
    let attempts = config.connect_attempts.max(1);

    let mut backoff = INITIAL_BACKOFF;
    let mut last_error = None;

    for attempt in 1..=attempts {
        let result = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options.clone())
            .await;

        match result {
            Ok(pool) => {
                tracing::info!("Connected to database (attempt {}/{})", attempt, attempts);
                return Ok(pool);
            }
            Err(e) => {
                tracing::warn!(
                    "Database not ready (attempt {}/{}): {}; retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    backoff
                );
                last_error = Some(e);
            }
        }

        if attempt < attempts {
            tokio::time::sleep(backoff).await;
            backoff = next_backoff(backoff);
        }
    }

    match last_error {
        Some(e) => Err(anyhow::Error::new(e)
            .context(format!("Database not ready after {} attempts", attempts))),
        None => anyhow::bail!("Database not ready after {} attempts", attempts),
    }
}
