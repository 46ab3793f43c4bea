//! PostgreSQL pool and embedded migrations.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the pool and apply migrations when `run_migrations` is set.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        target = %redact_url(&settings.url),
        max_connections = settings.max_connections,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(&settings.url)
        .await?;

    if settings.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!(migrations = MIGRATOR.iter().count(), "Database migrations applied");
    }

    Ok(pool)
}

/// Strip credentials from a connection URL before it is logged.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
