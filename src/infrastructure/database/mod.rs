//! Database Module
//!
//! PostgreSQL connection pool, migrations and readiness probing.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Create a PostgreSQL connection pool
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(&settings.url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Dependency probe used by the readiness endpoint.
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    /// Component name reported in the health response.
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
impl ReadinessCheck for PgPool {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn ping(&self) -> Result<(), AppError> {
        let idle = self.num_idle() as u32;
        let size = self.size();
        metrics::update_db_pool_stats(idle, size.saturating_sub(idle), self.options().get_max_connections());

        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}
