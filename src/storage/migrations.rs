//! Schema migrations.
//!
//! The SQL files under `migrations/` are applied at runtime, so the binary and
//! the tests share one schema without compile-time database access.

use log::info;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Applies every pending migration from `migrations/`.
///
/// Safe to call on every start: applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    let latest = migrator.iter().map(|m| m.version).max().unwrap_or_default();
    info!("Database schema at version {latest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent_and_create_occupancy_index() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let index: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_deals_occupied_position'",
        )
        .fetch_optional(&pool)
        .await
        .unwrap();
        assert!(index.is_some());
    }
}
