//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources a scan or
//! confirmation needs:
//! - Logger
//! - HTTP client (with timeouts)
//! - Database connection pool with the schema applied
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::error_handling::{DatabaseError, InitializationError};
use crate::storage::{init_db_pool_with_path, run_migrations};

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Everything the scan and confirmation entry points share.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    pub config: Config,
}

impl ReconcileContext {
    /// Bundles an existing pool with a client built from `config`.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, InitializationError> {
        let client = init_client(&config)?;
        Ok(Self {
            pool,
            client,
            config,
        })
    }
}

/// Opens (creating if needed) the configured database and applies migrations.
pub async fn init_database(config: &Config) -> Result<SqlitePool, DatabaseError> {
    let pool = init_db_pool_with_path(&config.db_path).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
