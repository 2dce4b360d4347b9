// storage/mod.rs
// Database operations module

pub mod audit;
pub mod catalog;
pub mod deals;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod scans;

#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use audit::{record_audit, AuditEntry};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use scans::NewScanItem;
