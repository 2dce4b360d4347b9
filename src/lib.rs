//! deal_reconciler library: affiliate link reconciliation
//!
//! This library scans an asset's page for outbound affiliate links, classifies
//! each one against the recorded deals and brands in a SQLite database, and
//! lets a reviewer confirm or ignore the findings. Confirming a finding can end
//! a deal that disappeared from the page or create a deal for a link nobody
//! recorded, subject to the one-deal-per-position rule.
//!
//! # Example
//!
//! ```no_run
//! use deal_reconciler::initialization::init_database;
//! use deal_reconciler::{confirm, scan_asset, Config, ConfirmRequest, Decision, ReconcileContext};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let pool = init_database(&config).await?;
//! let ctx = ReconcileContext::new(pool, config)?;
//!
//! let scan = scan_asset(&ctx, 7, "reviewer").await?;
//! for item in &scan.items {
//!     println!("{} {:?}", item.item_type, item.found_url);
//! }
//!
//! let outcome = confirm(
//!     &ctx.pool,
//!     scan.items[0].id,
//!     Decision::Ignore,
//!     ConfirmRequest::default(),
//!     "reviewer",
//! )
//! .await?;
//! println!("item {} is now {}", outcome.item_id, outcome.action);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod domain;
pub mod error_handling;
mod fetch;
pub mod initialization;
pub mod lifecycle;
pub mod matching;
pub mod parse;
pub mod reconcile;
pub mod scan;
pub mod storage;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ErrorBody, ReconcileError};
pub use initialization::ReconcileContext;
pub use reconcile::{confirm, ConfirmOutcome, ConfirmRequest, Decision};
pub use scan::{load_scan_result, scan_asset};
pub use storage::run_migrations;
