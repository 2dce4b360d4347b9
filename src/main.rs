//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `deal_reconciler` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - JSON output of results and errors
//!
//! All core functionality is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use deal_reconciler::config::{Command, Opt};
use deal_reconciler::initialization::{init_database, init_logger_with};
use deal_reconciler::scan::count_by_type;
use deal_reconciler::{
    confirm, load_scan_result, scan_asset, Config, ConfirmRequest, ReconcileContext,
    ReconcileError,
};

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Prints the error payload and exits with a failure status.
fn fail(error: &ReconcileError) -> ! {
    eprintln!("{}", json!(error.to_body()));
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = Config::from(&opt);
    let pool = init_database(&config)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

    match opt.command {
        Command::Migrate => {
            println!("Database ready at {}", config.db_path.display());
        }
        Command::Scan { asset_id, actor } => {
            let ctx = ReconcileContext::new(pool, config).context("Failed to build HTTP client")?;
            match scan_asset(&ctx, asset_id, &actor).await {
                Ok(result) => print_json(&json!({
                    "counts": count_by_type(&result.items),
                    "scan": result,
                }))?,
                Err(e) => fail(&e),
            }
        }
        Command::Confirm {
            item_id,
            decision,
            partner_id,
            brand_id,
            position_id,
            geo,
            actor,
        } => {
            let request = ConfirmRequest {
                partner_id,
                brand_id,
                position_id,
                geo,
            };
            match confirm(&pool, item_id, decision.into(), request, &actor).await {
                Ok(outcome) => print_json(&json!(outcome))?,
                Err(e) => fail(&e),
            }
        }
        Command::ShowScan { scan_id } => match load_scan_result(&pool, scan_id).await {
            Ok(result) => print_json(&json!({
                "counts": count_by_type(&result.items),
                "scan": result,
            }))?,
            Err(e) => fail(&e),
        },
    }

    Ok(())
}
