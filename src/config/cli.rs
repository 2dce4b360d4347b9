//! Command-line options.
//!
//! `Opt` is generated by `clap` from the field attributes and converted into
//! the library [`Config`] by the binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DB_PATH_ENV, DEFAULT_ASSET_SCHEME, DEFAULT_USER_AGENT, FETCH_TIMEOUT_SECS,
    SYSTEM_ACTOR,
};
use crate::config::types::{Config, LogFormat, LogLevel};
use crate::reconcile::Decision;

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Apply the schema
/// deal_reconciler migrate
///
/// # Scan asset 7 and print the classified items
/// deal_reconciler scan --asset-id 7
///
/// # Turn an unmatched link into a deal on position 12
/// deal_reconciler confirm --item-id 40 --decision confirm \
///     --partner-id 3 --brand-id 9 --position-id 12
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "deal_reconciler",
    about = "Scans asset pages for affiliate links and reconciles them against recorded deals."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, value_parser, env = DB_PATH_ENV, default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Page fetch timeout in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS, global = true)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Scheme used to reach asset domains (http is only useful for local testing)
    #[arg(long, default_value = DEFAULT_ASSET_SCHEME, global = true)]
    pub asset_scheme: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Operation to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply database migrations and exit
    Migrate,

    /// Fetch an asset's page and classify its outbound links
    Scan {
        /// Asset to scan
        #[arg(long)]
        asset_id: i64,

        /// User recorded in the audit log
        #[arg(long, default_value = SYSTEM_ACTOR)]
        actor: String,
    },

    /// Confirm or ignore one pending scan item
    Confirm {
        /// Scan item to process
        #[arg(long)]
        item_id: i64,

        /// confirm|ignore
        #[arg(long, value_enum)]
        decision: DecisionArg,

        /// Partner for a new deal (new unmatched items only)
        #[arg(long)]
        partner_id: Option<i64>,

        /// Brand for a new deal (new unmatched items only)
        #[arg(long)]
        brand_id: Option<i64>,

        /// Position for a new deal (new unmatched items only)
        #[arg(long)]
        position_id: Option<i64>,

        /// Geo for a new deal
        #[arg(long)]
        geo: Option<String>,

        /// User recorded in the audit log
        #[arg(long, default_value = SYSTEM_ACTOR)]
        actor: String,
    },

    /// Print a stored scan result with its items
    ShowScan {
        /// Scan result to print
        #[arg(long)]
        scan_id: i64,
    },
}

/// CLI spelling of a review decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DecisionArg {
    /// Apply the item
    Confirm,
    /// Dismiss the item
    Ignore,
}

impl From<DecisionArg> for Decision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Confirm => Decision::Confirm,
            DecisionArg::Ignore => Decision::Ignore,
        }
    }
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Config {
            db_path: opt.db_path.clone(),
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
            fetch_timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent.clone(),
            asset_scheme: opt.asset_scheme.clone(),
        }
    }
}
