//! Error type definitions.
//!
//! `ReconcileError` is the error surfaced by every scan, confirmation and deal
//! lifecycle operation. Each variant carries the ids a caller needs to decide
//! whether to retry, force, or offer a different flow.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use serde_json::json;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use super::categorization::FetchErrorKind;
use crate::storage::models::{DealStatus, ItemAction};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its domain type.
    #[error("Invalid value {value:?} in column {column}")]
    InvalidValue { column: &'static str, value: String },
}

/// Record kinds referenced by errors and audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Asset,
    Partner,
    Brand,
    Position,
    Deal,
    ScanResult,
    ScanResultItem,
}

/// Errors surfaced by the reconciliation engine.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A referenced record does not exist (or an asset has no domain to scan).
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    /// The asset page could not be fetched. Never retried automatically.
    #[error("failed to fetch {url}: {kind}: {message}")]
    FetchFailure {
        url: String,
        kind: FetchErrorKind,
        message: String,
    },

    /// Required input is missing or inconsistent; nothing was mutated.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        missing: Vec<&'static str>,
    },

    /// The scan item already left the pending state.
    #[error("scan item {item_id} was already {action}")]
    AlreadyProcessed { item_id: i64, action: ItemAction },

    /// The brand is owned by a different partner.
    #[error("brand {brand_id} does not belong to partner {partner_id}")]
    BrandPartnerMismatch { brand_id: i64, partner_id: i64 },

    /// The position already holds an occupying deal.
    #[error("position {position_id} is already occupied{}", occupant_suffix(.occupying_deal_id))]
    PositionOccupied {
        position_id: i64,
        occupying_deal_id: Option<i64>,
    },

    /// The requested deal status change is not allowed.
    #[error("deal {deal_id} cannot move from {from} to {to}")]
    InvalidTransition {
        deal_id: i64,
        from: DealStatus,
        to: DealStatus,
    },

    /// Storage failure; the surrounding transaction was rolled back.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Unexpected failure; logged where it happened.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ReconcileError {
    fn from(e: sqlx::Error) -> Self {
        ReconcileError::Database(DatabaseError::SqlError(e))
    }
}

fn occupant_suffix(deal_id: &Option<i64>) -> String {
    deal_id.map(|id| format!(" by deal {id}")).unwrap_or_default()
}

/// Serializable error payload handed back to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: serde_json::Value,
}

impl ReconcileError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::NotFound { .. } => "NOT_FOUND",
            ReconcileError::FetchFailure { .. } => "FETCH_FAILURE",
            ReconcileError::Validation { .. } => "VALIDATION_ERROR",
            ReconcileError::AlreadyProcessed { .. } => "ALREADY_PROCESSED",
            ReconcileError::BrandPartnerMismatch { .. } => "BRAND_PARTNER_MISMATCH",
            ReconcileError::PositionOccupied { .. } => "POSITION_OCCUPIED",
            ReconcileError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ReconcileError::Database(_) | ReconcileError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Builds the payload returned to the caller.
    ///
    /// Storage and internal failures only expose a generic message; their
    /// detail is in the logs.
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            ReconcileError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
            ReconcileError::FetchFailure { url, kind, .. } => json!({ "url": url, "kind": kind }),
            ReconcileError::Validation { missing, .. } => json!({ "missing": missing }),
            ReconcileError::AlreadyProcessed { item_id, action } => {
                json!({ "item_id": item_id, "action": action })
            }
            ReconcileError::BrandPartnerMismatch {
                brand_id,
                partner_id,
            } => json!({ "brand_id": brand_id, "partner_id": partner_id }),
            ReconcileError::PositionOccupied {
                position_id,
                occupying_deal_id,
            } => json!({ "position_id": position_id, "occupying_deal_id": occupying_deal_id }),
            ReconcileError::InvalidTransition { deal_id, from, to } => {
                json!({ "deal_id": deal_id, "from": from, "to": to })
            }
            ReconcileError::Database(_) | ReconcileError::Internal(_) => json!({}),
        };
        let message = match self {
            ReconcileError::Database(_) | ReconcileError::Internal(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody {
            code: self.code(),
            message,
            details,
        }
    }

    /// Shorthand for a missing record.
    pub fn not_found(entity: Entity, id: i64) -> Self {
        ReconcileError::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_display_is_snake_case() {
        assert_eq!(Entity::ScanResultItem.to_string(), "scan_result_item");
        assert_eq!(Entity::Asset.as_ref(), "asset");
    }

    #[test]
    fn test_not_found_message_and_body() {
        let err = ReconcileError::not_found(Entity::Asset, 42);
        assert_eq!(err.to_string(), "asset 42 not found");
        let body = err.to_body();
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.details["entity"], "asset");
        assert_eq!(body.details["id"], 42);
    }

    #[test]
    fn test_position_occupied_carries_ids() {
        let err = ReconcileError::PositionOccupied {
            position_id: 7,
            occupying_deal_id: Some(3),
        };
        assert_eq!(err.to_string(), "position 7 is already occupied by deal 3");
        let body = err.to_body();
        assert_eq!(body.code, "POSITION_OCCUPIED");
        assert_eq!(body.details["position_id"], 7);
        assert_eq!(body.details["occupying_deal_id"], 3);

        let err = ReconcileError::PositionOccupied {
            position_id: 7,
            occupying_deal_id: None,
        };
        assert_eq!(err.to_string(), "position 7 is already occupied");
    }

    #[test]
    fn test_already_processed_reports_action() {
        let err = ReconcileError::AlreadyProcessed {
            item_id: 5,
            action: ItemAction::Ignored,
        };
        assert_eq!(err.to_string(), "scan item 5 was already ignored");
        assert_eq!(err.to_body().details["action"], "ignored");
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = ReconcileError::Internal("pool exhausted at 0x1f".to_string());
        let body = err.to_body();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "internal error");
    }
}
