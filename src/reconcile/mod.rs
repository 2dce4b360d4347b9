//! Confirmation workflow for scan items.
//!
//! A reviewer either ignores an item or confirms it. Confirming a missing item
//! ends its deal; confirming an unmatched link creates a deal for it; verified
//! and replacement items are only acknowledged.
//!
//! Each item leaves `pending` exactly once. Mutating confirmations claim the
//! item as the first statement of their transaction, so a concurrent second
//! call either waits for the first to commit and then sees the item processed,
//! or finds the position occupied.

use log::{error, info};
use serde::Serialize;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::DEFAULT_GEO;
use crate::error_handling::{Entity, ReconcileError};
use crate::lifecycle::{initial_status, insert_occupying_deal, load_owned_brand};
use crate::storage::catalog;
use crate::storage::deals::{self, NewDealRow};
use crate::storage::models::{DealStatus, ItemAction, ScanItemType, ScanResultItem};
use crate::storage::scans::{self, ScanItemContext};
use crate::storage::{record_audit, AuditEntry};

/// Reviewer decision on a scan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Ignore,
}

/// Reviewer input needed to confirm an unmatched link.
#[derive(Debug, Clone, Default)]
pub struct ConfirmRequest {
    pub partner_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub position_id: Option<i64>,
    /// Defaults to `GLOBAL`
    pub geo: Option<String>,
}

/// What a confirmation did.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub item_id: i64,
    pub item_type: ScanItemType,
    pub action: ItemAction,
    pub created_deal_id: Option<i64>,
    pub created_deal_status: Option<DealStatus>,
    pub ended_deal_id: Option<i64>,
}

impl ConfirmOutcome {
    fn acknowledged(item: &ScanResultItem, action: ItemAction) -> Self {
        Self {
            item_id: item.id,
            item_type: item.item_type,
            action,
            created_deal_id: None,
            created_deal_status: None,
            ended_deal_id: None,
        }
    }
}

/// Applies a reviewer decision to one pending scan item.
///
/// # Errors
///
/// - `NotFound` when the item (or a referenced partner, brand or position) does not exist
/// - `AlreadyProcessed` when the item is no longer pending; nothing changes
/// - `Validation` when an unmatched link is confirmed without partner, brand and position
/// - `BrandPartnerMismatch` / `PositionOccupied` from inside the transaction, which is rolled back
pub async fn confirm(
    pool: &SqlitePool,
    item_id: i64,
    decision: Decision,
    request: ConfirmRequest,
    actor: &str,
) -> Result<ConfirmOutcome, ReconcileError> {
    match run_confirm(pool, item_id, decision, request, actor).await {
        Ok(outcome) => Ok(outcome),
        Err(e @ (ReconcileError::Database(_) | ReconcileError::Internal(_))) => {
            error!("Confirmation of scan item {item_id} failed: {e}");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

async fn run_confirm(
    pool: &SqlitePool,
    item_id: i64,
    decision: Decision,
    request: ConfirmRequest,
    actor: &str,
) -> Result<ConfirmOutcome, ReconcileError> {
    let ScanItemContext { item, asset_id } = scans::get_scan_item(pool, item_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::ScanResultItem, item_id))?;
    if item.action != ItemAction::Pending {
        return Err(ReconcileError::AlreadyProcessed {
            item_id,
            action: item.action,
        });
    }

    match (decision, item.item_type) {
        (Decision::Ignore, _) => acknowledge(pool, &item, ItemAction::Ignored, actor).await,
        (Decision::Confirm, ScanItemType::Verified | ScanItemType::Replacement) => {
            acknowledge(pool, &item, ItemAction::Confirmed, actor).await
        }
        (Decision::Confirm, ScanItemType::Missing) => confirm_missing(pool, &item, actor).await,
        (Decision::Confirm, ScanItemType::NewUnmatched) => {
            confirm_new_unmatched(pool, &item, asset_id, request, actor).await
        }
    }
}

/// Reports why an item could not be claimed.
async fn claim_failure(conn: &mut SqliteConnection, item_id: i64) -> ReconcileError {
    match scans::get_scan_item(conn, item_id).await {
        Ok(Some(current)) => ReconcileError::AlreadyProcessed {
            item_id,
            action: current.item.action,
        },
        Ok(None) => ReconcileError::not_found(Entity::ScanResultItem, item_id),
        Err(e) => e.into(),
    }
}

async fn acknowledge(
    pool: &SqlitePool,
    item: &ScanResultItem,
    action: ItemAction,
    actor: &str,
) -> Result<ConfirmOutcome, ReconcileError> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    if !scans::claim_item(pool, item.id, action, now_ms).await? {
        let mut conn = pool.acquire().await?;
        return Err(claim_failure(&mut conn, item.id).await);
    }

    info!("Scan item {} ({}) marked {}", item.id, item.item_type, action);
    record_audit(
        pool,
        &[AuditEntry {
            user_id: actor.to_string(),
            entity: Entity::ScanResultItem,
            entity_id: item.id,
            action: match action {
                ItemAction::Ignored => "item_ignored",
                _ => "item_confirmed",
            },
            details: json!({ "item_type": item.item_type }),
        }],
    )
    .await;
    Ok(ConfirmOutcome::acknowledged(item, action))
}

async fn confirm_missing(
    pool: &SqlitePool,
    item: &ScanResultItem,
    actor: &str,
) -> Result<ConfirmOutcome, ReconcileError> {
    let Some(deal_id) = item.matched_deal_id else {
        return Err(ReconcileError::Internal(format!(
            "missing item {} has no matched deal",
            item.id
        )));
    };

    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;
    if let Err(e) = end_missing_deal(&mut tx, item.id, deal_id, now_ms).await {
        tx.rollback().await?;
        return Err(e);
    }
    tx.commit().await?;

    info!("Scan item {} confirmed: deal {} ended", item.id, deal_id);
    record_audit(
        pool,
        &[AuditEntry {
            user_id: actor.to_string(),
            entity: Entity::Deal,
            entity_id: deal_id,
            action: "deal_ended",
            details: json!({ "scan_result_item_id": item.id, "reason": "missing_from_page" }),
        }],
    )
    .await;

    Ok(ConfirmOutcome {
        ended_deal_id: Some(deal_id),
        ..ConfirmOutcome::acknowledged(item, ItemAction::Confirmed)
    })
}

async fn end_missing_deal(
    conn: &mut SqliteConnection,
    item_id: i64,
    deal_id: i64,
    now_ms: i64,
) -> Result<(), ReconcileError> {
    if !scans::claim_item(&mut *conn, item_id, ItemAction::Confirmed, now_ms).await? {
        return Err(claim_failure(conn, item_id).await);
    }
    if deals::close_deal(&mut *conn, deal_id, DealStatus::Ended, now_ms)
        .await?
        .is_none()
    {
        let current = deals::get_deal(&mut *conn, deal_id)
            .await?
            .ok_or_else(|| ReconcileError::not_found(Entity::Deal, deal_id))?;
        return Err(ReconcileError::InvalidTransition {
            deal_id,
            from: current.status,
            to: DealStatus::Ended,
        });
    }
    Ok(())
}

/// Checked reviewer input for a new deal.
struct NewDealInput {
    partner_id: i64,
    brand_id: i64,
    position_id: i64,
    geo: String,
    affiliate_link: String,
}

fn validate_request(
    item: &ScanResultItem,
    request: ConfirmRequest,
) -> Result<NewDealInput, ReconcileError> {
    let mut missing = Vec::new();
    if request.partner_id.is_none() {
        missing.push("partner_id");
    }
    if request.brand_id.is_none() {
        missing.push("brand_id");
    }
    if request.position_id.is_none() {
        missing.push("position_id");
    }
    let affiliate_link = item
        .found_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    if affiliate_link.is_none() {
        missing.push("found_url");
    }

    match (request.partner_id, request.brand_id, request.position_id, affiliate_link) {
        (Some(partner_id), Some(brand_id), Some(position_id), Some(link)) => Ok(NewDealInput {
            partner_id,
            brand_id,
            position_id,
            geo: request
                .geo
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEO.to_string()),
            affiliate_link: link.to_string(),
        }),
        _ => Err(ReconcileError::Validation {
            message: format!(
                "confirming an unmatched link requires {}",
                missing.join(", ")
            ),
            missing,
        }),
    }
}

async fn confirm_new_unmatched(
    pool: &SqlitePool,
    item: &ScanResultItem,
    asset_id: i64,
    request: ConfirmRequest,
    actor: &str,
) -> Result<ConfirmOutcome, ReconcileError> {
    let input = validate_request(item, request)?;

    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;
    let (deal_id, status) =
        match create_deal_for_item(&mut tx, item.id, asset_id, &input, now_ms).await {
            Ok(created) => created,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
    tx.commit().await?;

    info!(
        "Scan item {} confirmed: deal {} created on position {} as {}",
        item.id, deal_id, input.position_id, status
    );
    record_audit(
        pool,
        &[
            AuditEntry {
                user_id: actor.to_string(),
                entity: Entity::Deal,
                entity_id: deal_id,
                action: "deal_created",
                details: json!({
                    "scan_result_item_id": item.id,
                    "position_id": input.position_id,
                    "brand_id": input.brand_id,
                    "status": status,
                }),
            },
            AuditEntry {
                user_id: actor.to_string(),
                entity: Entity::ScanResultItem,
                entity_id: item.id,
                action: "item_confirmed",
                details: json!({ "item_type": item.item_type, "deal_id": deal_id }),
            },
        ],
    )
    .await;

    Ok(ConfirmOutcome {
        created_deal_id: Some(deal_id),
        created_deal_status: Some(status),
        ..ConfirmOutcome::acknowledged(item, ItemAction::Confirmed)
    })
}

async fn create_deal_for_item(
    conn: &mut SqliteConnection,
    item_id: i64,
    asset_id: i64,
    input: &NewDealInput,
    now_ms: i64,
) -> Result<(i64, DealStatus), ReconcileError> {
    if !scans::claim_item(&mut *conn, item_id, ItemAction::Confirmed, now_ms).await? {
        return Err(claim_failure(conn, item_id).await);
    }

    let (partner, _) = load_owned_brand(conn, input.partner_id, input.brand_id).await?;
    let position = catalog::get_position(&mut *conn, input.position_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Position, input.position_id))?;
    if position.asset_id != asset_id {
        return Err(ReconcileError::Validation {
            message: format!(
                "position {} is not on asset {} that was scanned",
                position.id, asset_id
            ),
            missing: Vec::new(),
        });
    }

    let status = initial_status(&partner);
    let row = NewDealRow {
        partner_id: partner.id,
        brand_id: input.brand_id,
        asset_id,
        page_id: position.page_id,
        position_id: position.id,
        status,
        geo: input.geo.clone(),
        affiliate_link: input.affiliate_link.clone(),
        tracking_domain: None,
        start_date_ms: now_ms,
        replaced_deal_id: None,
        created_at_ms: now_ms,
    };
    let deal_id = insert_occupying_deal(conn, &row).await?;
    scans::set_item_matched_deal(&mut *conn, item_id, deal_id).await?;
    Ok((deal_id, status))
}
