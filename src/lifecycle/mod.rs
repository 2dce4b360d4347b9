//! Deal lifecycle rules.
//!
//! Shared by the confirmation workflow and by ordinary deal creation:
//! - at most one occupying deal per position
//! - SOP-gated initial status for direct partners
//! - atomic replacement that links the new deal to the one it supersedes
//! - explicit status transitions
//!
//! Every mutation that depends on position occupancy is a single statement or
//! a transaction whose first statement is a write. The partial unique index on `deals(position_id)` is the last line of
//! enforcement; a violation of it is reported as `PositionOccupied`.

mod status;

use std::collections::HashSet;

use log::info;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::DEFAULT_GEO;
use crate::error_handling::{Entity, ReconcileError};
use crate::storage::catalog;
use crate::storage::deals::{self, NewDealRow};
use crate::storage::models::{BrandInfo, Deal, DealStatus, Partner};
use crate::storage::{record_audit, AuditEntry};

pub use status::initial_status;

/// Input for ordinary deal creation.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub partner_id: i64,
    pub brand_id: i64,
    pub position_id: i64,
    /// Defaults to `GLOBAL`
    pub geo: Option<String>,
    pub affiliate_link: String,
    pub tracking_domain: Option<String>,
}

/// The deal that takes over an existing deal's position.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub partner_id: i64,
    pub brand_id: i64,
    pub geo: Option<String>,
    pub affiliate_link: String,
    pub tracking_domain: Option<String>,
}

/// Loads a partner and brand and checks that the brand belongs to the partner.
pub(crate) async fn load_owned_brand(
    conn: &mut SqliteConnection,
    partner_id: i64,
    brand_id: i64,
) -> Result<(Partner, BrandInfo), ReconcileError> {
    let partner = catalog::get_partner(&mut *conn, partner_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Partner, partner_id))?;
    let brand = catalog::get_brand(&mut *conn, brand_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Brand, brand_id))?;
    if brand.partner_id != partner.id {
        return Err(ReconcileError::BrandPartnerMismatch {
            brand_id,
            partner_id,
        });
    }
    Ok((partner, brand))
}

/// Inserts a deal that will occupy its position.
///
/// Must run inside the transaction that holds the write lock. Reports the
/// current occupant when the position is taken.
pub(crate) async fn insert_occupying_deal(
    conn: &mut SqliteConnection,
    row: &NewDealRow,
) -> Result<i64, ReconcileError> {
    if let Some(occupant) = deals::find_occupying_deal_id(&mut *conn, row.position_id).await? {
        return Err(ReconcileError::PositionOccupied {
            position_id: row.position_id,
            occupying_deal_id: Some(occupant),
        });
    }

    match deals::insert_deal(&mut *conn, row).await {
        Ok(id) => Ok(id),
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            let occupant = deals::find_occupying_deal_id(&mut *conn, row.position_id).await?;
            match occupant {
                Some(_) => Err(ReconcileError::PositionOccupied {
                    position_id: row.position_id,
                    occupying_deal_id: occupant,
                }),
                None => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

fn require_link(affiliate_link: &str) -> Result<(), ReconcileError> {
    if affiliate_link.trim().is_empty() {
        return Err(ReconcileError::Validation {
            message: "affiliate link is required".to_string(),
            missing: vec!["affiliate_link"],
        });
    }
    Ok(())
}

/// Creates a deal on a free position.
///
/// The initial status is gated on the partner's SOP completeness.
pub async fn create_deal(
    pool: &SqlitePool,
    new_deal: NewDeal,
    actor: &str,
) -> Result<Deal, ReconcileError> {
    require_link(&new_deal.affiliate_link)?;
    let mut conn = pool.acquire().await?;
    let (partner, _) = load_owned_brand(&mut conn, new_deal.partner_id, new_deal.brand_id).await?;
    drop(conn);
    let position = catalog::get_position(pool, new_deal.position_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Position, new_deal.position_id))?;

    let now_ms = chrono::Utc::now().timestamp_millis();
    let row = NewDealRow {
        partner_id: partner.id,
        brand_id: new_deal.brand_id,
        asset_id: position.asset_id,
        page_id: position.page_id,
        position_id: position.id,
        status: initial_status(&partner),
        geo: new_deal.geo.unwrap_or_else(|| DEFAULT_GEO.to_string()),
        affiliate_link: new_deal.affiliate_link.trim().to_string(),
        tracking_domain: new_deal.tracking_domain,
        start_date_ms: now_ms,
        replaced_deal_id: None,
        created_at_ms: now_ms,
    };

    let deal_id = match deals::insert_deal(pool, &row).await {
        Ok(id) => id,
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            let occupant = deals::find_occupying_deal_id(pool, row.position_id).await?;
            return Err(ReconcileError::PositionOccupied {
                position_id: row.position_id,
                occupying_deal_id: occupant,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let deal = row.into_deal(deal_id);
    info!(
        "Created deal {} on position {} with status {}",
        deal.id, deal.position_id, deal.status
    );
    record_audit(
        pool,
        &[AuditEntry {
            user_id: actor.to_string(),
            entity: Entity::Deal,
            entity_id: deal.id,
            action: "deal_created",
            details: json!({
                "position_id": deal.position_id,
                "brand_id": deal.brand_id,
                "status": deal.status,
            }),
        }],
    )
    .await;
    Ok(deal)
}

/// Ends an occupying deal and creates its successor on the same asset, page
/// and position, in one transaction.
///
/// The new deal records the old one as `replaced_deal_id`.
pub async fn replace_deal(
    pool: &SqlitePool,
    old_deal_id: i64,
    replacement: Replacement,
    actor: &str,
) -> Result<Deal, ReconcileError> {
    require_link(&replacement.affiliate_link)?;
    let old = deals::get_deal(pool, old_deal_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Deal, old_deal_id))?;
    if !old.status.is_occupying() {
        return Err(ReconcileError::InvalidTransition {
            deal_id: old.id,
            from: old.status,
            to: DealStatus::Ended,
        });
    }
    let mut conn = pool.acquire().await?;
    let (partner, _) =
        load_owned_brand(&mut conn, replacement.partner_id, replacement.brand_id).await?;
    drop(conn);

    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;
    let Some(ended) = deals::close_deal(&mut *tx, old.id, DealStatus::Ended, now_ms).await? else {
        // Ended by someone else since the pre-read.
        let current = deals::get_deal(&mut *tx, old.id).await?;
        return Err(ReconcileError::InvalidTransition {
            deal_id: old.id,
            from: current.map_or(old.status, |d| d.status),
            to: DealStatus::Ended,
        });
    };

    let row = NewDealRow {
        partner_id: partner.id,
        brand_id: replacement.brand_id,
        asset_id: ended.asset_id,
        page_id: ended.page_id,
        position_id: ended.position_id,
        status: initial_status(&partner),
        geo: replacement.geo.unwrap_or_else(|| ended.geo.clone()),
        affiliate_link: replacement.affiliate_link.trim().to_string(),
        tracking_domain: replacement.tracking_domain,
        start_date_ms: now_ms,
        replaced_deal_id: Some(ended.id),
        created_at_ms: now_ms,
    };
    let new_id = insert_occupying_deal(&mut *tx, &row).await?;
    tx.commit().await?;

    let deal = row.into_deal(new_id);
    info!(
        "Replaced deal {} with deal {} on position {}",
        ended.id, deal.id, deal.position_id
    );
    record_audit(
        pool,
        &[
            AuditEntry {
                user_id: actor.to_string(),
                entity: Entity::Deal,
                entity_id: ended.id,
                action: "deal_ended",
                details: json!({ "replaced_by": deal.id }),
            },
            AuditEntry {
                user_id: actor.to_string(),
                entity: Entity::Deal,
                entity_id: deal.id,
                action: "deal_created",
                details: json!({
                    "replaces": ended.id,
                    "position_id": deal.position_id,
                    "status": deal.status,
                }),
            },
        ],
    )
    .await;
    Ok(deal)
}

/// Ends an occupying deal, freeing its position.
pub async fn end_deal(pool: &SqlitePool, deal_id: i64, actor: &str) -> Result<Deal, ReconcileError> {
    transition_status(pool, deal_id, DealStatus::Ended, actor).await
}

/// Applies an explicit status change.
///
/// Moving to `ended` or `inactive` stamps the end date.
pub async fn transition_status(
    pool: &SqlitePool,
    deal_id: i64,
    to: DealStatus,
    actor: &str,
) -> Result<Deal, ReconcileError> {
    let deal = deals::get_deal(pool, deal_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Deal, deal_id))?;
    let from = deal.status;
    if !from.can_transition_to(to) {
        return Err(ReconcileError::InvalidTransition { deal_id, from, to });
    }

    let updated = if to.is_terminal() {
        let now_ms = chrono::Utc::now().timestamp_millis();
        deals::close_deal(pool, deal_id, to, now_ms).await?
    } else if deals::update_deal_status(pool, deal_id, from, to).await? {
        Some(Deal { status: to, ..deal })
    } else {
        None
    };

    let Some(updated) = updated else {
        // Status moved under us; report what it is now.
        let current = deals::get_deal(pool, deal_id)
            .await?
            .ok_or_else(|| ReconcileError::not_found(Entity::Deal, deal_id))?;
        return Err(ReconcileError::InvalidTransition {
            deal_id,
            from: current.status,
            to,
        });
    };

    info!("Deal {} moved from {} to {}", deal_id, from, to);
    record_audit(
        pool,
        &[AuditEntry {
            user_id: actor.to_string(),
            entity: Entity::Deal,
            entity_id: deal_id,
            action: "deal_status_changed",
            details: json!({ "from": from, "to": to }),
        }],
    )
    .await;
    Ok(updated)
}

/// The deal followed by every deal it superseded, newest first.
pub async fn replacement_chain(pool: &SqlitePool, deal_id: i64) -> Result<Vec<Deal>, ReconcileError> {
    let mut current = deals::get_deal(pool, deal_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Deal, deal_id))?;
    let mut seen = HashSet::from([current.id]);
    let mut chain = Vec::new();

    while let Some(previous_id) = current.replaced_deal_id {
        chain.push(current);
        if !seen.insert(previous_id) {
            return Err(ReconcileError::Internal(format!(
                "replacement chain of deal {deal_id} loops at deal {previous_id}"
            )));
        }
        current = deals::get_deal(pool, previous_id)
            .await?
            .ok_or_else(|| ReconcileError::not_found(Entity::Deal, previous_id))?;
    }
    chain.push(current);
    Ok(chain)
}
