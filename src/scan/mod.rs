//! Scan orchestration.
//!
//! A scan fetches an asset's page, keeps the outbound links that look like
//! affiliate links, classifies them against active brands and the asset's
//! occupying deals, and stores the result with every item pending review.
//!
//! Nothing is stored when the fetch fails. Brands and deals are read once at
//! the start, so classification works on a consistent snapshot; confirmation
//! re-checks occupancy when it mutates.

mod classify;

use log::{debug, error, info};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use strum::IntoEnumIterator;

use crate::error_handling::{Entity, ReconcileError};
use crate::fetch::fetch_page;
use crate::initialization::ReconcileContext;
use crate::parse::{affiliate_signal, extract_links};
use crate::storage::models::{ScanItemType, ScanResult, ScanResultItem};
use crate::storage::{catalog, deals, record_audit, scans, AuditEntry};

pub use classify::classify_links;

/// Number of items of each type, keyed by the stored type name.
pub fn count_by_type(items: &[ScanResultItem]) -> Map<String, Value> {
    ScanItemType::iter()
        .map(|item_type| {
            let count = items.iter().filter(|i| i.item_type == item_type).count();
            (item_type.to_string(), json!(count))
        })
        .collect()
}

/// Scans one asset and stores the result.
///
/// # Errors
///
/// - `NotFound` when the asset does not exist or has no domain
/// - `FetchFailure` when the page cannot be fetched in time; nothing is stored
/// - `Database` on storage failure; nothing partial is committed
pub async fn scan_asset(
    ctx: &ReconcileContext,
    asset_id: i64,
    actor: &str,
) -> Result<ScanResult, ReconcileError> {
    match run_scan(ctx, asset_id, actor).await {
        Ok(result) => Ok(result),
        Err(e @ (ReconcileError::Database(_) | ReconcileError::Internal(_))) => {
            error!("Scan of asset {asset_id} failed: {e}");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

async fn run_scan(
    ctx: &ReconcileContext,
    asset_id: i64,
    actor: &str,
) -> Result<ScanResult, ReconcileError> {
    let pool = &ctx.pool;
    let asset = catalog::get_asset(pool, asset_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::Asset, asset_id))?;
    let Some(domain) = asset
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    else {
        return Err(ReconcileError::not_found(Entity::Asset, asset_id));
    };

    let url = ctx.config.asset_url(domain);
    info!("Scanning asset {asset_id} at {url}");
    let html = fetch_page(&ctx.client, &url, ctx.config.fetch_timeout()).await?;

    let links = extract_links(&html, domain);
    let candidates: Vec<_> = links
        .iter()
        .filter(|link| match affiliate_signal(&link.url) {
            Some(signal) => {
                debug!("Candidate {} ({signal})", link.url);
                true
            }
            None => {
                debug!("Skipping {}: no affiliate signal", link.url);
                false
            }
        })
        .cloned()
        .collect();

    let brands = catalog::list_scannable_brands(pool).await?;
    let occupying = deals::occupying_deals_for_asset(pool, asset_id).await?;
    let items = classify_links(&candidates, &brands, &occupying);

    let scanned_at_ms = chrono::Utc::now().timestamp_millis();
    let result = scans::insert_scan_result(
        pool,
        asset_id,
        &url,
        links.len() as i64,
        scanned_at_ms,
        &items,
    )
    .await?;

    let counts = count_by_type(&result.items);
    info!(
        "Scan {} of asset {asset_id}: {} links, {} candidates, {}",
        result.id,
        links.len(),
        candidates.len(),
        Value::Object(counts.clone())
    );
    record_audit(
        pool,
        &[AuditEntry {
            user_id: actor.to_string(),
            entity: Entity::ScanResult,
            entity_id: result.id,
            action: "scan_completed",
            details: json!({
                "asset_id": asset_id,
                "total_links": links.len(),
                "candidates": candidates.len(),
                "counts": counts,
            }),
        }],
    )
    .await;

    Ok(result)
}

/// Loads a stored scan result with its items.
pub async fn load_scan_result(pool: &SqlitePool, scan_id: i64) -> Result<ScanResult, ReconcileError> {
    scans::get_scan_result(pool, scan_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found(Entity::ScanResult, scan_id))
}

/// Items still awaiting review across every scan of an asset.
pub async fn list_pending_items(
    pool: &SqlitePool,
    asset_id: i64,
) -> Result<Vec<ScanResultItem>, ReconcileError> {
    if catalog::get_asset(pool, asset_id).await?.is_none() {
        return Err(ReconcileError::not_found(Entity::Asset, asset_id));
    }
    Ok(scans::list_pending_items(pool, asset_id).await?)
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
