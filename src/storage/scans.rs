//! Scan result persistence.
//!
//! A scan result and its items are written in one transaction. Afterwards only
//! the item `action`, `processed_at_ms` and `matched_deal_id` columns change.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::models::{parse_column, ItemAction, ScanItemType, ScanResult, ScanResultItem};
use crate::error_handling::DatabaseError;

/// A classified finding that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScanItem {
    pub item_type: ScanItemType,
    pub found_url: Option<String>,
    pub found_anchor: Option<String>,
    pub matched_deal_id: Option<i64>,
    pub matched_brand_id: Option<i64>,
    pub confidence: Option<f64>,
    pub notes: String,
}

/// A stored item together with the asset its scan belongs to.
#[derive(Debug, Clone)]
pub struct ScanItemContext {
    pub item: ScanResultItem,
    pub asset_id: i64,
}

const ITEM_COLUMNS: &str = "scan_result_items.id, scan_result_items.scan_result_id,
     scan_result_items.item_type, scan_result_items.found_url, scan_result_items.found_anchor,
     scan_result_items.matched_deal_id, scan_result_items.matched_brand_id,
     scan_result_items.confidence, scan_result_items.notes, scan_result_items.action,
     scan_result_items.processed_at_ms";

fn item_from_row(row: &SqliteRow) -> Result<ScanResultItem, DatabaseError> {
    Ok(ScanResultItem {
        id: row.get("id"),
        scan_result_id: row.get("scan_result_id"),
        item_type: parse_column("item_type", row.get("item_type"))?,
        found_url: row.get("found_url"),
        found_anchor: row.get("found_anchor"),
        matched_deal_id: row.get("matched_deal_id"),
        matched_brand_id: row.get("matched_brand_id"),
        confidence: row.get("confidence"),
        notes: row.get("notes"),
        action: parse_column("action", row.get("action"))?,
        processed_at_ms: row.get("processed_at_ms"),
    })
}

/// Stores a scan result with all of its items, atomically.
///
/// Items keep the order they were given in.
pub async fn insert_scan_result(
    pool: &SqlitePool,
    asset_id: i64,
    scanned_url: &str,
    total_links: i64,
    scanned_at_ms: i64,
    items: &[NewScanItem],
) -> Result<ScanResult, DatabaseError> {
    let mut tx = pool.begin().await?;

    let scan_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO scan_results (asset_id, scanned_url, total_links, scanned_at_ms)
         VALUES (?, ?, ?, ?)
         RETURNING id",
    )
    .bind(asset_id)
    .bind(scanned_url)
    .bind(total_links)
    .bind(scanned_at_ms)
    .fetch_one(&mut *tx)
    .await?;

    let mut stored = Vec::with_capacity(items.len());
    for (ordinal, item) in items.iter().enumerate() {
        let item_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO scan_result_items (
                scan_result_id, ordinal, item_type, found_url, found_anchor,
                matched_deal_id, matched_brand_id, confidence, notes, action
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id",
        )
        .bind(scan_id)
        .bind(ordinal as i64)
        .bind(item.item_type.as_ref())
        .bind(&item.found_url)
        .bind(&item.found_anchor)
        .bind(item.matched_deal_id)
        .bind(item.matched_brand_id)
        .bind(item.confidence)
        .bind(&item.notes)
        .bind(ItemAction::Pending.as_ref())
        .fetch_one(&mut *tx)
        .await?;

        stored.push(ScanResultItem {
            id: item_id,
            scan_result_id: scan_id,
            item_type: item.item_type,
            found_url: item.found_url.clone(),
            found_anchor: item.found_anchor.clone(),
            matched_deal_id: item.matched_deal_id,
            matched_brand_id: item.matched_brand_id,
            confidence: item.confidence,
            notes: item.notes.clone(),
            action: ItemAction::Pending,
            processed_at_ms: None,
        });
    }

    tx.commit().await?;

    Ok(ScanResult {
        id: scan_id,
        asset_id,
        scanned_url: scanned_url.to_string(),
        total_links,
        scanned_at_ms,
        items: stored,
    })
}

/// Loads a scan result with its items in stored order.
pub async fn get_scan_result(
    pool: &SqlitePool,
    scan_id: i64,
) -> Result<Option<ScanResult>, DatabaseError> {
    let Some(row) = sqlx::query(
        "SELECT id, asset_id, scanned_url, total_links, scanned_at_ms
         FROM scan_results WHERE id = ?",
    )
    .bind(scan_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM scan_result_items
         WHERE scan_result_id = ?
         ORDER BY ordinal"
    );
    let items = sqlx::query(&sql)
        .bind(scan_id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(item_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ScanResult {
        id: row.get("id"),
        asset_id: row.get("asset_id"),
        scanned_url: row.get("scanned_url"),
        total_links: row.get("total_links"),
        scanned_at_ms: row.get("scanned_at_ms"),
        items,
    }))
}

/// Loads one item and the asset of the scan it belongs to.
pub async fn get_scan_item<'e, E>(
    executor: E,
    item_id: i64,
) -> Result<Option<ScanItemContext>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {ITEM_COLUMNS}, scan_results.asset_id
         FROM scan_result_items
         JOIN scan_results ON scan_results.id = scan_result_items.scan_result_id
         WHERE scan_result_items.id = ?"
    );
    let Some(row) = sqlx::query(&sql)
        .bind(item_id)
        .fetch_optional(executor)
        .await?
    else {
        return Ok(None);
    };

    Ok(Some(ScanItemContext {
        item: item_from_row(&row)?,
        asset_id: row.get("asset_id"),
    }))
}

/// Moves a pending item to `action`.
///
/// Returns `false` if the item does not exist or is no longer pending; the
/// row is left untouched in that case.
pub async fn claim_item<'e, E>(
    executor: E,
    item_id: i64,
    action: ItemAction,
    processed_at_ms: i64,
) -> Result<bool, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE scan_result_items SET action = ?, processed_at_ms = ?
         WHERE id = ? AND action = 'pending'",
    )
    .bind(action.as_ref())
    .bind(processed_at_ms)
    .bind(item_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Records the deal a confirmed item created.
pub async fn set_item_matched_deal<'e, E>(
    executor: E,
    item_id: i64,
    deal_id: i64,
) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE scan_result_items SET matched_deal_id = ? WHERE id = ?")
        .bind(deal_id)
        .bind(item_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Pending items across all scans of an asset, oldest scan first.
pub async fn list_pending_items(
    pool: &SqlitePool,
    asset_id: i64,
) -> Result<Vec<ScanResultItem>, DatabaseError> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS}
         FROM scan_result_items
         JOIN scan_results ON scan_results.id = scan_result_items.scan_result_id
         WHERE scan_results.asset_id = ? AND scan_result_items.action = 'pending'
         ORDER BY scan_results.id, scan_result_items.ordinal"
    );
    sqlx::query(&sql)
        .bind(asset_id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(item_from_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::*;

    fn unmatched(url: &str) -> NewScanItem {
        NewScanItem {
            item_type: ScanItemType::NewUnmatched,
            found_url: Some(url.to_string()),
            found_anchor: Some("Try".to_string()),
            matched_deal_id: None,
            matched_brand_id: None,
            confidence: None,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_scan_result_preserves_order() {
        let pool = create_test_pool().await;
        let asset_id = create_test_asset(&pool, Some("site.com")).await;
        let items = vec![
            unmatched("https://b.partner.com/go"),
            unmatched("https://a.partner.com/go"),
        ];

        let stored = insert_scan_result(&pool, asset_id, "https://site.com", 5, 1000, &items)
            .await
            .unwrap();
        assert_eq!(stored.items.len(), 2);
        assert!(stored.items.iter().all(|i| i.action == ItemAction::Pending));

        let loaded = get_scan_result(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_links, 5);
        assert_eq!(loaded.scanned_url, "https://site.com");
        let urls: Vec<_> = loaded.items.iter().map(|i| i.found_url.clone().unwrap()).collect();
        assert_eq!(urls, vec!["https://b.partner.com/go", "https://a.partner.com/go"]);
        assert_eq!(loaded.items[0].id, stored.items[0].id);
    }

    #[tokio::test]
    async fn test_get_scan_result_missing() {
        let pool = create_test_pool().await;
        assert!(get_scan_result(&pool, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_claim_item_only_once() {
        let pool = create_test_pool().await;
        let asset_id = create_test_asset(&pool, Some("site.com")).await;
        let stored = insert_scan_result(&pool, asset_id, "https://site.com", 1, 1000, &[unmatched("https://x.com/offer")])
            .await
            .unwrap();
        let item_id = stored.items[0].id;

        assert!(claim_item(&pool, item_id, ItemAction::Ignored, 2000).await.unwrap());
        assert!(!claim_item(&pool, item_id, ItemAction::Confirmed, 3000).await.unwrap());
        assert!(!claim_item(&pool, item_id + 50, ItemAction::Confirmed, 3000).await.unwrap());

        let ctx = get_scan_item(&pool, item_id).await.unwrap().unwrap();
        assert_eq!(ctx.asset_id, asset_id);
        assert_eq!(ctx.item.action, ItemAction::Ignored);
        assert_eq!(ctx.item.processed_at_ms, Some(2000));
    }

    #[tokio::test]
    async fn test_list_pending_items_excludes_processed_and_other_assets() {
        let pool = create_test_pool().await;
        let asset_id = create_test_asset(&pool, Some("site.com")).await;
        let other_asset = create_test_asset(&pool, Some("other.com")).await;
        let first = insert_scan_result(
            &pool,
            asset_id,
            "https://site.com",
            2,
            1000,
            &[unmatched("https://a.com/offer"), unmatched("https://b.com/offer")],
        )
        .await
        .unwrap();
        insert_scan_result(&pool, other_asset, "https://other.com", 1, 1000, &[unmatched("https://c.com/offer")])
            .await
            .unwrap();
        claim_item(&pool, first.items[0].id, ItemAction::Confirmed, 2000)
            .await
            .unwrap();

        let pending = list_pending_items(&pool, asset_id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first.items[1].id);
    }
}
