//! Lookups for the records deals hang off: assets, partners, brands, positions.
//!
//! These tables are maintained by ordinary CRUD elsewhere; the reconciliation
//! engine only reads them.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use super::models::{parse_column, Asset, BrandInfo, Partner, PositionInfo};
use crate::error_handling::DatabaseError;

/// Looks up an asset by id.
pub async fn get_asset<'e, E>(executor: E, asset_id: i64) -> Result<Option<Asset>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT id, name, domain FROM assets WHERE id = ?")
        .bind(asset_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|row| Asset {
        id: row.get("id"),
        name: row.get("name"),
        domain: row.get("domain"),
    }))
}

/// Looks up a partner and its SOP flags by id.
pub async fn get_partner<'e, E>(
    executor: E,
    partner_id: i64,
) -> Result<Option<Partner>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, name, is_direct, has_contract, has_license, has_banking
         FROM partners WHERE id = ?",
    )
    .bind(partner_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|row| Partner {
        id: row.get("id"),
        name: row.get("name"),
        is_direct: row.get("is_direct"),
        has_contract: row.get("has_contract"),
        has_license: row.get("has_license"),
        has_banking: row.get("has_banking"),
    }))
}

fn brand_from_row(row: SqliteRow) -> Result<BrandInfo, DatabaseError> {
    Ok(BrandInfo {
        id: row.get("id"),
        partner_id: row.get("partner_id"),
        name: row.get("name"),
        domain: row.get("domain"),
        status: parse_column("status", row.get("status"))?,
    })
}

/// Looks up a brand by id, whatever its status.
pub async fn get_brand<'e, E>(executor: E, brand_id: i64) -> Result<Option<BrandInfo>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("SELECT id, partner_id, name, domain, status FROM brands WHERE id = ?")
        .bind(brand_id)
        .fetch_optional(executor)
        .await?
        .map(brand_from_row)
        .transpose()
}

/// Active brands with a registered domain, in id order.
pub async fn list_scannable_brands<'e, E>(executor: E) -> Result<Vec<BrandInfo>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "SELECT id, partner_id, name, domain, status
         FROM brands
         WHERE status = 'active' AND domain IS NOT NULL AND TRIM(domain) <> ''
         ORDER BY id",
    )
    .fetch_all(executor)
    .await?
    .into_iter()
    .map(brand_from_row)
    .collect()
}

/// Looks up a position with the page and asset it belongs to.
pub async fn get_position<'e, E>(
    executor: E,
    position_id: i64,
) -> Result<Option<PositionInfo>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT positions.id, positions.name, positions.page_id, pages.asset_id
         FROM positions
         JOIN pages ON pages.id = positions.page_id
         WHERE positions.id = ?",
    )
    .bind(position_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|row| PositionInfo {
        id: row.get("id"),
        name: row.get("name"),
        page_id: row.get("page_id"),
        asset_id: row.get("asset_id"),
    }))
}
