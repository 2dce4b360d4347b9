// Shared test helpers for database setup and catalog seeding.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;

use sqlx::SqlitePool;

use deal_reconciler::initialization::init_database;
use deal_reconciler::Config;

/// Ids of a seeded partner, brand, asset and position.
#[allow(dead_code)] // Used by other test files
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub partner_id: i64,
    pub brand_id: i64,
    pub asset_id: i64,
    pub position_id: i64,
}

/// Opens a file-backed database with migrations applied.
///
/// File-backed so that concurrent transactions see real SQLite locking.
#[allow(dead_code)]
pub async fn create_test_pool_with_path(db_path: &Path) -> SqlitePool {
    let config = Config {
        db_path: db_path.to_path_buf(),
        ..Default::default()
    };
    init_database(&config)
        .await
        .expect("Failed to create test database")
}

#[allow(dead_code)]
pub async fn insert_partner(pool: &SqlitePool, is_direct: bool, sop_complete: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO partners (name, is_direct, has_contract, has_license, has_banking)
         VALUES ('Partner', ?, ?, ?, ?) RETURNING id",
    )
    .bind(is_direct)
    .bind(sop_complete)
    .bind(sop_complete)
    .bind(sop_complete)
    .fetch_one(pool)
    .await
    .expect("Failed to insert partner")
}

#[allow(dead_code)]
pub async fn insert_brand(pool: &SqlitePool, partner_id: i64, domain: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO brands (partner_id, name, domain, status) VALUES (?, ?, ?, 'active') RETURNING id",
    )
    .bind(partner_id)
    .bind(domain)
    .bind(domain)
    .fetch_one(pool)
    .await
    .expect("Failed to insert brand")
}

#[allow(dead_code)]
pub async fn insert_asset(pool: &SqlitePool, domain: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO assets (name, domain) VALUES ('Asset', ?) RETURNING id")
        .bind(domain)
        .fetch_one(pool)
        .await
        .expect("Failed to insert asset")
}

/// Adds a page with one position to the asset and returns the position id.
#[allow(dead_code)]
pub async fn insert_position(pool: &SqlitePool, asset_id: i64, name: &str) -> i64 {
    let page_id: i64 =
        sqlx::query_scalar("INSERT INTO pages (asset_id, path) VALUES (?, '/') RETURNING id")
            .bind(asset_id)
            .fetch_one(pool)
            .await
            .expect("Failed to insert page");
    sqlx::query_scalar("INSERT INTO positions (page_id, name) VALUES (?, ?) RETURNING id")
        .bind(page_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to insert position")
}

/// Seeds a partner with complete SOP, a brand on `brand_domain`, and an asset
/// on `asset_domain` with one position.
#[allow(dead_code)]
pub async fn seed(pool: &SqlitePool, brand_domain: &str, asset_domain: &str) -> Seeded {
    let partner_id = insert_partner(pool, true, true).await;
    let brand_id = insert_brand(pool, partner_id, brand_domain).await;
    let asset_id = insert_asset(pool, asset_domain).await;
    let position_id = insert_position(pool, asset_id, "Top Banner").await;
    Seeded {
        partner_id,
        brand_id,
        asset_id,
        position_id,
    }
}

/// Inserts a live deal on the position.
#[allow(dead_code)]
pub async fn insert_live_deal(pool: &SqlitePool, seeded: &Seeded, position_id: i64, link: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO deals (partner_id, brand_id, asset_id, page_id, position_id, status, geo,
                            affiliate_link, start_date_ms, created_at_ms)
         SELECT ?, ?, ?, page_id, id, 'live', 'GLOBAL', ?, 0, 0 FROM positions WHERE id = ?
         RETURNING id",
    )
    .bind(seeded.partner_id)
    .bind(seeded.brand_id)
    .bind(seeded.asset_id)
    .bind(link)
    .bind(position_id)
    .fetch_one(pool)
    .await
    .expect("Failed to insert deal")
}
