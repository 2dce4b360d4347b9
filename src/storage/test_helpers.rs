//! Shared test helpers for storage module tests.
//!
//! This module provides common utilities for database setup and test data creation
//! used across the crate's unit tests.

use sqlx::SqlitePool;

use crate::storage::deals::{insert_deal, NewDealRow};
use crate::storage::models::{BrandStatus, DealStatus};
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Ids of a minimal partner/brand/asset/page/position set.
#[derive(Debug, Clone)]
pub struct TestCatalog {
    pub partner_id: i64,
    pub brand_id: i64,
    pub asset_id: i64,
    pub page_id: i64,
    pub position_id: i64,
}

/// Creates a partner and returns its ID.
pub async fn create_test_partner(
    pool: &SqlitePool,
    is_direct: bool,
    has_contract: bool,
    has_license: bool,
    has_banking: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO partners (name, is_direct, has_contract, has_license, has_banking)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind("Test Partner")
    .bind(is_direct)
    .bind(has_contract)
    .bind(has_license)
    .bind(has_banking)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test partner")
}

/// Creates a brand and returns its ID.
pub async fn create_test_brand(
    pool: &SqlitePool,
    partner_id: i64,
    domain: Option<&str>,
    status: BrandStatus,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO brands (partner_id, name, domain, status) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(partner_id)
    .bind(domain.unwrap_or("Unnamed"))
    .bind(domain)
    .bind(status.as_ref())
    .fetch_one(pool)
    .await
    .expect("Failed to insert test brand")
}

/// Creates an asset and returns its ID.
pub async fn create_test_asset(pool: &SqlitePool, domain: Option<&str>) -> i64 {
    sqlx::query_scalar("INSERT INTO assets (name, domain) VALUES (?, ?) RETURNING id")
        .bind("Test Asset")
        .bind(domain)
        .fetch_one(pool)
        .await
        .expect("Failed to insert test asset")
}

/// Creates a page with one position on the asset. Returns `(page_id, position_id)`.
pub async fn create_test_position(pool: &SqlitePool, asset_id: i64, name: &str) -> (i64, i64) {
    let page_id: i64 =
        sqlx::query_scalar("INSERT INTO pages (asset_id, path) VALUES (?, ?) RETURNING id")
            .bind(asset_id)
            .bind("/")
            .fetch_one(pool)
            .await
            .expect("Failed to insert test page");
    let position_id: i64 =
        sqlx::query_scalar("INSERT INTO positions (page_id, name) VALUES (?, ?) RETURNING id")
            .bind(page_id)
            .bind(name)
            .fetch_one(pool)
            .await
            .expect("Failed to insert test position");
    (page_id, position_id)
}

/// Seeds a non-direct partner, an active brand on `acme.com`, and an asset on
/// `site.com` with one position.
pub async fn seed_catalog(pool: &SqlitePool) -> TestCatalog {
    let partner_id = create_test_partner(pool, false, false, false, false).await;
    let brand_id = create_test_brand(pool, partner_id, Some("acme.com"), BrandStatus::Active).await;
    let asset_id = create_test_asset(pool, Some("site.com")).await;
    let (page_id, position_id) = create_test_position(pool, asset_id, "Top Banner").await;
    TestCatalog {
        partner_id,
        brand_id,
        asset_id,
        page_id,
        position_id,
    }
}

/// Builds a deal row for the catalog's partner, brand and asset.
pub fn new_deal_row(
    catalog: &TestCatalog,
    position_id: i64,
    status: DealStatus,
    affiliate_link: &str,
) -> NewDealRow {
    NewDealRow {
        partner_id: catalog.partner_id,
        brand_id: catalog.brand_id,
        asset_id: catalog.asset_id,
        page_id: catalog.page_id,
        position_id,
        status,
        geo: "GLOBAL".to_string(),
        affiliate_link: affiliate_link.to_string(),
        tracking_domain: None,
        start_date_ms: 1704067200000,
        replaced_deal_id: None,
        created_at_ms: 1704067200000,
    }
}

/// Inserts a deal and returns its ID.
pub async fn create_test_deal(
    pool: &SqlitePool,
    catalog: &TestCatalog,
    position_id: i64,
    status: DealStatus,
    affiliate_link: &str,
) -> i64 {
    insert_deal(pool, &new_deal_row(catalog, position_id, status, affiliate_link))
        .await
        .expect("Failed to insert test deal")
}
