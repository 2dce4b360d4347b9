//! Deal queries and row-level mutations.
//!
//! Callers that need the occupancy check and the write to be atomic run these
//! against a transaction connection (`&mut *tx`).

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use super::models::{parse_column, Deal, DealInfo, DealStatus};
use crate::error_handling::DatabaseError;

/// SQL list of the statuses that hold a position.
///
/// Must agree with `DealStatus::is_occupying` and the partial unique index in
/// the schema.
pub(crate) const OCCUPYING_SQL: &str = "('live', 'pending_approval', 'paused')";

const DEAL_COLUMNS: &str = "id, partner_id, brand_id, asset_id, page_id, position_id, status, geo,
     affiliate_link, tracking_domain, start_date_ms, end_date_ms, replaced_deal_id, created_at_ms";

/// Column values for a deal about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDealRow {
    pub partner_id: i64,
    pub brand_id: i64,
    pub asset_id: i64,
    pub page_id: i64,
    pub position_id: i64,
    pub status: DealStatus,
    pub geo: String,
    pub affiliate_link: String,
    pub tracking_domain: Option<String>,
    pub start_date_ms: i64,
    pub replaced_deal_id: Option<i64>,
    pub created_at_ms: i64,
}

impl NewDealRow {
    /// The stored deal once the insert returned `id`.
    pub fn into_deal(self, id: i64) -> Deal {
        Deal {
            id,
            partner_id: self.partner_id,
            brand_id: self.brand_id,
            asset_id: self.asset_id,
            page_id: self.page_id,
            position_id: self.position_id,
            status: self.status,
            geo: self.geo,
            affiliate_link: self.affiliate_link,
            tracking_domain: self.tracking_domain,
            start_date_ms: self.start_date_ms,
            end_date_ms: None,
            replaced_deal_id: self.replaced_deal_id,
            created_at_ms: self.created_at_ms,
        }
    }
}

fn deal_from_row(row: SqliteRow) -> Result<Deal, DatabaseError> {
    Ok(Deal {
        id: row.get("id"),
        partner_id: row.get("partner_id"),
        brand_id: row.get("brand_id"),
        asset_id: row.get("asset_id"),
        page_id: row.get("page_id"),
        position_id: row.get("position_id"),
        status: parse_column("status", row.get("status"))?,
        geo: row.get("geo"),
        affiliate_link: row.get("affiliate_link"),
        tracking_domain: row.get("tracking_domain"),
        start_date_ms: row.get("start_date_ms"),
        end_date_ms: row.get("end_date_ms"),
        replaced_deal_id: row.get("replaced_deal_id"),
        created_at_ms: row.get("created_at_ms"),
    })
}

/// Occupying deals on an asset, in id order.
pub async fn occupying_deals_for_asset<'e, E>(
    executor: E,
    asset_id: i64,
) -> Result<Vec<DealInfo>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT id, partner_id, brand_id, affiliate_link, tracking_domain, position_id
         FROM deals
         WHERE asset_id = ? AND status IN {OCCUPYING_SQL}
         ORDER BY id"
    );
    let rows = sqlx::query(&sql).bind(asset_id).fetch_all(executor).await?;

    Ok(rows
        .into_iter()
        .map(|row| DealInfo {
            id: row.get("id"),
            partner_id: row.get("partner_id"),
            brand_id: row.get("brand_id"),
            affiliate_link: row.get("affiliate_link"),
            tracking_domain: row.get("tracking_domain"),
            position_id: row.get("position_id"),
        })
        .collect())
}

/// Looks up a deal by id.
pub async fn get_deal<'e, E>(executor: E, deal_id: i64) -> Result<Option<Deal>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = ?");
    sqlx::query(&sql)
        .bind(deal_id)
        .fetch_optional(executor)
        .await?
        .map(deal_from_row)
        .transpose()
}

/// Id of the deal currently occupying a position, if any.
pub async fn find_occupying_deal_id<'e, E>(
    executor: E,
    position_id: i64,
) -> Result<Option<i64>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT id FROM deals WHERE position_id = ? AND status IN {OCCUPYING_SQL}");
    let id = sqlx::query_scalar::<_, i64>(&sql)
        .bind(position_id)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

/// Inserts a deal and returns its id.
///
/// Returns the raw `sqlx::Error` so callers can translate a unique violation
/// on the occupied-position index.
pub async fn insert_deal<'e, E>(executor: E, deal: &NewDealRow) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO deals (
            partner_id, brand_id, asset_id, page_id, position_id, status, geo,
            affiliate_link, tracking_domain, start_date_ms, end_date_ms,
            replaced_deal_id, created_at_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
        RETURNING id",
    )
    .bind(deal.partner_id)
    .bind(deal.brand_id)
    .bind(deal.asset_id)
    .bind(deal.page_id)
    .bind(deal.position_id)
    .bind(deal.status.as_ref())
    .bind(&deal.geo)
    .bind(&deal.affiliate_link)
    .bind(&deal.tracking_domain)
    .bind(deal.start_date_ms)
    .bind(deal.replaced_deal_id)
    .bind(deal.created_at_ms)
    .fetch_one(executor)
    .await
}

/// Moves an occupying deal to a terminal status and stamps its end date.
///
/// Returns the updated row, or `None` when the deal does not exist or no
/// longer occupies its position.
pub async fn close_deal<'e, E>(
    executor: E,
    deal_id: i64,
    status: DealStatus,
    end_date_ms: i64,
) -> Result<Option<Deal>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE deals SET status = ?, end_date_ms = ?
         WHERE id = ? AND status IN {OCCUPYING_SQL}
         RETURNING {DEAL_COLUMNS}"
    );
    sqlx::query(&sql)
        .bind(status.as_ref())
        .bind(end_date_ms)
        .bind(deal_id)
        .fetch_optional(executor)
        .await?
        .map(deal_from_row)
        .transpose()
}

/// Compare-and-set on a deal's status. Returns `false` when the deal was not
/// in `from` anymore.
pub async fn update_deal_status<'e, E>(
    executor: E,
    deal_id: i64,
    from: DealStatus,
    to: DealStatus,
) -> Result<bool, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE deals SET status = ? WHERE id = ? AND status = ?")
        .bind(to.as_ref())
        .bind(deal_id)
        .bind(from.as_ref())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_occupying_sql_lists_every_occupying_status() {
        for status in DealStatus::iter() {
            let quoted = format!("'{}'", status.as_ref());
            assert_eq!(
                OCCUPYING_SQL.contains(&quoted),
                status.is_occupying(),
                "status: {status}"
            );
        }
    }

    #[tokio::test]
    async fn test_occupying_deals_for_asset_skips_terminal_and_other_assets() {
        let pool = create_test_pool().await;
        let fixture = seed_catalog(&pool).await;
        let other_asset = create_test_asset(&pool, Some("other.com")).await;
        let (_, other_position) = create_test_position(&pool, other_asset, "Sidebar").await;
        let (_, second_position) = create_test_position(&pool, fixture.asset_id, "Footer").await;

        let live = create_test_deal(&pool, &fixture, fixture.position_id, DealStatus::Live, "https://aff.acme.com/go").await;
        create_test_deal(&pool, &fixture, second_position, DealStatus::Ended, "https://aff.acme.com/old").await;
        let mut elsewhere = fixture.clone();
        elsewhere.asset_id = other_asset;
        create_test_deal(&pool, &elsewhere, other_position, DealStatus::Live, "https://aff.acme.com/x").await;

        let deals = occupying_deals_for_asset(&pool, fixture.asset_id).await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, live);
        assert_eq!(deals[0].position_id, fixture.position_id);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_occupant() {
        let pool = create_test_pool().await;
        let fixture = seed_catalog(&pool).await;
        create_test_deal(&pool, &fixture, fixture.position_id, DealStatus::Paused, "https://a.com/1").await;

        let row = new_deal_row(&fixture, fixture.position_id, DealStatus::PendingApproval, "https://a.com/2");
        let err = insert_deal(&pool, &row).await.unwrap_err();
        let db_err = err.as_database_error().expect("database error");
        assert!(db_err.is_unique_violation());

        // A terminal deal on the same position is fine.
        let row = new_deal_row(&fixture, fixture.position_id, DealStatus::Ended, "https://a.com/3");
        assert!(insert_deal(&pool, &row).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_deal_only_touches_occupying_deals() {
        let pool = create_test_pool().await;
        let fixture = seed_catalog(&pool).await;
        let deal_id = create_test_deal(&pool, &fixture, fixture.position_id, DealStatus::Live, "https://a.com/1").await;

        let closed = close_deal(&pool, deal_id, DealStatus::Ended, 1_700_000_000_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.status, DealStatus::Ended);
        assert_eq!(closed.end_date_ms, Some(1_700_000_000_000));
        assert_eq!(find_occupying_deal_id(&pool, fixture.position_id).await.unwrap(), None);

        // Second close is a no-op.
        assert!(close_deal(&pool, deal_id, DealStatus::Inactive, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_deal_status_is_compare_and_set() {
        let pool = create_test_pool().await;
        let fixture = seed_catalog(&pool).await;
        let deal_id = create_test_deal(&pool, &fixture, fixture.position_id, DealStatus::Live, "https://a.com/1").await;

        assert!(update_deal_status(&pool, deal_id, DealStatus::Live, DealStatus::Paused).await.unwrap());
        assert!(!update_deal_status(&pool, deal_id, DealStatus::Live, DealStatus::Paused).await.unwrap());
        let deal = get_deal(&pool, deal_id).await.unwrap().unwrap();
        assert_eq!(deal.status, DealStatus::Paused);
    }

    #[tokio::test]
    async fn test_replaced_deal_id_allows_one_successor() {
        let pool = create_test_pool().await;
        let fixture = seed_catalog(&pool).await;
        let old = create_test_deal(&pool, &fixture, fixture.position_id, DealStatus::Ended, "https://a.com/1").await;

        let mut row = new_deal_row(&fixture, fixture.position_id, DealStatus::Live, "https://a.com/2");
        row.replaced_deal_id = Some(old);
        let successor = insert_deal(&pool, &row).await.unwrap();
        let stored = get_deal(&pool, successor).await.unwrap().unwrap();
        assert_eq!(stored.replaced_deal_id, Some(old));

        let mut row = new_deal_row(&fixture, fixture.position_id, DealStatus::Ended, "https://a.com/3");
        row.replaced_deal_id = Some(old);
        assert!(insert_deal(&pool, &row).await.is_err());
    }
}
