// storage/models.rs
// Database models and types

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error_handling::DatabaseError;

/// Brand lifecycle. Only active brands with a domain take part in scans.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BrandStatus {
    Active,
    Inactive,
    Archived,
}

/// Deal status.
///
/// `Live`, `PendingApproval` and `Paused` occupy their position; `Ended` and
/// `Inactive` are terminal and free it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Live,
    PendingApproval,
    Paused,
    Ended,
    Inactive,
}

/// Classification of a scan finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanItemType {
    /// Link matches an active deal as recorded
    Verified,
    /// Recognized deal or brand, but the link drifted from the record
    Replacement,
    /// Affiliate-looking link with no deal behind it
    NewUnmatched,
    /// Active deal whose link is no longer on the page
    Missing,
}

/// Review state of a scan item. Leaves `Pending` exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Pending,
    Confirmed,
    Ignored,
}

/// Parses a TEXT column into one of the enums above.
pub(crate) fn parse_column<T: FromStr>(column: &'static str, value: String) -> Result<T, DatabaseError> {
    T::from_str(&value).map_err(|_| DatabaseError::InvalidValue { column, value })
}

/// A managed website.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub domain: Option<String>,
}

/// Partner with its SOP completeness flags.
#[derive(Debug, Clone, Serialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub is_direct: bool,
    pub has_contract: bool,
    pub has_license: bool,
    pub has_banking: bool,
}

impl Partner {
    /// Contract, license and banking are all on file.
    pub fn sop_complete(&self) -> bool {
        self.has_contract && self.has_license && self.has_banking
    }
}

/// Brand as seen by the matchers.
#[derive(Debug, Clone, Serialize)]
pub struct BrandInfo {
    pub id: i64,
    pub partner_id: i64,
    pub name: String,
    pub domain: Option<String>,
    pub status: BrandStatus,
}

/// A position together with the page and asset it sits on.
#[derive(Debug, Clone, Serialize)]
pub struct PositionInfo {
    pub id: i64,
    pub name: String,
    pub page_id: i64,
    pub asset_id: i64,
}

/// A full deal row.
#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    pub id: i64,
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
    pub end_date_ms: Option<i64>,
    /// Deal this one superseded. Set at creation, never changed.
    pub replaced_deal_id: Option<i64>,
    pub created_at_ms: i64,
}

/// Occupying deal as seen by the matchers.
#[derive(Debug, Clone, Serialize)]
pub struct DealInfo {
    pub id: i64,
    pub partner_id: i64,
    pub brand_id: i64,
    pub affiliate_link: String,
    pub tracking_domain: Option<String>,
    pub position_id: i64,
}

/// One execution of the scan orchestrator against one asset.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub id: i64,
    pub asset_id: i64,
    pub scanned_url: String,
    pub total_links: i64,
    pub scanned_at_ms: i64,
    pub items: Vec<ScanResultItem>,
}

/// One classified finding of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResultItem {
    pub id: i64,
    pub scan_result_id: i64,
    pub item_type: ScanItemType,
    /// `None` only for missing items
    pub found_url: Option<String>,
    pub found_anchor: Option<String>,
    pub matched_deal_id: Option<i64>,
    pub matched_brand_id: Option<i64>,
    pub confidence: Option<f64>,
    pub notes: String,
    pub action: ItemAction,
    pub processed_at_ms: Option<i64>,
}
