//! Append-only audit log.

use log::warn;
use sqlx::SqlitePool;

use crate::error_handling::{DatabaseError, Entity};

/// One audit record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: String,
    pub entity: Entity,
    pub entity_id: i64,
    pub action: &'static str,
    pub details: serde_json::Value,
}

/// Appends an entry to the audit log.
pub async fn insert_audit(
    pool: &SqlitePool,
    entry: &AuditEntry,
    recorded_at_ms: i64,
) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO audit_log (user_id, entity, entity_id, action, details, recorded_at_ms)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(&entry.user_id)
    .bind(entry.entity.as_ref())
    .bind(entry.entity_id)
    .bind(entry.action)
    .bind(entry.details.to_string())
    .bind(recorded_at_ms)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Writes audit entries after the mutation they describe has committed.
///
/// Failures are logged and swallowed: a missing audit row never undoes a
/// committed change.
pub async fn record_audit(pool: &SqlitePool, entries: &[AuditEntry]) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    for entry in entries {
        if let Err(e) = insert_audit(pool, entry, now_ms).await {
            warn!(
                "Failed to write audit entry {} for {} {}: {}",
                entry.action, entry.entity, entry.entity_id, e
            );
        }
    }
}
