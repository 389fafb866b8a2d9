//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use inventory_core::types::{AssetId, Timestamp};

use crate::models::audit::{AuditLogRow, CreateAuditLog};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, entity_type, entity_id, action, old_values, new_values, \
    changes, description, metadata, created_at, updated_at";

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

/// Provides insert, query and retention operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs \
                (entity_type, entity_id, action, old_values, new_values, changes, description, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.action)
            .bind(&entry.old_values)
            .bind(&entry.new_values)
            .bind(&entry.changes)
            .bind(&entry.description)
            .bind(&entry.metadata)
            .fetch_one(pool)
            .await
    }

    /// Entries for one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: AssetId,
    ) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// Delete entries created before `cutoff`. Returns the number removed.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
