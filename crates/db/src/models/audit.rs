//! Audit log row model. Rows are append-only; only the retention job
//! deletes them.

use serde::Serialize;
use sqlx::FromRow;

use inventory_core::audit::AuditEntry;
use inventory_core::types::{AssetId, DbId, Timestamp};

/// A single stored audit entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLogRow {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: AssetId,
    pub action: String,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub changes: serde_json::Value,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub entity_type: String,
    pub entity_id: AssetId,
    pub action: String,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub changes: serde_json::Value,
    pub description: String,
    pub metadata: serde_json::Value,
}

impl TryFrom<&AuditEntry> for CreateAuditLog {
    type Error = serde_json::Error;

    fn try_from(entry: &AuditEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            action: entry.action.as_str().to_string(),
            old_values: entry
                .old_values
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
            new_values: entry
                .new_values
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
            changes: serde_json::to_value(&entry.changes)?,
            description: entry.description.clone(),
            metadata: serde_json::to_value(&entry.metadata)?,
        })
    }
}
