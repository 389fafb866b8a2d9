//! Audit trail entries for asset mutations.
//!
//! Snapshots are a typed [`AssetSnapshot`] rather than an open map, and the
//! change-set is computed field by field with [`diff_snapshots`].

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::asset::Asset;
use crate::diff::ChangeSet;
use crate::procurement::ProcurementSource;
use crate::status::AssetStatus;
use crate::types::{AssetId, BulkId, CategoryId, DbId, Timestamp};

/// Entity type recorded on every entry this engine emits.
pub const ENTITY_ASSET: &str = "asset";

/// Metadata keys attached to bulk-related entries.
pub mod metadata_keys {
    pub const BULK_ID: &str = "bulk_id";
    pub const BULK_SEQUENCE: &str = "bulk_sequence";
    pub const IS_BULK_PARENT: &str = "is_bulk_parent";
    pub const UPDATE_TYPE: &str = "update_type";
    pub const DELETED_COUNT: &str = "deleted_count";
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    BulkDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::BulkDelete => "bulk_delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of every persisted asset field except timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub id: AssetId,
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub acquisition_date: NaiveDate,
    pub acquisition_price: f64,
    pub useful_life_years: i32,
    pub useful_life_months: i32,
    pub accumulated_depreciation: f64,
    pub residual_value: f64,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub category_id: CategoryId,
    pub procurement_source: ProcurementSource,
    pub status: AssetStatus,
    pub bulk_id: Option<BulkId>,
    pub bulk_sequence: Option<i32>,
    pub is_bulk_parent: bool,
    pub bulk_total_count: Option<i32>,
}

impl From<&Asset> for AssetSnapshot {
    fn from(asset: &Asset) -> Self {
        let f = &asset.fields;
        Self {
            id: asset.id,
            code: asset.code.clone(),
            name: f.name.clone(),
            specification: f.specification.clone(),
            quantity: f.quantity,
            unit: f.unit.clone(),
            acquisition_date: f.acquisition_date,
            acquisition_price: f.acquisition_price,
            useful_life_years: f.useful_life_years,
            useful_life_months: asset.useful_life_months,
            accumulated_depreciation: asset.accumulated_depreciation,
            residual_value: asset.residual_value,
            description: f.description.clone(),
            location_id: f.location_id,
            category_id: f.category_id,
            procurement_source: f.procurement_source,
            status: f.status,
            bulk_id: asset.bulk.map(|b| b.bulk_id),
            bulk_sequence: asset.bulk.map(|b| b.bulk_sequence),
            is_bulk_parent: asset.is_bulk_parent(),
            bulk_total_count: asset.bulk.map(|b| b.bulk_total_count),
        }
    }
}

/// Compare two snapshots field by field.
pub fn diff_snapshots(old: &AssetSnapshot, new: &AssetSnapshot) -> ChangeSet {
    let mut changes = ChangeSet::default();
    macro_rules! compare {
        ($($field:ident),* $(,)?) => {
            $(changes.compare(stringify!($field), json!(old.$field), json!(new.$field));)*
        };
    }
    compare!(
        code,
        name,
        specification,
        quantity,
        unit,
        acquisition_date,
        acquisition_price,
        useful_life_years,
        useful_life_months,
        accumulated_depreciation,
        residual_value,
        description,
        location_id,
        category_id,
        procurement_source,
        status,
        bulk_id,
        bulk_sequence,
        is_bulk_parent,
        bulk_total_count,
    );
    changes
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One audit record handed to the [`AuditRecorder`](crate::store::AuditRecorder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity_type: String,
    pub entity_id: AssetId,
    pub action: AuditAction,
    pub old_values: Option<AssetSnapshot>,
    pub new_values: Option<AssetSnapshot>,
    pub changes: ChangeSet,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

impl AuditEntry {
    fn new(entity_id: AssetId, action: AuditAction, description: String) -> Self {
        Self {
            entity_type: ENTITY_ASSET.to_string(),
            entity_id,
            action,
            old_values: None,
            new_values: None,
            changes: ChangeSet::default(),
            description,
            metadata: BTreeMap::new(),
        }
    }

    pub fn created(asset: &Asset) -> Self {
        let mut entry = Self::new(
            asset.id,
            AuditAction::Create,
            format!("Asset {} ({}) created", asset.code, asset.fields.name),
        );
        entry.new_values = Some(asset.into());
        entry.with_bulk_metadata(asset)
    }

    pub fn updated(old: &Asset, new: &Asset) -> Self {
        let old_snap = AssetSnapshot::from(old);
        let new_snap = AssetSnapshot::from(new);
        let mut entry = Self::new(
            new.id,
            AuditAction::Update,
            format!("Asset {} updated", new.code),
        );
        entry.changes = diff_snapshots(&old_snap, &new_snap);
        entry.old_values = Some(old_snap);
        entry.new_values = Some(new_snap);
        entry
    }

    /// A member's entry within a group-wide update.
    pub fn bulk_updated(old: &Asset, new: &Asset, bulk_id: BulkId) -> Self {
        let mut entry = Self::updated(old, new);
        entry.description = format!(
            "Bulk asset update - asset {} updated as part of bulk {bulk_id}",
            old.code
        );
        entry
            .metadata
            .insert(metadata_keys::UPDATE_TYPE.into(), "bulk_update".into());
        entry.with_bulk_metadata(old)
    }

    pub fn deleted(asset: &Asset) -> Self {
        let mut entry = Self::new(
            asset.id,
            AuditAction::Delete,
            format!("Asset {} ({}) deleted", asset.code, asset.fields.name),
        );
        entry.old_values = Some(asset.into());
        entry.with_bulk_metadata(asset)
    }

    /// Summary entry for a whole-group delete, attributed to the parent.
    pub fn bulk_deleted(parent: &Asset, bulk_id: BulkId, deleted_count: usize) -> Self {
        let mut entry = Self::new(
            parent.id,
            AuditAction::BulkDelete,
            format!("Bulk group {bulk_id} deleted ({deleted_count} assets)"),
        );
        entry.old_values = Some(parent.into());
        entry
            .metadata
            .insert(metadata_keys::DELETED_COUNT.into(), deleted_count.to_string());
        entry.with_bulk_metadata(parent)
    }

    fn with_bulk_metadata(mut self, asset: &Asset) -> Self {
        if let Some(bulk) = asset.bulk {
            self.metadata
                .insert(metadata_keys::BULK_ID.into(), bulk.bulk_id.to_string());
            self.metadata.insert(
                metadata_keys::BULK_SEQUENCE.into(),
                bulk.bulk_sequence.to_string(),
            );
            self.metadata.insert(
                metadata_keys::IS_BULK_PARENT.into(),
                bulk.is_bulk_parent.to_string(),
            );
        }
        self
    }
}

/// Oldest timestamp kept under a retention window of `retention_days`.
pub fn retention_cutoff(now: Timestamp, retention_days: u32) -> Timestamp {
    now - Duration::days(i64::from(retention_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{fixtures, BulkMembership};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn asset() -> Asset {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Asset {
            id: Uuid::new_v4(),
            code: "001.10.1.24.001".into(),
            fields: fixtures::fields(),
            useful_life_months: 60,
            accumulated_depreciation: 60_000.0,
            residual_value: 1_140_000.0,
            bulk: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let a = asset();
        let snap = AssetSnapshot::from(&a);
        assert!(diff_snapshots(&snap, &snap).is_empty());
    }

    #[test]
    fn update_entry_lists_only_changed_fields() {
        let old = asset();
        let mut new = old.clone();
        new.fields.name = "Standing desk".into();
        new.fields.description = Some("Second floor".into());

        let entry = AuditEntry::updated(&old, &new);
        assert_eq!(entry.action, AuditAction::Update);
        assert_eq!(entry.changes.fields(), vec!["name", "description"]);
        assert_eq!(
            entry.changes.get("description").unwrap().status,
            crate::diff::DiffStatus::Added
        );
        assert!(entry.old_values.is_some());
        assert!(entry.new_values.is_some());
        assert!(entry.metadata.is_empty());
    }

    #[test]
    fn bulk_update_entry_carries_group_metadata() {
        let bulk_id = Uuid::new_v4();
        let mut old = asset();
        old.bulk = Some(BulkMembership {
            bulk_id,
            bulk_sequence: 2,
            is_bulk_parent: false,
            bulk_total_count: 3,
        });
        let mut new = old.clone();
        new.fields.status = AssetStatus::Damaged;

        let entry = AuditEntry::bulk_updated(&old, &new, bulk_id);
        assert_eq!(entry.metadata["bulk_id"], bulk_id.to_string());
        assert_eq!(entry.metadata["bulk_sequence"], "2");
        assert_eq!(entry.metadata["is_bulk_parent"], "false");
        assert_eq!(entry.metadata["update_type"], "bulk_update");
        assert!(entry.description.contains("001.10.1.24.001"));
        assert_eq!(entry.changes.fields(), vec!["status"]);
    }

    #[test]
    fn create_and_delete_entries_carry_one_snapshot() {
        let a = asset();
        let created = AuditEntry::created(&a);
        assert_eq!(created.action.as_str(), "create");
        assert!(created.old_values.is_none());
        assert_eq!(created.new_values.as_ref().unwrap().code, a.code);

        let deleted = AuditEntry::deleted(&a);
        assert_eq!(deleted.action.as_str(), "delete");
        assert!(deleted.new_values.is_none());
        assert_eq!(deleted.old_values.as_ref().unwrap().id, a.id);
    }

    #[test]
    fn retention_cutoff_subtracts_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let cutoff = retention_cutoff(now, 30);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }
}
