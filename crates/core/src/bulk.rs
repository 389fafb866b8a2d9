//! Bulk groups: N identical units acquired together, sharing a `bulk_id`.
//!
//! A group is created whole, updated whole, and deleted whole. Each member
//! keeps its own code, `bulk_sequence` and parent flag; every other business
//! field is identical across the group. The group's size is fixed at
//! creation: members are never added or removed individually.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::asset::{Asset, AssetFields, BulkMembership};
use crate::code::{AssetCode, CodePrefix};
use crate::depreciation::depreciate;
use crate::error::CoreError;
use crate::store::AssetTransaction;
use crate::types::{AssetId, BulkId, Timestamp};

/// Units that describe discretely countable items. Bulk groups of length,
/// weight or volume measures are meaningless and are rejected.
pub const BULK_ELIGIBLE_UNITS: &[&str] = &["unit", "pcs", "set", "buah"];

pub fn is_bulk_eligible_unit(unit: &str) -> bool {
    let unit = unit.trim().to_lowercase();
    BULK_ELIGIBLE_UNITS.contains(&unit.as_str())
}

/// Reject a bulk request before anything is read or written.
pub fn validate_bulk_request(fields: &AssetFields, quantity: u32) -> Result<(), CoreError> {
    if quantity < 2 {
        return Err(CoreError::Validation(format!(
            "bulk quantity must be greater than 1, got {quantity}"
        )));
    }
    validate_bulk_unit(&fields.unit)
}

pub fn validate_bulk_unit(unit: &str) -> Result<(), CoreError> {
    if is_bulk_eligible_unit(unit) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "unit '{unit}' is not eligible for bulk assets (allowed: {})",
            BULK_ELIGIBLE_UNITS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Pure construction
// ---------------------------------------------------------------------------

/// Build the members of a new group. `first_sequence` is the start of a free
/// window of `quantity` sequences, already checked against `window_end`.
pub fn build_group(
    template: &AssetFields,
    quantity: u32,
    prefix: &CodePrefix,
    first_sequence: u32,
    today: NaiveDate,
    now: Timestamp,
) -> Vec<Asset> {
    let bulk_id = Uuid::new_v4();
    let dep = depreciate(
        template.acquisition_price,
        template.useful_life_years,
        template.acquisition_date,
        today,
    );
    let total = quantity as i32;

    (0..quantity)
        .map(|i| {
            let mut fields = template.clone();
            fields.quantity = 1;
            let mut asset = Asset {
                id: Uuid::new_v4(),
                code: prefix.with_sequence(first_sequence + i),
                fields,
                useful_life_months: 0,
                accumulated_depreciation: 0.0,
                residual_value: 0.0,
                bulk: Some(BulkMembership {
                    bulk_id,
                    bulk_sequence: i as i32 + 1,
                    is_bulk_parent: i == 0,
                    bulk_total_count: total,
                }),
                created_at: now,
                updated_at: now,
            };
            asset.apply_depreciation(dep);
            asset
        })
        .collect()
}

/// Apply new business fields to every member, preserving each member's
/// identity, code and bulk position. With `regenerate` set, each code is
/// rebuilt from the new prefix and the member's existing sequence.
pub fn apply_group_update(
    members: &[Asset],
    fields: &AssetFields,
    regenerate: Option<&CodePrefix>,
    today: NaiveDate,
    now: Timestamp,
) -> Result<Vec<Asset>, CoreError> {
    members
        .iter()
        .map(|member| {
            let mut updated = member.clone();
            updated.fields = fields.clone();
            updated.fields.quantity = 1;
            // Computed per row so each member's derivation stands on its own.
            updated.apply_depreciation(depreciate(
                fields.acquisition_price,
                fields.useful_life_years,
                fields.acquisition_date,
                today,
            ));
            if let Some(prefix) = regenerate {
                let sequence = member
                    .code
                    .parse::<AssetCode>()
                    .map_err(|e| {
                        CoreError::Internal(format!(
                            "cannot regenerate code for asset {}: {e}",
                            member.id
                        ))
                    })?
                    .sequence;
                updated.code = prefix.with_sequence(sequence);
            }
            updated.updated_at = now;
            Ok(updated)
        })
        .collect()
}

/// Check that a loaded group is well-formed: one parent, sequences exactly
/// `1..=total`, one shared `bulk_total_count`, quantity 1 everywhere.
pub fn check_group_invariants(bulk_id: BulkId, members: &[Asset]) -> Result<(), CoreError> {
    let broken = |why: String| CoreError::Internal(format!("bulk group {bulk_id} is corrupt: {why}"));

    let total = members.len() as i32;
    let mut parents = 0;
    let mut seen = HashSet::new();
    for member in members {
        let bulk = member
            .bulk
            .filter(|b| b.bulk_id == bulk_id)
            .ok_or_else(|| broken(format!("asset {} is not a member", member.id)))?;
        if bulk.is_bulk_parent {
            parents += 1;
        }
        if bulk.bulk_total_count != total {
            return Err(broken(format!(
                "asset {} records group size {}, group has {total}",
                member.id, bulk.bulk_total_count
            )));
        }
        if bulk.bulk_sequence < 1 || bulk.bulk_sequence > total || !seen.insert(bulk.bulk_sequence)
        {
            return Err(broken(format!(
                "asset {} has invalid bulk_sequence {}",
                member.id, bulk.bulk_sequence
            )));
        }
        if member.fields.quantity != 1 {
            return Err(broken(format!("asset {} has quantity {}", member.id, member.fields.quantity)));
        }
    }
    if parents != 1 {
        return Err(broken(format!("{parents} parents")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Group-wide view for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkSummary {
    pub bulk_id: BulkId,
    pub parent_id: AssetId,
    pub parent_code: String,
    pub name: String,
    pub total_count: i32,
    pub first_code: String,
    pub last_code: String,
    pub total_acquisition_price: f64,
    pub total_residual_value: f64,
}

impl BulkSummary {
    /// Summarize members ordered by `bulk_sequence`. `None` if empty or no
    /// member is flagged as parent.
    pub fn from_members(members: &[Asset]) -> Option<Self> {
        let parent = members.iter().find(|m| m.is_bulk_parent())?;
        let bulk = parent.bulk?;
        Some(Self {
            bulk_id: bulk.bulk_id,
            parent_id: parent.id,
            parent_code: parent.code.clone(),
            name: parent.fields.name.clone(),
            total_count: bulk.bulk_total_count,
            first_code: members.first()?.code.clone(),
            last_code: members.last()?.code.clone(),
            total_acquisition_price: crate::depreciation::round2(
                members.iter().map(|m| m.fields.acquisition_price).sum(),
            ),
            total_residual_value: crate::depreciation::round2(
                members.iter().map(|m| m.residual_value).sum(),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Transactional operations
// ---------------------------------------------------------------------------

/// Result of a group update: members before and after, in sequence order.
#[derive(Debug, Clone)]
pub struct BulkUpdate {
    pub before: Vec<Asset>,
    pub after: Vec<Asset>,
}

/// Load a group inside `tx`. `NotFound` if it has no members.
pub async fn load_group(
    tx: &mut dyn AssetTransaction,
    bulk_id: BulkId,
) -> Result<Vec<Asset>, CoreError> {
    let members = tx
        .list_bulk_members(bulk_id)
        .await
        .map_err(|e| CoreError::store(format!("list members of bulk {bulk_id}"), e))?;
    if members.is_empty() {
        return Err(CoreError::not_found("BulkGroup", bulk_id));
    }
    Ok(members)
}

/// Insert a freshly built group as one batch.
pub async fn create_group(
    tx: &mut dyn AssetTransaction,
    members: &[Asset],
) -> Result<(), CoreError> {
    let first = members.first().map(|m| m.code.as_str()).unwrap_or_default();
    tx.create_batch(members).await.map_err(|e| {
        CoreError::store(
            format!("insert bulk group of {} starting at {first}", members.len()),
            e,
        )
    })
}

/// Rewrite every member of a group with new business fields.
pub async fn update_group(
    tx: &mut dyn AssetTransaction,
    bulk_id: BulkId,
    fields: &AssetFields,
    regenerate: Option<&CodePrefix>,
    today: NaiveDate,
    now: Timestamp,
) -> Result<BulkUpdate, CoreError> {
    validate_bulk_unit(&fields.unit)?;
    let before = load_group(tx, bulk_id).await?;
    check_group_invariants(bulk_id, &before)?;

    let after = apply_group_update(&before, fields, regenerate, today, now)?;
    let updated = tx
        .update_batch(&after)
        .await
        .map_err(|e| CoreError::store(format!("update bulk {bulk_id}"), e))?;
    if updated != after.len() as u64 {
        return Err(CoreError::Conflict(format!(
            "bulk {bulk_id} changed during update: {updated} of {} rows written",
            after.len()
        )));
    }
    Ok(BulkUpdate { before, after })
}

/// Delete every member of a group. Returns the deleted members.
pub async fn delete_group(
    tx: &mut dyn AssetTransaction,
    bulk_id: BulkId,
) -> Result<Vec<Asset>, CoreError> {
    let members = load_group(tx, bulk_id).await?;
    let deleted = tx
        .delete_bulk(bulk_id)
        .await
        .map_err(|e| CoreError::store(format!("delete bulk {bulk_id}"), e))?;
    if deleted != members.len() as u64 {
        return Err(CoreError::Conflict(format!(
            "bulk {bulk_id} changed during delete: {deleted} of {} rows removed",
            members.len()
        )));
    }
    Ok(members)
}
