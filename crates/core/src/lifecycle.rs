//! Asset lifecycle orchestration.
//!
//! Composes code generation, sequence allocation, depreciation and bulk
//! handling over the store traits. Every mutation runs inside one
//! [`AssetTransaction`]: the code snapshot used for allocation and the rows
//! that consume the allocated sequences commit together or not at all.
//! Audit entries are emitted after commit and are best-effort.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::asset::{Asset, AssetFields};
use crate::audit::AuditEntry;
use crate::bulk::{self, BulkSummary};
use crate::clock::{Clock, SystemClock};
use crate::code::{structural_change, AssetCode, CodePrefix};
use crate::depreciation::depreciate;
use crate::error::CoreError;
use crate::sequence::{first_free_window, occupied_sequences, range_is_free, window_end};
use crate::store::{AssetStore, AssetTransaction, AuditRecorder, CategoryStore, LocationStore};
use crate::types::{AssetId, BulkId};

/// Outcome of [`AssetLifecycle::update_asset`].
#[derive(Debug, Clone)]
pub enum AssetUpdate {
    /// A standalone asset was updated.
    Single(Asset),
    /// The asset belongs to a bulk group; every member was updated.
    Bulk(Vec<Asset>),
}

impl AssetUpdate {
    pub fn assets(&self) -> &[Asset] {
        match self {
            Self::Single(asset) => std::slice::from_ref(asset),
            Self::Bulk(members) => members,
        }
    }
}

/// How codes are treated when a bulk group is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodePolicy {
    /// Keep every member's code untouched.
    Preserve,
    /// Rebuild codes from the new structural fields if any changed.
    Regenerate,
}

/// The lifecycle engine. Holds no mutable state between calls.
#[derive(Clone)]
pub struct AssetLifecycle {
    assets: Arc<dyn AssetStore>,
    categories: Arc<dyn CategoryStore>,
    locations: Arc<dyn LocationStore>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
}

impl AssetLifecycle {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        categories: Arc<dyn CategoryStore>,
        locations: Arc<dyn LocationStore>,
        audit: Arc<dyn AuditRecorder>,
    ) -> Self {
        Self {
            assets,
            categories,
            locations,
            audit,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for timestamps and depreciation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Register a single asset at the first free sequence.
    pub async fn create_asset(&self, fields: AssetFields) -> Result<Asset, CoreError> {
        self.create_single(fields, None).await
    }

    /// Register a single asset at a sequence pre-allocated with
    /// [`get_next_available_sequence_range`](Self::get_next_available_sequence_range).
    pub async fn create_asset_with_sequence(
        &self,
        fields: AssetFields,
        sequence: u32,
    ) -> Result<Asset, CoreError> {
        self.create_single(fields, Some(sequence)).await
    }

    /// Register `quantity` identical units as one bulk group.
    pub async fn create_bulk_asset(
        &self,
        fields: AssetFields,
        quantity: u32,
    ) -> Result<Vec<Asset>, CoreError> {
        self.create_bulk(fields, quantity, None).await
    }

    /// Bulk variant of [`create_asset_with_sequence`](Self::create_asset_with_sequence).
    pub async fn create_bulk_asset_with_sequence(
        &self,
        fields: AssetFields,
        quantity: u32,
        first_sequence: u32,
    ) -> Result<Vec<Asset>, CoreError> {
        self.create_bulk(fields, quantity, Some(first_sequence)).await
    }

    async fn create_single(
        &self,
        fields: AssetFields,
        requested: Option<u32>,
    ) -> Result<Asset, CoreError> {
        fields.validate()?;
        self.ensure_category(&fields).await?;
        let prefix = self.code_prefix(&fields).await;

        let mut tx = self.begin().await?;
        let sequence = allocate(tx.as_mut(), 1, requested).await?;

        let now = self.clock.now();
        let mut asset = Asset {
            id: Uuid::new_v4(),
            code: prefix.with_sequence(sequence),
            fields,
            useful_life_months: 0,
            accumulated_depreciation: 0.0,
            residual_value: 0.0,
            bulk: None,
            created_at: now,
            updated_at: now,
        };
        self.recompute(&mut asset);

        tx.create(&asset)
            .await
            .map_err(|e| CoreError::store(format!("insert asset {}", asset.code), e))?;
        commit(tx, "create asset").await?;

        info!(asset_id = %asset.id, code = %asset.code, "Asset created");
        self.record(AuditEntry::created(&asset)).await;
        Ok(asset)
    }

    async fn create_bulk(
        &self,
        fields: AssetFields,
        quantity: u32,
        requested: Option<u32>,
    ) -> Result<Vec<Asset>, CoreError> {
        fields.validate()?;
        bulk::validate_bulk_request(&fields, quantity)?;
        self.ensure_category(&fields).await?;
        let prefix = self.code_prefix(&fields).await;

        let mut tx = self.begin().await?;
        let first = allocate(tx.as_mut(), quantity, requested).await?;

        let members = bulk::build_group(
            &fields,
            quantity,
            &prefix,
            first,
            self.clock.today(),
            self.clock.now(),
        );
        bulk::create_group(tx.as_mut(), &members).await?;
        commit(tx, "create bulk asset").await?;

        info!(
            bulk_id = ?members[0].bulk_id(),
            count = quantity,
            first_code = %members[0].code,
            "Bulk asset group created"
        );
        for member in &members {
            self.record(AuditEntry::created(member)).await;
        }
        Ok(members)
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Update an asset. A bulk member is never updated alone: the new values
    /// are applied to its whole group. Codes are regenerated on a structural
    /// change for standalone assets and when the group's parent is the
    /// member being updated.
    pub async fn update_asset(
        &self,
        id: AssetId,
        fields: AssetFields,
    ) -> Result<AssetUpdate, CoreError> {
        fields.validate()?;
        self.ensure_category(&fields).await?;

        let mut tx = self.begin().await?;
        let existing = tx
            .get_by_id(id)
            .await
            .map_err(|e| CoreError::store(format!("load asset {id}"), e))?
            .ok_or_else(|| CoreError::not_found("Asset", id))?;

        if let Some(membership) = existing.bulk {
            let policy = if membership.is_bulk_parent {
                CodePolicy::Regenerate
            } else {
                CodePolicy::Preserve
            };
            debug!(asset_id = %id, bulk_id = %membership.bulk_id, ?policy, "Routing update to bulk group");
            let members = self
                .update_group_in(tx, membership.bulk_id, fields, policy)
                .await?;
            return Ok(AssetUpdate::Bulk(members));
        }

        let mut updated = existing.clone();
        if structural_change(&existing.fields, &fields) {
            let sequence = existing
                .code
                .parse::<AssetCode>()
                .map_err(|e| {
                    CoreError::Internal(format!("cannot regenerate code for asset {id}: {e}"))
                })?
                .sequence;
            updated.code = self.code_prefix(&fields).await.with_sequence(sequence);
        }
        updated.fields = fields;
        updated.updated_at = self.clock.now();
        self.recompute(&mut updated);

        let found = tx
            .update(&updated)
            .await
            .map_err(|e| CoreError::store(format!("update asset {}", updated.code), e))?;
        if !found {
            return Err(CoreError::not_found("Asset", id));
        }
        commit(tx, "update asset").await?;

        info!(asset_id = %id, code = %updated.code, "Asset updated");
        self.record(AuditEntry::updated(&existing, &updated)).await;
        Ok(AssetUpdate::Single(updated))
    }

    /// Update every member of a bulk group. This is the group-level path:
    /// a structural change regenerates every member's code from its
    /// existing sequence.
    pub async fn update_bulk_assets(
        &self,
        bulk_id: BulkId,
        fields: AssetFields,
    ) -> Result<Vec<Asset>, CoreError> {
        fields.validate()?;
        self.ensure_category(&fields).await?;
        let tx = self.begin().await?;
        self.update_group_in(tx, bulk_id, fields, CodePolicy::Regenerate)
            .await
    }

    async fn update_group_in(
        &self,
        mut tx: Box<dyn AssetTransaction>,
        bulk_id: BulkId,
        fields: AssetFields,
        policy: CodePolicy,
    ) -> Result<Vec<Asset>, CoreError> {
        let members = bulk::load_group(tx.as_mut(), bulk_id).await?;
        let regenerate = match policy {
            CodePolicy::Regenerate if structural_change(&members[0].fields, &fields) => {
                Some(self.code_prefix(&fields).await)
            }
            _ => None,
        };

        let update = bulk::update_group(
            tx.as_mut(),
            bulk_id,
            &fields,
            regenerate.as_ref(),
            self.clock.today(),
            self.clock.now(),
        )
        .await?;
        commit(tx, "update bulk asset").await?;

        info!(
            bulk_id = %bulk_id,
            count = update.after.len(),
            codes_regenerated = regenerate.is_some(),
            "Bulk asset group updated"
        );
        for (old, new) in update.before.iter().zip(&update.after) {
            self.record(AuditEntry::bulk_updated(old, new, bulk_id)).await;
        }
        Ok(update.after)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete a standalone asset. Bulk members can only be deleted together
    /// through [`delete_bulk_assets`](Self::delete_bulk_assets).
    pub async fn delete_asset(&self, id: AssetId) -> Result<Asset, CoreError> {
        let mut tx = self.begin().await?;
        let existing = tx
            .get_by_id(id)
            .await
            .map_err(|e| CoreError::store(format!("load asset {id}"), e))?
            .ok_or_else(|| CoreError::not_found("Asset", id))?;

        if let Some(bulk_id) = existing.bulk_id() {
            return Err(CoreError::Validation(format!(
                "asset {} belongs to bulk group {bulk_id}; delete the group instead",
                existing.code
            )));
        }

        let found = tx
            .delete(id)
            .await
            .map_err(|e| CoreError::store(format!("delete asset {}", existing.code), e))?;
        if !found {
            return Err(CoreError::not_found("Asset", id));
        }
        commit(tx, "delete asset").await?;

        info!(asset_id = %id, code = %existing.code, "Asset deleted");
        self.record(AuditEntry::deleted(&existing)).await;
        Ok(existing)
    }

    /// Delete a whole bulk group atomically. A group missing its parent is
    /// still deleted, without the `bulk_delete` summary entry.
    pub async fn delete_bulk_assets(&self, bulk_id: BulkId) -> Result<Vec<Asset>, CoreError> {
        let mut tx = self.begin().await?;
        let members = bulk::delete_group(tx.as_mut(), bulk_id).await?;
        commit(tx, "delete bulk asset").await?;

        info!(bulk_id = %bulk_id, count = members.len(), "Bulk asset group deleted");
        for member in &members {
            self.record(AuditEntry::deleted(member)).await;
        }
        match members.iter().find(|m| m.is_bulk_parent()) {
            Some(parent) => {
                self.record(AuditEntry::bulk_deleted(parent, bulk_id, members.len()))
                    .await
            }
            None => warn!(
                bulk_id = %bulk_id,
                count = members.len(),
                "Deleted bulk group had no parent, summary entry skipped"
            ),
        }
        Ok(members)
    }

    // -----------------------------------------------------------------------
    // Allocation & reads
    // -----------------------------------------------------------------------

    /// First sequence of the lowest free window of `count` sequences. Used by
    /// imports to pre-assign dense codes across many rows.
    pub async fn get_next_available_sequence_range(&self, count: u32) -> Result<u32, CoreError> {
        if count == 0 {
            return Err(CoreError::Validation(
                "sequence range count must be at least 1".into(),
            ));
        }
        let mut tx = self.begin().await?;
        allocate(tx.as_mut(), count, None).await
    }

    pub async fn get_asset(&self, id: AssetId) -> Result<Asset, CoreError> {
        let mut tx = self.begin().await?;
        tx.get_by_id(id)
            .await
            .map_err(|e| CoreError::store(format!("load asset {id}"), e))?
            .ok_or_else(|| CoreError::not_found("Asset", id))
    }

    pub async fn get_bulk_assets(&self, bulk_id: BulkId) -> Result<Vec<Asset>, CoreError> {
        let mut tx = self.begin().await?;
        bulk::load_group(tx.as_mut(), bulk_id).await
    }

    pub async fn get_bulk_summary(&self, bulk_id: BulkId) -> Result<BulkSummary, CoreError> {
        let members = self.get_bulk_assets(bulk_id).await?;
        BulkSummary::from_members(&members)
            .ok_or_else(|| CoreError::Internal(format!("bulk group {bulk_id} has no parent")))
    }

    /// Recompute depreciation for every asset as of today. Returns the
    /// number of rows whose stored values changed.
    pub async fn refresh_depreciation(&self) -> Result<usize, CoreError> {
        let mut tx = self.begin().await?;
        let assets = tx
            .list_all()
            .await
            .map_err(|e| CoreError::store("list assets", e))?;

        let now = self.clock.now();
        let stale: Vec<Asset> = assets
            .into_iter()
            .filter_map(|mut asset| {
                let before = asset.depreciation();
                self.recompute(&mut asset);
                if asset.depreciation() == before {
                    return None;
                }
                asset.updated_at = now;
                Some(asset)
            })
            .collect();

        if !stale.is_empty() {
            tx.update_batch(&stale)
                .await
                .map_err(|e| CoreError::store("refresh depreciation", e))?;
        }
        commit(tx, "refresh depreciation").await?;

        info!(updated = stale.len(), "Depreciation refreshed");
        Ok(stale.len())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn begin(&self) -> Result<Box<dyn AssetTransaction>, CoreError> {
        self.assets
            .begin()
            .await
            .map_err(|e| CoreError::store("begin transaction", e))
    }

    fn recompute(&self, asset: &mut Asset) {
        asset.apply_depreciation(depreciate(
            asset.fields.acquisition_price,
            asset.fields.useful_life_years,
            asset.fields.acquisition_date,
            self.clock.today(),
        ));
    }

    /// The referenced category must exist. Lookup failures propagate.
    async fn ensure_category(&self, fields: &AssetFields) -> Result<(), CoreError> {
        let id = fields.category_id;
        self.categories
            .get_by_id(id)
            .await
            .map_err(|e| CoreError::store(format!("load category {id}"), e))?
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("AssetCategory", id))
    }

    /// Resolve the structural code segments. Never fails: lookup problems
    /// fall back to the default segments.
    async fn code_prefix(&self, fields: &AssetFields) -> CodePrefix {
        let location_code = match fields.location_id {
            Some(id) => match self.locations.get_by_id(id).await {
                Ok(found) => found.map(|l| l.code),
                Err(e) => {
                    warn!(location_id = id, error = %e, "Location lookup failed, using default code");
                    None
                }
            },
            None => None,
        };

        let category_code = match self.categories.get_by_id(fields.category_id).await {
            Ok(found) => found.map(|c| c.code),
            Err(e) => {
                warn!(category_id = %fields.category_id, error = %e, "Category lookup failed, using default code");
                None
            }
        };

        CodePrefix::new(
            location_code.as_deref(),
            category_code.as_deref(),
            fields.procurement_source,
            fields.acquisition_year(),
        )
    }

    /// Hand an entry to the audit recorder. Failures are logged, never raised.
    async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.record(&entry).await {
            warn!(
                entity_id = %entry.entity_id,
                action = %entry.action,
                error = %e,
                "Failed to record audit entry"
            );
        }
    }
}

/// Pick the first sequence for `count` new codes from the transaction's
/// snapshot. A `requested` start (pre-allocated by an import) must still be
/// entirely free.
async fn allocate(
    tx: &mut dyn AssetTransaction,
    count: u32,
    requested: Option<u32>,
) -> Result<u32, CoreError> {
    if let Some(first) = requested {
        if first == 0 {
            return Err(CoreError::Validation("sequence numbers start at 1".into()));
        }
        if window_end(first, count).is_none() {
            return Err(CoreError::Validation(format!(
                "a range of {count} starting at {first} exceeds the largest sequence"
            )));
        }
    }

    let codes = tx
        .list_all_codes()
        .await
        .map_err(|e| CoreError::store("list asset codes", e))?;
    let occupied = occupied_sequences(&codes);

    let first = match requested {
        Some(first) if range_is_free(&occupied, first, count) => first,
        Some(first) => {
            let last = window_end(first, count).unwrap_or(u32::MAX);
            return Err(CoreError::Conflict(format!(
                "sequences {first}..{last} are no longer free"
            )));
        }
        None => first_free_window(&occupied, count).ok_or_else(|| {
            CoreError::Validation(format!("no free range of {count} sequences remains"))
        })?,
    };
    debug!(first, count, existing = codes.len(), "Allocated sequence range");
    Ok(first)
}

async fn commit(tx: Box<dyn AssetTransaction>, operation: &str) -> Result<(), CoreError> {
    tx.commit()
        .await
        .map_err(|e| CoreError::store(format!("commit {operation}"), e))
}
