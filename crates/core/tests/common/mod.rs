//! In-memory implementations of the store traits, with failure injection.
//!
//! A transaction holds the table lock for its whole lifetime and works on a
//! private copy of the rows; `commit` publishes the copy, dropping it
//! discards the copy.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use inventory_core::asset::{Asset, AssetCategory, AssetFields, Location};
use inventory_core::audit::AuditEntry;
use inventory_core::clock::FixedClock;
use inventory_core::lifecycle::AssetLifecycle;
use inventory_core::procurement::ProcurementSource;
use inventory_core::status::AssetStatus;
use inventory_core::store::{
    AssetStore, AssetTransaction, AuditRecorder, CategoryStore, LocationStore, StoreError,
    StoreResult,
};
use inventory_core::types::{AssetId, BulkId, CategoryId, DbId};

// ---------------------------------------------------------------------------
// Failure injection
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("injected failure: {0}")]
pub struct Injected(pub &'static str);

/// Switches that make the next matching store call fail.
#[derive(Debug, Default)]
pub struct Faults {
    /// `delete_bulk` removes one row, then fails.
    pub delete_bulk_midway: AtomicBool,
    /// `create_batch` inserts one row, then fails.
    pub create_batch_midway: AtomicBool,
    /// `commit` fails without publishing.
    pub commit: AtomicBool,
    /// Category lookups fail.
    pub category_lookup: AtomicBool,
    /// Location lookups fail.
    pub location_lookup: AtomicBool,
}

impl Faults {
    fn hit(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryAssetStore {
    rows: Arc<AsyncMutex<Vec<Asset>>>,
    faults: Arc<Faults>,
}

impl MemoryAssetStore {
    pub fn new(faults: Arc<Faults>) -> Self {
        Self {
            rows: Arc::default(),
            faults,
        }
    }

    /// Committed rows, ordered by code.
    pub async fn rows(&self) -> Vec<Asset> {
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        rows
    }

    pub async fn codes(&self) -> Vec<String> {
        self.rows().await.into_iter().map(|a| a.code).collect()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn begin(&self) -> StoreResult<Box<dyn AssetTransaction>> {
        let guard = self.rows.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            faults: self.faults.clone(),
        }))
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Vec<Asset>>,
    working: Vec<Asset>,
    faults: Arc<Faults>,
}

impl MemoryTransaction {
    fn insert(&mut self, asset: &Asset) -> StoreResult<()> {
        if self.working.iter().any(|a| a.code == asset.code) {
            return Err(StoreError::UniqueViolation(format!(
                "assets_code_key: {}",
                asset.code
            )));
        }
        self.working.push(asset.clone());
        Ok(())
    }

    fn replace(&mut self, asset: &Asset) -> StoreResult<bool> {
        if self
            .working
            .iter()
            .any(|a| a.code == asset.code && a.id != asset.id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "assets_code_key: {}",
                asset.code
            )));
        }
        match self.working.iter_mut().find(|a| a.id == asset.id) {
            Some(row) => {
                *row = asset.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AssetTransaction for MemoryTransaction {
    async fn list_all_codes(&mut self) -> StoreResult<Vec<String>> {
        Ok(self.working.iter().map(|a| a.code.clone()).collect())
    }

    async fn list_all(&mut self) -> StoreResult<Vec<Asset>> {
        Ok(self.working.clone())
    }

    async fn get_by_id(&mut self, id: AssetId) -> StoreResult<Option<Asset>> {
        Ok(self.working.iter().find(|a| a.id == id).cloned())
    }

    async fn list_bulk_members(&mut self, bulk_id: BulkId) -> StoreResult<Vec<Asset>> {
        let mut members: Vec<Asset> = self
            .working
            .iter()
            .filter(|a| a.bulk_id() == Some(bulk_id))
            .cloned()
            .collect();
        members.sort_by_key(|a| a.bulk.map(|b| b.bulk_sequence));
        Ok(members)
    }

    async fn create(&mut self, asset: &Asset) -> StoreResult<()> {
        self.insert(asset)
    }

    async fn create_batch(&mut self, assets: &[Asset]) -> StoreResult<()> {
        for (i, asset) in assets.iter().enumerate() {
            if i == 1 && Faults::hit(&self.faults.create_batch_midway) {
                return Err(StoreError::backend(Injected("create_batch")));
            }
            self.insert(asset)?;
        }
        Ok(())
    }

    async fn update(&mut self, asset: &Asset) -> StoreResult<bool> {
        self.replace(asset)
    }

    async fn update_batch(&mut self, assets: &[Asset]) -> StoreResult<u64> {
        let mut updated = 0;
        for asset in assets {
            if self.replace(asset)? {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&mut self, id: AssetId) -> StoreResult<bool> {
        let before = self.working.len();
        self.working.retain(|a| a.id != id);
        Ok(self.working.len() != before)
    }

    async fn delete_bulk(&mut self, bulk_id: BulkId) -> StoreResult<u64> {
        let mut deleted = 0;
        while let Some(pos) = self
            .working
            .iter()
            .position(|a| a.bulk_id() == Some(bulk_id))
        {
            if deleted == 1 && Faults::hit(&self.faults.delete_bulk_midway) {
                return Err(StoreError::backend(Injected("delete_bulk")));
            }
            self.working.remove(pos);
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        if Faults::hit(&self.faults.commit) {
            return Err(StoreError::backend(Injected("commit")));
        }
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryReferenceData {
    pub categories: Vec<AssetCategory>,
    pub locations: Vec<Location>,
    faults: Arc<Faults>,
}

#[async_trait]
impl CategoryStore for MemoryReferenceData {
    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Option<AssetCategory>> {
        if Faults::hit(&self.faults.category_lookup) {
            return Err(StoreError::backend(Injected("category lookup")));
        }
        Ok(self.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<AssetCategory>> {
        Ok(self.categories.iter().find(|c| c.code == code).cloned())
    }
}

#[async_trait]
impl LocationStore for MemoryReferenceData {
    async fn get_by_id(&self, id: DbId) -> StoreResult<Option<Location>> {
        if Faults::hit(&self.faults.location_lookup) {
            return Err(StoreError::backend(Injected("location lookup")));
        }
        Ok(self.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Location>> {
        Ok(self.locations.iter().find(|l| l.code == code).cloned())
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
    pub failing: AtomicBool,
}

impl MemoryAudit {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditRecorder for MemoryAudit {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::backend(Injected("audit")));
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub const FURNITURE: Uuid = Uuid::from_u128(0x10);
pub const ELECTRONICS: Uuid = Uuid::from_u128(0x20);
pub const MAIN_OFFICE: DbId = 1;
pub const WAREHOUSE: DbId = 2;

pub struct Harness {
    pub lifecycle: AssetLifecycle,
    pub store: MemoryAssetStore,
    pub audit: Arc<MemoryAudit>,
    pub faults: Arc<Faults>,
}

/// Engine wired to empty in-memory stores, with the clock fixed on `today`.
pub fn harness(today: NaiveDate) -> Harness {
    let faults = Arc::new(Faults::default());
    let store = MemoryAssetStore::new(faults.clone());
    let reference = Arc::new(MemoryReferenceData {
        categories: vec![
            AssetCategory {
                id: FURNITURE,
                code: "10".into(),
                name: "Furniture".into(),
                description: None,
            },
            AssetCategory {
                id: ELECTRONICS,
                code: "20".into(),
                name: "Electronics".into(),
                description: Some("Computers and peripherals".into()),
            },
        ],
        locations: vec![
            Location {
                id: MAIN_OFFICE,
                code: "001".into(),
                name: "Main office".into(),
                building: Some("A".into()),
                floor: Some("1".into()),
                room: None,
            },
            Location {
                id: WAREHOUSE,
                code: "002".into(),
                name: "Warehouse".into(),
                building: Some("B".into()),
                floor: None,
                room: None,
            },
        ],
        faults: faults.clone(),
    });
    let audit = Arc::new(MemoryAudit::default());

    let lifecycle = AssetLifecycle::new(
        Arc::new(store.clone()),
        reference.clone(),
        reference,
        audit.clone(),
    )
    .with_clock(Arc::new(FixedClock::on(today)));

    Harness {
        lifecycle,
        store,
        audit,
        faults,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Valid purchase of one chair in the main office, acquired in 2024.
pub fn chair() -> AssetFields {
    AssetFields {
        name: "Office chair".into(),
        specification: None,
        quantity: 1,
        unit: "unit".into(),
        acquisition_date: date(2024, 1, 10),
        acquisition_price: 1_200_000.0,
        useful_life_years: 5,
        description: None,
        location_id: Some(MAIN_OFFICE),
        category_id: FURNITURE,
        procurement_source: ProcurementSource::Purchase,
        status: AssetStatus::Good,
    }
}
