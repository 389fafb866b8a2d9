//! PostgreSQL implementations of the `inventory-core` store traits.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use inventory_core::asset::{Asset, AssetCategory, Location};
use inventory_core::audit::AuditEntry;
use inventory_core::store::{
    AssetStore, AssetTransaction, AuditRecorder, CategoryStore, LocationStore, StoreError,
    StoreResult,
};
use inventory_core::types::{AssetId, BulkId, CategoryId, DbId};

use crate::models::audit::CreateAuditLog;
use crate::repositories::{AssetRepo, AuditLogRepo, CategoryRepo, LocationRepo};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error into the store taxonomy.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::UniqueViolation(format!("{constraint}: {}", db_err.message()));
        }
    }
    StoreError::backend(err)
}

fn into_assets(rows: Vec<crate::models::asset::AssetRow>) -> Vec<Asset> {
    rows.into_iter().map(Asset::from).collect()
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    async fn begin(&self) -> StoreResult<Box<dyn AssetTransaction>> {
        let tx = self.pool.begin().await.map_err(classify_sqlx_error)?;
        Ok(Box::new(PgAssetTransaction { tx, locked: false }))
    }
}

/// A database transaction. Dropped without commit, it rolls back.
pub struct PgAssetTransaction {
    tx: Transaction<'static, Postgres>,
    locked: bool,
}

#[async_trait]
impl AssetTransaction for PgAssetTransaction {
    async fn list_all_codes(&mut self) -> StoreResult<Vec<String>> {
        if !self.locked {
            AssetRepo::lock_code_allocation(&mut self.tx)
                .await
                .map_err(classify_sqlx_error)?;
            self.locked = true;
        }
        AssetRepo::list_codes(&mut self.tx)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn list_all(&mut self) -> StoreResult<Vec<Asset>> {
        AssetRepo::list_all(&mut self.tx)
            .await
            .map(into_assets)
            .map_err(classify_sqlx_error)
    }

    async fn get_by_id(&mut self, id: AssetId) -> StoreResult<Option<Asset>> {
        AssetRepo::find_by_id(&mut self.tx, id)
            .await
            .map(|row| row.map(Asset::from))
            .map_err(classify_sqlx_error)
    }

    async fn list_bulk_members(&mut self, bulk_id: BulkId) -> StoreResult<Vec<Asset>> {
        AssetRepo::list_by_bulk_id(&mut self.tx, bulk_id)
            .await
            .map(into_assets)
            .map_err(classify_sqlx_error)
    }

    async fn create(&mut self, asset: &Asset) -> StoreResult<()> {
        AssetRepo::create(&mut self.tx, asset)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn create_batch(&mut self, assets: &[Asset]) -> StoreResult<()> {
        AssetRepo::create_batch(&mut self.tx, assets)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn update(&mut self, asset: &Asset) -> StoreResult<bool> {
        AssetRepo::update(&mut self.tx, asset)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn update_batch(&mut self, assets: &[Asset]) -> StoreResult<u64> {
        AssetRepo::update_batch(&mut self.tx, assets)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn delete(&mut self, id: AssetId) -> StoreResult<bool> {
        AssetRepo::delete(&mut self.tx, id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn delete_bulk(&mut self, bulk_id: BulkId) -> StoreResult<u64> {
        AssetRepo::delete_by_bulk_id(&mut self.tx, bulk_id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(classify_sqlx_error)
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Option<AssetCategory>> {
        CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(AssetCategory::from))
            .map_err(classify_sqlx_error)
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<AssetCategory>> {
        CategoryRepo::find_by_code(&self.pool, code)
            .await
            .map(|row| row.map(AssetCategory::from))
            .map_err(classify_sqlx_error)
    }
}

#[derive(Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn get_by_id(&self, id: DbId) -> StoreResult<Option<Location>> {
        LocationRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Location::from))
            .map_err(classify_sqlx_error)
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Location>> {
        LocationRepo::find_by_code(&self.pool, code)
            .await
            .map(|row| row.map(Location::from))
            .map_err(classify_sqlx_error)
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Writes audit entries to `audit_logs` outside the mutation's transaction.
#[derive(Clone)]
pub struct PgAuditRecorder {
    pool: PgPool,
}

impl PgAuditRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRecorder for PgAuditRecorder {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()> {
        let row = CreateAuditLog::try_from(entry).map_err(StoreError::backend)?;
        AuditLogRepo::insert(&self.pool, &row)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }
}
