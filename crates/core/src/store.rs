//! Collaborator traits the lifecycle engine is written against.
//!
//! Persistence is behind [`AssetStore`]: every mutation goes through an
//! [`AssetTransaction`], and dropping a transaction without calling
//! [`AssetTransaction::commit`] rolls it back. Reference data and the audit
//! sink are read-only / write-only collaborators respectively.

use async_trait::async_trait;

use crate::asset::{Asset, AssetCategory, Location};
use crate::audit::AuditEntry;
use crate::types::{AssetId, BulkId, CategoryId, DbId};

/// Failure reported by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a duplicate `code`).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other backend failure.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Entry point to asset persistence.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Open a transaction. Reads and writes made through it are atomic.
    async fn begin(&self) -> StoreResult<Box<dyn AssetTransaction>>;
}

/// One atomic unit of work against the asset table.
#[async_trait]
pub trait AssetTransaction: Send {
    /// Every asset code currently stored. Implementations must serialize
    /// concurrent callers from this point until commit/rollback.
    async fn list_all_codes(&mut self) -> StoreResult<Vec<String>>;

    async fn list_all(&mut self) -> StoreResult<Vec<Asset>>;

    async fn get_by_id(&mut self, id: AssetId) -> StoreResult<Option<Asset>>;

    /// Members of a bulk group ordered by `bulk_sequence`.
    async fn list_bulk_members(&mut self, bulk_id: BulkId) -> StoreResult<Vec<Asset>>;

    async fn create(&mut self, asset: &Asset) -> StoreResult<()>;

    async fn create_batch(&mut self, assets: &[Asset]) -> StoreResult<()>;

    /// Overwrite a row. Returns `false` if no row has `asset.id`.
    async fn update(&mut self, asset: &Asset) -> StoreResult<bool>;

    /// Overwrite several rows. Returns the number of rows updated.
    async fn update_batch(&mut self, assets: &[Asset]) -> StoreResult<u64>;

    /// Returns `false` if no row had `id`.
    async fn delete(&mut self, id: AssetId) -> StoreResult<bool>;

    /// Delete every row sharing `bulk_id`. Returns the number deleted.
    async fn delete_bulk(&mut self, bulk_id: BulkId) -> StoreResult<u64>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Option<AssetCategory>>;
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<AssetCategory>>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get_by_id(&self, id: DbId) -> StoreResult<Option<Location>>;
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Location>>;
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Write-only audit sink. Failures never abort the triggering mutation.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()>;
}
