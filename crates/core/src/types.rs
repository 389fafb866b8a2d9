/// Integer primary keys (locations) are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Assets are identified by a random UUID.
pub type AssetId = uuid::Uuid;

/// Categories are identified by a random UUID.
pub type CategoryId = uuid::Uuid;

/// Shared identifier of every member of one bulk group.
pub type BulkId = uuid::Uuid;
