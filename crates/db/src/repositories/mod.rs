//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Reference-data and audit repositories accept `&PgPool`; the asset
//! repository accepts `&mut PgConnection` so it can run inside a transaction.

pub mod asset_repo;
pub mod audit_repo;
pub mod category_repo;
pub mod location_repo;

pub use asset_repo::AssetRepo;
pub use audit_repo::AuditLogRepo;
pub use category_repo::CategoryRepo;
pub use location_repo::LocationRepo;
