//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the database row
//! - Conversions to and from the `inventory-core` domain types
//! - A `Deserialize` create DTO where rows are inserted outside the engine

pub mod asset;
pub mod audit;
pub mod category;
pub mod location;
