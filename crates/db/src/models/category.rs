use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use inventory_core::asset::AssetCategory;
use inventory_core::types::{CategoryId, Timestamp};

/// A row from the `asset_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CategoryRow> for AssetCategory {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
        }
    }
}

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}
