use sqlx::PgPool;

use inventory_core::types::CategoryId;

use crate::models::category::{CategoryRow, CreateCategory};

/// Column list for `asset_categories` queries.
const COLUMNS: &str = "id, code, name, description, created_at, updated_at";

/// Provides CRUD operations for asset categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<CategoryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_categories (code, name, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: CategoryId,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_categories WHERE code = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
