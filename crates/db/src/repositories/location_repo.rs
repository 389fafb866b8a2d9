use sqlx::PgPool;

use inventory_core::types::DbId;

use crate::models::location::{CreateLocation, LocationRow};

/// Column list for `locations` queries.
const COLUMNS: &str = "id, code, name, building, floor, room, created_at, updated_at";

/// Provides CRUD operations for locations.
pub struct LocationRepo;

impl LocationRepo {
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<LocationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (code, name, building, floor, room) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LocationRow>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.building.as_deref())
            .bind(input.floor.as_deref())
            .bind(input.room.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LocationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = $1");
        sqlx::query_as::<_, LocationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<LocationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE code = $1");
        sqlx::query_as::<_, LocationRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
