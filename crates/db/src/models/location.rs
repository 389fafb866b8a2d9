use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use inventory_core::asset::Location;
use inventory_core::types::{DbId, Timestamp};

/// A row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationRow {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            building: row.building,
            floor: row.floor,
            room: row.room,
        }
    }
}

/// DTO for creating a location.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocation {
    pub code: String,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
}
