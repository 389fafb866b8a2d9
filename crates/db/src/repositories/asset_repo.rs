//! Repository for the `assets` table.
//!
//! Functions take `&mut PgConnection` so they compose inside one
//! transaction (`&mut *tx`).

use sqlx::PgConnection;

use inventory_core::asset::Asset;
use inventory_core::types::{AssetId, BulkId};

use crate::models::asset::AssetRow;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `assets` queries. Also the INSERT column order.
const COLUMNS: &str = "\
    id, code, name, specification, quantity, unit, \
    acquisition_date, acquisition_price, useful_life_years, \
    useful_life_months, accumulated_depreciation, residual_value, \
    description, location_id, category_id, procurement_source, status, \
    bulk_id, bulk_sequence, is_bulk_parent, bulk_total_count, \
    created_at, updated_at";

/// Number of entries in [`COLUMNS`].
const COLUMN_COUNT: usize = 23;

/// Rows per multi-row INSERT, keeping bind parameters under PostgreSQL's
/// 65535 limit.
const INSERT_CHUNK: usize = 1000;

/// Key for the transaction-scoped advisory lock serializing code allocation.
const CODE_ALLOCATION_LOCK: i64 = 0x6173_7365_745f_636f;

/// Build `($1, ..., $n), ($n+1, ...)` for `rows` rows.
fn values_placeholders(rows: usize) -> String {
    (0..rows)
        .map(|r| {
            let params: Vec<String> = (1..=COLUMN_COUNT)
                .map(|c| format!("${}", r * COLUMN_COUNT + c))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

type AssetQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

/// Bind every column of `asset`, in [`COLUMNS`] order.
fn bind_asset<'q>(query: AssetQuery<'q>, asset: &'q Asset) -> AssetQuery<'q> {
    let f = &asset.fields;
    let bulk = asset.bulk;
    query
        .bind(asset.id)
        .bind(&asset.code)
        .bind(&f.name)
        .bind(f.specification.as_deref())
        .bind(f.quantity)
        .bind(&f.unit)
        .bind(f.acquisition_date)
        .bind(f.acquisition_price)
        .bind(f.useful_life_years)
        .bind(asset.useful_life_months)
        .bind(asset.accumulated_depreciation)
        .bind(asset.residual_value)
        .bind(f.description.as_deref())
        .bind(f.location_id)
        .bind(f.category_id)
        .bind(f.procurement_source.as_str())
        .bind(f.status.as_str())
        .bind(bulk.map(|b| b.bulk_id))
        .bind(bulk.map(|b| b.bulk_sequence))
        .bind(asset.is_bulk_parent())
        .bind(bulk.map(|b| b.bulk_total_count))
        .bind(asset.created_at)
        .bind(asset.updated_at)
}

// ---------------------------------------------------------------------------
// AssetRepo
// ---------------------------------------------------------------------------

/// Provides transactional CRUD operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Block until this transaction holds the code allocation lock. Released
    /// automatically at commit or rollback.
    pub async fn lock_code_allocation(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CODE_ALLOCATION_LOCK)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn list_codes(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT code FROM assets")
            .fetch_all(conn)
            .await
    }

    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets ORDER BY code");
        sqlx::query_as::<_, AssetRow>(&query).fetch_all(conn).await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: AssetId,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Members of a bulk group, ordered by `bulk_sequence`.
    pub async fn list_by_bulk_id(
        conn: &mut PgConnection,
        bulk_id: BulkId,
    ) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assets WHERE bulk_id = $1 ORDER BY bulk_sequence");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(bulk_id)
            .fetch_all(conn)
            .await
    }

    pub async fn create(conn: &mut PgConnection, asset: &Asset) -> Result<(), sqlx::Error> {
        Self::create_batch(conn, std::slice::from_ref(asset)).await
    }

    /// Insert several rows with multi-row INSERT statements.
    pub async fn create_batch(
        conn: &mut PgConnection,
        assets: &[Asset],
    ) -> Result<(), sqlx::Error> {
        for chunk in assets.chunks(INSERT_CHUNK) {
            let query = format!(
                "INSERT INTO assets ({COLUMNS}) VALUES {}",
                values_placeholders(chunk.len())
            );
            let mut q = sqlx::query(&query);
            for asset in chunk {
                q = bind_asset(q, asset);
            }
            q.execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Overwrite every column except `id` and `created_at`. Returns `true`
    /// if the row existed.
    pub async fn update(conn: &mut PgConnection, asset: &Asset) -> Result<bool, sqlx::Error> {
        let f = &asset.fields;
        let bulk = asset.bulk;
        let result = sqlx::query(
            "UPDATE assets SET \
                code = $2, name = $3, specification = $4, quantity = $5, unit = $6, \
                acquisition_date = $7, acquisition_price = $8, useful_life_years = $9, \
                useful_life_months = $10, accumulated_depreciation = $11, residual_value = $12, \
                description = $13, location_id = $14, category_id = $15, \
                procurement_source = $16, status = $17, \
                bulk_id = $18, bulk_sequence = $19, is_bulk_parent = $20, bulk_total_count = $21, \
                updated_at = $22 \
             WHERE id = $1",
        )
        .bind(asset.id)
        .bind(&asset.code)
        .bind(&f.name)
        .bind(f.specification.as_deref())
        .bind(f.quantity)
        .bind(&f.unit)
        .bind(f.acquisition_date)
        .bind(f.acquisition_price)
        .bind(f.useful_life_years)
        .bind(asset.useful_life_months)
        .bind(asset.accumulated_depreciation)
        .bind(asset.residual_value)
        .bind(f.description.as_deref())
        .bind(f.location_id)
        .bind(f.category_id)
        .bind(f.procurement_source.as_str())
        .bind(f.status.as_str())
        .bind(bulk.map(|b| b.bulk_id))
        .bind(bulk.map(|b| b.bulk_sequence))
        .bind(asset.is_bulk_parent())
        .bind(bulk.map(|b| b.bulk_total_count))
        .bind(asset.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update several rows. Returns how many existed.
    pub async fn update_batch(
        conn: &mut PgConnection,
        assets: &[Asset],
    ) -> Result<u64, sqlx::Error> {
        let mut updated = 0;
        for asset in assets {
            if Self::update(&mut *conn, asset).await? {
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Delete a row. Returns `true` if it existed.
    pub async fn delete(conn: &mut PgConnection, id: AssetId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every member of a bulk group. Returns the number of rows deleted.
    pub async fn delete_by_bulk_id(
        conn: &mut PgConnection,
        bulk_id: BulkId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE bulk_id = $1")
            .bind(bulk_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
