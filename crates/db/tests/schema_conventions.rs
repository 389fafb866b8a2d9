//! Checks the migrated schema against the conventions every table follows.

use std::collections::BTreeMap;

use sqlx::PgPool;

const TABLES: [&str; 4] = ["asset_categories", "assets", "audit_logs", "locations"];

async fn public_tables(pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT table_name::text
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name <> '_sqlx_migrations'
         ORDER BY 1",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_every_table_is_timestamped(pool: PgPool) {
    assert_eq!(public_tables(&pool).await, TABLES);

    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name::text, column_name::text, data_type::text
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND column_name IN ('created_at', 'updated_at')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let mut by_table: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for (table, column, data_type) in rows {
        by_table.entry(table).or_default().push((column, data_type));
    }

    for table in TABLES {
        let columns = by_table.get(table).cloned().unwrap_or_default();
        assert_eq!(columns.len(), 2, "{table} timestamps: {columns:?}");
        for (column, data_type) in columns {
            assert_eq!(data_type, "timestamp with time zone", "{table}.{column}");
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_strings_are_text(pool: PgPool) {
    let bounded: Vec<String> = sqlx::query_scalar(
        "SELECT table_name || '.' || column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND table_name <> '_sqlx_migrations'
           AND data_type IN ('character varying', 'character')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(bounded.is_empty(), "bounded string columns: {bounded:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_keys_are_indexed(pool: PgPool) {
    let fk_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM pg_constraint
         WHERE contype = 'f' AND connamespace = 'public'::regnamespace",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(fk_count, 2);

    // An index only serves a foreign key when the key column leads it.
    let unindexed: Vec<String> = sqlx::query_scalar(
        "SELECT c.conrelid::regclass::text || '.' || a.attname::text
         FROM pg_constraint c
         JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = c.conkey[1]
         WHERE c.contype = 'f'
           AND c.connamespace = 'public'::regnamespace
           AND NOT EXISTS (
               SELECT 1 FROM pg_index i
               WHERE i.indrelid = c.conrelid AND i.indkey[0] = c.conkey[1]
           )",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(unindexed.is_empty(), "unindexed foreign keys: {unindexed:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_keys_declare_a_rule(pool: PgPool) {
    let implicit: Vec<String> = sqlx::query_scalar(
        "SELECT conname::text
         FROM pg_constraint
         WHERE contype = 'f'
           AND connamespace = 'public'::regnamespace
           AND confdeltype = 'a'
           AND confupdtype = 'a'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(implicit.is_empty(), "foreign keys left at NO ACTION: {implicit:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_are_named(pool: PgPool) {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT conname::text
         FROM pg_constraint
         WHERE contype = 'u' AND conrelid = 'assets'::regclass
         ORDER BY 1",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(names, ["uq_assets_bulk_sequence", "uq_assets_code"]);
}
