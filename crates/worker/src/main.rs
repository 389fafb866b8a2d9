//! Maintenance worker: applies migrations, refreshes stored depreciation
//! and prunes audit entries past the retention window. Intended to run
//! once per invocation from a scheduler.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_core::audit::retention_cutoff;
use inventory_core::lifecycle::AssetLifecycle;
use inventory_db::config::DbConfig;
use inventory_db::repositories::AuditLogRepo;
use inventory_db::stores::{PgAssetStore, PgAuditRecorder, PgCategoryStore, PgLocationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_worker=debug,inventory_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DbConfig::from_env().context("Invalid configuration")?;

    let pool = inventory_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    inventory_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    inventory_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let lifecycle = AssetLifecycle::new(
        Arc::new(PgAssetStore::new(pool.clone())),
        Arc::new(PgCategoryStore::new(pool.clone())),
        Arc::new(PgLocationStore::new(pool.clone())),
        Arc::new(PgAuditRecorder::new(pool.clone())),
    );

    let refreshed = lifecycle
        .refresh_depreciation()
        .await
        .context("Depreciation refresh failed")?;
    tracing::info!(refreshed, "Depreciation refresh complete");

    let cutoff = retention_cutoff(chrono::Utc::now(), config.audit_retention_days);
    let pruned = AuditLogRepo::delete_older_than(&pool, cutoff)
        .await
        .context("Audit retention cleanup failed")?;
    tracing::info!(
        pruned,
        retention_days = config.audit_retention_days,
        %cutoff,
        "Audit retention cleanup complete"
    );

    pool.close().await;
    Ok(())
}
