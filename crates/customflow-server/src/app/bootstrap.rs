use std::sync::Arc;

use anyhow::{Context, Result};
use customflow_core::ai::AiAuditRepository;
use customflow_core::auth::StaticAuthenticator;
use customflow_core::config::{ServerConfig, StorageBackend};
use customflow_core::order::OrderRepository;
use customflow_infrastructure::{
    FsImageStore, InMemoryAuditRepository, InMemoryOrderRepository, PgAuditRepository,
    PgOrderRepository, database,
};
use customflow_interaction::OpenAiGateway;

use crate::app::AppState;

/// Builds the application state from configuration.
///
/// Fails when the upload root cannot be created, the database is unreachable
/// or a required table is missing.
pub async fn bootstrap(config: &ServerConfig) -> Result<AppState> {
    let images = FsImageStore::new(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to prepare upload directory {}", config.upload_dir.display()))?;
    tracing::info!(upload_dir = %config.upload_dir.display(), "[Bootstrap] Upload store ready");

    let (orders, audit): (Arc<dyn OrderRepository>, Arc<dyn AiAuditRepository>) =
        match config.storage {
            StorageBackend::Postgres => {
                let pool = database::connect(&config.database)
                    .await
                    .context("Failed to connect to database")?;
                if config.database.apply_schema {
                    database::apply_schema(&pool)
                        .await
                        .context("Failed to apply database schema")?;
                }
                database::verify_required_tables(&pool)
                    .await
                    .context("Database is not ready")?;
                (
                    Arc::new(PgOrderRepository::new(pool.clone())),
                    Arc::new(PgAuditRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("[Bootstrap] Using in-memory storage; data is lost on restart");
                (
                    Arc::new(InMemoryOrderRepository::new()),
                    Arc::new(InMemoryAuditRepository::new()),
                )
            }
        };

    let gateway = OpenAiGateway::new(config.ai.clone()).context("Failed to build AI gateway")?;

    Ok(AppState::new(
        orders,
        audit,
        Arc::new(images),
        Arc::new(gateway),
        Arc::new(StaticAuthenticator::default()),
    ))
}
