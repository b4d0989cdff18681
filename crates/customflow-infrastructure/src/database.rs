//! PostgreSQL connection pool and startup checks.

use customflow_core::config::DatabaseConfig;
use customflow_core::error::{CustomFlowError, Result};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

/// Idempotent schema script.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Tables that must exist before the server accepts requests.
pub const REQUIRED_TABLES: &[&str] = &["users", "orders", "order_images", "ai_responses"];

/// Opens a connection pool and checks it with one round trip.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(|e| {
            CustomFlowError::storage(format!(
                "Failed to connect to {}:{}/{}: {}",
                config.host, config.port, config.name, e
            ))
        })?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

/// Runs the bundled schema script.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(|e| db_error("apply schema", e))?;
    tracing::info!("Database schema applied");
    Ok(())
}

/// Fails with a configuration error naming every missing table.
pub async fn verify_required_tables(pool: &PgPool) -> Result<()> {
    let wanted: Vec<String> = REQUIRED_TABLES.iter().map(|t| t.to_string()).collect();
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ANY($1)",
    )
    .bind(&wanted)
    .fetch_all(pool)
    .await
    .map_err(|e| db_error("verify tables", e))?;

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !present.iter().any(|p| p == t))
        .collect();
    if !missing.is_empty() {
        return Err(CustomFlowError::config(format!(
            "Missing required tables: {}",
            missing.join(", ")
        )));
    }
    tracing::info!(tables = ?REQUIRED_TABLES, "All required tables present");
    Ok(())
}

/// Maps a driver error to the shared taxonomy.
pub(crate) fn db_error(operation: &str, err: sqlx::Error) -> CustomFlowError {
    if is_unique_violation(&err) {
        return CustomFlowError::conflict(format!("Duplicate key during {operation}"));
    }
    CustomFlowError::storage(format!("{operation} failed: {err}"))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
