pub mod schema;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

pub use schema::CURRENT_SCHEMA;

#[instrument]
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, AppError> {
    info!("Connecting to SQLite database");
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Each connection to an in-memory database sees its own empty database
    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

/// Runs the fixed DDL script. Every statement is idempotent.
#[instrument(skip(pool))]
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Applying database schema");
    sqlx::raw_sql(CURRENT_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to apply schema: {}", e)))?;
    Ok(())
}
