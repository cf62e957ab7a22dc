//! Import command - Loads orders from a CSV file outside of the HTTP API.

use std::sync::Arc;

use crate::cli::args::ImportOrdersArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Execute the import-orders command
pub async fn execute(args: ImportOrdersArgs, config: Config) -> AppResult<()> {
    let data = tokio::fs::read(&args.path).await.map_err(|e| {
        AppError::BadRequest(format!("Cannot read {}: {}", args.path.display(), e))
    })?;

    let db = Database::connect(&config).await?;
    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let services = Services::from_connection(db.get_connection(), Arc::new(cache), config);

    tracing::info!(path = %args.path.display(), encoding = %args.encoding, "Importing orders");
    let report = services.orders().import_orders(data, args.encoding).await?;

    println!("Imported {} orders", report.created);
    Ok(())
}
