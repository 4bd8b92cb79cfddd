// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `spycats migrate` - apply PostgreSQL schema migrations

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use spycats_core::domain::repository::StorageBackend;
use spycats_core::domain::service_config::ServiceConfigManifest;
use spycats_core::infrastructure::db::Database;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = ServiceConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let StorageBackend::PostgreSQL(postgres) = config.storage_backend() else {
        anyhow::bail!(
            "Migrations need the postgres storage backend (set spec.storage.backend or DATABASE_URL)"
        );
    };

    info!("Running migrations");
    let database = Database::new(&postgres.connection_string, postgres.max_connections).await?;
    database.run_migrations().await?;

    println!("{}", "✓ Database schema is up to date".green());
    Ok(())
}
