// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `spycats serve` - run the HTTP API
//!
//! Wires the configured store and breed registry into the services and
//! serves the router until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use spycats_core::application::repository_factory::{create_breed_registry, create_mission_store};
use spycats_core::application::{StandardAssignmentEngine, StandardCatService};
use spycats_core::domain::repository::StorageBackend;
use spycats_core::domain::service_config::ServiceConfigManifest;
use spycats_core::infrastructure::db::Database;
use spycats_core::presentation::app;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// HTTP API port (overrides spec.server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// HTTP API bind address (overrides spec.server.bind_address)
    #[arg(long)]
    pub host: Option<String>,

    /// Do not apply database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = ServiceConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.spec.server.port = port;
    }
    if let Some(host) = args.host {
        config.spec.server.bind_address = host;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    info!("Starting Spy Cat Agency service '{}'", config.metadata.name);

    let backend = config.storage_backend();
    let database = match &backend {
        StorageBackend::PostgreSQL(postgres) => {
            let database = Database::new(&postgres.connection_string, postgres.max_connections).await?;
            if args.no_migrate {
                info!("Skipping database migrations (--no-migrate)");
            } else {
                database.run_migrations().await?;
            }
            Some(database)
        }
        StorageBackend::InMemory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            None
        }
    };

    let store = create_mission_store(&backend, database.as_ref())?;
    let breeds = create_breed_registry(&config.spec.breeds)?;
    info!("Breed registry provider: {:?}", config.spec.breeds.provider);

    let router = app(
        Arc::new(StandardCatService::new(store.clone(), breeds)),
        Arc::new(StandardAssignmentEngine::new(store)),
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on {}", addr);
    println!("{}", format!("✓ Spy Cat Agency API listening on http://{}", addr).green());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
