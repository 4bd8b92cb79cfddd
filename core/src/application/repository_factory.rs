// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete store and breed registry implementations from the
//! service configuration. Infrastructure types stay out of the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wire configured backends to their domain ports

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::breed::BreedRegistry;
use crate::domain::repository::{MissionStore, StorageBackend};
use crate::domain::service_config::{BreedProviderKind, BreedRegistryConfig};
use crate::infrastructure::breed_registry::{StaticBreedRegistry, TheCatApiBreedRegistry};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_mission::PostgresMissionStore;
use crate::infrastructure::repositories::InMemoryMissionStore;

/// Creates a MissionStore implementation based on the configured backend.
///
/// The PostgreSQL backend needs a connected [`Database`].
pub fn create_mission_store(
    backend: &StorageBackend,
    database: Option<&Database>,
) -> anyhow::Result<Arc<dyn MissionStore>> {
    match backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryMissionStore::new())),
        StorageBackend::PostgreSQL(_) => {
            let database = database
                .context("PostgreSQL storage backend selected but no database connection is available")?;
            Ok(Arc::new(PostgresMissionStore::new(database.get_pool().clone())))
        }
    }
}

/// Creates a BreedRegistry implementation based on the configured provider
pub fn create_breed_registry(config: &BreedRegistryConfig) -> anyhow::Result<Arc<dyn BreedRegistry>> {
    match config.provider {
        BreedProviderKind::TheCatApi => {
            let registry = TheCatApiBreedRegistry::new(
                config.endpoint.clone(),
                config.resolved_api_key(),
                Duration::from_secs(config.timeout_secs),
            )
            .context("Failed to build TheCatAPI client")?;
            Ok(Arc::new(registry))
        }
        BreedProviderKind::Static => Ok(Arc::new(StaticBreedRegistry::new(config.allowed.clone()))),
    }
}
