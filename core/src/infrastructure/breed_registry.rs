// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Breed Registry Clients
//!
//! Implementations of the [`BreedRegistry`] port.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Answer "is this a real cat breed?"
//! - **Integration:** TheCatAPI (`GET /breeds/search?name=`) or a static list
//!
//! # Usage
//!
//! ```ignore
//! let registry = TheCatApiBreedRegistry::new(
//!     "https://api.thecatapi.com/v1",
//!     Some(api_key),
//!     Duration::from_secs(5),
//! )?;
//! assert!(registry.is_valid_breed("Siamese").await?);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::breed::{BreedRegistry, BreedRegistryError};

// ============================================================================
// TheCatAPI
// ============================================================================

pub struct TheCatApiBreedRegistry {
    /// Base URL, e.g. "https://api.thecatapi.com/v1"
    base_url: String,

    api_key: Option<String>,

    client: Client,
}

impl TheCatApiBreedRegistry {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BreedRegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BreedRegistryError::Unreachable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl BreedRegistry for TheCatApiBreedRegistry {
    async fn is_valid_breed(&self, name: &str) -> Result<bool, BreedRegistryError> {
        let url = format!("{}/breeds/search", self.base_url);
        let mut request = self.client.get(&url).query(&[("name", name)]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Breed registry request failed: {}", e);
            BreedRegistryError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Breed registry returned HTTP {} for '{}'", status, name);
            return Err(BreedRegistryError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let breeds: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| BreedRegistryError::MalformedResponse(e.to_string()))?;

        debug!("Breed registry matched {} breeds for '{}'", breeds.len(), name);
        Ok(!breeds.is_empty())
    }
}

// ============================================================================
// Static allow list
// ============================================================================

/// Fixed, case-insensitive list of accepted breeds
pub struct StaticBreedRegistry {
    allowed: HashSet<String>,
}

impl StaticBreedRegistry {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|breed| breed.trim().to_lowercase())
                .collect(),
        }
    }
}

#[async_trait]
impl BreedRegistry for StaticBreedRegistry {
    async fn is_valid_breed(&self, name: &str) -> Result<bool, BreedRegistryError> {
        Ok(self.allowed.contains(&name.trim().to_lowercase()))
    }
}
