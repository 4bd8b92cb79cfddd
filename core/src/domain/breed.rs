// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Breed registry port.
//!
//! Cats are only recruited with a breed the registry knows about. The
//! registry answers a yes/no question; failing to get an answer is a
//! separate error so callers can tell "invalid breed" from "registry down".

use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait BreedRegistry: Send + Sync {
    /// `Ok(false)` means the registry answered and the breed is unknown
    async fn is_valid_breed(&self, name: &str) -> Result<bool, BreedRegistryError>;
}

#[derive(Debug, Error)]
pub enum BreedRegistryError {
    #[error("Breed registry unreachable: {0}")]
    Unreachable(String),

    #[error("Breed registry returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Malformed breed registry response: {0}")]
    MalformedResponse(String),
}
