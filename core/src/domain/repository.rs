// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Store Interfaces
//!
//! Persistence contract for the Cat and Mission aggregates. Unlike a plain
//! per-aggregate repository, every access goes through a
//! [`StoreTransaction`]: the assignment rules span two aggregates (a cat and
//! its open mission) and must be checked and written atomically.
//!
//! | Trait | Implementations |
//! |-------|----------------|
//! | `MissionStore` | `InMemoryMissionStore`, `PostgresMissionStore` |
//!
//! ## Transaction semantics
//!
//! - `lock_*` methods return the live row and hold it against concurrent
//!   writers until the transaction ends (`SELECT ... FOR UPDATE` in
//!   PostgreSQL, a store-wide lock in memory).
//! - `find_*` / `list_*` methods only ever return live rows
//!   (`deleted_at IS NULL`); targets come back in creation order.
//! - Dropping a transaction without calling `commit` rolls it back.

use async_trait::async_trait;

use crate::domain::cat::{Cat, CatId};
use crate::domain::mission::{Mission, MissionId, Target, TargetId};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Entry point to the store: hands out transactions
#[async_trait]
pub trait MissionStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, RepositoryError>;
}

/// One unit of work against the store
#[async_trait]
pub trait StoreTransaction: Send {
    // ---- cats ----

    async fn insert_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError>;

    async fn find_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError>;

    /// Live cat, locked for the rest of the transaction
    async fn lock_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError>;

    async fn list_cats(&mut self) -> Result<Vec<Cat>, RepositoryError>;

    /// Persist salary, `updated_at` and `deleted_at`
    async fn update_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError>;

    // ---- missions ----

    /// Insert the mission row and all of its targets
    async fn insert_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError>;

    async fn find_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError>;

    /// Live mission with its live targets, locked for the rest of the transaction
    async fn lock_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError>;

    async fn list_missions(&mut self) -> Result<Vec<Mission>, RepositoryError>;

    /// Persist `cat_id`, `complete`, `updated_at` and `deleted_at` of the
    /// mission row only; targets are written separately
    async fn update_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError>;

    /// Live, incomplete missions referencing the cat, other than `excluding`
    async fn count_open_missions_for_cat(
        &mut self,
        cat_id: CatId,
        excluding: Option<MissionId>,
    ) -> Result<usize, RepositoryError>;

    // ---- targets ----

    async fn insert_target(&mut self, target: &Target) -> Result<(), RepositoryError>;

    async fn find_target(&mut self, id: TargetId) -> Result<Option<Target>, RepositoryError>;

    /// Persist notes, `complete`, `updated_at` and `deleted_at`
    async fn update_target(&mut self, target: &Target) -> Result<(), RepositoryError>;

    /// Every target row the mission ever had, soft-deleted ones included
    async fn count_targets_ever_added(&mut self, mission_id: MissionId) -> Result<usize, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
