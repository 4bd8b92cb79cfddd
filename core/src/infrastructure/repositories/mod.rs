// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Store Implementations
//!
//! Infrastructure implementations of the [`MissionStore`] abstraction defined
//! in the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve cats, missions and targets
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **PostgresMissionStore** - row locks via `SELECT ... FOR UPDATE`
//! - **InMemoryMissionStore** - one store-wide async lock per transaction,
//!   for development and tests
//!
//! # Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), spycats_core::domain::repository::RepositoryError> {
//! use spycats_core::domain::repository::MissionStore;
//! use spycats_core::infrastructure::repositories::InMemoryMissionStore;
//!
//! let store = InMemoryMissionStore::new();
//! let mut tx = store.begin().await?;
//! let cats = tx.list_cats().await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod postgres_mission;

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::cat::{Cat, CatId};
use crate::domain::mission::{Mission, MissionId, Target, TargetId};
use crate::domain::repository::{MissionStore, RepositoryError, StoreTransaction};

/// A stored value plus its insertion sequence number
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    cats: HashMap<CatId, Row<Cat>>,
    /// Mission rows; `targets` is always empty here
    missions: HashMap<MissionId, Row<Mission>>,
    targets: HashMap<TargetId, Row<Target>>,
    next_seq: u64,
}

impl StoreState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn live_cat(&self, id: CatId) -> Option<Cat> {
        self.cats
            .get(&id)
            .map(|row| &row.value)
            .filter(|cat| !cat.is_deleted())
            .cloned()
    }

    fn live_targets(&self, mission_id: MissionId) -> Vec<Target> {
        let mut rows: Vec<&Row<Target>> = self
            .targets
            .values()
            .filter(|row| row.value.mission_id == mission_id && !row.value.is_deleted())
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.value.clone()).collect()
    }

    fn live_mission(&self, id: MissionId) -> Option<Mission> {
        let row = self.missions.get(&id).filter(|row| !row.value.is_deleted())?;
        let mut mission = row.value.clone();
        mission.targets = self.live_targets(id);
        Some(mission)
    }
}

fn in_insertion_order<K, T: Clone>(rows: &HashMap<K, Row<T>>, live: impl Fn(&T) -> bool) -> Vec<(K, T)>
where
    K: Copy + Eq + Hash,
{
    let mut rows: Vec<(&K, &Row<T>)> = rows.iter().filter(|(_, row)| live(&row.value)).collect();
    rows.sort_by_key(|(_, row)| row.seq);
    rows.into_iter().map(|(k, row)| (*k, row.value.clone())).collect()
}

/// Store kept in process memory.
///
/// A transaction holds the store-wide lock from `begin` until it is committed
/// or dropped, and works on a private copy of the state. Commit publishes the
/// copy; dropping discards it. Transactions are therefore serializable.
#[derive(Clone, Default)]
pub struct InMemoryMissionStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryMissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MissionStore for InMemoryMissionStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, RepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryStoreTransaction { guard, working }))
    }
}

pub struct InMemoryStoreTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

#[async_trait]
impl StoreTransaction for InMemoryStoreTransaction {
    async fn insert_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError> {
        let seq = self.working.next_seq();
        self.working.cats.insert(
            cat.id,
            Row {
                seq,
                value: cat.clone(),
            },
        );
        Ok(())
    }

    async fn find_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError> {
        Ok(self.working.live_cat(id))
    }

    async fn lock_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError> {
        // The whole store is already locked
        Ok(self.working.live_cat(id))
    }

    async fn list_cats(&mut self) -> Result<Vec<Cat>, RepositoryError> {
        Ok(in_insertion_order(&self.working.cats, |cat| !cat.is_deleted())
            .into_iter()
            .map(|(_, cat)| cat)
            .collect())
    }

    async fn update_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError> {
        let row = self
            .working
            .cats
            .get_mut(&cat.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Cat {}", cat.id)))?;
        row.value.salary = cat.salary;
        row.value.updated_at = cat.updated_at;
        row.value.deleted_at = cat.deleted_at;
        Ok(())
    }

    async fn insert_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError> {
        let seq = self.working.next_seq();
        let mut row = mission.clone();
        let targets = std::mem::take(&mut row.targets);
        self.working.missions.insert(mission.id, Row { seq, value: row });

        for target in targets {
            let seq = self.working.next_seq();
            self.working.targets.insert(target.id, Row { seq, value: target });
        }
        Ok(())
    }

    async fn find_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        Ok(self.working.live_mission(id))
    }

    async fn lock_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        Ok(self.working.live_mission(id))
    }

    async fn list_missions(&mut self) -> Result<Vec<Mission>, RepositoryError> {
        let ids = in_insertion_order(&self.working.missions, |mission| !mission.is_deleted());
        Ok(ids
            .into_iter()
            .filter_map(|(id, _)| self.working.live_mission(id))
            .collect())
    }

    async fn update_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError> {
        let row = self
            .working
            .missions
            .get_mut(&mission.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Mission {}", mission.id)))?;
        row.value.cat_id = mission.cat_id;
        row.value.complete = mission.complete;
        row.value.updated_at = mission.updated_at;
        row.value.deleted_at = mission.deleted_at;
        Ok(())
    }

    async fn count_open_missions_for_cat(
        &mut self,
        cat_id: CatId,
        excluding: Option<MissionId>,
    ) -> Result<usize, RepositoryError> {
        Ok(self
            .working
            .missions
            .values()
            .map(|row| &row.value)
            .filter(|m| !m.is_deleted() && !m.complete && m.is_assigned_to(cat_id))
            .filter(|m| Some(m.id) != excluding)
            .count())
    }

    async fn insert_target(&mut self, target: &Target) -> Result<(), RepositoryError> {
        if !self.working.missions.contains_key(&target.mission_id) {
            return Err(RepositoryError::NotFound(format!("Mission {}", target.mission_id)));
        }
        let seq = self.working.next_seq();
        self.working.targets.insert(
            target.id,
            Row {
                seq,
                value: target.clone(),
            },
        );
        Ok(())
    }

    async fn find_target(&mut self, id: TargetId) -> Result<Option<Target>, RepositoryError> {
        Ok(self
            .working
            .targets
            .get(&id)
            .map(|row| &row.value)
            .filter(|t| !t.is_deleted())
            .cloned())
    }

    async fn update_target(&mut self, target: &Target) -> Result<(), RepositoryError> {
        let row = self
            .working
            .targets
            .get_mut(&target.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Target {}", target.id)))?;
        row.value.notes = target.notes.clone();
        row.value.complete = target.complete;
        row.value.updated_at = target.updated_at;
        row.value.deleted_at = target.deleted_at;
        Ok(())
    }

    async fn count_targets_ever_added(&mut self, mission_id: MissionId) -> Result<usize, RepositoryError> {
        Ok(self
            .working
            .targets
            .values()
            .filter(|row| row.value.mission_id == mission_id)
            .count())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let InMemoryStoreTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
