// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Assignment & Completion Engine
//!
//! Application service for missions and targets. Each operation opens one
//! store transaction, locks what it is about to check, applies the mission
//! aggregate's rules and commits. Any error drops the transaction, which
//! rolls it back.
//!
//! Lock order is always mission before cat, so two operations can never wait
//! on each other's rows.
//!
//! The engine keeps no state of its own and does not log; callers decide
//! what to report.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Cat assignment exclusivity, target cap, completion cascade

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::error::EngineError;
use crate::domain::cat::CatId;
use crate::domain::mission::{Mission, MissionId, NewMission, Target, TargetId, TargetSpec};
use crate::domain::repository::{MissionStore, StoreTransaction};

#[async_trait]
pub trait AssignmentEngine: Send + Sync {
    async fn create_mission(&self, request: NewMission) -> Result<Mission, EngineError>;

    async fn assign_cat(&self, mission_id: MissionId, cat_id: CatId) -> Result<Mission, EngineError>;

    async fn add_target(&self, mission_id: MissionId, spec: TargetSpec) -> Result<Target, EngineError>;

    /// Completing the last open target completes the owning mission
    async fn update_target_status(&self, target_id: TargetId, complete: bool) -> Result<Target, EngineError>;

    async fn update_target_notes(&self, target_id: TargetId, notes: String) -> Result<Target, EngineError>;

    async fn complete_mission(&self, mission_id: MissionId) -> Result<Mission, EngineError>;

    async fn delete_mission(&self, mission_id: MissionId) -> Result<(), EngineError>;

    async fn delete_target(&self, target_id: TargetId) -> Result<(), EngineError>;

    async fn get_mission(&self, mission_id: MissionId) -> Result<Mission, EngineError>;

    async fn list_missions(&self) -> Result<Vec<Mission>, EngineError>;

    async fn get_target(&self, target_id: TargetId) -> Result<Target, EngineError>;
}

pub struct StandardAssignmentEngine {
    store: Arc<dyn MissionStore>,
}

impl StandardAssignmentEngine {
    pub fn new(store: Arc<dyn MissionStore>) -> Self {
        Self { store }
    }

    async fn lock_mission(
        tx: &mut Box<dyn StoreTransaction>,
        mission_id: MissionId,
    ) -> Result<Mission, EngineError> {
        tx.lock_mission(mission_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Mission", mission_id))
    }

    async fn lock_cat(tx: &mut Box<dyn StoreTransaction>, cat_id: CatId) -> Result<(), EngineError> {
        tx.lock_cat(cat_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Cat", cat_id))?;
        Ok(())
    }

    /// Lock the mission owning a live target
    async fn lock_owning_mission(
        tx: &mut Box<dyn StoreTransaction>,
        target_id: TargetId,
    ) -> Result<Mission, EngineError> {
        let target = tx
            .find_target(target_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Target", target_id))?;

        // A target of a deleted mission is gone along with it
        tx.lock_mission(target.mission_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Target", target_id))
    }

    async fn ensure_cat_is_free(
        tx: &mut Box<dyn StoreTransaction>,
        cat_id: CatId,
        excluding: Option<MissionId>,
    ) -> Result<(), EngineError> {
        if tx.count_open_missions_for_cat(cat_id, excluding).await? > 0 {
            return Err(EngineError::Conflict(format!(
                "Cat {} already has an incomplete mission",
                cat_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentEngine for StandardAssignmentEngine {
    async fn create_mission(&self, request: NewMission) -> Result<Mission, EngineError> {
        let mission = Mission::create(request)?;

        let mut tx = self.store.begin().await?;
        if let Some(cat_id) = mission.cat_id {
            Self::lock_cat(&mut tx, cat_id).await?;
            Self::ensure_cat_is_free(&mut tx, cat_id, None).await?;
        }
        tx.insert_mission(&mission).await?;
        tx.commit().await?;

        Ok(mission)
    }

    async fn assign_cat(&self, mission_id: MissionId, cat_id: CatId) -> Result<Mission, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_mission(&mut tx, mission_id).await?;
        Self::lock_cat(&mut tx, cat_id).await?;
        mission.ensure_open()?;

        if mission.is_assigned_to(cat_id) {
            return Ok(mission);
        }

        Self::ensure_cat_is_free(&mut tx, cat_id, Some(mission_id)).await?;
        mission.assign_cat(cat_id)?;
        tx.update_mission(&mission).await?;
        tx.commit().await?;

        Ok(mission)
    }

    async fn add_target(&self, mission_id: MissionId, spec: TargetSpec) -> Result<Target, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_mission(&mut tx, mission_id).await?;
        let ever_added = tx.count_targets_ever_added(mission_id).await?;

        let target = mission.add_target(spec, ever_added)?.clone();
        tx.insert_target(&target).await?;
        tx.update_mission(&mission).await?;
        tx.commit().await?;

        Ok(target)
    }

    async fn update_target_status(&self, target_id: TargetId, complete: bool) -> Result<Target, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_owning_mission(&mut tx, target_id).await?;

        let change = mission.update_target_status(target_id, complete)?;
        let target = mission.target(target_id)?.clone();
        tx.update_target(&target).await?;
        if change.mission_completed {
            tx.update_mission(&mission).await?;
        }
        tx.commit().await?;

        Ok(target)
    }

    async fn update_target_notes(&self, target_id: TargetId, notes: String) -> Result<Target, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_owning_mission(&mut tx, target_id).await?;

        let target = mission.update_target_notes(target_id, notes)?.clone();
        tx.update_target(&target).await?;
        tx.commit().await?;

        Ok(target)
    }

    async fn complete_mission(&self, mission_id: MissionId) -> Result<Mission, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_mission(&mut tx, mission_id).await?;

        mission.mark_complete()?;
        tx.update_mission(&mission).await?;
        tx.commit().await?;

        Ok(mission)
    }

    async fn delete_mission(&self, mission_id: MissionId) -> Result<(), EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_mission(&mut tx, mission_id).await?;

        mission.mark_deleted()?;
        tx.update_mission(&mission).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn delete_target(&self, target_id: TargetId) -> Result<(), EngineError> {
        let mut tx = self.store.begin().await?;
        let mut mission = Self::lock_owning_mission(&mut tx, target_id).await?;

        let deleted = mission.delete_target(target_id)?;
        tx.update_target(&deleted).await?;
        tx.update_mission(&mission).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn get_mission(&self, mission_id: MissionId) -> Result<Mission, EngineError> {
        let mut tx = self.store.begin().await?;
        let mission = tx
            .find_mission(mission_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Mission", mission_id))?;
        tx.commit().await?;
        Ok(mission)
    }

    async fn list_missions(&self) -> Result<Vec<Mission>, EngineError> {
        let mut tx = self.store.begin().await?;
        let missions = tx.list_missions().await?;
        tx.commit().await?;
        Ok(missions)
    }

    async fn get_target(&self, target_id: TargetId) -> Result<Target, EngineError> {
        let mut tx = self.store.begin().await?;
        let target = tx
            .find_target(target_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Target", target_id))?;

        // Hide targets whose mission has been deleted
        if tx.find_mission(target.mission_id).await?.is_none() {
            return Err(EngineError::not_found("Target", target_id));
        }
        tx.commit().await?;
        Ok(target)
    }
}
