// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Mission Aggregate
//!
//! A mission is the aggregate root for its targets. All target mutations go
//! through the mission so the completion cascade and the freeze rules are
//! applied in one place:
//!
//! - a mission holds at most [`MAX_TARGETS_PER_MISSION`] targets over its
//!   whole life (soft-deleted targets keep their slot)
//! - a completed target, or any target of a completed mission, is frozen
//! - completing the last open target completes the mission
//! - `complete` never goes back to `false`
//! - an assigned mission cannot be deleted
//!
//! Cross-aggregate rules (one open mission per cat) live in the assignment
//! engine, which checks them under the store's row locks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cat::CatId;

/// Cumulative cap on targets ever added to one mission
pub const MAX_TARGETS_PER_MISSION: usize = 3;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub Uuid);

impl MissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied description of a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub notes: String,
}

impl TargetSpec {
    pub fn validate(&self) -> Result<(), MissionError> {
        if self.name.trim().is_empty() {
            return Err(MissionError::InvalidTarget("Target name cannot be empty".to_string()));
        }
        if self.country.trim().is_empty() {
            return Err(MissionError::InvalidTarget("Target country cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Intent to create a mission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMission {
    #[serde(default)]
    pub cat_id: Option<CatId>,
    /// Must be `false`; a mission cannot start out complete
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

// ============================================================================
// Entity: Target
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub mission_id: MissionId,
    pub name: String,
    pub country: String,
    pub notes: String,
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Target {
    /// New targets always start incomplete
    pub fn new(mission_id: MissionId, spec: TargetSpec) -> Result<Self, MissionError> {
        spec.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: TargetId::new(),
            mission_id,
            name: spec.name.trim().to_string(),
            country: spec.country.trim().to_string(),
            notes: spec.notes,
            complete: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn ensure_open(&self) -> Result<(), MissionError> {
        if self.complete {
            return Err(MissionError::TargetComplete(self.id));
        }
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ============================================================================
// Aggregate Root: Mission
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub cat_id: Option<CatId>,
    pub complete: bool,
    /// Live targets in creation order
    pub targets: Vec<Target>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Outcome of a target status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub target_id: TargetId,
    /// The update closed the last open target and completed the mission
    pub mission_completed: bool,
}

impl Mission {
    /// Create a mission with its initial targets
    pub fn create(request: NewMission) -> Result<Self, MissionError> {
        if request.complete {
            return Err(MissionError::CreatedComplete);
        }
        if request.targets.len() > MAX_TARGETS_PER_MISSION {
            return Err(MissionError::TargetLimitExceeded {
                limit: MAX_TARGETS_PER_MISSION,
            });
        }

        let id = MissionId::new();
        let targets = request
            .targets
            .into_iter()
            .map(|spec| Target::new(id, spec))
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        Ok(Self {
            id,
            cat_id: request.cat_id,
            complete: false,
            targets,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    // ========================================================================
    // Aggregate Commands
    // ========================================================================

    pub fn assign_cat(&mut self, cat_id: CatId) -> Result<(), MissionError> {
        self.ensure_open()?;
        self.cat_id = Some(cat_id);
        self.touch();
        Ok(())
    }

    /// Append a target. `targets_ever_added` counts every target row the
    /// mission has had, deleted ones included.
    pub fn add_target(
        &mut self,
        spec: TargetSpec,
        targets_ever_added: usize,
    ) -> Result<&Target, MissionError> {
        self.ensure_open()?;
        if targets_ever_added.max(self.targets.len()) >= MAX_TARGETS_PER_MISSION {
            return Err(MissionError::TargetLimitExceeded {
                limit: MAX_TARGETS_PER_MISSION,
            });
        }

        let target = Target::new(self.id, spec)?;
        self.targets.push(target);
        self.touch();
        Ok(&self.targets[self.targets.len() - 1])
    }

    pub fn update_target_notes(
        &mut self,
        target_id: TargetId,
        notes: String,
    ) -> Result<&Target, MissionError> {
        self.ensure_open()?;
        let target = self.target_mut(target_id)?;
        target.ensure_open()?;
        target.notes = notes;
        target.updated_at = Utc::now();
        self.target(target_id)
    }

    /// Set a target's status and complete the mission when no live target
    /// remains open
    pub fn update_target_status(
        &mut self,
        target_id: TargetId,
        complete: bool,
    ) -> Result<StatusChange, MissionError> {
        self.ensure_open()?;
        let target = self.target_mut(target_id)?;
        target.ensure_open()?;
        target.complete = complete;
        target.updated_at = Utc::now();

        let mission_completed = complete && self.targets.iter().all(|t| t.complete);
        if mission_completed {
            self.complete = true;
            self.touch();
        }

        Ok(StatusChange {
            target_id,
            mission_completed,
        })
    }

    /// Soft-delete a target and drop it from the live list. The returned
    /// target carries its deletion timestamp for persistence.
    pub fn delete_target(&mut self, target_id: TargetId) -> Result<Target, MissionError> {
        let index = self
            .targets
            .iter()
            .position(|t| t.id == target_id)
            .ok_or(MissionError::TargetNotFound(target_id))?;

        if self.targets[index].complete {
            return Err(MissionError::CompletedTargetDeletion(target_id));
        }

        let mut target = self.targets.remove(index);
        let now = Utc::now();
        target.deleted_at = Some(now);
        target.updated_at = now;
        self.touch();
        Ok(target)
    }

    /// Manual completion; irreversible
    pub fn mark_complete(&mut self) -> Result<(), MissionError> {
        self.ensure_open()?;
        self.complete = true;
        self.touch();
        Ok(())
    }

    pub fn mark_deleted(&mut self) -> Result<(), MissionError> {
        if let Some(cat_id) = self.cat_id {
            return Err(MissionError::MissionAssigned {
                mission_id: self.id,
                cat_id,
            });
        }
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    // ========================================================================
    // Aggregate Queries
    // ========================================================================

    pub fn ensure_open(&self) -> Result<(), MissionError> {
        if self.complete {
            return Err(MissionError::MissionComplete(self.id));
        }
        Ok(())
    }

    pub fn target(&self, target_id: TargetId) -> Result<&Target, MissionError> {
        self.targets
            .iter()
            .find(|t| t.id == target_id)
            .ok_or(MissionError::TargetNotFound(target_id))
    }

    fn target_mut(&mut self, target_id: TargetId) -> Result<&mut Target, MissionError> {
        self.targets
            .iter_mut()
            .find(|t| t.id == target_id)
            .ok_or(MissionError::TargetNotFound(target_id))
    }

    pub fn is_assigned_to(&self, cat_id: CatId) -> bool {
        self.cat_id == Some(cat_id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("Mission cannot be created as completed")]
    CreatedComplete,

    #[error("Mission {0} is complete and can no longer be changed")]
    MissionComplete(MissionId),

    #[error("Target {0} is complete and can no longer be changed")]
    TargetComplete(TargetId),

    #[error("A mission can hold at most {limit} targets")]
    TargetLimitExceeded { limit: usize },

    #[error("Mission {mission_id} is assigned to cat {cat_id} and cannot be deleted")]
    MissionAssigned { mission_id: MissionId, cat_id: CatId },

    #[error("Target {0} is complete and cannot be deleted")]
    CompletedTargetDeletion(TargetId),

    #[error("Target not found: {0}")]
    TargetNotFound(TargetId),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> TargetSpec {
        TargetSpec {
            name: name.to_string(),
            country: "France".to_string(),
            notes: String::new(),
        }
    }

    fn mission_with(targets: usize) -> Mission {
        Mission::create(NewMission {
            cat_id: None,
            complete: false,
            targets: (0..targets).map(|i| spec(&format!("target-{}", i))).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_mission_creation() {
        let mission = mission_with(2);
        assert!(!mission.complete);
        assert!(mission.cat_id.is_none());
        assert_eq!(mission.targets.len(), 2);
        assert!(mission.targets.iter().all(|t| !t.complete && t.mission_id == mission.id));
        assert_eq!(mission.targets[0].name, "target-0");
    }

    #[test]
    fn test_mission_cannot_be_created_complete() {
        let result = Mission::create(NewMission {
            complete: true,
            ..Default::default()
        });
        assert_eq!(result, Err(MissionError::CreatedComplete));
    }

    #[test]
    fn test_mission_creation_respects_target_cap() {
        let result = Mission::create(NewMission {
            targets: (0..4).map(|i| spec(&i.to_string())).collect(),
            ..Default::default()
        });
        assert_eq!(result, Err(MissionError::TargetLimitExceeded { limit: 3 }));
    }

    #[test]
    fn test_target_validation() {
        let result = Mission::create(NewMission {
            targets: vec![TargetSpec {
                name: "Mr. Fluffy".to_string(),
                country: " ".to_string(),
                notes: String::new(),
            }],
            ..Default::default()
        });
        assert!(matches!(result, Err(MissionError::InvalidTarget(_))));
    }

    #[test]
    fn test_add_target_counts_deleted_slots() {
        let mut mission = mission_with(2);
        let first = mission.targets[0].id;
        mission.delete_target(first).unwrap();
        assert_eq!(mission.targets.len(), 1);

        // Two rows were ever inserted, one slot left
        assert!(mission.add_target(spec("third"), 2).is_ok());
        assert_eq!(
            mission.add_target(spec("fourth"), 3).unwrap_err(),
            MissionError::TargetLimitExceeded { limit: 3 }
        );
    }

    #[test]
    fn test_completion_cascade() {
        let mut mission = mission_with(2);
        let (a, b) = (mission.targets[0].id, mission.targets[1].id);

        let change = mission.update_target_status(a, true).unwrap();
        assert!(!change.mission_completed);
        assert!(!mission.complete);

        let change = mission.update_target_status(b, true).unwrap();
        assert!(change.mission_completed);
        assert!(mission.complete);
    }

    #[test]
    fn test_reopen_status_does_not_cascade() {
        let mut mission = mission_with(1);
        let id = mission.targets[0].id;
        let change = mission.update_target_status(id, false).unwrap();
        assert!(!change.mission_completed);
        assert!(!mission.complete);
        assert!(!mission.targets[0].complete);
    }

    #[test]
    fn test_completed_target_is_frozen() {
        let mut mission = mission_with(2);
        let id = mission.targets[0].id;
        mission.update_target_status(id, true).unwrap();

        assert_eq!(
            mission.update_target_notes(id, "late intel".to_string()).unwrap_err(),
            MissionError::TargetComplete(id)
        );
        assert_eq!(
            mission.update_target_status(id, false).unwrap_err(),
            MissionError::TargetComplete(id)
        );
        assert_eq!(
            mission.delete_target(id).unwrap_err(),
            MissionError::CompletedTargetDeletion(id)
        );
    }

    #[test]
    fn test_completed_mission_is_frozen() {
        let mut mission = mission_with(1);
        let target = mission.targets[0].id;
        mission.mark_complete().unwrap();
        let frozen = MissionError::MissionComplete(mission.id);

        assert_eq!(mission.mark_complete().unwrap_err(), frozen);
        assert_eq!(mission.assign_cat(CatId::new()).unwrap_err(), frozen);
        assert_eq!(mission.add_target(spec("late"), 1).unwrap_err(), frozen);
        assert_eq!(mission.update_target_notes(target, "x".to_string()).unwrap_err(), frozen);
        assert_eq!(mission.update_target_status(target, true).unwrap_err(), frozen);
        assert!(mission.complete);
    }

    #[test]
    fn test_assigned_mission_cannot_be_deleted() {
        let mut mission = mission_with(0);
        let cat = CatId::new();
        mission.assign_cat(cat).unwrap();
        assert!(mission.is_assigned_to(cat));
        assert!(matches!(
            mission.mark_deleted(),
            Err(MissionError::MissionAssigned { .. })
        ));
        assert!(!mission.is_deleted());

        let mut unassigned = mission_with(0);
        unassigned.mark_deleted().unwrap();
        assert!(unassigned.is_deleted());
    }

    #[test]
    fn test_unknown_target() {
        let mut mission = mission_with(1);
        let missing = TargetId::new();
        assert_eq!(
            mission.update_target_notes(missing, "x".to_string()).unwrap_err(),
            MissionError::TargetNotFound(missing)
        );
    }
}
