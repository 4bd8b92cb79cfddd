// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Mission Store
//!
//! PostgreSQL implementation of [`MissionStore`]. Each store transaction
//! wraps one `sqlx` transaction; `lock_*` reads use `SELECT ... FOR UPDATE`
//! so invariant checks and the writes that follow them see the same rows.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Persist cats, missions and targets in PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::cat::{Cat, CatId};
use crate::domain::mission::{Mission, MissionId, Target, TargetId};
use crate::domain::repository::{MissionStore, RepositoryError, StoreTransaction};

const CAT_COLUMNS: &str = "id, name, experience_years, breed, salary, created_at, updated_at, deleted_at";
const MISSION_COLUMNS: &str = "id, cat_id, complete, created_at, updated_at, deleted_at";
const TARGET_COLUMNS: &str =
    "id, mission_id, name, country, notes, complete, created_at, updated_at, deleted_at";

pub struct PostgresMissionStore {
    pool: PgPool,
}

impl PostgresMissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MissionStore for PostgresMissionStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, RepositoryError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to begin transaction: {}", e)))?;
        Ok(Box::new(PostgresStoreTransaction { tx }))
    }
}

/// Rolled back by `sqlx` when dropped uncommitted
pub struct PostgresStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresStoreTransaction {
    async fn fetch_cat(&mut self, id: CatId, for_update: bool) -> Result<Option<Cat>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM cats WHERE id = $1 AND deleted_at IS NULL{}",
            CAT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query(&query)
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(parse_cat_row).transpose()
    }

    async fn fetch_mission(
        &mut self,
        id: MissionId,
        for_update: bool,
    ) -> Result<Option<Mission>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM missions WHERE id = $1 AND deleted_at IS NULL{}",
            MISSION_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query(&query)
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut mission = parse_mission_row(row)?;
        mission.targets = self.fetch_live_targets(&[mission.id.0]).await?;
        Ok(Some(mission))
    }

    /// Live targets of the given missions in creation order
    async fn fetch_live_targets(&mut self, mission_ids: &[Uuid]) -> Result<Vec<Target>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM targets WHERE mission_id = ANY($1) AND deleted_at IS NULL ORDER BY seq",
            TARGET_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(mission_ids)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.into_iter().map(parse_target_row).collect()
    }

    async fn insert_target_row(&mut self, target: &Target) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO targets (
                id, mission_id, name, country, notes, complete,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(target.id.0)
        .bind(target.mission_id.0)
        .bind(&target.name)
        .bind(&target.country)
        .bind(&target.notes)
        .bind(target.complete)
        .bind(target.created_at)
        .bind(target.updated_at)
        .bind(target.deleted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert target: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PostgresStoreTransaction {
    async fn insert_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO cats (
                id, name, experience_years, breed, salary,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(cat.id.0)
        .bind(&cat.name)
        .bind(i32::try_from(cat.experience_years).map_err(|_| {
            RepositoryError::Database(format!("experience_years out of range: {}", cat.experience_years))
        })?)
        .bind(&cat.breed)
        .bind(cat.salary)
        .bind(cat.created_at)
        .bind(cat.updated_at)
        .bind(cat.deleted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert cat: {}", e)))?;

        Ok(())
    }

    async fn find_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError> {
        self.fetch_cat(id, false).await
    }

    async fn lock_cat(&mut self, id: CatId) -> Result<Option<Cat>, RepositoryError> {
        self.fetch_cat(id, true).await
    }

    async fn list_cats(&mut self) -> Result<Vec<Cat>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM cats WHERE deleted_at IS NULL ORDER BY created_at, id",
            CAT_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(&mut *self.tx).await?;

        rows.into_iter().map(parse_cat_row).collect()
    }

    async fn update_cat(&mut self, cat: &Cat) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cats SET salary = $2, updated_at = $3, deleted_at = $4 WHERE id = $1",
        )
        .bind(cat.id.0)
        .bind(cat.salary)
        .bind(cat.updated_at)
        .bind(cat.deleted_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Cat {}", cat.id)));
        }
        Ok(())
    }

    async fn insert_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO missions (id, cat_id, complete, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(mission.id.0)
        .bind(mission.cat_id.map(|c| c.0))
        .bind(mission.complete)
        .bind(mission.created_at)
        .bind(mission.updated_at)
        .bind(mission.deleted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert mission: {}", e)))?;

        // One at a time so `seq` follows the slice order
        for target in &mission.targets {
            self.insert_target_row(target).await?;
        }
        Ok(())
    }

    async fn find_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        self.fetch_mission(id, false).await
    }

    async fn lock_mission(&mut self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        self.fetch_mission(id, true).await
    }

    async fn list_missions(&mut self) -> Result<Vec<Mission>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM missions WHERE deleted_at IS NULL ORDER BY created_at, id",
            MISSION_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(&mut *self.tx).await?;

        let mut missions = rows
            .into_iter()
            .map(parse_mission_row)
            .collect::<Result<Vec<_>, _>>()?;
        if missions.is_empty() {
            return Ok(missions);
        }

        let ids: Vec<Uuid> = missions.iter().map(|m| m.id.0).collect();
        for target in self.fetch_live_targets(&ids).await? {
            if let Some(mission) = missions.iter_mut().find(|m| m.id == target.mission_id) {
                mission.targets.push(target);
            }
        }
        Ok(missions)
    }

    async fn update_mission(&mut self, mission: &Mission) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE missions
            SET cat_id = $2, complete = $3, updated_at = $4, deleted_at = $5
            WHERE id = $1
            "#,
        )
        .bind(mission.id.0)
        .bind(mission.cat_id.map(|c| c.0))
        .bind(mission.complete)
        .bind(mission.updated_at)
        .bind(mission.deleted_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Mission {}", mission.id)));
        }
        Ok(())
    }

    async fn count_open_missions_for_cat(
        &mut self,
        cat_id: CatId,
        excluding: Option<MissionId>,
    ) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM missions
            WHERE cat_id = $1
              AND complete = FALSE
              AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(cat_id.0)
        .bind(excluding.map(|m| m.0))
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count as usize)
    }

    async fn insert_target(&mut self, target: &Target) -> Result<(), RepositoryError> {
        self.insert_target_row(target).await
    }

    async fn find_target(&mut self, id: TargetId) -> Result<Option<Target>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM targets WHERE id = $1 AND deleted_at IS NULL",
            TARGET_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(parse_target_row).transpose()
    }

    async fn update_target(&mut self, target: &Target) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE targets
            SET notes = $2, complete = $3, updated_at = $4, deleted_at = $5
            WHERE id = $1
            "#,
        )
        .bind(target.id.0)
        .bind(&target.notes)
        .bind(target.complete)
        .bind(target.updated_at)
        .bind(target.deleted_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Target {}", target.id)));
        }
        Ok(())
    }

    async fn count_targets_ever_added(&mut self, mission_id: MissionId) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM targets WHERE mission_id = $1")
            .bind(mission_id.0)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(count as usize)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to commit transaction: {}", e)))
    }
}

fn parse_cat_row(row: PgRow) -> Result<Cat, RepositoryError> {
    let id: Uuid = row.try_get("id")?;
    let experience_years: i32 = row.try_get("experience_years")?;
    let experience_years = u32::try_from(experience_years).map_err(|_| {
        RepositoryError::CorruptRow(format!("cat {} has negative experience_years", id))
    })?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at")?;

    Ok(Cat {
        id: CatId(id),
        name: row.try_get("name")?,
        experience_years,
        breed: row.try_get("breed")?,
        salary: row.try_get("salary")?,
        created_at,
        updated_at,
        deleted_at,
    })
}

/// Mission row without its targets
fn parse_mission_row(row: PgRow) -> Result<Mission, RepositoryError> {
    let id: Uuid = row.try_get("id")?;
    let cat_id: Option<Uuid> = row.try_get("cat_id")?;

    Ok(Mission {
        id: MissionId(id),
        cat_id: cat_id.map(CatId),
        complete: row.try_get("complete")?,
        targets: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

fn parse_target_row(row: PgRow) -> Result<Target, RepositoryError> {
    let id: Uuid = row.try_get("id")?;
    let mission_id: Uuid = row.try_get("mission_id")?;

    Ok(Target {
        id: TargetId(id),
        mission_id: MissionId(mission_id),
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        notes: row.try_get("notes")?,
        complete: row.try_get("complete")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}
