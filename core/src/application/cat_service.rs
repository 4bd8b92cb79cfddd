// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cat roster service
//!
//! Recruiting checks the breed with the external registry before any store
//! transaction is opened, so a slow registry never holds row locks.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::error::EngineError;
use crate::domain::breed::BreedRegistry;
use crate::domain::cat::{Cat, CatId, CatProfile};
use crate::domain::repository::MissionStore;

#[async_trait]
pub trait CatService: Send + Sync {
    async fn create_cat(&self, profile: CatProfile) -> Result<Cat, EngineError>;

    async fn get_cat(&self, id: CatId) -> Result<Cat, EngineError>;

    async fn list_cats(&self) -> Result<Vec<Cat>, EngineError>;

    async fn update_cat_salary(&self, id: CatId, salary: f64) -> Result<Cat, EngineError>;

    /// Soft-delete; missions referencing the cat are left as they are
    async fn delete_cat(&self, id: CatId) -> Result<(), EngineError>;
}

pub struct StandardCatService {
    store: Arc<dyn MissionStore>,
    breeds: Arc<dyn BreedRegistry>,
}

impl StandardCatService {
    pub fn new(store: Arc<dyn MissionStore>, breeds: Arc<dyn BreedRegistry>) -> Self {
        Self { store, breeds }
    }
}

#[async_trait]
impl CatService for StandardCatService {
    async fn create_cat(&self, profile: CatProfile) -> Result<Cat, EngineError> {
        let cat = Cat::new(profile)?;

        if !self.breeds.is_valid_breed(&cat.breed).await? {
            return Err(EngineError::InvalidInput(format!("Unknown breed: {}", cat.breed)));
        }

        let mut tx = self.store.begin().await?;
        tx.insert_cat(&cat).await?;
        tx.commit().await?;

        Ok(cat)
    }

    async fn get_cat(&self, id: CatId) -> Result<Cat, EngineError> {
        let mut tx = self.store.begin().await?;
        let cat = tx
            .find_cat(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Cat", id))?;
        tx.commit().await?;
        Ok(cat)
    }

    async fn list_cats(&self) -> Result<Vec<Cat>, EngineError> {
        let mut tx = self.store.begin().await?;
        let cats = tx.list_cats().await?;
        tx.commit().await?;
        Ok(cats)
    }

    async fn update_cat_salary(&self, id: CatId, salary: f64) -> Result<Cat, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut cat = tx
            .lock_cat(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Cat", id))?;

        cat.update_salary(salary)?;
        tx.update_cat(&cat).await?;
        tx.commit().await?;

        Ok(cat)
    }

    async fn delete_cat(&self, id: CatId) -> Result<(), EngineError> {
        let mut tx = self.store.begin().await?;
        let mut cat = tx
            .lock_cat(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Cat", id))?;

        cat.mark_deleted();
        tx.update_cat(&cat).await?;
        tx.commit().await?;

        Ok(())
    }
}
