// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Cat Aggregate
//!
//! A field agent of the agency. Cats are created once (breed checked against
//! the external registry before creation), may have their salary adjusted,
//! and are soft-deleted. Deleting a cat never touches the missions that
//! reference it.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Cat identity, attributes and attribute validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier for a cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatId(pub Uuid);

impl CatId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for CatId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper bound on years of experience; matches the `INTEGER` column
pub const MAX_EXPERIENCE_YEARS: u32 = i32::MAX as u32;

/// Attributes supplied when recruiting a new cat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatProfile {
    pub name: String,
    pub experience_years: u32,
    pub breed: String,
    pub salary: f64,
}

impl CatProfile {
    /// Check the attributes that can be judged without the breed registry
    pub fn validate(&self) -> Result<(), CatError> {
        if self.name.trim().is_empty() {
            return Err(CatError::InvalidName("Cat name cannot be empty".to_string()));
        }
        if self.breed.trim().is_empty() {
            return Err(CatError::InvalidBreed("Breed cannot be empty".to_string()));
        }
        if self.experience_years > MAX_EXPERIENCE_YEARS {
            return Err(CatError::InvalidExperience(self.experience_years));
        }
        validate_salary(self.salary)
    }
}

fn validate_salary(salary: f64) -> Result<(), CatError> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(CatError::InvalidSalary(salary));
    }
    Ok(())
}

// ============================================================================
// Aggregate Root: Cat
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    pub id: CatId,
    pub name: String,
    pub experience_years: u32,
    pub breed: String,
    pub salary: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Cat {
    /// Create a new cat from a validated profile
    pub fn new(profile: CatProfile) -> Result<Self, CatError> {
        profile.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: CatId::new(),
            name: profile.name.trim().to_string(),
            experience_years: profile.experience_years,
            breed: profile.breed.trim().to_string(),
            salary: profile.salary,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn update_salary(&mut self, salary: f64) -> Result<(), CatError> {
        validate_salary(salary)?;
        self.salary = salary;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum CatError {
    #[error("Invalid cat name: {0}")]
    InvalidName(String),

    #[error("Invalid breed: {0}")]
    InvalidBreed(String),

    #[error("Invalid salary: {0} (must be a non-negative number)")]
    InvalidSalary(f64),

    #[error("Invalid experience: {0} years (at most {max})", max = MAX_EXPERIENCE_YEARS)]
    InvalidExperience(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CatProfile {
        CatProfile {
            name: "Whiskers".to_string(),
            experience_years: 4,
            breed: "Siamese".to_string(),
            salary: 1200.0,
        }
    }

    #[test]
    fn test_cat_creation() {
        let cat = Cat::new(profile()).unwrap();
        assert_eq!(cat.name, "Whiskers");
        assert_eq!(cat.breed, "Siamese");
        assert!(!cat.is_deleted());
        assert_eq!(cat.created_at, cat.updated_at);
    }

    #[test]
    fn test_cat_creation_rejects_blank_fields() {
        let mut blank_name = profile();
        blank_name.name = "   ".to_string();
        assert!(matches!(Cat::new(blank_name), Err(CatError::InvalidName(_))));

        let mut blank_breed = profile();
        blank_breed.breed = String::new();
        assert!(matches!(Cat::new(blank_breed), Err(CatError::InvalidBreed(_))));
    }

    #[test]
    fn test_salary_must_be_non_negative() {
        let mut negative = profile();
        negative.salary = -1.0;
        assert_eq!(Cat::new(negative), Err(CatError::InvalidSalary(-1.0)));

        let mut cat = Cat::new(profile()).unwrap();
        assert!(cat.update_salary(f64::NAN).is_err());
        assert!(cat.update_salary(0.0).is_ok());
        assert_eq!(cat.salary, 0.0);
    }

    #[test]
    fn test_experience_is_bounded() {
        let mut veteran = profile();
        veteran.experience_years = MAX_EXPERIENCE_YEARS;
        assert!(Cat::new(veteran).is_ok());

        let mut impossible = profile();
        impossible.experience_years = MAX_EXPERIENCE_YEARS + 1;
        assert_eq!(
            Cat::new(impossible),
            Err(CatError::InvalidExperience(MAX_EXPERIENCE_YEARS + 1))
        );
    }

    #[test]
    fn test_cat_id_from_string() {
        let uuid_str = "123e4567-e89b-12d3-a456-426614174000";
        let id = CatId::from_string(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
        assert!(CatId::from_string("not-a-uuid").is_err());
    }
}
