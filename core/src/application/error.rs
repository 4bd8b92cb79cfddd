// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine error taxonomy
//!
//! Every rejected intent surfaces as exactly one [`EngineError`] kind. Domain
//! aggregate errors and store errors convert into it so application services
//! can propagate with `?`.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Typed violations returned by the engine and cat service

use thiserror::Error;

use crate::domain::breed::BreedRegistryError;
use crate::domain::cat::CatError;
use crate::domain::mission::MissionError;
use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    LimitExceeded(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Breed registry failure: {0}")]
    Dependency(#[from] BreedRegistryError),

    #[error("Store failure: {0}")]
    Store(#[from] RepositoryError),
}

/// Discriminant of [`EngineError`], stable across messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    LimitExceeded,
    InvalidState,
    InvalidInput,
    Dependency,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::LimitExceeded => "limit_exceeded",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Dependency => "dependency",
            ErrorKind::Store => "store",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::LimitExceeded(_) => ErrorKind::LimitExceeded,
            EngineError::InvalidState(_) => ErrorKind::InvalidState,
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::Dependency(_) => ErrorKind::Dependency,
            EngineError::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        EngineError::NotFound(format!("{} not found: {}", entity, id))
    }
}

impl From<MissionError> for EngineError {
    fn from(err: MissionError) -> Self {
        let message = err.to_string();
        match err {
            MissionError::CreatedComplete
            | MissionError::MissionComplete(_)
            | MissionError::TargetComplete(_) => EngineError::InvalidState(message),
            MissionError::TargetLimitExceeded { .. } => EngineError::LimitExceeded(message),
            MissionError::MissionAssigned { .. } | MissionError::CompletedTargetDeletion(_) => {
                EngineError::Conflict(message)
            }
            MissionError::TargetNotFound(_) => EngineError::NotFound(message),
            MissionError::InvalidTarget(_) => EngineError::InvalidInput(message),
        }
    }
}

impl From<CatError> for EngineError {
    fn from(err: CatError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cat::CatId;
    use crate::domain::mission::{MissionId, TargetId};

    #[test]
    fn test_mission_error_mapping() {
        let cases = vec![
            (MissionError::CreatedComplete, ErrorKind::InvalidState),
            (MissionError::MissionComplete(MissionId::new()), ErrorKind::InvalidState),
            (MissionError::TargetComplete(TargetId::new()), ErrorKind::InvalidState),
            (MissionError::TargetLimitExceeded { limit: 3 }, ErrorKind::LimitExceeded),
            (
                MissionError::MissionAssigned {
                    mission_id: MissionId::new(),
                    cat_id: CatId::new(),
                },
                ErrorKind::Conflict,
            ),
            (MissionError::CompletedTargetDeletion(TargetId::new()), ErrorKind::Conflict),
            (MissionError::TargetNotFound(TargetId::new()), ErrorKind::NotFound),
            (MissionError::InvalidTarget("blank".to_string()), ErrorKind::InvalidInput),
        ];

        for (err, kind) in cases {
            assert_eq!(EngineError::from(err).kind(), kind);
        }
    }

    #[test]
    fn test_infrastructure_errors() {
        let err: EngineError = RepositoryError::Database("connection reset".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Store);

        let err: EngineError = BreedRegistryError::UnexpectedStatus { status: 503 }.into();
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(err.kind().to_string(), "dependency");
    }
}
