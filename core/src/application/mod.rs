// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
pub mod assignment_engine;
pub mod cat_service;
pub mod repository_factory;

// Re-export services for convenience
pub use assignment_engine::{AssignmentEngine, StandardAssignmentEngine};
pub use cat_service::{CatService, StandardCatService};
pub use error::{EngineError, ErrorKind};
