// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Aggregates, value objects and the ports the application layer depends on.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Business rules free of transport and storage concerns

pub mod breed;
pub mod cat;
pub mod mission;
pub mod repository;
pub mod service_config;
