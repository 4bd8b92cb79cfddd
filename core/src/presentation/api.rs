// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! JSON routes over the cat service and the assignment engine. Handlers only
//! parse, delegate and serialize; every rule lives in the application layer.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::assignment_engine::AssignmentEngine;
use crate::application::cat_service::CatService;
use crate::domain::cat::{Cat, CatId, CatProfile};
use crate::domain::mission::{Mission, MissionId, NewMission, Target, TargetId, TargetSpec};
use crate::presentation::error::ApiError;

pub struct AppState {
    pub cat_service: Arc<dyn CatService>,
    pub engine: Arc<dyn AssignmentEngine>,
}

pub fn app(cat_service: Arc<dyn CatService>, engine: Arc<dyn AssignmentEngine>) -> Router {
    let state = Arc::new(AppState { cat_service, engine });

    Router::new()
        .route("/health", get(health))
        .route("/cats", post(create_cat).get(list_cats))
        .route("/cats/{id}", get(get_cat).patch(update_cat_salary).delete(delete_cat))
        .route("/missions", post(create_mission).get(list_missions))
        .route("/missions/{id}", get(get_mission).delete(delete_mission))
        .route("/missions/{id}/complete", post(complete_mission))
        .route("/missions/{id}/targets", post(add_target))
        .route("/missions/{id}/cat/{cat_id}", put(assign_cat))
        .route("/targets/{id}", get(get_target).delete(delete_target))
        .route("/targets/{id}/status", put(update_target_status))
        .route("/targets/{id}/notes", put(update_target_notes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCatRequest {
    pub name: String,
    #[serde(default)]
    pub experience: u32,
    pub breed: String,
    pub salary: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSalaryRequest {
    pub salary: f64,
}

/// Target fields accepted from clients; completion state is never taken
/// from input
#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMissionRequest {
    #[serde(default)]
    pub cat_id: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub targets: Vec<TargetRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub is_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatResponse {
    pub id: String,
    pub name: String,
    pub experience: u32,
    pub breed: String,
    pub salary: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TargetResponse {
    pub id: String,
    pub mission_id: String,
    pub name: String,
    pub country: String,
    pub notes: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MissionResponse {
    pub id: String,
    pub cat_id: Option<String>,
    pub is_complete: bool,
    pub targets: Vec<TargetResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cat> for CatResponse {
    fn from(cat: Cat) -> Self {
        Self {
            id: cat.id.to_string(),
            name: cat.name,
            experience: cat.experience_years,
            breed: cat.breed,
            salary: cat.salary,
            created_at: cat.created_at,
            updated_at: cat.updated_at,
        }
    }
}

impl From<Target> for TargetResponse {
    fn from(target: Target) -> Self {
        Self {
            id: target.id.to_string(),
            mission_id: target.mission_id.to_string(),
            name: target.name,
            country: target.country,
            notes: target.notes,
            is_complete: target.complete,
            created_at: target.created_at,
            updated_at: target.updated_at,
        }
    }
}

impl From<Mission> for MissionResponse {
    fn from(mission: Mission) -> Self {
        Self {
            id: mission.id.to_string(),
            cat_id: mission.cat_id.map(|id| id.to_string()),
            is_complete: mission.complete,
            targets: mission.targets.into_iter().map(TargetResponse::from).collect(),
            created_at: mission.created_at,
            updated_at: mission.updated_at,
        }
    }
}

impl From<TargetRequest> for TargetSpec {
    fn from(request: TargetRequest) -> Self {
        Self {
            name: request.name,
            country: request.country,
            notes: request.notes,
        }
    }
}

fn parse_cat_id(value: &str) -> Result<CatId, ApiError> {
    CatId::from_string(value).map_err(|_| ApiError::InvalidId {
        entity: "cat",
        value: value.to_string(),
    })
}

fn parse_mission_id(value: &str) -> Result<MissionId, ApiError> {
    MissionId::from_string(value).map_err(|_| ApiError::InvalidId {
        entity: "mission",
        value: value.to_string(),
    })
}

fn parse_target_id(value: &str) -> Result<TargetId, ApiError> {
    TargetId::from_string(value).map_err(|_| ApiError::InvalidId {
        entity: "target",
        value: value.to_string(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---- cats ----

async fn create_cat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let cat = state
        .cat_service
        .create_cat(CatProfile {
            name: payload.name,
            experience_years: payload.experience,
            breed: payload.breed,
            salary: payload.salary,
        })
        .await?;

    info!("Recruited cat {} ({})", cat.id, cat.name);
    Ok((StatusCode::CREATED, Json(CatResponse::from(cat))))
}

async fn list_cats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let cats = state.cat_service.list_cats().await?;
    Ok(Json(cats.into_iter().map(CatResponse::from).collect::<Vec<_>>()))
}

async fn get_cat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cat = state.cat_service.get_cat(parse_cat_id(&id)?).await?;
    Ok(Json(CatResponse::from(cat)))
}

async fn update_cat_salary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSalaryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let cat = state
        .cat_service
        .update_cat_salary(parse_cat_id(&id)?, payload.salary)
        .await?;
    Ok(Json(CatResponse::from(cat)))
}

async fn delete_cat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cat_id = parse_cat_id(&id)?;
    state.cat_service.delete_cat(cat_id).await?;
    info!("Deleted cat {}", cat_id);
    Ok(StatusCode::NO_CONTENT)
}

// ---- missions ----

async fn create_mission(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let cat_id = payload.cat_id.as_deref().map(parse_cat_id).transpose()?;
    let mission = state
        .engine
        .create_mission(NewMission {
            cat_id,
            complete: payload.is_complete,
            targets: payload.targets.into_iter().map(TargetSpec::from).collect(),
        })
        .await?;

    info!("Created mission {} with {} targets", mission.id, mission.targets.len());
    Ok((StatusCode::CREATED, Json(MissionResponse::from(mission))))
}

async fn list_missions(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let missions = state.engine.list_missions().await?;
    Ok(Json(missions.into_iter().map(MissionResponse::from).collect::<Vec<_>>()))
}

async fn get_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mission = state.engine.get_mission(parse_mission_id(&id)?).await?;
    Ok(Json(MissionResponse::from(mission)))
}

async fn delete_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mission_id = parse_mission_id(&id)?;
    state.engine.delete_mission(mission_id).await?;
    info!("Deleted mission {}", mission_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mission = state.engine.complete_mission(parse_mission_id(&id)?).await?;
    info!("Mission {} completed manually", mission.id);
    Ok(Json(MissionResponse::from(mission)))
}

async fn add_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let target = state
        .engine
        .add_target(parse_mission_id(&id)?, TargetSpec::from(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(TargetResponse::from(target))))
}

async fn assign_cat(
    State(state): State<Arc<AppState>>,
    Path((id, cat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let mission = state
        .engine
        .assign_cat(parse_mission_id(&id)?, parse_cat_id(&cat_id)?)
        .await?;

    info!("Assigned cat {} to mission {}", cat_id, mission.id);
    Ok(Json(MissionResponse::from(mission)))
}

// ---- targets ----

async fn get_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.engine.get_target(parse_target_id(&id)?).await?;
    Ok(Json(TargetResponse::from(target)))
}

async fn delete_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target_id = parse_target_id(&id)?;
    state.engine.delete_target(target_id).await?;
    info!("Deleted target {}", target_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn update_target_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let target = state
        .engine
        .update_target_status(parse_target_id(&id)?, payload.is_complete)
        .await?;
    Ok(Json(TargetResponse::from(target)))
}

async fn update_target_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNotesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let target = state
        .engine
        .update_target_notes(parse_target_id(&id)?, payload.notes)
        .await?;
    Ok(Json(TargetResponse::from(target)))
}
