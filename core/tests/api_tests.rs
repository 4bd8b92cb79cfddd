// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API tests
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use spycats_core::application::{StandardAssignmentEngine, StandardCatService};
use spycats_core::infrastructure::breed_registry::StaticBreedRegistry;
use spycats_core::infrastructure::repositories::InMemoryMissionStore;
use spycats_core::presentation::app;

fn router() -> Router {
    let store = Arc::new(InMemoryMissionStore::new());
    let breeds = Arc::new(StaticBreedRegistry::new(vec!["Siamese".to_string()]));
    app(
        Arc::new(StandardCatService::new(store.clone(), breeds)),
        Arc::new(StandardAssignmentEngine::new(store)),
    )
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_cat(router: &Router, name: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/cats",
        Some(json!({ "name": name, "experience": 3, "breed": "Siamese", "salary": 1000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cat_lifecycle() {
    let router = router();
    let id = create_cat(&router, "Whiskers").await;

    let (status, body) = send(&router, Method::GET, &format!("/cats/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Whiskers");
    assert_eq!(body["experience"], 3);

    let (status, body) = send(
        &router,
        Method::PATCH,
        &format!("/cats/{}", id),
        Some(json!({ "salary": 2000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salary"], 2000.0);

    let (status, _) = send(&router, Method::DELETE, &format!("/cats/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, Method::GET, &format!("/cats/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (_, body) = send(&router, Method::GET, "/cats", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_breed_and_bad_salary_are_rejected() {
    let router = router();
    let (status, body) = send(
        &router,
        Method::POST,
        "/cats",
        Some(json!({ "name": "Rex", "experience": 1, "breed": "Dragon", "salary": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");

    let (status, _) = send(
        &router,
        Method::POST,
        "/cats",
        Some(json!({ "name": "Rex", "experience": 1, "breed": "Siamese", "salary": -10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        Method::POST,
        "/cats",
        Some(json!({ "name": "Rex", "experience": 3_000_000_000u64, "breed": "Siamese", "salary": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_bad_bodies_are_invalid_input() {
    let router = router();
    let (status, body) = send(
        &router,
        Method::POST,
        "/cats",
        Some(json!({ "name": "Rex", "salary": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
    assert!(body["error"].as_str().unwrap().contains("breed"));

    let (_, mission) = send(&router, Method::POST, "/missions", Some(json!({}))).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/missions/{}/targets", mission_id),
        Some(json!({ "name": "Dr. Paws" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/missions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "invalid_input");

    // Nothing was created by the rejected requests
    let (_, cats) = send(&router, Method::GET, "/cats", None).await;
    assert_eq!(cats.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_invalid_id() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/missions/42", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mission id: 42");
}

#[tokio::test]
async fn test_mission_flow_status_codes() {
    let router = router();
    let cat = create_cat(&router, "Whiskers").await;

    let (status, mission) = send(
        &router,
        Method::POST,
        "/missions",
        Some(json!({
            "cat_id": cat,
            "targets": [
                { "name": "Mr. Snuggles", "country": "France", "is_complete": true },
                { "name": "Dr. Paws", "country": "Spain", "notes": "likes tuna" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mission["cat_id"], cat.as_str());
    assert_eq!(mission["is_complete"], false);
    // Completion state from input is ignored
    assert_eq!(mission["targets"][0]["is_complete"], false);
    assert_eq!(mission["targets"][1]["notes"], "likes tuna");
    let mission_id = mission["id"].as_str().unwrap().to_string();

    // Same cat, second open mission
    let (status, body) = send(
        &router,
        Method::POST,
        "/missions",
        Some(json!({ "cat_id": cat })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (status, target) = send(
        &router,
        Method::POST,
        &format!("/missions/{}/targets", mission_id),
        Some(json!({ "name": "Lady Fang", "country": "Italy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(target["mission_id"], mission_id.as_str());

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/missions/{}/targets", mission_id),
        Some(json!({ "name": "Extra", "country": "Italy" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "limit_exceeded");

    let (status, _) = send(&router, Method::DELETE, &format!("/missions/{}", mission_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mission) = send(&router, Method::GET, &format!("/missions/{}", mission_id), None).await;
    let target_ids: Vec<String> = mission["targets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(target_ids.len(), 3);

    for id in &target_ids {
        let (status, _) = send(
            &router,
            Method::PUT,
            &format!("/targets/{}/status", id),
            Some(json!({ "is_complete": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, mission) = send(&router, Method::GET, &format!("/missions/{}", mission_id), None).await;
    assert_eq!(mission["is_complete"], true);

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/targets/{}/notes", target_ids[0]),
        Some(json!({ "notes": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");

    let (status, _) = send(&router, Method::DELETE, &format!("/targets/{}", target_ids[0]), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_assign_and_complete_routes() {
    let router = router();
    let cat = create_cat(&router, "Luna").await;

    let (_, mission) = send(&router, Method::POST, "/missions", Some(json!({}))).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/missions/{}/cat/{}", mission_id, cat),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cat_id"], cat.as_str());

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/missions/{}/complete", mission_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_complete"], true);

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/missions/{}/complete", mission_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/missions/{}/cat/{}", uuid::Uuid::new_v4(), cat),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_target_routes() {
    let router = router();
    let (_, mission) = send(
        &router,
        Method::POST,
        "/missions",
        Some(json!({ "targets": [{ "name": "Dr. Paws", "country": "Spain" }] })),
    )
    .await;
    let target_id = mission["targets"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/targets/{}/notes", target_id),
        Some(json!({ "notes": "spotted in Madrid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "spotted in Madrid");

    let (status, body) = send(&router, Method::GET, &format!("/targets/{}", target_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dr. Paws");

    let (status, _) = send(&router, Method::DELETE, &format!("/targets/{}", target_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, &format!("/targets/{}", target_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
