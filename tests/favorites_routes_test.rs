// ABOUTME: Integration tests for the favorites route handlers
// ABOUTME: Covers auth requirements, ordered hydration, idempotent adds, removal and clearing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{
    create_test_server_resources, create_test_server_resources_with, create_test_user, movie_ids,
    test_config, unknown_user_id, FakeCatalog,
};
use helpers::axum_test::AxumTestRequest;
use movie_explorer_server::{
    constants::tmdb::FAVORITES_FETCH_CONCURRENCY, models::User, server::build_router,
};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;

async fn setup() -> (axum::Router, Arc<FakeCatalog>, String) {
    let (resources, catalog) = create_test_server_resources().await.unwrap();
    let (_, token) = create_test_user(&resources, "collector").await.unwrap();
    (build_router(resources), catalog, token)
}

async fn add(router: &axum::Router, token: &str, body: &Value) -> (u16, Value) {
    let response = AxumTestRequest::post("/api/user/favorites")
        .bearer(token)
        .json(body)
        .send(router.clone())
        .await;
    (response.status(), response.json())
}

#[tokio::test]
async fn test_favorites_require_token() {
    let (router, _, _) = setup().await;

    let response = AxumTestRequest::get("/api/user/favorites")
        .send(router.clone())
        .await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "No token provided");

    let response = AxumTestRequest::delete("/api/user/favorites")
        .bearer("forged")
        .send(router)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_new_user_has_no_favorites() {
    let (router, catalog, token) = setup().await;

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&token)
        .send(router)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({"favorites": []}));
    assert_eq!(catalog.detail_calls(), 0);
}

#[tokio::test]
async fn test_add_returns_hydrated_list_in_insertion_order() {
    let (router, _, token) = setup().await;

    add(&router, &token, &json!({"movie": {"id": 603, "title": "The Matrix"}})).await;
    add(&router, &token, &json!({"movie": {"id": 155}})).await;
    let (status, body) = add(&router, &token, &json!({"movie": {"id": 550}})).await;

    assert_eq!(status, 200);
    assert_eq!(movie_ids(&body["favorites"]), vec![603, 155, 550]);
    assert_eq!(body["favorites"][0]["runtime"], 120);

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&token)
        .send(router)
        .await;
    let body: Value = response.json();
    assert_eq!(movie_ids(&body["favorites"]), vec![603, 155, 550]);
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let (router, _, token) = setup().await;

    add(&router, &token, &json!({"movie": {"id": 550}})).await;
    add(&router, &token, &json!({"movie": {"id": 603}})).await;
    let (status, body) = add(&router, &token, &json!({"movie": {"id": 550}})).await;

    assert_eq!(status, 200);
    assert_eq!(movie_ids(&body["favorites"]), vec![550, 603]);
}

#[tokio::test]
async fn test_add_requires_movie_id() {
    let (router, _, token) = setup().await;

    for payload in [json!({}), json!({"movie": {}}), json!({"movie": {"id": null}})] {
        let (status, body) = add(&router, &token, &payload).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Movie ID is required");
    }
}

#[tokio::test]
async fn test_remove_single_favorite() {
    let (router, _, token) = setup().await;
    add(&router, &token, &json!({"movie": {"id": 550}})).await;
    add(&router, &token, &json!({"movie": {"id": 603}})).await;

    let response = AxumTestRequest::delete("/api/user/favorites/550")
        .bearer(&token)
        .send(router.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(movie_ids(&body["favorites"]), vec![603]);

    let response = AxumTestRequest::delete("/api/user/favorites/not-a-number")
        .bearer(&token)
        .send(router)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_clear_favorites_skips_catalog() {
    let (router, catalog, token) = setup().await;
    add(&router, &token, &json!({"movie": {"id": 550}})).await;
    add(&router, &token, &json!({"movie": {"id": 603}})).await;
    let calls_before = catalog.detail_calls();

    let response = AxumTestRequest::delete("/api/user/favorites")
        .bearer(&token)
        .send(router.clone())
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({"favorites": []}));
    assert_eq!(catalog.detail_calls(), calls_before);

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&token)
        .send(router)
        .await;
    let body: Value = response.json();
    assert_eq!(body["favorites"], json!([]));
}

#[tokio::test]
async fn test_favorites_are_per_user() {
    let (resources, _) = create_test_server_resources().await.unwrap();
    let (_, alice) = create_test_user(&resources, "alice").await.unwrap();
    let (_, bob) = create_test_user(&resources, "bob").await.unwrap();
    let router = build_router(resources);

    add(&router, &alice, &json!({"movie": {"id": 550}})).await;
    let (_, body) = add(&router, &bob, &json!({"movie": {"id": 155}})).await;
    assert_eq!(movie_ids(&body["favorites"]), vec![155]);

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&alice)
        .send(router)
        .await;
    let body: Value = response.json();
    assert_eq!(movie_ids(&body["favorites"]), vec![550]);
}

#[tokio::test]
async fn test_hydration_failure_fails_request() {
    let mut catalog = FakeCatalog::with_sample_movies();
    catalog.failing_ids.insert(155);
    let resources = create_test_server_resources_with(test_config(), Arc::new(catalog))
        .await
        .unwrap();
    let (_, token) = create_test_user(&resources, "collector").await.unwrap();
    let router = build_router(resources);

    let (status, body) = add(&router, &token, &json!({"movie": {"id": 155}})).await;

    assert_eq!(status, 502);
    assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_favorite_removed_upstream_is_upstream_error() {
    let (router, _, token) = setup().await;

    let (status, body) = add(&router, &token, &json!({"movie": {"id": 424_242}})).await;

    assert_eq!(status, 502);
    assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_hydration_concurrency_is_bounded() {
    let mut catalog = FakeCatalog::with_sample_movies();
    let stored: Vec<u64> = (1..=25).collect();
    for id in &stored {
        catalog.details.insert(*id, json!({ "id": id }));
    }
    let catalog = Arc::new(catalog);
    let resources = create_test_server_resources_with(test_config(), catalog.clone())
        .await
        .unwrap();
    let (user, token) = create_test_user(&resources, "hoarder").await.unwrap();
    for id in &stored {
        resources.database.add_favorite(user.id, *id).await.unwrap();
    }
    let router = build_router(resources);

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&token)
        .send(router)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(movie_ids(&body["favorites"]), stored);
    assert_eq!(catalog.detail_calls(), stored.len());
    let peak = catalog.max_details_in_flight.load(Ordering::SeqCst);
    assert!(
        (1..=FAVORITES_FETCH_CONCURRENCY).contains(&peak),
        "peak concurrency {peak}"
    );
}

#[tokio::test]
async fn test_token_for_deleted_user_is_not_found() {
    let (resources, _) = create_test_server_resources().await.unwrap();
    let mut ghost = User::new("ghost".to_owned(), None, "hash".to_owned());
    ghost.id = unknown_user_id();
    let token = resources.auth_manager.generate_token(&ghost).unwrap();
    let router = build_router(resources);

    let response = AxumTestRequest::get("/api/user/favorites")
        .bearer(&token)
        .send(router)
        .await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "User not found");
}
