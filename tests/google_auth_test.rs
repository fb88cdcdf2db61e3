// ABOUTME: Integration tests for Google ID token verification and Google sign-in
// ABOUTME: Signs tokens with a generated RSA key served from a local JWKS endpoint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::{http::header, routing::get, Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use common::{create_test_server_resources_with, create_test_user, test_config, FakeCatalog};
use helpers::axum_test::AxumTestRequest;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use movie_explorer_server::{
    errors::ErrorCode, resources::ServerResources, server::build_router,
};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;

const CLIENT_ID: &str = "movie-explorer-test.apps.googleusercontent.com";
const KEY_ID: &str = "test-key-1";

struct SigningKey {
    encoding_key: EncodingKey,
    jwks: Value,
}

fn signing_key() -> &'static SigningKey {
    static KEY: OnceLock<SigningKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let pem = private_key.to_pkcs1_pem(LineEnding::LF).unwrap();
        let public_key = private_key.to_public_key();

        SigningKey {
            encoding_key: EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
            jwks: json!({
                "keys": [{
                    "kty": "RSA",
                    "use": "sig",
                    "alg": "RS256",
                    "kid": KEY_ID,
                    "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                    "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
                }]
            }),
        }
    })
}

/// Serve the JWKS on an ephemeral port and count fetches
async fn spawn_certs_server() -> (String, Arc<AtomicUsize>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = fetches.clone();
    let jwks = signing_key().jwks.clone();

    let app = Router::new().route(
        "/certs",
        get(move || {
            let counter = counter.clone();
            let jwks = jwks.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ([(header::CACHE_CONTROL, "public, max-age=3600")], Json(jwks))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}/certs"), fetches)
}

async fn setup() -> (axum::Router, Arc<ServerResources>, Arc<AtomicUsize>) {
    let (certs_url, fetches) = spawn_certs_server().await;
    let mut config = test_config();
    config.google.client_id = Some(CLIENT_ID.to_owned());
    config.google.certs_url = certs_url;

    let resources =
        create_test_server_resources_with(config, Arc::new(FakeCatalog::with_sample_movies()))
            .await
            .unwrap();
    (build_router(resources.clone()), resources, fetches)
}

fn claims(sub: &str, email: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": "https://accounts.google.com",
        "aud": CLIENT_ID,
        "sub": sub,
        "iat": now,
        "exp": now + 3600,
        "email": email,
        "email_verified": true,
        "name": "Movie Fan",
    })
}

fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.to_owned());
    encode(&header, claims, &signing_key().encoding_key).unwrap()
}

async fn google_sign_in(router: &axum::Router, credential: &str) -> (u16, Value) {
    let response = AxumTestRequest::post("/api/auth/google")
        .json(&json!({ "credential": credential }))
        .send(router.clone())
        .await;
    (response.status(), response.json())
}

#[tokio::test]
async fn test_google_sign_in_creates_user() {
    let (router, resources, _) = setup().await;

    let (status, body) =
        google_sign_in(&router, &sign(&claims("1111111111", "Movie.Fan@example.com"))).await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["username"], "movie.fan");
    let user = resources
        .database
        .get_user_by_google_id("1111111111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email.as_deref(), Some("movie.fan@example.com"));
    assert!(user.password_hash.is_none());

    let response = AxumTestRequest::get("/api/auth/validate")
        .bearer(body["token"].as_str().unwrap())
        .send(router)
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_google_sign_in_is_stable_and_caches_keys() {
    let (router, _, fetches) = setup().await;
    let token = sign(&claims("2222222222", "repeat@example.com"));

    let (_, first) = google_sign_in(&router, &token).await;
    let (status, second) = google_sign_in(&router, &token).await;

    assert_eq!(status, 200);
    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_google_sign_in_refuses_email_registered_with_password() {
    let (router, resources, _) = setup().await;
    let registered = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "username": "squatter",
            "password": "popcorn99",
            "email": "owner@example.com",
        }))
        .send(router.clone())
        .await;
    assert_eq!(registered.status(), 201);
    let registered: Value = registered.json();

    let (status, body) =
        google_sign_in(&router, &sign(&claims("3333333333", "Owner@example.com"))).await;

    assert_eq!(status, 409);
    assert_eq!(body["code"], "RESOURCE_ALREADY_EXISTS");
    assert_eq!(body["error"], "Email already registered");
    assert!(body.get("token").is_none());

    assert!(resources
        .database
        .get_user_by_google_id("3333333333")
        .await
        .unwrap()
        .is_none());

    let squatter = resources
        .database
        .get_user_by_username("squatter")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(squatter.id.to_string(), registered["user"]["id"].as_str().unwrap());
    assert!(squatter.google_id.is_none());
}

#[tokio::test]
async fn test_google_sign_in_suffixes_taken_username() {
    let (router, resources, _) = setup().await;
    create_test_user(&resources, "critic").await.unwrap();

    let (status, body) =
        google_sign_in(&router, &sign(&claims("4444444444", "critic@example.com"))).await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["username"], "critic_444444");
}

#[tokio::test]
async fn test_google_token_for_other_client_rejected() {
    let (router, _, _) = setup().await;
    let mut foreign = claims("5555555555", "other@example.com");
    foreign["aud"] = json!("someone-else.apps.googleusercontent.com");

    let (status, body) = google_sign_in(&router, &sign(&foreign)).await;

    assert_eq!(status, 401);
    assert_eq!(body["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_expired_google_token_rejected() {
    let (router, _, _) = setup().await;
    let mut expired = claims("6666666666", "late@example.com");
    let past = Utc::now().timestamp() - 7200;
    expired["iat"] = json!(past);
    expired["exp"] = json!(past + 600);

    let (status, body) = google_sign_in(&router, &sign(&expired)).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn test_unverified_email_rejected() {
    let (_, resources, _) = setup().await;
    let mut unverified = claims("7777777777", "unverified@example.com");
    unverified["email_verified"] = json!(false);

    let error = resources
        .google_auth
        .validate_id_token(&sign(&unverified))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::AuthInvalid);
    assert!(resources
        .database
        .get_user_by_google_id("7777777777")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unknown_key_id_rejected() {
    let (_, resources, fetches) = setup().await;
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("rotated-away".to_owned());
    let token = encode(
        &header,
        &claims("8888888888", "rotated@example.com"),
        &signing_key().encoding_key,
    )
    .unwrap();

    let error = resources
        .google_auth
        .validate_id_token(&token)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::AuthInvalid);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}
