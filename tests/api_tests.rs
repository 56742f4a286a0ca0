use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use apres_ski_finder::cache::{CacheConfig, VenueCache};
use apres_ski_finder::clients::overpass_client::{normalize, OverpassResponse};
use apres_ski_finder::clients::{UpstreamFailure, VenueSource};
use apres_ski_finder::config::EnvironmentConfig;
use apres_ski_finder::models::location::{ski_resorts, LocationDescriptor};
use apres_ski_finder::models::place::QueryResult;
use apres_ski_finder::repositories::InMemoryUserRepository;
use apres_ski_finder::routes::create_router;
use apres_ski_finder::state::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Overpass falso: devuelve siempre el mismo JSON o falla
#[derive(Default)]
struct StubOverpass {
    calls: AtomicUsize,
    failing: AtomicBool,
}

#[async_trait]
impl VenueSource for StubOverpass {
    async fn fetch_places(&self, _location: &LocationDescriptor) -> Result<QueryResult, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamFailure {
                detail: "runtime error: Query timed out".to_string(),
                attempts: 2,
            });
        }

        let response: OverpassResponse = serde_json::from_value(json!({
            "elements": [
                { "type": "node", "id": 101, "lat": 47.129, "lon": 10.268,
                  "tags": { "amenity": "bar", "name": "Krazy Kanguruh" } },
                { "type": "way", "id": 202, "center": { "lat": 47.127, "lon": 10.263 },
                  "tags": { "amenity": "nightclub" } }
            ]
        }))
        .unwrap();
        Ok(normalize(response))
    }
}

fn test_app() -> (Arc<StubOverpass>, Router) {
    let config = EnvironmentConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap();

    let overpass = Arc::new(StubOverpass::default());
    let venues = VenueCache::new(overpass.clone(), ski_resorts(), &CacheConfig::default());
    let state = AppState::new(config, Arc::new(InMemoryUserRepository::new()), venues);

    (overpass, create_router(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authed(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _, _) = send(
        app,
        json_request(
            Method::POST,
            "/auth/register",
            None,
            json!({ "email": email, "password": "first-chair", "name": "Lena" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": email, "password": "first-chair" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (_, app) = test_app();
    let (status, _, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "message": "API is running" }));
}

#[tokio::test]
async fn test_resort_venues_are_cached() {
    let (overpass, app) = test_app();

    let (status, headers, body) = send(&app, get("/api/apres-ski/st-anton")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-cache"], "MISS");
    assert_eq!(body["count"], 2);
    assert_eq!(body["places"][0]["type"], "bar");
    assert_eq!(body["places"][1]["name"], "(no name)");
    assert_eq!(body["places"][1]["lat"], 47.127);

    let (status, headers, second) = send(&app, get("/api/apres-ski/st-anton")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-cache"], "HIT");
    assert_eq!(second, body);
    assert_eq!(overpass.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upstream_failure_returns_error_payload() {
    let (overpass, app) = test_app();
    overpass.failing.store(true, Ordering::SeqCst);

    let (status, _, body) = send(&app, get("/api/apres-ski/zermatt")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Overpass failed");
    assert_eq!(body["details"], "runtime error: Query timed out");
}

#[tokio::test]
async fn test_unknown_resort_is_not_found() {
    let (overpass, app) = test_app();
    let (status, _, _) = send(&app, get("/api/apres-ski/whistler")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(overpass.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resort_listing_reports_cache_state() {
    let (_, app) = test_app();
    send(&app, get("/api/apres-ski/verbier")).await;

    let (status, _, body) = send(&app, get("/api/apres-ski")).await;
    assert_eq!(status, StatusCode::OK);

    let resorts = body.as_array().unwrap();
    assert_eq!(resorts.len(), 10);
    let verbier = resorts.iter().find(|r| r["slug"] == "verbier").unwrap();
    assert_eq!(verbier["state"], "fresh");
    assert_eq!(verbier["cached_count"], 2);
    let ischgl = resorts.iter().find(|r| r["slug"] == "ischgl").unwrap();
    assert_eq!(ischgl["state"], "empty");
}

#[tokio::test]
async fn test_register_login_and_profile_flow() {
    let (_, app) = test_app();
    let token = register_and_login(&app, "Lena@Example.com").await;

    let (status, _, me) = send(&app, authed(Method::GET, "/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["ok"], true);
    assert_eq!(me["user"]["email"], "lena@example.com");

    let (status, _, updated) = send(
        &app,
        json_request(
            Method::PUT,
            "/profile",
            Some(&token),
            json!({ "profilePictureUrl": "https://cdn.example/lena.png" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Lena");
    assert_eq!(updated["profilePictureUrl"], "https://cdn.example/lena.png");

    let (status, _, _) = send(&app, authed(Method::DELETE, "/profile", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, authed(Method::GET, "/profile", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (_, app) = test_app();
    register_and_login(&app, "dup@example.com").await;

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/auth/register",
            None,
            json!({ "email": "DUP@example.com", "password": "whatever" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already exists");
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let (_, app) = test_app();
    let (status, _, body) = send(
        &app,
        json_request(Method::POST, "/auth/login", None, json!({ "email": "a@b.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email and password are required");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let (_, app) = test_app();

    let (status, _, body) = send(&app, get("/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing bearer token");

    let (status, _, body) = send(&app, authed(Method::GET, "/profile", "not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn test_cors_allows_configured_origin_only() {
    let (_, app) = test_app();

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/apres-ski/st-anton")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let (_, headers, _) = send(&app, preflight("http://localhost:5500")).await;
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5500");

    let (_, headers, _) = send(&app, preflight("https://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
