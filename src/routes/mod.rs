//! Router HTTP de la aplicación

pub mod apres_ski_routes;
pub mod auth_routes;
pub mod profile_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors_middleware_with_origins;
use crate::state::AppState;

/// Crear el router principal con todas las rutas y capas
pub fn create_router(state: AppState) -> Router {
    let cors = cors_middleware_with_origins(&state.config.cors_origins);

    Router::new()
        .route("/", get(health))
        .merge(auth_routes::create_auth_router(state.clone()))
        .merge(profile_routes::create_profile_router(state.clone()))
        .merge(apres_ski_routes::create_apres_ski_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check
async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "API is running",
    }))
}
