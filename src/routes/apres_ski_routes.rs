use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::cache::venue_cache::SlotSummary;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Rutas de locales de après-ski
pub fn create_apres_ski_router() -> Router<AppState> {
    Router::new()
        .route("/api/apres-ski", get(list_resorts))
        .route("/api/apres-ski/:slug", get(get_resort_venues))
}

/// Estaciones disponibles y estado de su cache
async fn list_resorts(State(state): State<AppState>) -> Json<Vec<SlotSummary>> {
    Json(state.venues.snapshot().await)
}

/// Bares, pubs y discotecas de una estación (`{ count, places }`)
async fn get_resort_venues(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let lookup = state.venues.get_or_fetch(&slug).await?;

    Ok((
        [(X_CACHE, HeaderValue::from_static(lookup.source.as_header_value()))],
        Json(lookup.payload.as_ref()),
    )
        .into_response())
}
