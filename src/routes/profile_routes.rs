use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::profile_controller::ProfileController;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::middleware::require_auth;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtClaims;

/// Rutas del perfil del usuario autenticado
pub fn create_profile_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = ProfileController::new(state.users.clone());
    let user = controller.get(claims.user_uuid()?).await?;
    Ok(Json(user))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = ProfileController::new(state.users.clone());
    let user = controller.update(claims.user_uuid()?, request).await?;
    Ok(Json(user))
}

async fn delete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<StatusCode, AppError> {
    let controller = ProfileController::new(state.users.clone());
    controller.delete(claims.user_uuid()?).await?;
    Ok(StatusCode::NO_CONTENT)
}
