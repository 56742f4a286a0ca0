//! Middleware de autenticación JWT
//!
//! Extrae el bearer token, lo verifica e inyecta los claims en las
//! extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Exigir `Authorization: Bearer <token>` válido
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_token_from_header)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    let claims = verify_token(token, &state.jwt)
        .map_err(|_| AppError::Unauthorized("invalid token".to_string()))?;

    debug!("🔓 Token válido para {}", claims.email);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
