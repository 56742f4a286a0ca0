//! Middleware del sistema
//!
//! Autenticación por bearer token y CORS.

pub mod auth;
pub mod cors;

pub use auth::require_auth;
pub use cors::cors_middleware_with_origins;
