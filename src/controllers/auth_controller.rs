use std::sync::Arc;

use bcrypt::{hash, verify};
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::user::{normalize_email, NewUser, UserResponse};
use crate::repositories::UserStore;
use crate::utils::errors::{bad_request_error, AppError};
use crate::utils::jwt::{generate_token, JwtConfig};

pub const PASSWORD_HASH_COST: u32 = 10;

const CREDENTIALS_REQUIRED: &str = "email and password are required";
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Email obligatorio: ausente o en blanco cuenta como faltante
fn required_email(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Password obligatorio: solo la cadena vacía cuenta como faltante
fn required_password(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub struct AuthController {
    users: Arc<dyn UserStore>,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, mut request: RegisterRequest) -> Result<UserResponse, AppError> {
        // El formato se valida sobre el email ya recortado
        request.email = request.email.map(|e| e.trim().to_string());

        let (Some(email), Some(password)) =
            (required_email(&request.email), required_password(&request.password))
        else {
            return Err(bad_request_error(CREDENTIALS_REQUIRED));
        };
        request.validate()?;

        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already exists".to_string()));
        }

        // bcrypt es costoso: fuera del hilo del runtime
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash(password, PASSWORD_HASH_COST))
            .await
            .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name: request.name.unwrap_or_default().trim().to_string(),
                profile_picture_url: request.profile_picture_url.unwrap_or_default(),
            })
            .await?;

        info!("👤 Usuario registrado: {}", user.email);
        Ok(UserResponse::from(user))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (Some(email), Some(password)) =
            (required_email(&request.email), required_password(&request.password))
        else {
            return Err(bad_request_error(CREDENTIALS_REQUIRED));
        };

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(user.id, &user.email, &self.jwt)?;
        info!("🔑 Login correcto: {}", user.email);

        Ok(LoginResponse { token })
    }
}
