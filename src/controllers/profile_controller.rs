use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::profile_dto::UpdateProfileRequest;
use crate::models::user::{ProfileChanges, UserResponse};
use crate::repositories::UserStore;
use crate::utils::errors::{not_found_error, AppError};

pub struct ProfileController {
    users: Arc<dyn UserStore>,
}

impl ProfileController {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("user", &user_id.to_string()))
    }

    pub async fn update(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        let changes = ProfileChanges::from(request);
        if changes.is_empty() {
            return self.get(user_id).await;
        }

        let user = self
            .users
            .update_profile(user_id, changes)
            .await?
            .ok_or_else(|| not_found_error("user", &user_id.to_string()))?;

        info!("✏️ Perfil actualizado: {}", user.email);
        Ok(UserResponse::from(user))
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.users.delete(user_id).await? {
            return Err(not_found_error("user", &user_id.to_string()));
        }

        info!("🗑️ Usuario eliminado: {}", user_id);
        Ok(())
    }
}
