use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::ProfileChanges;
use crate::utils::jwt::JwtClaims;

// Request para actualizar el perfil
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub profile_picture_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()),
            profile_picture_url: request.profile_picture_url,
        }
    }
}

// Response de /me
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub ok: bool,
    pub user: JwtClaims,
}
