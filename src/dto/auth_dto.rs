use serde::{Deserialize, Serialize};
use validator::Validate;

// Request de registro
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 100))]
    pub password: Option<String>,

    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub profile_picture_url: Option<String>,
}

// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}
