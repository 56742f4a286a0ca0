pub mod auth_controller;
pub mod profile_controller;
