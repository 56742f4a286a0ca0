pub mod auth_dto;
pub mod profile_dto;
