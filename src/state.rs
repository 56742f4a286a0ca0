//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::cache::VenueCache;
use crate::config::environment::EnvironmentConfig;
use crate::repositories::UserStore;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub users: Arc<dyn UserStore>,
    pub venues: Arc<VenueCache>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, users: Arc<dyn UserStore>, venues: VenueCache) -> Self {
        Self {
            jwt: JwtConfig::from(&config),
            config,
            users,
            venues: Arc::new(venues),
        }
    }
}
