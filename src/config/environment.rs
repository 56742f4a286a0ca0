//! Configuración de variables de entorno
//!
//! Este módulo lee la configuración del servidor desde el entorno
//! (previamente cargado desde `.env` con dotenvy).

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::clients::overpass_client::DEFAULT_OVERPASS_URL;

/// Orígenes permitidos por defecto (frontends de desarrollo)
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://127.0.0.1:5500",
    "http://localhost:5500",
    "http://127.0.0.1:3000",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://localhost:5173",
    "http://127.0.0.1:8080",
    "http://localhost:8080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0} in environment")]
    Missing(&'static str),

    #[error("{key} must be a valid number, got '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Segundos de validez de un token
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub overpass_url: String,
}

impl EnvironmentConfig {
    /// Leer la configuración de las variables de entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración con una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_origins = match get("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000)?,
            database_url: get("DATABASE_URL"),
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", get("JWT_EXPIRATION"), 2 * 60 * 60)?,
            cors_origins,
            overpass_url: get("OVERPASS_URL").unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_string()),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
