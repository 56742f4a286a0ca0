//! Configuración de cache
//!
//! Este módulo contiene la configuración para el cache de locales.

use std::time::Duration;

/// Tiempo de vida de cada slot
pub const VENUE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuración del cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: VENUE_CACHE_TTL, // 5 minutos
        }
    }
}
