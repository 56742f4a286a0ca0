//! Cache
//!
//! Este módulo contiene el cache en memoria de locales por estación.

pub mod cache_config;
pub mod venue_cache;

pub use cache_config::CacheConfig;
pub use venue_cache::{PayloadSource, SlotState, VenueCache};
