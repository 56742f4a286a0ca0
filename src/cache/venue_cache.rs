//! Cache en memoria de locales por estación
//!
//! Un slot por estación, creado vacío al arrancar. Un slot sólo cambia tras
//! una consulta exitosa a Overpass y se reemplaza entero.
//!
//! No hay single-flight: si llegan dos peticiones a un slot vacío o caducado
//! al mismo tiempo, las dos consultan Overpass y gana la última escritura.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::cache_config::CacheConfig;
use crate::clients::overpass_client::VenueSource;
use crate::models::location::Location;
use crate::models::place::QueryResult;
use crate::utils::errors::{not_found_error, AppResult};

/// Estado de un slot respecto al TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Empty,
    Fresh,
    Stale,
}

/// Último resultado bueno de una estación
#[derive(Debug, Clone, Default)]
pub struct CacheSlot {
    /// Milisegundos desde epoch; 0 = nunca
    pub last_fetched_at_ms: i64,
    pub payload: Option<Arc<QueryResult>>,
}

impl CacheSlot {
    pub fn state_at(&self, now_ms: i64, ttl_ms: i64) -> SlotState {
        match self.payload {
            None => SlotState::Empty,
            Some(_) if now_ms - self.last_fetched_at_ms < ttl_ms => SlotState::Fresh,
            Some(_) => SlotState::Stale,
        }
    }

    fn fresh_payload(&self, now_ms: i64, ttl_ms: i64) -> Option<Arc<QueryResult>> {
        match self.state_at(now_ms, ttl_ms) {
            SlotState::Fresh => self.payload.clone(),
            _ => None,
        }
    }
}

/// De dónde salió el resultado servido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Cache,
    Upstream,
}

impl PayloadSource {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            PayloadSource::Cache => "HIT",
            PayloadSource::Upstream => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub payload: Arc<QueryResult>,
    pub source: PayloadSource,
}

/// Resumen de una estación para el listado
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slug: String,
    pub name: String,
    pub country: String,
    pub state: SlotState,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub cached_count: Option<usize>,
}

struct Entry {
    location: Location,
    slot: RwLock<CacheSlot>,
}

/// Gestor de slots: decide entre servir cache o consultar Overpass
pub struct VenueCache {
    source: Arc<dyn VenueSource>,
    entries: HashMap<String, Entry>,
    order: Vec<String>,
    ttl_ms: i64,
}

impl VenueCache {
    pub fn new(source: Arc<dyn VenueSource>, locations: Vec<Location>, config: &CacheConfig) -> Self {
        let order = locations.iter().map(|l| l.slug.clone()).collect();
        let entries = locations
            .into_iter()
            .map(|location| {
                let slug = location.slug.clone();
                let entry = Entry {
                    location,
                    slot: RwLock::new(CacheSlot::default()),
                };
                (slug, entry)
            })
            .collect();

        Self {
            source,
            entries,
            order,
            ttl_ms: config.ttl.as_millis() as i64,
        }
    }

    fn entry(&self, key: &str) -> AppResult<&Entry> {
        self.entries
            .get(key)
            .ok_or_else(|| not_found_error("resort", key))
    }

    pub async fn get_or_fetch(&self, key: &str) -> AppResult<CacheLookup> {
        self.get_or_fetch_at(key, || Utc::now().timestamp_millis()).await
    }

    /// Igual que `get_or_fetch`, con reloj inyectado
    pub async fn get_or_fetch_at<F>(&self, key: &str, now_ms: F) -> AppResult<CacheLookup>
    where
        F: Fn() -> i64,
    {
        let entry = self.entry(key)?;

        if let Some(payload) = entry.slot.read().await.fresh_payload(now_ms(), self.ttl_ms) {
            debug!("📥 Venue cache HIT para {}", key);
            return Ok(CacheLookup {
                payload,
                source: PayloadSource::Cache,
            });
        }

        info!("❌ Venue cache MISS para {}, consultando Overpass", key);
        let result = self
            .source
            .fetch_places(&entry.location.descriptor)
            .await?;

        let payload = Arc::new(result);
        *entry.slot.write().await = CacheSlot {
            last_fetched_at_ms: now_ms(),
            payload: Some(payload.clone()),
        };
        debug!("💾 Venue cache SET para {} ({} places)", key, payload.count());

        Ok(CacheLookup {
            payload,
            source: PayloadSource::Upstream,
        })
    }

    pub async fn slot_state(&self, key: &str, now_ms: i64) -> AppResult<SlotState> {
        let entry = self.entry(key)?;
        let state = entry.slot.read().await.state_at(now_ms, self.ttl_ms);
        Ok(state)
    }

    /// Copia del slot (para inspección)
    pub async fn slot(&self, key: &str) -> AppResult<CacheSlot> {
        Ok(self.entry(key)?.slot.read().await.clone())
    }

    /// Estado de todas las estaciones, en el orden del catálogo
    pub async fn snapshot(&self) -> Vec<SlotSummary> {
        let now_ms = Utc::now().timestamp_millis();
        let mut summaries = Vec::with_capacity(self.order.len());

        for slug in &self.order {
            let Some(entry) = self.entries.get(slug) else {
                continue;
            };
            let slot = entry.slot.read().await;
            summaries.push(SlotSummary {
                slug: slug.clone(),
                name: entry.location.name.clone(),
                country: entry.location.country.clone(),
                state: slot.state_at(now_ms, self.ttl_ms),
                last_fetched_at: slot
                    .payload
                    .as_ref()
                    .and_then(|_| Utc.timestamp_millis_opt(slot.last_fetched_at_ms).single()),
                cached_count: slot.payload.as_ref().map(|p| p.count()),
            });
        }

        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::overpass_client::UpstreamFailure;
    use crate::models::location::{ski_resorts, LocationDescriptor};
    use crate::models::place::{Place, VenueCategory};
    use crate::utils::errors::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const TTL_MS: i64 = 300_000;

    /// Fuente falsa que cuenta llamadas y puede fallar a demanda
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl FakeSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl VenueSource for FakeSource {
        async fn fetch_places(
            &self,
            _location: &LocationDescriptor,
        ) -> Result<QueryResult, UpstreamFailure> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as i64;
            if self.failing.load(Ordering::SeqCst) {
                return Err(UpstreamFailure {
                    detail: "overloaded".to_string(),
                    attempts: 2,
                });
            }
            Ok(QueryResult::new(vec![Place {
                id: n,
                category: VenueCategory::Bar,
                name: format!("Bar {}", n),
                latitude: None,
                longitude: None,
                website: None,
            }]))
        }
    }

    fn cache() -> (Arc<FakeSource>, VenueCache) {
        let source = Arc::new(FakeSource::default());
        let cache = VenueCache::new(source.clone(), ski_resorts(), &CacheConfig::default());
        (source, cache)
    }

    #[tokio::test]
    async fn slots_start_empty() {
        let (_, cache) = cache();
        assert_eq!(cache.slot_state("st-anton", 0).await.unwrap(), SlotState::Empty);
        assert_eq!(cache.slot("zermatt").await.unwrap().last_fetched_at_ms, 0);
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_a_hit() {
        let (source, cache) = cache();

        let first = cache.get_or_fetch_at("st-anton", || 1_000).await.unwrap();
        let second = cache
            .get_or_fetch_at("st-anton", || 1_000 + TTL_MS - 1)
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first.source, PayloadSource::Upstream);
        assert_eq!(second.source, PayloadSource::Cache);
        assert!(Arc::ptr_eq(&first.payload, &second.payload));
    }

    #[tokio::test]
    async fn expired_slot_fetches_once_then_is_fresh_again() {
        let (source, cache) = cache();

        cache.get_or_fetch_at("ischgl", || 0).await.unwrap();
        assert_eq!(cache.slot_state("ischgl", TTL_MS).await.unwrap(), SlotState::Stale);

        let refreshed = cache.get_or_fetch_at("ischgl", || TTL_MS).await.unwrap();
        cache.get_or_fetch_at("ischgl", || TTL_MS + 10).await.unwrap();

        assert_eq!(refreshed.source, PayloadSource::Upstream);
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.slot_state("ischgl", TTL_MS + 10).await.unwrap(), SlotState::Fresh);
    }

    #[tokio::test]
    async fn failure_on_stale_slot_is_surfaced_and_slot_kept() {
        let (source, cache) = cache();

        let original = cache.get_or_fetch_at("lech", || 0).await.unwrap();
        source.set_failing(true);

        let err = cache.get_or_fetch_at("lech", || 400_000).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref f) if f.detail == "overloaded"));

        let slot = cache.slot("lech").await.unwrap();
        assert_eq!(slot.last_fetched_at_ms, 0);
        assert!(Arc::ptr_eq(slot.payload.as_ref().unwrap(), &original.payload));
    }

    #[tokio::test]
    async fn failure_on_empty_slot_leaves_it_empty() {
        let (source, cache) = cache();
        source.set_failing(true);

        assert!(cache.get_or_fetch_at("zermatt", || 5).await.is_err());
        assert_eq!(cache.slot_state("zermatt", 5).await.unwrap(), SlotState::Empty);

        source.set_failing(false);
        cache.get_or_fetch_at("zermatt", || 6).await.unwrap();
        assert_eq!(cache.slot_state("zermatt", 6).await.unwrap(), SlotState::Fresh);
    }

    #[tokio::test]
    async fn slots_are_independent_per_location() {
        let (source, cache) = cache();

        cache.get_or_fetch_at("verbier", || 0).await.unwrap();
        cache.get_or_fetch_at("val-thorens", || 0).await.unwrap();
        cache.get_or_fetch_at("verbier", || 1).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(cache.slot_state("chamonix", 1).await.unwrap(), SlotState::Empty);
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let (source, cache) = cache();
        let err = cache.get_or_fetch("whistler").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_misses_may_fetch_more_than_once() {
        let (source, cache) = cache();
        let cache = Arc::new(cache);

        let lookups = futures::future::join_all(
            (0..4).map(|_| {
                let cache = cache.clone();
                async move { cache.get_or_fetch_at("soelden", || 0).await }
            }),
        )
        .await;

        assert!(lookups.iter().all(|l| l.is_ok()));
        assert!(source.calls() >= 1 && source.calls() <= 4);
        assert_eq!(cache.slot_state("soelden", 0).await.unwrap(), SlotState::Fresh);
    }

    #[tokio::test]
    async fn snapshot_follows_catalog_order() {
        let (_, cache) = cache();
        cache.get_or_fetch("kitzbuehel").await.unwrap();

        let summaries = cache.snapshot().await;
        assert_eq!(summaries.len(), 10);
        assert_eq!(summaries[0].slug, "st-anton");

        let kitz = summaries.iter().find(|s| s.slug == "kitzbuehel").unwrap();
        assert_eq!(kitz.state, SlotState::Fresh);
        assert_eq!(kitz.cached_count, Some(1));
        assert!(kitz.last_fetched_at.is_some());
    }

    #[test]
    fn ttl_boundary_is_stale() {
        let slot = CacheSlot {
            last_fetched_at_ms: 0,
            payload: Some(Arc::new(QueryResult::new(vec![]))),
        };
        let ttl = Duration::from_secs(300).as_millis() as i64;
        assert_eq!(slot.state_at(ttl - 1, ttl), SlotState::Fresh);
        assert_eq!(slot.state_at(ttl, ttl), SlotState::Stale);
    }
}
