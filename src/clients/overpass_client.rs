//! Cliente HTTP para la API de Overpass
//!
//! Construye la consulta Overpass QL de cada estación, la envía con un
//! reintento y normaliza la respuesta a `QueryResult`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::location::LocationDescriptor;
use crate::models::place::{Place, QueryResult, VenueCategory, UNNAMED_PLACE};

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const USER_AGENT: &str = "apres-ski-finder/1.0";
pub const MAX_ATTEMPTS: u32 = 2;
pub const RETRY_DELAY: Duration = Duration::from_millis(800);

/// Error de un intento individual contra Overpass
#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl OverpassError {
    /// Detalle visible para el cliente: el cuerpo de la respuesta si lo hubo
    fn detail(&self) -> String {
        match self {
            OverpassError::Http { body, .. } => body.clone(),
            OverpassError::Transport(msg) | OverpassError::Decode(msg) => msg.clone(),
        }
    }
}

/// Fallo definitivo tras agotar los reintentos
#[derive(Debug, Clone, Error)]
#[error("Overpass failed after {attempts} attempts: {detail}")]
pub struct UpstreamFailure {
    pub detail: String,
    pub attempts: u32,
}

// ── Respuesta de Overpass ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassCenter {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

// ── Consulta ──────────────────────────────────────────────────────────

fn escape_ql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Construir la consulta Overpass QL para un descriptor de estación
pub fn build_query(location: &LocationDescriptor, categories: &[VenueCategory]) -> String {
    let (prelude, filter) = match location {
        LocationDescriptor::Area { name } => (
            format!(
                "area[\"name\"=\"{}\"][\"boundary\"=\"administrative\"]->.a;\n",
                escape_ql(name)
            ),
            "(area.a)".to_string(),
        ),
        LocationDescriptor::Point {
            latitude,
            longitude,
            radius_m,
        } => (
            String::new(),
            format!("(around:{},{},{})", radius_m, latitude, longitude),
        ),
    };

    let mut query = String::from("[out:json][timeout:25];\n");
    query.push_str(&prelude);
    query.push_str("(\n");
    for element in ["node", "way", "relation"] {
        for category in categories {
            query.push_str(&format!(
                "  {}[\"amenity\"=\"{}\"]{};\n",
                element,
                category.as_str(),
                filter
            ));
        }
    }
    query.push_str(");\nout center tags;\n");
    query
}

// ── Normalización ─────────────────────────────────────────────────────

fn non_empty_tag<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

impl From<OverpassElement> for Place {
    fn from(element: OverpassElement) -> Self {
        let center = element.center.as_ref();
        let tags = &element.tags;

        Place {
            id: element.id,
            category: VenueCategory::from_tag(non_empty_tag(tags, "amenity")),
            name: non_empty_tag(tags, "name").unwrap_or(UNNAMED_PLACE).to_string(),
            latitude: element.lat.or_else(|| center.and_then(|c| c.lat)),
            longitude: element.lon.or_else(|| center.and_then(|c| c.lon)),
            website: non_empty_tag(tags, "website")
                .or_else(|| non_empty_tag(tags, "contact:website"))
                .or_else(|| non_empty_tag(tags, "contact_website"))
                .map(str::to_string),
        }
    }
}

/// Convertir la respuesta cruda en el resultado público
pub fn normalize(response: OverpassResponse) -> QueryResult {
    QueryResult::new(response.elements.into_iter().map(Place::from).collect())
}

// ── Transporte ────────────────────────────────────────────────────────

/// Envío de una consulta (un solo intento, sin reintentos)
#[async_trait]
pub trait OverpassTransport: Send + Sync {
    async fn execute(&self, query: &str) -> Result<OverpassResponse, OverpassError>;
}

/// Transporte real sobre reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl OverpassTransport for HttpTransport {
    async fn execute(&self, query: &str) -> Result<OverpassResponse, OverpassError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .body(format!("data={}", urlencoding::encode(query)))
            .send()
            .await
            .map_err(|e| OverpassError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("📡 Overpass response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| OverpassError::Transport(e.to_string()))?;
            return Err(OverpassError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<OverpassResponse>()
            .await
            .map_err(|e| OverpassError::Decode(e.to_string()))
    }
}

// ── Cliente ───────────────────────────────────────────────────────────

/// Fuente de locales para una estación
#[async_trait]
pub trait VenueSource: Send + Sync {
    async fn fetch_places(&self, location: &LocationDescriptor)
        -> Result<QueryResult, UpstreamFailure>;
}

/// Cliente de Overpass con un reintento tras `retry_delay`
pub struct OverpassClient<T = HttpTransport> {
    transport: T,
    retry_delay: Duration,
}

impl OverpassClient<HttpTransport> {
    pub fn new(endpoint: &str) -> reqwest::Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(endpoint)?))
    }
}

impl<T: OverpassTransport> OverpassClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn execute_with_retry(&self, query: &str) -> Result<OverpassResponse, UpstreamFailure> {
        let mut attempt = 1;
        loop {
            match self.transport.execute(query).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "⚠️ Overpass attempt {}/{} failed, retrying in {:?}: {}",
                        attempt, MAX_ATTEMPTS, self.retry_delay, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(UpstreamFailure {
                        detail: e.detail(),
                        attempts: attempt,
                    })
                }
            }
        }
    }
}

#[async_trait]
impl<T: OverpassTransport> VenueSource for OverpassClient<T> {
    async fn fetch_places(
        &self,
        location: &LocationDescriptor,
    ) -> Result<QueryResult, UpstreamFailure> {
        let query = build_query(location, &VenueCategory::SEARCHED);
        debug!("🗺️ Overpass query:\n{}", query);

        let response = self.execute_with_retry(&query).await?;
        let result = normalize(response);

        info!("✅ Overpass returned {} places", result.count());
        Ok(result)
    }
}
