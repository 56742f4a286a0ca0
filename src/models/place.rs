//! Modelo de Place
//!
//! Locales normalizados (bares, pubs, discotecas) devueltos por la API.
//! Los nombres de campo en JSON siguen el contrato público: `type`, `lat`, `lon`.

use serde::{Deserialize, Serialize};

/// Nombre usado cuando el elemento no trae `tags.name`
pub const UNNAMED_PLACE: &str = "(no name)";

/// Tipo de local
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueCategory {
    Bar,
    Pub,
    Nightclub,
    Unknown,
}

impl VenueCategory {
    /// Categorías que se piden a la API de Overpass
    pub const SEARCHED: [VenueCategory; 3] =
        [VenueCategory::Bar, VenueCategory::Pub, VenueCategory::Nightclub];

    /// Valor de la etiqueta `amenity` de OpenStreetMap
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueCategory::Bar => "bar",
            VenueCategory::Pub => "pub",
            VenueCategory::Nightclub => "nightclub",
            VenueCategory::Unknown => "unknown",
        }
    }

    /// Convertir la etiqueta `amenity` (si existe) en categoría
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("bar") => VenueCategory::Bar,
            Some("pub") => VenueCategory::Pub,
            Some("nightclub") => VenueCategory::Nightclub,
            _ => VenueCategory::Unknown,
        }
    }
}

/// Local normalizado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    #[serde(rename = "type")]
    pub category: VenueCategory,
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
    pub website: Option<String>,
}

/// Resultado de una consulta: `count` siempre coincide con `places.len()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    count: usize,
    places: Vec<Place>,
}

impl QueryResult {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            count: places.len(),
            places,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }
}
