//! Catálogo de estaciones de esquí
//!
//! Cada estación tiene un slug fijo (usado en la URL) y un descriptor que
//! indica a Overpass dónde buscar.

use serde::Serialize;

/// Radio de búsqueda por defecto para estaciones definidas por coordenadas
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 2_000;

/// Dónde buscar locales
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LocationDescriptor {
    /// Área administrativa que Overpass resuelve por nombre
    Area { name: String },
    /// Punto con radio de búsqueda en metros
    Point {
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    },
}

impl LocationDescriptor {
    pub fn area(name: &str) -> Self {
        LocationDescriptor::Area {
            name: name.to_string(),
        }
    }

    pub fn point(latitude: f64, longitude: f64) -> Self {
        LocationDescriptor::Point {
            latitude,
            longitude,
            radius_m: DEFAULT_SEARCH_RADIUS_M,
        }
    }
}

/// Estación de esquí
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub slug: String,
    pub name: String,
    pub country: String,
    pub descriptor: LocationDescriptor,
}

impl Location {
    fn new(slug: &str, name: &str, country: &str, descriptor: LocationDescriptor) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            descriptor,
        }
    }
}

/// Estaciones servidas por `/api/apres-ski/:slug`
pub fn ski_resorts() -> Vec<Location> {
    vec![
        Location::new("st-anton", "St. Anton am Arlberg", "AT", LocationDescriptor::area("Sankt Anton am Arlberg")),
        Location::new("ischgl", "Ischgl", "AT", LocationDescriptor::area("Ischgl")),
        Location::new("kitzbuehel", "Kitzbühel", "AT", LocationDescriptor::area("Kitzbühel")),
        Location::new("soelden", "Sölden", "AT", LocationDescriptor::area("Sölden")),
        Location::new("mayrhofen", "Mayrhofen", "AT", LocationDescriptor::area("Mayrhofen")),
        Location::new("lech", "Lech am Arlberg", "AT", LocationDescriptor::area("Lech")),
        Location::new("zermatt", "Zermatt", "CH", LocationDescriptor::area("Zermatt")),
        Location::new("verbier", "Verbier", "CH", LocationDescriptor::point(46.0967, 7.2286)),
        Location::new("chamonix", "Chamonix-Mont-Blanc", "FR", LocationDescriptor::area("Chamonix-Mont-Blanc")),
        Location::new("val-thorens", "Val Thorens", "FR", LocationDescriptor::point(45.2979, 6.5800)),
    ]
}
