//! Clientes de APIs externas

pub mod overpass_client;

pub use overpass_client::{OverpassClient, UpstreamFailure, VenueSource};
