//! Modelos del sistema
//!
//! Usuarios, estaciones de esquí y locales normalizados.

pub mod location;
pub mod place;
pub mod user;
