//! Après-ski finder backend
//!
//! Registro y login de usuarios, perfil, y un proxy con cache hacia la API
//! de Overpass que lista bares, pubs y discotecas de estaciones de esquí.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;
