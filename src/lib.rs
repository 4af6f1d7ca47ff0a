//! osm-boundaries - Fetch OpenStreetMap administrative boundaries as GeoJSON

pub mod api;
pub mod config;
pub mod domain;
pub mod export;
pub mod geojson;
pub mod osm;
