use serde::Serialize;

use crate::domain::AdminBoundary;

/// GeoJSON FeatureCollection of administrative boundaries
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub properties: Properties,
    pub geometry: Polygon,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Properties {
    pub name: String,
    pub boundary: &'static str,
    pub admin_level: String,
}

/// Single-ring polygon geometry, coordinates as [lon, lat]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl FeatureCollection {
    pub fn from_boundaries(boundaries: &[AdminBoundary]) -> Self {
        Self {
            type_: "FeatureCollection",
            features: boundaries.iter().map(Feature::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<&AdminBoundary> for Feature {
    fn from(boundary: &AdminBoundary) -> Self {
        Self {
            type_: "Feature",
            properties: Properties {
                name: boundary.name.clone(),
                boundary: "administrative",
                admin_level: boundary.admin_level.clone(),
            },
            geometry: Polygon {
                type_: "Polygon",
                coordinates: vec![close_ring(&boundary.ring)],
            },
        }
    }
}

/// Convert (lat, lon) points to GeoJSON [lon, lat] pairs and close the ring.
///
/// The first point is always appended, even if the input is already closed.
pub fn close_ring(points: &[(f64, f64)]) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = points.iter().map(|&(lat, lon)| [lon, lat]).collect();
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    coords
}
