use anyhow::Result;
use std::path::Path;

use crate::api::OverpassResponse;
use crate::geojson::{FeatureCollection, write_feature_collection};
use crate::osm::{ParseStats, parse_boundaries};

/// A fully converted Overpass payload, not yet written anywhere
#[derive(Debug)]
pub struct Conversion {
    pub collection: FeatureCollection,
    pub remark: Option<String>,
    pub stats: ParseStats,
}

impl Conversion {
    pub fn features(&self) -> usize {
        self.collection.len()
    }

    /// Write the collection to `output`, returning the number of bytes written
    pub fn write(&self, output: &Path) -> Result<u64> {
        write_feature_collection(output, &self.collection)
    }
}

/// Convert a raw Overpass JSON payload to GeoJSON.
///
/// Nothing is written here; callers write the result with
/// [`Conversion::write`], so a parse failure never touches an existing file.
pub fn convert_boundaries(raw: &[u8]) -> Result<Conversion> {
    let response = OverpassResponse::from_slice(raw)?;
    let (boundaries, stats) = parse_boundaries(&response);

    Ok(Conversion {
        collection: FeatureCollection::from_boundaries(&boundaries),
        remark: response.remark,
        stats,
    })
}
