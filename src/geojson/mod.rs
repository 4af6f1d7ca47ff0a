pub mod feature;
pub mod writer;

pub use feature::{Feature, FeatureCollection, Polygon, Properties, close_ring};
pub use writer::write_feature_collection;
