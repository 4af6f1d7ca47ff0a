pub mod boundary;

pub use boundary::{AdminBoundary, BBox, BBoxError};
