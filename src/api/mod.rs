pub mod overpass;

pub use overpass::{
    Element, GeomPoint, OverpassError, OverpassResponse, build_boundary_query, fetch_overpass,
};
