pub mod parser;

pub use parser::{ParseStats, parse_boundaries};
