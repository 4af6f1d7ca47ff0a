use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An administrative boundary relation with an inline outer ring
#[derive(Debug, Clone, PartialEq)]
pub struct AdminBoundary {
    pub name: String,
    pub admin_level: String,
    /// Ring points as (lat, lon) pairs in WGS84, as delivered (not closed)
    pub ring: Vec<(f64, f64)>,
}

impl AdminBoundary {
    pub fn new(name: String, admin_level: String, ring: Vec<(f64, f64)>) -> Self {
        Self {
            name,
            admin_level,
            ring,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BBoxError {
    #[error("expected 4 comma-separated values (south,west,north,east), got {0}")]
    WrongArity(usize),
    #[error("invalid coordinate {0:?}")]
    InvalidNumber(String),
    #[error("coordinates out of range: {0}")]
    OutOfRange(BBox),
    #[error("south/west must not exceed north/east: {0}")]
    Inverted(BBox),
}

/// Query bounding box in degrees, in Overpass order
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BBox {
    /// Kelurahan of Tanjungpinang
    pub const DEFAULT: BBox = BBox {
        south: 0.7,
        west: 104.3,
        north: 1.1,
        east: 104.6,
    };

    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, BBoxError> {
        let bbox = BBox {
            south,
            west,
            north,
            east,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    pub fn validate(&self) -> Result<(), BBoxError> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);

        if !(lat_ok(self.south) && lat_ok(self.north) && lon_ok(self.west) && lon_ok(self.east)) {
            return Err(BBoxError::OutOfRange(*self));
        }
        if self.south > self.north || self.west > self.east {
            return Err(BBoxError::Inverted(*self));
        }
        Ok(())
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

impl FromStr for BBox {
    type Err = BBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BBoxError::WrongArity(parts.len()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BBoxError::InvalidNumber(part.to_string()))?;
        }

        BBox::new(values[0], values[1], values[2], values[3])
    }
}
