use crate::api::{Element, OverpassResponse};
use crate::domain::AdminBoundary;

const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_ADMIN_LEVEL_TAG: &str = "8";

/// Counts of administrative relations that did not become boundaries
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub admin_relations: usize,
    /// Relations whose outline is only available through member ways
    pub missing_geometry: usize,
    pub too_few_points: usize,
}

impl ParseStats {
    pub fn skipped(&self) -> usize {
        self.missing_geometry + self.too_few_points
    }
}

fn is_admin_relation(element: &Element) -> bool {
    element.type_ == "relation" && element.tag("boundary") == Some("administrative")
}

/// Parse Overpass response into administrative boundaries
///
/// An element becomes a boundary only if it is a `boundary=administrative`
/// relation with an inline geometry of more than two points. Relations that
/// would need their member ways stitched together are skipped.
pub fn parse_boundaries(response: &OverpassResponse) -> (Vec<AdminBoundary>, ParseStats) {
    let mut stats = ParseStats::default();
    let mut boundaries = Vec::new();

    for element in response.elements.iter().filter(|e| is_admin_relation(e)) {
        stats.admin_relations += 1;

        let geometry = match &element.geometry {
            Some(g) => g,
            None => {
                stats.missing_geometry += 1;
                continue;
            }
        };

        if geometry.len() <= 2 {
            stats.too_few_points += 1;
            continue;
        }

        let name = element.tag("name").unwrap_or(UNKNOWN_NAME);
        let admin_level = element.tag("admin_level").unwrap_or(DEFAULT_ADMIN_LEVEL_TAG);
        let ring = geometry.iter().map(|p| (p.lat, p.lon)).collect();

        boundaries.push(AdminBoundary::new(
            name.to_string(),
            admin_level.to_string(),
            ring,
        ));
    }

    (boundaries, stats)
}
