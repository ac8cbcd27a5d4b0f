//! Spatial filter: keeps lattice candidates inside the plantable region.

use super::grid::LatticePoint;
use super::TreePosition;
use crate::geometry::{GeometryService, Region};
use geo::BoundingRect;

/// Keep every candidate inside `region`, preserving candidate order.
///
/// Candidates outside the region's bounding rectangle are skipped before the
/// point-in-polygon test.
pub fn filter_trees<G, I>(geometry: &G, candidates: I, region: &Region) -> Vec<TreePosition>
where
    G: GeometryService,
    I: IntoIterator<Item = LatticePoint>,
{
    let Some(bounds) = region.bounding_rect() else {
        return Vec::new();
    };
    let (min, max) = (bounds.min(), bounds.max());

    candidates
        .into_iter()
        .filter(|c| {
            c.local.x >= min.x && c.local.x <= max.x && c.local.y >= min.y && c.local.y <= max.y
        })
        .filter(|c| geometry.contains(region, c.local))
        .map(|c| TreePosition {
            position: c.position,
            row: c.row,
            slot: c.slot,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::ClipperGeometry;
    use crate::config::PlantingConfig;
    use crate::geometry::polygon::to_polygon;
    use crate::geometry::{GeoPoint, LocalFrame};
    use crate::layout::grid::Lattice;
    use geo::{Coord, MultiPolygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        MultiPolygon::new(vec![to_polygon(&[
            Coord { x: x0, y: y0 },
            Coord { x: x1, y: y0 },
            Coord { x: x1, y: y1 },
            Coord { x: x0, y: y1 },
        ])])
    }

    #[test]
    fn test_filter_counts_interior_points() {
        let geometry = ClipperGeometry::new();
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let config = PlantingConfig::default().with_spacing(5.0, 4.0);
        let lattice = Lattice::new(frame, 60.0, &config);

        // x in {-10..10 step 5} = 5 rows, y in {-6..6} -> {-4, 0, 4} = 3 slots
        let trees = filter_trees(&geometry, lattice, &rect(-12.0, -6.0, 12.0, 6.0));
        assert_eq!(trees.len(), 15);
    }

    #[test]
    fn test_filter_preserves_order() {
        let geometry = ClipperGeometry::new();
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let config = PlantingConfig::default();
        let trees = filter_trees(
            &geometry,
            Lattice::new(frame, 60.0, &config),
            &rect(-20.0, -20.0, 20.0, 20.0),
        );
        let keys: Vec<_> = trees.iter().map(|t| (t.row, t.slot)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_empty_region_keeps_nothing() {
        let geometry = ClipperGeometry::new();
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let config = PlantingConfig::default();
        let trees = filter_trees(
            &geometry,
            Lattice::new(frame, 60.0, &config),
            &MultiPolygon::new(vec![]),
        );
        assert!(trees.is_empty());
    }
}
