//! Clipper-backed geometry service.
//!
//! This module implements [`GeometryService`] on top of the geo-clipper
//! library for offsets and boolean difference, and `geo` for area,
//! point-in-polygon and geodesic distance.
//!
//! These operations are used for:
//! - Shrinking the plot boundary by the setback margin
//! - Turning road centerlines into strips
//! - Cutting road strips out of the plantable region
//! - Filtering lattice points

use crate::geometry::{GeoPoint, GeometryService, Region};
use crate::geometry::polygon::to_polygon;
use geo::{Area, Coord, HaversineDistance, Intersects, Line, LineString, MultiPolygon, Point, Polygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Default integer precision handed to Clipper: coordinates are meters, so
/// 1000 keeps millimeter resolution.
pub const DEFAULT_PRECISION: f64 = 1000.0;

/// Default maximum deviation (meters) of a rounded corner from the true arc.
pub const DEFAULT_ARC_TOLERANCE: f64 = 0.02;

/// Parts smaller than this (m²) are dropped from offset results.
const MIN_PART_AREA: f64 = 1e-6;

/// Half-width (meters) of the thin closed core a road centerline is turned
/// into before it is grown to the full strip width.
const ROAD_CORE_HALF_WIDTH: f64 = 0.01;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners
    Square,
    /// Round corners
    #[default]
    Round,
    /// Mitered corners
    Miter,
}

/// [`GeometryService`] backed by Clipper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipperGeometry {
    /// Scale factor Clipper uses to convert meters to integers.
    pub precision: f64,
    /// Arc tolerance for round joins and road caps (meters).
    pub arc_tolerance: f64,
    /// Corner style for the setback offset.
    pub join: OffsetJoinType,
}

impl Default for ClipperGeometry {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
            join: OffsetJoinType::Round,
        }
    }
}

impl ClipperGeometry {
    /// Create a service with default precision and round joins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different corner style for inward offsets.
    pub fn with_join(mut self, join: OffsetJoinType) -> Self {
        self.join = join;
        self
    }

    fn join_type(&self) -> JoinType {
        match self.join {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(self.arc_tolerance),
            OffsetJoinType::Miter => JoinType::Miter(2.0),
        }
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn region_is_finite(region: &Region) -> bool {
    region.0.iter().all(|poly| {
        poly.exterior().coords().all(|c| c.x.is_finite() && c.y.is_finite())
            && poly
                .interiors()
                .iter()
                .all(|ring| ring.coords().all(|c| c.x.is_finite() && c.y.is_finite()))
    })
}

fn line_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

/// Counter-clockwise rectangle of half-width `half` around one segment.
fn segment_rectangle(segment: Line<f64>, half: f64) -> Option<Polygon<f64>> {
    let length = segment.dx().hypot(segment.dy());
    if length <= 0.0 {
        return None;
    }
    let nx = -segment.dy() / length * half;
    let ny = segment.dx() / length * half;
    let (a, b) = (segment.start, segment.end);
    Some(to_polygon(&[
        Coord { x: a.x - nx, y: a.y - ny },
        Coord { x: b.x - nx, y: b.y - ny },
        Coord { x: b.x + nx, y: b.y + ny },
        Coord { x: a.x + nx, y: a.y + ny },
    ]))
}

fn drop_slivers(region: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        region
            .0
            .into_iter()
            .filter(|poly| poly.unsigned_area() > MIN_PART_AREA)
            .collect(),
    )
}

// ============================================================================
// GeometryService
// ============================================================================

impl GeometryService for ClipperGeometry {
    fn area(&self, region: &Region) -> f64 {
        region.unsigned_area()
    }

    fn buffer_inward(&self, region: &Region, distance: f64) -> Option<Region> {
        if !distance.is_finite() || distance < 0.0 || !region_is_finite(region) {
            return None;
        }
        if region.unsigned_area() <= MIN_PART_AREA {
            return None;
        }
        if distance == 0.0 {
            return Some(region.clone());
        }

        let result = region.offset(
            -distance,
            self.join_type(),
            EndType::ClosedPolygon,
            self.precision,
        );
        let result = drop_slivers(result);
        if result.0.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    fn buffer_outward(&self, line: &LineString<f64>, half_width: f64) -> Option<Region> {
        if !half_width.is_finite() || half_width <= 0.0 {
            return None;
        }
        if line.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return None;
        }
        if line_length(line) <= 0.0 {
            return None;
        }

        let core_half = ROAD_CORE_HALF_WIDTH.min(half_width);
        let mut core = MultiPolygon::new(Vec::new());
        for segment in line.lines() {
            let Some(rect) = segment_rectangle(segment, core_half) else {
                continue;
            };
            core = if core.0.is_empty() {
                MultiPolygon::new(vec![rect])
            } else {
                core.union(&rect, self.precision)
            };
        }
        if core.0.is_empty() {
            return None;
        }

        let grow = half_width - core_half;
        let result = if grow > 0.0 {
            core.offset(
                grow,
                JoinType::Round(self.arc_tolerance),
                EndType::ClosedPolygon,
                self.precision,
            )
        } else {
            core
        };
        let result = drop_slivers(result);
        if result.0.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    fn difference(&self, a: &Region, b: &Region) -> Option<Region> {
        if !region_is_finite(a) || !region_is_finite(b) {
            return None;
        }
        if a.0.is_empty() {
            return Some(MultiPolygon::new(vec![]));
        }
        if b.0.is_empty() {
            return Some(a.clone());
        }

        Some(drop_slivers(Clipper::difference(a, b, self.precision)))
    }

    fn contains(&self, region: &Region, point: Coord<f64>) -> bool {
        region.0.iter().any(|poly| poly.intersects(&point))
    }

    fn centroid(&self, ring: &[GeoPoint]) -> Option<GeoPoint> {
        let mut points = ring;
        if points.len() > 1 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }
        if points.is_empty() || points.iter().any(|p| !p.lat.is_finite() || !p.lng.is_finite()) {
            return None;
        }

        let n = points.len() as f64;
        let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
        let lng = points.iter().map(|p| p.lng).sum::<f64>() / n;
        Some(GeoPoint::new(lat, lng))
    }

    fn bounding_box_diagonal(&self, ring: &[GeoPoint]) -> f64 {
        if ring.is_empty() {
            return 0.0;
        }

        let mut min = GeoPoint::new(f64::MAX, f64::MAX);
        let mut max = GeoPoint::new(f64::MIN, f64::MIN);
        for p in ring {
            min.lat = min.lat.min(p.lat);
            min.lng = min.lng.min(p.lng);
            max.lat = max.lat.max(p.lat);
            max.lng = max.lng.max(p.lng);
        }
        self.distance(min, max)
    }

    fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        let pa: Point<f64> = a.to_geo();
        let pb: Point<f64> = b.to_geo();
        pa.haversine_distance(&pb)
    }
}
