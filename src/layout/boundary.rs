//! Farm-plot boundary and road centerline models.

use super::{ShapeError, ShapeResult};
use crate::geometry::polygon::{is_simple, open_ring, signed_area, to_polygon};
use crate::geometry::{GeoPoint, GeometryService, LocalFrame, Region};
use geo::{LineString, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Minimum distinct vertices of a committed boundary.
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// Minimum points of a committed road.
pub const MIN_ROAD_POINTS: usize = 2;

fn check_points(points: &[GeoPoint]) -> ShapeResult<()> {
    match points.iter().position(|p| !p.is_valid()) {
        Some(index) => Err(ShapeError::InvalidPoint {
            index,
            point: points[index],
        }),
        None => Ok(()),
    }
}

/// A committed, validated farm-plot boundary.
///
/// The geographic ring is kept as drawn (minus duplicate vertices). Its
/// projection into the local frame, the frame itself and the area are derived
/// once at commit time and never change independently of the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    ring: Vec<GeoPoint>,
    frame: LocalFrame,
    region: Region,
    area_m2: f64,
    diagonal_m: f64,
}

impl Boundary {
    /// Validate a drawn ring and derive its planar form.
    ///
    /// Consecutive duplicate vertices and a closing vertex equal to the first
    /// are dropped before counting. Self-intersecting rings are rejected.
    pub fn commit<G: GeometryService>(points: &[GeoPoint], geometry: &G) -> ShapeResult<Self> {
        check_points(points)?;

        let ring = open_ring(points);
        if ring.len() < MIN_BOUNDARY_POINTS {
            return Err(ShapeError::TooFewPoints {
                required: MIN_BOUNDARY_POINTS,
                found: ring.len(),
            });
        }

        let centroid = geometry.centroid(&ring).ok_or(ShapeError::Degenerate)?;
        let frame = LocalFrame::new(centroid);
        let mut local = frame.project_all(&ring);
        if !is_simple(&local) {
            return Err(ShapeError::SelfIntersecting);
        }
        // Clipper and the area tests expect counter-clockwise exteriors
        if signed_area(&local) < 0.0 {
            local.reverse();
        }

        let region = MultiPolygon::new(vec![to_polygon(&local)]);
        let area_m2 = geometry.area(&region);
        let diagonal_m = geometry.bounding_box_diagonal(&ring);

        Ok(Self {
            ring,
            frame,
            region,
            area_m2,
            diagonal_m,
        })
    }

    /// The boundary vertices, open ring.
    #[inline]
    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Local frame anchored at the boundary centroid.
    #[inline]
    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// Vertex-mean centroid.
    #[inline]
    pub fn centroid(&self) -> GeoPoint {
        self.frame.origin()
    }

    /// The boundary as a planar region in the local frame.
    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Enclosed area (m²).
    #[inline]
    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    /// Geodesic bounding-box diagonal (m).
    #[inline]
    pub fn diagonal_m(&self) -> f64 {
        self.diagonal_m
    }
}

/// A committed road centerline.
///
/// Width is not stored; the active config's road width applies at
/// computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadPath {
    points: Vec<GeoPoint>,
}

impl RoadPath {
    /// Validate a drawn polyline.
    pub fn commit(points: &[GeoPoint]) -> ShapeResult<Self> {
        check_points(points)?;
        if points.len() < MIN_ROAD_POINTS {
            return Err(ShapeError::TooFewPoints {
                required: MIN_ROAD_POINTS,
                found: points.len(),
            });
        }
        Ok(Self {
            points: points.to_vec(),
        })
    }

    /// The centerline vertices.
    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Project the centerline into `frame`.
    pub fn to_local(&self, frame: &LocalFrame) -> LineString<f64> {
        LineString::new(frame.project_all(&self.points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::ClipperGeometry;

    fn square_ring(origin: GeoPoint, half: f64) -> Vec<GeoPoint> {
        let frame = LocalFrame::new(origin);
        vec![
            frame.to_geo(-half, -half),
            frame.to_geo(half, -half),
            frame.to_geo(half, half),
            frame.to_geo(-half, half),
        ]
    }

    #[test]
    fn test_commit_square() {
        let geometry = ClipperGeometry::new();
        let ring = square_ring(GeoPoint::new(36.5, 128.7), 50.0);
        let boundary = Boundary::commit(&ring, &geometry).unwrap();

        assert_eq!(boundary.ring().len(), 4);
        assert!((boundary.area_m2() - 10_000.0).abs() < 1.0);
        assert!((boundary.centroid().lat - 36.5).abs() < 1e-9);
        assert!(boundary.diagonal_m() > 140.0 && boundary.diagonal_m() < 143.0);
    }

    #[test]
    fn test_commit_too_few_points() {
        let geometry = ClipperGeometry::new();
        let ring = square_ring(GeoPoint::new(36.5, 128.7), 50.0);
        let err = Boundary::commit(&ring[..2], &geometry).unwrap_err();
        assert_eq!(
            err,
            ShapeError::TooFewPoints {
                required: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_commit_counts_distinct_points() {
        let geometry = ClipperGeometry::new();
        let a = GeoPoint::new(36.5, 128.7);
        let b = GeoPoint::new(36.501, 128.7);
        assert!(matches!(
            Boundary::commit(&[a, b, b, a], &geometry),
            Err(ShapeError::TooFewPoints { found: 2, .. })
        ));
    }

    #[test]
    fn test_commit_drops_closing_vertex() {
        let geometry = ClipperGeometry::new();
        let mut ring = square_ring(GeoPoint::new(36.5, 128.7), 20.0);
        ring.push(ring[0]);
        let boundary = Boundary::commit(&ring, &geometry).unwrap();
        assert_eq!(boundary.ring().len(), 4);
    }

    #[test]
    fn test_commit_rejects_invalid_point() {
        let geometry = ClipperGeometry::new();
        let mut ring = square_ring(GeoPoint::new(36.5, 128.7), 20.0);
        ring[2] = GeoPoint::new(95.0, 0.0);
        assert!(matches!(
            Boundary::commit(&ring, &geometry),
            Err(ShapeError::InvalidPoint { index: 2, .. })
        ));
    }

    #[test]
    fn test_commit_rejects_bowtie() {
        let geometry = ClipperGeometry::new();
        let ring = square_ring(GeoPoint::new(36.5, 128.7), 20.0);
        let bowtie = vec![ring[0], ring[2], ring[1], ring[3]];
        assert_eq!(
            Boundary::commit(&bowtie, &geometry),
            Err(ShapeError::SelfIntersecting)
        );
    }

    #[test]
    fn test_area_invariant_under_rotation_and_reversal() {
        let geometry = ClipperGeometry::new();
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let ring = vec![
            frame.to_geo(0.0, 0.0),
            frame.to_geo(80.0, 10.0),
            frame.to_geo(95.0, 70.0),
            frame.to_geo(30.0, 90.0),
            frame.to_geo(-10.0, 40.0),
        ];
        let base = Boundary::commit(&ring, &geometry).unwrap().area_m2();

        for k in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(k);
            let area = Boundary::commit(&rotated, &geometry).unwrap().area_m2();
            assert!((area - base).abs() < 1e-6 * base);
        }

        let mut reversed = ring.clone();
        reversed.reverse();
        let area = Boundary::commit(&reversed, &geometry).unwrap().area_m2();
        assert!((area - base).abs() < 1e-6 * base);
    }

    #[test]
    fn test_road_commit() {
        let a = GeoPoint::new(36.5, 128.7);
        let b = GeoPoint::new(36.501, 128.7);
        assert!(RoadPath::commit(&[a]).is_err());
        let road = RoadPath::commit(&[a, b]).unwrap();
        assert_eq!(road.points(), &[a, b]);
    }

    #[test]
    fn test_road_serializes_as_point_list() {
        let road = RoadPath::commit(&[GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)]).unwrap();
        let json = serde_json::to_string(&road).unwrap();
        assert_eq!(json, r#"[{"lat":1.0,"lng":2.0},{"lat":3.0,"lng":4.0}]"#);
    }
}
