//! The geometry capability the layout engine is written against.
//!
//! Nothing outside [`crate::clipper`] touches a spatial library directly, so
//! the backend can be swapped (or faked in tests) by implementing
//! [`GeometryService`].

use super::GeoPoint;
use geo::{Coord, LineString, MultiPolygon};

/// A planar region in local meters. May be empty or have several parts.
pub type Region = MultiPolygon<f64>;

/// Spatial operations used by the layout pipeline.
///
/// Planar operations take regions in the boundary's [`LocalFrame`](super::LocalFrame);
/// `centroid`, `bounding_box_diagonal` and `distance` take geographic points
/// because they are needed before a frame exists.
///
/// Operations that can fail on degenerate input return `None` rather than
/// panicking.
pub trait GeometryService {
    /// Unsigned area in square meters.
    fn area(&self, region: &Region) -> f64;

    /// Shrink a region by `distance` meters. `None` if the input is degenerate
    /// or nothing survives the shrink.
    fn buffer_inward(&self, region: &Region, distance: f64) -> Option<Region>;

    /// Expand an open polyline into a strip `half_width` meters to each side,
    /// with round caps. `None` if the line has no length.
    fn buffer_outward(&self, line: &LineString<f64>, half_width: f64) -> Option<Region>;

    /// `a` minus `b`. An empty region is a valid answer; `None` means the
    /// operation could not be carried out.
    fn difference(&self, a: &Region, b: &Region) -> Option<Region>;

    /// Point-in-polygon test. Points on an edge count as inside.
    fn contains(&self, region: &Region, point: Coord<f64>) -> bool;

    /// Vertex mean of a geographic ring.
    fn centroid(&self, ring: &[GeoPoint]) -> Option<GeoPoint>;

    /// Geodesic length of the bounding-box diagonal of a ring, in meters.
    fn bounding_box_diagonal(&self, ring: &[GeoPoint]) -> f64;

    /// Geodesic distance between two points, in meters.
    fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64;
}

impl<G: GeometryService + ?Sized> GeometryService for &G {
    fn area(&self, region: &Region) -> f64 {
        (**self).area(region)
    }

    fn buffer_inward(&self, region: &Region, distance: f64) -> Option<Region> {
        (**self).buffer_inward(region, distance)
    }

    fn buffer_outward(&self, line: &LineString<f64>, half_width: f64) -> Option<Region> {
        (**self).buffer_outward(line, half_width)
    }

    fn difference(&self, a: &Region, b: &Region) -> Option<Region> {
        (**self).difference(a, b)
    }

    fn contains(&self, region: &Region, point: Coord<f64>) -> bool {
        (**self).contains(region, point)
    }

    fn centroid(&self, ring: &[GeoPoint]) -> Option<GeoPoint> {
        (**self).centroid(ring)
    }

    fn bounding_box_diagonal(&self, ring: &[GeoPoint]) -> f64 {
        (**self).bounding_box_diagonal(ring)
    }

    fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        (**self).distance(a, b)
    }
}
