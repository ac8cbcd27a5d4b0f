//! Local tangent-plane projection.
//!
//! Orchard plots span a few hundred meters, so an equirectangular projection
//! anchored at the plot centroid is accurate enough for planar buffering and
//! lattice placement. Errors grow with distance from the anchor and with
//! latitude (the `cos(lat)` factor is taken at the anchor only); the frame is
//! not meant for extents beyond a few kilometers or for polar regions.

use super::GeoPoint;
use crate::METERS_PER_DEGREE;
use geo::Coord;

/// Planar meter frame anchored at a geographic origin.
///
/// `x` grows east, `y` grows north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    cos_lat: f64,
}

impl LocalFrame {
    /// Create a frame anchored at `origin`.
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    /// The anchor of this frame.
    #[inline]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Project a geographic point into local meters.
    #[inline]
    pub fn to_local(&self, p: GeoPoint) -> Coord<f64> {
        Coord {
            x: (p.lng - self.origin.lng) * METERS_PER_DEGREE * self.cos_lat,
            y: (p.lat - self.origin.lat) * METERS_PER_DEGREE,
        }
    }

    /// Map local meters back to a geographic point.
    #[inline]
    pub fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint {
            lat: self.origin.lat + y / METERS_PER_DEGREE,
            lng: self.origin.lng + x / (METERS_PER_DEGREE * self.cos_lat),
        }
    }

    /// Project a sequence of geographic points.
    pub fn project_all(&self, points: &[GeoPoint]) -> Vec<Coord<f64>> {
        points.iter().map(|p| self.to_local(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let c = frame.to_local(GeoPoint::new(36.5, 128.7));
        assert_eq!(c, Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_one_degree_north() {
        let frame = LocalFrame::new(GeoPoint::new(0.0, 0.0));
        let c = frame.to_local(GeoPoint::new(1.0, 0.0));
        assert!((c.y - METERS_PER_DEGREE).abs() < 1e-9);
        assert!(c.x.abs() < 1e-9);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let frame = LocalFrame::new(GeoPoint::new(60.0, 10.0));
        let c = frame.to_local(GeoPoint::new(60.0, 11.0));
        assert!((c.x - METERS_PER_DEGREE * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let p = frame.to_geo(123.4, -56.7);
        let c = frame.to_local(p);
        assert!((c.x - 123.4).abs() < 1e-6);
        assert!((c.y + 56.7).abs() < 1e-6);
    }
}
