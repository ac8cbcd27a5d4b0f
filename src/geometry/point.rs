//! Geographic point type.
//!
//! Everything the user draws arrives as latitude/longitude pairs in degrees.
//! Planar math happens in a [`LocalFrame`](super::LocalFrame) instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 position in degrees.
///
/// `GeoPoint` is a plain value: it is copied freely and never owns anything.
///
/// # Example
/// ```
/// use orchard_layout::geometry::GeoPoint;
///
/// let p = GeoPoint::new(36.5, 128.7);
/// assert!(p.is_valid());
///
/// // GeoJSON order is (lng, lat)
/// let q = GeoPoint::from_lng_lat(128.7, 36.5);
/// assert_eq!(p, q);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create a point from GeoJSON-ordered `(lng, lat)` values.
    #[inline]
    pub const fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both coordinates are finite and inside the WGS84 ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    /// Convert to a `geo` point (x = lng, y = lat).
    #[inline]
    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(p: geo::Point<f64>) -> Self {
        Self::from_lng_lat(p.x(), p.y())
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Interprets the tuple as `(lat, lng)`, the order the drawing surface reports.
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({:.7}, {:.7})", self.lat, self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
