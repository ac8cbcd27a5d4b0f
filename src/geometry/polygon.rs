//! Ring helpers shared by the boundary model and the Clipper backend.
//!
//! Rings are stored open: the last vertex connects back to the first and the
//! closing vertex is never repeated. `geo` wants closed rings, so
//! [`to_polygon`] closes them on the way out.

use super::GeoPoint;
use geo::{Coord, Intersects, Line, LineString, Polygon};

/// Drop consecutive duplicates and a trailing copy of the first vertex.
pub fn open_ring(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last() != Some(p) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Signed area of an open ring using the shoelace formula.
///
/// Positive for counter-clockwise rings.
pub fn signed_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..ring.len() {
        let j = (i + 1) % ring.len();
        sum += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    sum / 2.0
}

/// Close an open ring into a `geo` polygon without holes.
pub fn to_polygon(ring: &[Coord<f64>]) -> Polygon<f64> {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (closed.first(), closed.last()) {
        if first != last {
            closed.push(*first);
        }
    }
    Polygon::new(LineString::new(closed), vec![])
}

/// Check that no two non-adjacent edges of an open ring touch.
///
/// Rings with fewer than 4 vertices are always simple.
pub fn is_simple(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    if n < 4 {
        return true;
    }

    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];
        for j in (i + 1)..n {
            // adjacent edges share a vertex
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Closed-segment intersection test, collinear overlaps included.
pub fn segments_intersect(a1: Coord<f64>, a2: Coord<f64>, b1: Coord<f64>, b2: Coord<f64>) -> bool {
    Line::new(a1, a2).intersects(&Line::new(b1, b2))
}
