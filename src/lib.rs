//! Orchard planting layout engine.
//!
//! Given a farm-plot boundary, optional internal roads and a
//! [`PlantingConfig`](config::PlantingConfig), the engine computes a
//! deterministic tree lattice together with the total, road and plantable
//! areas. A [`DrawingSession`](session::DrawingSession) drives the
//! interactive side: drawing the boundary, drawing roads, undo/cancel, and a
//! full recomputation after every committed edit.
//!
//! ## Pipeline
//!
//! ```text
//! Boundary ──► Setback ──► Road strips ──► Lattice ──► Filter ──► LayoutResult
//! ```
//!
//! All planar math happens in a [`LocalFrame`](geometry::LocalFrame)
//! anchored at the boundary centroid, through the
//! [`GeometryService`](geometry::GeometryService) trait.
//!
//! ## Example
//!
//! ```rust,ignore
//! use orchard_layout::prelude::*;
//!
//! let mut session = DrawingSession::new(PlantingConfig::default());
//! session.start(DrawTarget::Boundary)?;
//! for p in corners {
//!     session.add_point(p)?;
//! }
//! session.finish()?;
//! println!("{} trees", session.result().unwrap().tree_count);
//! ```

pub mod catalog;
pub mod clipper;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod scene;
pub mod services;
pub mod session;
pub mod storage;

/// Meters per degree of latitude used by the local projection.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Pyeong per square meter (1 pyeong ≈ 3.3058 m²).
pub const PYEONG_PER_SQUARE_METER: f64 = 0.3025;

/// Convert square meters to pyeong.
#[inline]
pub fn to_pyeong(area_m2: f64) -> f64 {
    area_m2 * PYEONG_PER_SQUARE_METER
}

/// Commonly used types.
pub mod prelude {
    pub use crate::catalog::{Catalog, YieldPerTree};
    pub use crate::clipper::ClipperGeometry;
    pub use crate::config::PlantingConfig;
    pub use crate::geometry::{GeoPoint, GeometryService, LocalFrame};
    pub use crate::layout::{Boundary, LayoutEngine, LayoutResult, RoadPath, TreePosition};
    pub use crate::session::{DrawTarget, DrawingSession, Mode, SessionError, SessionEvent};
    pub use crate::storage::{KeyValueStore, MemoryStore};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pyeong() {
        assert!((to_pyeong(1000.0) - 302.5).abs() < 1e-9);
    }
}
