//! Orchard layout pipeline.
//!
//! This module turns a committed [`Boundary`], its [`RoadPath`]s and a
//! [`PlantingConfig`] into a [`LayoutResult`]:
//!
//! 1. [`setback`] shrinks the boundary by the inward margin
//! 2. [`roads`] cuts buffered road strips out of what is left
//! 3. [`grid`] lays a rotated lattice over the boundary's extent
//! 4. [`filter`] keeps lattice points inside the plantable region
//! 5. [`result`] aggregates counts, areas and the yield estimate
//!
//! Every step is a pure function of `(boundary, roads, config)`, so running
//! the pipeline twice on the same inputs gives equal results, tree order
//! included.

mod boundary;
pub mod filter;
pub mod grid;
pub mod result;
pub mod roads;
pub mod setback;

pub use boundary::{Boundary, RoadPath, MIN_BOUNDARY_POINTS, MIN_ROAD_POINTS};
pub use result::{aggregate, LayoutDiagnostic, LayoutResult, TreePosition, YieldRange};

use crate::catalog::YieldPerTree;
use crate::clipper::ClipperGeometry;
use crate::config::PlantingConfig;
use crate::geometry::{GeoPoint, GeometryService};
use grid::Lattice;

/// Errors from validating drawn shapes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    /// Not enough (distinct) vertices.
    #[error("at least {required} points are required, got {found}")]
    TooFewPoints { required: usize, found: usize },

    /// A vertex is not a valid WGS84 coordinate.
    #[error("point {index} {point} is not a valid coordinate")]
    InvalidPoint { index: usize, point: GeoPoint },

    /// Two non-adjacent edges of the ring cross or touch.
    #[error("boundary edges cross each other")]
    SelfIntersecting,

    /// The geometry backend could not derive a centroid.
    #[error("shape is degenerate")]
    Degenerate,
}

/// Result type for shape validation.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Runs the layout pipeline against a [`GeometryService`].
#[derive(Debug, Clone)]
pub struct LayoutEngine<G: GeometryService = ClipperGeometry> {
    geometry: G,
}

impl Default for LayoutEngine<ClipperGeometry> {
    fn default() -> Self {
        Self::new(ClipperGeometry::default())
    }
}

impl<G: GeometryService> LayoutEngine<G> {
    /// Create an engine over the given geometry backend.
    pub fn new(geometry: G) -> Self {
        Self { geometry }
    }

    /// The geometry backend.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Compute a complete layout.
    ///
    /// Never fails: geometry failures are recovered and reported through
    /// [`LayoutResult::diagnostics`]. Out-of-range config values are clamped
    /// with [`PlantingConfig::sanitized`] first.
    pub fn compute(
        &self,
        boundary: &Boundary,
        roads: &[RoadPath],
        config: &PlantingConfig,
        per_tree: YieldPerTree,
    ) -> LayoutResult {
        let geometry = &self.geometry;
        let config = &config.sanitized();

        let setback = setback::apply_setback(geometry, boundary.region(), config);
        let mut diagnostics: Vec<LayoutDiagnostic> = setback.diagnostic().into_iter().collect();

        let cut = roads::subtract_roads(
            geometry,
            boundary.frame(),
            roads,
            config.road_width,
            setback.region,
        );
        diagnostics.extend(cut.diagnostics);

        let lattice = Lattice::new(*boundary.frame(), boundary.diagonal_m(), config);
        log::debug!(
            "evaluating {} lattice candidates ({} steps)",
            lattice.candidate_count(),
            lattice.steps()
        );
        let trees = filter::filter_trees(geometry, lattice, &cut.region);

        let result = aggregate(
            geometry,
            boundary,
            &cut.region,
            cut.road_area_m2,
            trees,
            per_tree,
            diagnostics,
        );
        log::debug!("layout: {}", result);
        result
    }

    /// Validate a ring and compute its layout in one go.
    pub fn compute_for_points(
        &self,
        boundary: &[GeoPoint],
        roads: &[Vec<GeoPoint>],
        config: &PlantingConfig,
        per_tree: YieldPerTree,
    ) -> ShapeResult<LayoutResult> {
        let boundary = Boundary::commit(boundary, &self.geometry)?;
        let roads = roads
            .iter()
            .map(|r| RoadPath::commit(r))
            .collect::<ShapeResult<Vec<_>>>()?;
        Ok(self.compute(&boundary, &roads, config, per_tree))
    }
}
