//! Planting lattice generation.
//!
//! The lattice is a rectangular grid of candidate tree positions centered on
//! the boundary centroid, `row_spacing` apart across rows and `tree_spacing`
//! apart along a row, rotated by the row angle. It covers a square of
//! `steps` cells each way, where
//!
//! ```text
//! steps = ceil(diagonal / min(row_spacing, tree_spacing)) + 2
//! ```
//!
//! which always reaches past the boundary's bounding box.
//!
//! # Ordering
//!
//! Candidates are produced row-major: `row` from `-steps` to `steps` in the
//! outer loop, `slot` from `-steps` to `steps` in the inner loop. Identical
//! inputs therefore always produce identically ordered output.

use crate::config::PlantingConfig;
use crate::geometry::{GeoPoint, LocalFrame};
use geo::Coord;

/// Safety margin added to the computed step count.
pub const LATTICE_MARGIN_STEPS: i32 = 2;

/// One candidate position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticePoint {
    /// Row index (across rows).
    pub row: i32,
    /// Position within the row.
    pub slot: i32,
    /// Offset from the centroid in local meters, after rotation.
    pub local: Coord<f64>,
    /// Geographic position.
    pub position: GeoPoint,
}

/// Half-width of the lattice in cells.
pub fn lattice_steps(diagonal_m: f64, row_spacing: f64, tree_spacing: f64) -> i32 {
    let min_spacing = row_spacing.min(tree_spacing);
    if !diagonal_m.is_finite() || diagonal_m <= 0.0 || !min_spacing.is_finite() || min_spacing <= 0.0
    {
        return LATTICE_MARGIN_STEPS;
    }
    let cells = (diagonal_m / min_spacing).ceil();
    let limit = f64::from(i32::MAX - LATTICE_MARGIN_STEPS);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to the i32 range above")]
    let cells = cells.min(limit) as i32;
    cells + LATTICE_MARGIN_STEPS
}

/// Row-major iterator over the rotated lattice.
#[derive(Debug, Clone)]
pub struct Lattice {
    frame: LocalFrame,
    row_spacing: f64,
    tree_spacing: f64,
    cos: f64,
    sin: f64,
    steps: i32,
    row: i32,
    slot: i32,
    done: bool,
}

impl Lattice {
    /// Lattice centered on `frame`'s origin covering `diagonal_m`.
    pub fn new(frame: LocalFrame, diagonal_m: f64, config: &PlantingConfig) -> Self {
        let steps = lattice_steps(diagonal_m, config.row_spacing, config.tree_spacing);
        let angle = config.row_angle.to_radians();
        Self {
            frame,
            row_spacing: config.row_spacing,
            tree_spacing: config.tree_spacing,
            cos: angle.cos(),
            sin: angle.sin(),
            steps,
            row: -steps,
            slot: -steps,
            done: false,
        }
    }

    /// Half-width in cells.
    #[inline]
    pub fn steps(&self) -> i32 {
        self.steps
    }

    /// Total number of candidates the lattice yields.
    pub fn candidate_count(&self) -> usize {
        let side = usize::try_from(self.steps)
            .unwrap_or(0)
            .saturating_mul(2)
            .saturating_add(1);
        side.saturating_mul(side)
    }

    fn point_at(&self, row: i32, slot: i32) -> LatticePoint {
        let x = f64::from(row) * self.row_spacing;
        let y = f64::from(slot) * self.tree_spacing;
        let local = Coord {
            x: x * self.cos - y * self.sin,
            y: x * self.sin + y * self.cos,
        };
        LatticePoint {
            row,
            slot,
            local,
            position: self.frame.to_geo(local.x, local.y),
        }
    }
}

impl Iterator for Lattice {
    type Item = LatticePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let point = self.point_at(self.row, self.slot);
        if self.slot < self.steps {
            self.slot += 1;
        } else if self.row < self.steps {
            self.slot = -self.steps;
            self.row += 1;
        } else {
            self.done = true;
        }
        Some(point)
    }
}
