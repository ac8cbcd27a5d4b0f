//! Layout results and the aggregator that builds them.

use super::Boundary;
use crate::catalog::YieldPerTree;
use crate::geometry::{GeoPoint, GeometryService, Region};
use crate::to_pyeong;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A planted tree: a lattice position that survived filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreePosition {
    pub position: GeoPoint,
    /// Lattice row index.
    pub row: i32,
    /// Lattice position within the row.
    pub slot: i32,
}

/// Estimated harvest range for the whole layout (kg).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

/// A geometry failure the pipeline recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutDiagnostic {
    /// The inward buffer failed; trees may reach the boundary line.
    SetbackFallback { distance: f64 },
    /// A road could not be buffered and was ignored.
    RoadBufferFailed { road: usize },
    /// A road's strip was tallied but not cut from the plantable region.
    RoadSubtractionSkipped { road: usize },
    /// Nothing could be planted.
    NoPlantableArea,
}

impl fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetbackFallback { distance } => {
                write!(f, "setback of {distance}m could not be applied")
            }
            Self::RoadBufferFailed { road } => write!(f, "road {road} has no usable length"),
            Self::RoadSubtractionSkipped { road } => {
                write!(f, "road {road} could not be cut from the planting area")
            }
            Self::NoPlantableArea => write!(f, "no plantable area remains"),
        }
    }
}

/// Snapshot of one layout computation.
///
/// A result is never updated in place; every recomputation produces a new
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub tree_count: usize,
    /// Boundary area (m²).
    pub area_m2: f64,
    /// Boundary area (pyeong).
    pub area_pyeong: f64,
    /// Total road strip area (m²).
    pub road_area_m2: f64,
    /// Area left for planting after setback and roads (m²).
    pub plantable_area_m2: f64,
    pub estimated_yield: YieldRange,
    pub tree_positions: Vec<TreePosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<LayoutDiagnostic>,
}

impl LayoutResult {
    /// Check whether any tree was placed.
    pub fn has_trees(&self) -> bool {
        self.tree_count > 0
    }

    /// Copy of this result without tree positions, for compact storage.
    pub fn summary(&self) -> Self {
        Self {
            tree_positions: Vec::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for LayoutResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trees on {:.0}m² ({:.0} pyeong), roads {:.0}m², plantable {:.0}m², yield {:.0}~{:.0}kg",
            self.tree_count,
            self.area_m2,
            self.area_pyeong,
            self.road_area_m2,
            self.plantable_area_m2,
            self.estimated_yield.min_kg,
            self.estimated_yield.max_kg
        )
    }
}

/// Assemble a result from the pipeline outputs.
///
/// Pure: the same inputs always give an equal result.
pub fn aggregate<G: GeometryService>(
    geometry: &G,
    boundary: &Boundary,
    plantable: &Region,
    road_area_m2: f64,
    trees: Vec<TreePosition>,
    per_tree: YieldPerTree,
    mut diagnostics: Vec<LayoutDiagnostic>,
) -> LayoutResult {
    let area_m2 = boundary.area_m2();
    let plantable_area_m2 = geometry.area(plantable).max(0.0);
    let tree_count = trees.len();

    if tree_count == 0 {
        diagnostics.push(LayoutDiagnostic::NoPlantableArea);
    }

    LayoutResult {
        tree_count,
        area_m2,
        area_pyeong: to_pyeong(area_m2),
        road_area_m2,
        plantable_area_m2,
        estimated_yield: YieldRange {
            min_kg: tree_count as f64 * per_tree.min_kg,
            max_kg: tree_count as f64 * per_tree.max_kg,
        },
        tree_positions: trees,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::ClipperGeometry;
    use crate::geometry::LocalFrame;

    fn boundary() -> Boundary {
        let frame = LocalFrame::new(GeoPoint::new(36.5, 128.7));
        let ring = vec![
            frame.to_geo(-10.0, -10.0),
            frame.to_geo(10.0, -10.0),
            frame.to_geo(10.0, 10.0),
            frame.to_geo(-10.0, 10.0),
        ];
        Boundary::commit(&ring, &ClipperGeometry::new()).unwrap()
    }

    fn tree(row: i32, slot: i32) -> TreePosition {
        TreePosition {
            position: GeoPoint::new(36.5, 128.7),
            row,
            slot,
        }
    }

    #[test]
    fn test_aggregate_areas_and_yield() {
        let geometry = ClipperGeometry::new();
        let boundary = boundary();
        let result = aggregate(
            &geometry,
            &boundary,
            boundary.region(),
            12.0,
            vec![tree(0, 0), tree(0, 1)],
            YieldPerTree::default(),
            Vec::new(),
        );

        assert_eq!(result.tree_count, 2);
        assert!((result.area_m2 - 400.0).abs() < 0.1);
        assert!((result.area_pyeong - 121.0).abs() < 0.1);
        assert_eq!(result.road_area_m2, 12.0);
        assert!((result.plantable_area_m2 - 400.0).abs() < 0.1);
        assert_eq!(result.estimated_yield.min_kg, 60.0);
        assert_eq!(result.estimated_yield.max_kg, 90.0);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_aggregate_empty_layout_explains_itself() {
        let geometry = ClipperGeometry::new();
        let boundary = boundary();
        let result = aggregate(
            &geometry,
            &boundary,
            &Region::new(vec![]),
            0.0,
            Vec::new(),
            YieldPerTree::default(),
            Vec::new(),
        );

        assert!(!result.has_trees());
        assert_eq!(result.plantable_area_m2, 0.0);
        assert_eq!(result.diagnostics, vec![LayoutDiagnostic::NoPlantableArea]);
    }

    #[test]
    fn test_summary_drops_positions() {
        let geometry = ClipperGeometry::new();
        let boundary = boundary();
        let result = aggregate(
            &geometry,
            &boundary,
            boundary.region(),
            0.0,
            vec![tree(1, 1)],
            YieldPerTree::default(),
            Vec::new(),
        );
        let summary = result.summary();
        assert!(summary.tree_positions.is_empty());
        assert_eq!(summary.tree_count, 1);
    }

    #[test]
    fn test_diagnostic_serialization() {
        let json = serde_json::to_string(&LayoutDiagnostic::RoadSubtractionSkipped { road: 2 })
            .unwrap();
        assert_eq!(json, r#"{"kind":"road_subtraction_skipped","road":2}"#);
    }
}
