//! Road network: buffers centerlines into strips and cuts them out of the
//! plantable region.

use super::{LayoutDiagnostic, RoadPath};
use crate::geometry::{GeometryService, LocalFrame, Region};

/// Plantable region and road area after subtracting every road.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadOutcome {
    /// Plantable region with all road strips removed.
    pub region: Region,
    /// Sum of full strip areas, including any part outside the boundary (m²).
    pub road_area_m2: f64,
    /// Recovered failures, in road order.
    pub diagnostics: Vec<LayoutDiagnostic>,
}

/// Subtract each road's strip from `plantable`, in commit order.
///
/// A road whose strip cannot be subtracted still counts toward the road
/// area; only its cut is skipped.
pub fn subtract_roads<G: GeometryService>(
    geometry: &G,
    frame: &LocalFrame,
    roads: &[RoadPath],
    road_width: f64,
    plantable: Region,
) -> RoadOutcome {
    let half_width = road_width / 2.0;
    let mut region = plantable;
    let mut road_area_m2 = 0.0;
    let mut diagnostics = Vec::new();

    for (index, road) in roads.iter().enumerate() {
        let line = road.to_local(frame);
        let Some(strip) = geometry.buffer_outward(&line, half_width) else {
            log::warn!("road {} could not be buffered, ignoring it", index);
            diagnostics.push(LayoutDiagnostic::RoadBufferFailed { road: index });
            continue;
        };

        road_area_m2 += geometry.area(&strip);

        match geometry.difference(&region, &strip) {
            Some(rest) => region = rest,
            None => {
                log::warn!("subtracting road {} failed, keeping its area only", index);
                diagnostics.push(LayoutDiagnostic::RoadSubtractionSkipped { road: index });
            }
        }
    }

    RoadOutcome {
        region,
        road_area_m2,
        diagnostics,
    }
}
