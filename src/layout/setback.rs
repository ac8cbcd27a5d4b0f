//! Setback engine: shrinks the boundary to the candidate plantable region.

use super::LayoutDiagnostic;
use crate::config::PlantingConfig;
use crate::geometry::{GeometryService, Region};

/// The region left after the inward margin.
#[derive(Debug, Clone, PartialEq)]
pub struct SetbackOutcome {
    /// Candidate plantable region.
    pub region: Region,
    /// Margin that was requested (m).
    pub distance: f64,
    /// The shrink failed and `region` is the unshrunk boundary.
    pub fell_back: bool,
}

impl SetbackOutcome {
    /// Diagnostic to attach to the layout result, if any.
    pub fn diagnostic(&self) -> Option<LayoutDiagnostic> {
        self.fell_back.then_some(LayoutDiagnostic::SetbackFallback {
            distance: self.distance,
        })
    }
}

/// Shrink `boundary` by the config's effective setback.
///
/// A failed shrink never empties the plot: the unshrunk boundary is used
/// instead and the outcome is flagged.
pub fn apply_setback<G: GeometryService>(
    geometry: &G,
    boundary: &Region,
    config: &PlantingConfig,
) -> SetbackOutcome {
    let distance = config.effective_setback();
    if distance <= 0.0 {
        return SetbackOutcome {
            region: boundary.clone(),
            distance,
            fell_back: false,
        };
    }

    match geometry.buffer_inward(boundary, distance) {
        Some(region) => SetbackOutcome {
            region,
            distance,
            fell_back: false,
        },
        None => {
            log::warn!(
                "inward buffer of {:.2}m failed, planting up to the boundary",
                distance
            );
            SetbackOutcome {
                region: boundary.clone(),
                distance,
                fell_back: true,
            }
        }
    }
}
