//! Persisted session state.

use crate::geometry::GeoPoint;
use serde::{Deserialize, Serialize};

/// Store key of the drawing snapshot.
pub const SNAPSHOT_KEY: &str = "farm-design-cache";

/// Store key of the persisted planting config.
pub const CONFIG_KEY: &str = "farm-design-config";

/// Map center shown before anything is drawn (Andong, Gyeongbuk).
pub const DEFAULT_VIEW_CENTER: GeoPoint = GeoPoint::new(36.5, 128.7);

/// Map zoom shown before anything is drawn.
pub const DEFAULT_VIEW_ZOOM: f64 = 13.0;

/// Map viewport the session was last looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_VIEW_CENTER,
            zoom: DEFAULT_VIEW_ZOOM,
        }
    }
}

/// The committed drawing, as written under [`SNAPSHOT_KEY`].
///
/// Only inputs are stored. The layout is always recomputed on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub boundary: Option<Vec<GeoPoint>>,
    pub roads: Vec<Vec<GeoPoint>>,
    pub view_center: Option<GeoPoint>,
    pub view_zoom: Option<f64>,
}

impl SessionSnapshot {
    /// Viewport with defaults filled in.
    pub fn view(&self) -> ViewState {
        let default = ViewState::default();
        ViewState {
            center: self
                .view_center
                .filter(GeoPoint::is_valid)
                .unwrap_or(default.center),
            zoom: self
                .view_zoom
                .filter(|z| z.is_finite())
                .unwrap_or(default.zoom),
        }
    }

    /// True if there is nothing to restore.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_none() && self.roads.is_empty()
    }
}
