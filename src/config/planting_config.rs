//! Planting configuration.
//!
//! This module provides the [`PlantingConfig`] value object consumed by
//! every layout computation, with clamping to the supported ranges and JSON
//! persistence helpers.

use super::{ConfigError, ConfigResult};
use crate::catalog::{MachineSpec, RootstockSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Supported row spacing (m).
pub const ROW_SPACING_RANGE: RangeInclusive<f64> = 2.0..=8.0;
/// Supported tree spacing within a row (m).
pub const TREE_SPACING_RANGE: RangeInclusive<f64> = 1.0..=6.0;
/// Supported row angle (degrees from north).
pub const ROW_ANGLE_RANGE: RangeInclusive<f64> = 0.0..=180.0;
/// Supported road width (m).
pub const ROAD_WIDTH_RANGE: RangeInclusive<f64> = 2.0..=6.0;
/// Supported setback distance when setback is enabled (m).
pub const SETBACK_DISTANCE_RANGE: RangeInclusive<f64> = 0.5..=2.0;
/// Supported inward margin when setback is disabled (m).
pub const BOUNDARY_MARGIN_RANGE: RangeInclusive<f64> = 0.0..=5.0;

/// Inward margin applied when setback is disabled, keeping trees off the
/// property line itself.
pub const DEFAULT_BOUNDARY_MARGIN: f64 = 2.0;

/// Planting parameters for one layout computation.
///
/// Field names serialize in camelCase so configs saved by the web client
/// load unchanged; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlantingConfig {
    /// Apple variety id, used to look up yield per tree.
    pub variety_id: String,

    /// Rootstock id, used for spacing recommendations.
    pub rootstock_id: String,

    /// Orchard machine id, used for pass-width checks.
    pub machine_id: String,

    /// Distance between rows (m).
    pub row_spacing: f64,

    /// Distance between trees within a row (m).
    pub tree_spacing: f64,

    /// Lattice rotation (degrees, counterclockwise).
    pub row_angle: f64,

    /// Width of every road strip (m).
    pub road_width: f64,

    /// Whether the configured setback distance applies.
    pub setback_enabled: bool,

    /// Setback from the boundary when enabled (m).
    pub setback_distance: f64,

    /// Inward margin used when setback is disabled (m, 0 = plant up to the line).
    pub boundary_margin: f64,
}

impl Default for PlantingConfig {
    fn default() -> Self {
        Self {
            variety_id: "fuji".to_string(),
            rootstock_id: "M26".to_string(),
            machine_id: "ss".to_string(),
            row_spacing: 5.0,
            tree_spacing: 4.0,
            row_angle: 0.0,
            road_width: 3.0,
            setback_enabled: true,
            setback_distance: 1.0,
            boundary_margin: DEFAULT_BOUNDARY_MARGIN,
        }
    }
}

fn clamp_or(value: f64, range: &RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

impl PlantingConfig {
    /// Return a copy with every numeric field clamped to its supported range.
    ///
    /// NaN values are replaced with the default for that field.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            variety_id: self.variety_id.clone(),
            rootstock_id: self.rootstock_id.clone(),
            machine_id: self.machine_id.clone(),
            row_spacing: clamp_or(self.row_spacing, &ROW_SPACING_RANGE, defaults.row_spacing),
            tree_spacing: clamp_or(self.tree_spacing, &TREE_SPACING_RANGE, defaults.tree_spacing),
            row_angle: clamp_or(self.row_angle, &ROW_ANGLE_RANGE, defaults.row_angle),
            road_width: clamp_or(self.road_width, &ROAD_WIDTH_RANGE, defaults.road_width),
            setback_enabled: self.setback_enabled,
            setback_distance: clamp_or(
                self.setback_distance,
                &SETBACK_DISTANCE_RANGE,
                defaults.setback_distance,
            ),
            boundary_margin: clamp_or(
                self.boundary_margin,
                &BOUNDARY_MARGIN_RANGE,
                defaults.boundary_margin,
            ),
        }
    }

    /// Check whether every numeric field is already inside its range.
    pub fn is_within_ranges(&self) -> bool {
        ROW_SPACING_RANGE.contains(&self.row_spacing)
            && TREE_SPACING_RANGE.contains(&self.tree_spacing)
            && ROW_ANGLE_RANGE.contains(&self.row_angle)
            && ROAD_WIDTH_RANGE.contains(&self.road_width)
            && SETBACK_DISTANCE_RANGE.contains(&self.setback_distance)
            && BOUNDARY_MARGIN_RANGE.contains(&self.boundary_margin)
    }

    /// Inward distance the setback engine applies (m).
    #[inline]
    pub fn effective_setback(&self) -> f64 {
        if self.setback_enabled {
            self.setback_distance
        } else {
            self.boundary_margin
        }
    }

    /// Set row and tree spacing.
    pub fn with_spacing(mut self, row: f64, tree: f64) -> Self {
        self.row_spacing = row;
        self.tree_spacing = tree;
        self
    }

    /// Set the row angle.
    pub fn with_row_angle(mut self, angle: f64) -> Self {
        self.row_angle = angle;
        self
    }

    /// Set the road width.
    pub fn with_road_width(mut self, width: f64) -> Self {
        self.road_width = width;
        self
    }

    /// Enable setback at `distance`, or disable it with `None`.
    pub fn with_setback(mut self, distance: Option<f64>) -> Self {
        match distance {
            Some(d) => {
                self.setback_enabled = true;
                self.setback_distance = d;
            }
            None => self.setback_enabled = false,
        }
        self
    }

    /// Set the margin used when setback is disabled.
    pub fn with_boundary_margin(mut self, margin: f64) -> Self {
        self.boundary_margin = margin;
        self
    }

    /// Switch to a rootstock and adopt its recommended spacing.
    pub fn apply_rootstock(&mut self, rootstock: &RootstockSpec) {
        self.rootstock_id = rootstock.id.clone();
        self.row_spacing = rootstock.row_spacing.recommended;
        self.tree_spacing = rootstock.tree_spacing.recommended;
    }

    /// Switch to a machine, widening rows and roads to its pass width.
    pub fn apply_machine(&mut self, machine: &MachineSpec) {
        self.machine_id = machine.id.clone();
        self.road_width = self.road_width.max(machine.min_pass_width);
        self.row_spacing = self.row_spacing.max(machine.min_pass_width);
    }

    /// True if rows are too narrow for `machine` to pass.
    pub fn lacks_clearance_for(&self, machine: &MachineSpec) -> bool {
        self.row_spacing < machine.min_pass_width
    }

    /// Load a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Save to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl fmt::Display for PlantingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}: {}m x {}m at {}°, roads {}m, setback {}m",
            self.variety_id,
            self.rootstock_id,
            self.row_spacing,
            self.tree_spacing,
            self.row_angle,
            self.road_width,
            self.effective_setback()
        )
    }
}
