//! Configuration module for planting settings.
//!
//! This module provides the [`PlantingConfig`] consumed by every layout
//! computation, the supported value ranges, and JSON file helpers.

mod planting_config;

pub use planting_config::{
    PlantingConfig, BOUNDARY_MARGIN_RANGE, DEFAULT_BOUNDARY_MARGIN, ROAD_WIDTH_RANGE,
    ROW_ANGLE_RANGE, ROW_SPACING_RANGE, SETBACK_DISTANCE_RANGE, TREE_SPACING_RANGE,
};

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
