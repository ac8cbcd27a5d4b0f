//! Reference data for orchard design.
//!
//! This module provides the rootstock, machine and yield tables the layout
//! engine and the drawing session consult:
//! - [`RootstockSpec`] - recommended row/tree spacing per rootstock
//! - [`MachineSpec`] - minimum pass width per orchard machine
//! - [`YieldPerTree`] - per-variety yield bounds used for the estimate
//!
//! ## Example
//!
//! ```rust,ignore
//! use orchard_layout::catalog::Catalog;
//!
//! // Built-in tables
//! let catalog = Catalog::builtin();
//! let m26 = catalog.rootstock("M26").unwrap();
//!
//! // Or a site-specific table
//! let catalog = Catalog::from_file("catalog.json")?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalog entry: {0}")]
    Invalid(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// ============================================================================
// Entry Types
// ============================================================================

/// Min / recommended / max spacing in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingRange {
    pub min: f64,
    pub recommended: f64,
    pub max: f64,
}

impl SpacingRange {
    pub const fn new(min: f64, recommended: f64, max: f64) -> Self {
        Self {
            min,
            recommended,
            max,
        }
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.recommended && self.recommended <= self.max
    }
}

/// Vigor class of a rootstock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vigor {
    Dwarf,
    SemiDwarf,
    SemiVigorous,
    Standard,
}

/// Growth characteristics and spacing advice for one rootstock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootstockSpec {
    /// Unique identifier (e.g. "M9")
    pub id: String,

    /// Display name
    pub name: String,

    pub vigor: Vigor,

    /// Mature tree height (m)
    pub max_height: f64,

    /// Mature canopy width (m)
    pub canopy_width: f64,

    pub row_spacing: SpacingRange,

    pub tree_spacing: SpacingRange,
}

/// An orchard machine that must drive between rows and along roads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    /// Unique identifier (e.g. "ss")
    pub id: String,

    /// Display name
    pub name: String,

    /// Body width (m)
    pub width: f64,

    /// Minimum lane width including side clearance (m)
    pub min_pass_width: f64,

    /// Minimum turning radius (m)
    pub turning_radius: f64,
}

/// Expected harvest per mature tree, in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldPerTree {
    pub min_kg: f64,
    pub max_kg: f64,
}

impl Default for YieldPerTree {
    fn default() -> Self {
        Self {
            min_kg: 30.0,
            max_kg: 45.0,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Lookup tables for rootstocks, machines and variety yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub rootstocks: Vec<RootstockSpec>,

    #[serde(default)]
    pub machines: Vec<MachineSpec>,

    /// Per-variety yield bounds keyed by variety id.
    #[serde(default)]
    pub yields: BTreeMap<String, YieldPerTree>,

    /// Used for varieties missing from `yields`.
    #[serde(default)]
    pub default_yield: YieldPerTree,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The standard rootstock and machine tables.
    pub fn builtin() -> Self {
        let rootstocks = vec![
            RootstockSpec {
                id: "M9".to_string(),
                name: "M9 (T337)".to_string(),
                vigor: Vigor::Dwarf,
                max_height: 3.0,
                canopy_width: 1.75,
                row_spacing: SpacingRange::new(3.5, 3.75, 4.0),
                tree_spacing: SpacingRange::new(1.5, 1.75, 2.0),
            },
            RootstockSpec {
                id: "M26".to_string(),
                name: "M26".to_string(),
                vigor: Vigor::SemiDwarf,
                max_height: 4.0,
                canopy_width: 2.75,
                row_spacing: SpacingRange::new(4.5, 4.75, 5.0),
                tree_spacing: SpacingRange::new(2.5, 3.0, 3.5),
            },
            RootstockSpec {
                id: "MM106".to_string(),
                name: "MM106".to_string(),
                vigor: Vigor::SemiVigorous,
                max_height: 4.5,
                canopy_width: 3.25,
                row_spacing: SpacingRange::new(5.0, 5.5, 6.0),
                tree_spacing: SpacingRange::new(3.0, 3.5, 4.0),
            },
            RootstockSpec {
                id: "seedling".to_string(),
                name: "Seedling".to_string(),
                vigor: Vigor::Standard,
                max_height: 6.0,
                canopy_width: 4.5,
                row_spacing: SpacingRange::new(6.0, 7.0, 8.0),
                tree_spacing: SpacingRange::new(4.0, 5.0, 6.0),
            },
        ];

        let machines = vec![
            MachineSpec {
                id: "ss".to_string(),
                name: "Speed sprayer".to_string(),
                width: 1.8,
                min_pass_width: 3.0,
                turning_radius: 3.5,
            },
            MachineSpec {
                id: "tractor-small".to_string(),
                name: "Small tractor (25-35hp)".to_string(),
                width: 1.4,
                min_pass_width: 2.5,
                turning_radius: 2.8,
            },
            MachineSpec {
                id: "tractor-mid".to_string(),
                name: "Mid tractor (50-70hp)".to_string(),
                width: 1.9,
                min_pass_width: 3.2,
                turning_radius: 4.0,
            },
            MachineSpec {
                id: "cultivator".to_string(),
                name: "Power tiller".to_string(),
                width: 1.0,
                min_pass_width: 2.0,
                turning_radius: 2.0,
            },
        ];

        Self {
            rootstocks,
            machines,
            yields: BTreeMap::new(),
            default_yield: YieldPerTree::default(),
        }
    }

    /// Look up a rootstock by id.
    pub fn rootstock(&self, id: &str) -> Option<&RootstockSpec> {
        self.rootstocks.iter().find(|r| r.id == id)
    }

    /// Look up a machine by id.
    pub fn machine(&self, id: &str) -> Option<&MachineSpec> {
        self.machines.iter().find(|m| m.id == id)
    }

    /// Yield bounds for a variety, falling back to the default.
    pub fn yield_for(&self, variety_id: &str) -> YieldPerTree {
        self.yields
            .get(variety_id)
            .copied()
            .unwrap_or(self.default_yield)
    }

    /// Register yield bounds for a variety.
    pub fn set_yield(&mut self, variety_id: impl Into<String>, per_tree: YieldPerTree) {
        self.yields.insert(variety_id.into(), per_tree);
    }

    /// Check that every range is ordered and every yield bound sensible.
    pub fn validate(&self) -> CatalogResult<()> {
        for r in &self.rootstocks {
            if !r.row_spacing.is_ordered() || !r.tree_spacing.is_ordered() {
                return Err(CatalogError::Invalid(format!(
                    "rootstock '{}' has unordered spacing",
                    r.id
                )));
            }
        }
        for m in &self.machines {
            if m.min_pass_width <= 0.0 {
                return Err(CatalogError::Invalid(format!(
                    "machine '{}' has non-positive pass width",
                    m.id
                )));
            }
        }
        let yields = self
            .yields
            .iter()
            .map(|(id, y)| (id.as_str(), y))
            .chain(std::iter::once(("default", &self.default_yield)));
        for (id, y) in yields {
            if y.min_kg < 0.0 || y.min_kg > y.max_kg {
                return Err(CatalogError::Invalid(format!(
                    "yield for '{}' has min {} > max {}",
                    id, y.min_kg, y.max_kg
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a catalog from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
