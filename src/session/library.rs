//! Saved-design library.
//!
//! Designs are kept newest first under [`DESIGNS_KEY`], at most
//! [`MAX_SAVED_DESIGNS`] of them. Saving an eleventh drops the oldest.

use crate::config::PlantingConfig;
use crate::geometry::GeoPoint;
use crate::layout::LayoutResult;
use crate::storage::{load_json, save_json, KeyValueStore, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store key of the design library.
pub const DESIGNS_KEY: &str = "farm-designs";

/// Designs kept in the library.
pub const MAX_SAVED_DESIGNS: usize = 10;

/// A named design: inputs plus the result summary at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDesign {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub config: PlantingConfig,
    /// Summary without tree positions.
    pub result: LayoutResult,
    pub boundary: Vec<GeoPoint>,
    #[serde(default)]
    pub roads: Vec<Vec<GeoPoint>>,
}

/// Ordered collection of saved designs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignLibrary {
    designs: Vec<SavedDesign>,
}

impl DesignLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the library from a store; an absent key is an empty library.
    pub fn load(store: &dyn KeyValueStore) -> StoreResult<Self> {
        let mut designs: Vec<SavedDesign> = load_json(store, DESIGNS_KEY)?.unwrap_or_default();
        designs.truncate(MAX_SAVED_DESIGNS);
        Ok(Self { designs })
    }

    /// Write the library back.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> StoreResult<()> {
        save_json(store, DESIGNS_KEY, &self.designs)
    }

    /// Add a design at the front, evicting the oldest past capacity.
    ///
    /// A design with the same id replaces the existing one.
    pub fn insert(&mut self, design: SavedDesign) {
        self.designs.retain(|d| d.id != design.id);
        self.designs.insert(0, design);
        self.designs.truncate(MAX_SAVED_DESIGNS);
    }

    /// Remove a design by id.
    pub fn remove(&mut self, id: &str) -> Option<SavedDesign> {
        let idx = self.designs.iter().position(|d| d.id == id)?;
        Some(self.designs.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&SavedDesign> {
        self.designs.iter().find(|d| d.id == id)
    }

    /// Designs, newest first.
    pub fn designs(&self) -> &[SavedDesign] {
        &self.designs
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// An id not used by any stored design, derived from `millis`.
    pub fn fresh_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::YieldRange;
    use crate::storage::MemoryStore;

    fn design(id: &str) -> SavedDesign {
        SavedDesign {
            id: id.to_string(),
            name: format!("fuji {id}"),
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            config: PlantingConfig::default(),
            result: LayoutResult {
                tree_count: 10,
                area_m2: 500.0,
                area_pyeong: 151.25,
                road_area_m2: 0.0,
                plantable_area_m2: 400.0,
                estimated_yield: YieldRange {
                    min_kg: 300.0,
                    max_kg: 450.0,
                },
                tree_positions: Vec::new(),
                diagnostics: Vec::new(),
            },
            boundary: vec![
                GeoPoint::new(36.0, 128.0),
                GeoPoint::new(36.001, 128.0),
                GeoPoint::new(36.001, 128.001),
            ],
            roads: Vec::new(),
        }
    }

    #[test]
    fn test_newest_first_and_capacity() {
        let mut library = DesignLibrary::new();
        for i in 0..12 {
            library.insert(design(&i.to_string()));
        }
        assert_eq!(library.len(), MAX_SAVED_DESIGNS);
        assert_eq!(library.designs()[0].id, "11");
        assert_eq!(library.designs()[MAX_SAVED_DESIGNS - 1].id, "2");
        assert!(library.get("0").is_none());
        assert!(library.get("1").is_none());
    }

    #[test]
    fn test_remove() {
        let mut library = DesignLibrary::new();
        library.insert(design("a"));
        library.insert(design("b"));
        assert_eq!(library.remove("a").map(|d| d.id), Some("a".to_string()));
        assert!(library.remove("a").is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(DesignLibrary::load(&store).unwrap().is_empty());

        let mut library = DesignLibrary::new();
        library.insert(design("a"));
        library.save(&mut store).unwrap();

        let raw = store.get(DESIGNS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"date\":\"2026-04-01\""));

        let loaded = DesignLibrary::load(&store).unwrap();
        assert_eq!(loaded, library);
    }

    #[test]
    fn test_fresh_id_skips_taken() {
        let mut library = DesignLibrary::new();
        library.insert(design("1000"));
        assert_eq!(library.fresh_id(1000), "1001");
        assert_eq!(library.fresh_id(5), "5");
    }
}
