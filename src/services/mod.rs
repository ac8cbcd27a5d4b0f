//! External service seams.
//!
//! Place search and parcel-boundary lookup are network services owned by the
//! host application. The session only needs their results, so they are
//! modeled as traits plus the input/output normalization every caller owes
//! them:
//! - [`search_places`] enforces the minimum query length and caps results
//! - [`normalize_ring`] turns a registry ring into a clean counterclockwise
//!   ring before it reaches [`Boundary::commit`](crate::layout::Boundary::commit)

use crate::geometry::polygon::{open_ring, signed_area};
use crate::geometry::GeoPoint;
use geo::Coord;
use serde::{Deserialize, Serialize};

/// Shortest trimmed query worth sending to a geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

/// Most candidates returned by [`search_places`].
pub const MAX_PLACE_RESULTS: usize = 5;

/// Parts of a comma-separated place name kept in a candidate label.
pub const LABEL_PARTS: usize = 3;

/// Error type for external services.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("nothing found")]
    NotFound,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("query too short: at least {MIN_QUERY_CHARS} characters are required")]
    QueryTooShort,

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// Geocoding
// ============================================================================

/// A ranked place match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

impl PlaceCandidate {
    pub fn new(label: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            label: label.into(),
            lat,
            lng,
        }
    }

    /// Candidate position.
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Address-text geocoding.
pub trait Geocoder {
    /// Search for places matching `query`, best match first.
    fn search(&self, query: &str) -> ServiceResult<Vec<PlaceCandidate>>;
}

/// Shorten a long comma-separated place name to its leading parts.
pub fn short_label(display_name: &str) -> String {
    display_name
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(LABEL_PARTS)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run a place search with the query rules applied.
///
/// The query is trimmed and must have at least [`MIN_QUERY_CHARS`]
/// characters; results with invalid coordinates are dropped and at most
/// [`MAX_PLACE_RESULTS`] are returned, each with a shortened label.
pub fn search_places<G: Geocoder + ?Sized>(
    geocoder: &G,
    query: &str,
) -> ServiceResult<Vec<PlaceCandidate>> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(ServiceError::QueryTooShort);
    }

    let candidates = geocoder.search(query)?;
    Ok(candidates
        .into_iter()
        .filter(|c| c.position().is_valid())
        .take(MAX_PLACE_RESULTS)
        .map(|c| PlaceCandidate {
            label: short_label(&c.label),
            ..c
        })
        .collect())
}

// ============================================================================
// Parcel registry
// ============================================================================

/// Cadastral parcel-boundary lookup.
pub trait ParcelRegistry {
    /// Ring of the parcel containing `at`, in any winding.
    fn lookup(&self, at: GeoPoint) -> ServiceResult<Vec<GeoPoint>>;
}

/// Parcel payload as registries return it: GeoJSON-style `[lng, lat]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelResponse {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl ParcelResponse {
    /// Parse a JSON parcel payload into a normalized ring.
    pub fn parse(json: &str) -> ServiceResult<Vec<GeoPoint>> {
        let response: ParcelResponse =
            serde_json::from_str(json).map_err(|e| ServiceError::Malformed(e.to_string()))?;
        response.into_ring()
    }

    /// Convert to a normalized ring.
    pub fn into_ring(self) -> ServiceResult<Vec<GeoPoint>> {
        let points: Vec<GeoPoint> = self
            .coordinates
            .iter()
            .map(|[lng, lat]| GeoPoint::from_lng_lat(*lng, *lat))
            .collect();
        normalize_ring(&points)
    }
}

/// Normalize a registry ring for the boundary model.
///
/// Drops a closing duplicate and consecutive duplicates, then orders the
/// ring counterclockwise (longitude as x, latitude as y). Fails with
/// [`ServiceError::NotFound`] when fewer than 3 distinct points remain and
/// with [`ServiceError::Malformed`] on invalid coordinates.
pub fn normalize_ring(points: &[GeoPoint]) -> ServiceResult<Vec<GeoPoint>> {
    if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
        return Err(ServiceError::Malformed(format!("invalid coordinate {bad}")));
    }

    let mut ring = open_ring(points);
    if ring.len() < 3 {
        return Err(ServiceError::NotFound);
    }

    // degree space is enough for the winding sign
    let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p.lng, y: p.lat }).collect();
    if signed_area(&coords) < 0.0 {
        ring.reverse();
    }
    Ok(ring)
}
