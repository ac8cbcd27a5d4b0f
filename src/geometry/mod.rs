//! Geometry primitives for orchard layout.
//!
//! This module provides:
//! - [`GeoPoint`] - latitude/longitude input coordinates
//! - [`LocalFrame`] - the equirectangular meter frame used for planar math
//! - [`GeometryService`] - the spatial capability trait the engine depends on
//! - Ring helpers (shoelace area, simplicity check, ring closing)

mod point;
pub mod polygon;
mod projection;
mod service;

pub use point::GeoPoint;
pub use projection::LocalFrame;
pub use service::{GeometryService, Region};
