//! Domain model for the place picker.
//!
//! # Responsibility
//! - Define the catalog entity (`Place`) and its stable identifier.
//! - Provide the geographic primitives used to order places by proximity.
//!
//! # Invariants
//! - Every place is identified by a validated `PlaceId`.
//! - Coordinates are finite and inside their geographic ranges.

pub mod geo;
pub mod place;
