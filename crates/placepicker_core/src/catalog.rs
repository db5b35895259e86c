//! Static place catalog and proximity ordering.
//!
//! # Responsibility
//! - Hold the read-only list of places offered by the picker.
//! - Reorder places for display by distance from the user's position.
//!
//! # Invariants
//! - Catalog content is never mutated after construction.
//! - Place ids are unique and every place has valid coordinates.
//! - Ordering is stable: equidistant places keep catalog order.

use crate::model::geo::{Coordinates, CoordinatesError};
use crate::model::place::{Place, PlaceId};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static BUILTIN_CATALOG: Lazy<PlaceCatalog> = Lazy::new(|| {
    PlaceCatalog::from_json(include_str!("../data/places.json")).expect("bundled catalog is valid")
});

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog construction errors.
#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
    DuplicateId(PlaceId),
    InvalidCoordinates {
        id: PlaceId,
        source: CoordinatesError,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "catalog is not valid JSON: {err}"),
            Self::DuplicateId(id) => write!(f, "catalog contains duplicate place id `{id}`"),
            Self::InvalidCoordinates { id, source } => {
                write!(f, "place `{id}` has invalid coordinates: {source}")
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::DuplicateId(_) => None,
            Self::InvalidCoordinates { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Read-only list of available places.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCatalog {
    places: Vec<Place>,
}

impl PlaceCatalog {
    /// Validates and wraps a list of places.
    pub fn from_places(places: Vec<Place>) -> CatalogResult<Self> {
        let mut seen = HashSet::with_capacity(places.len());
        for place in &places {
            if !seen.insert(place.id.clone()) {
                return Err(CatalogError::DuplicateId(place.id.clone()));
            }
            place
                .coordinates()
                .map_err(|source| CatalogError::InvalidCoordinates {
                    id: place.id.clone(),
                    source,
                })?;
        }
        Ok(Self { places })
    }

    /// Parses a JSON array of places.
    pub fn from_json(text: &str) -> CatalogResult<Self> {
        let places: Vec<Place> = serde_json::from_str(text)?;
        Self::from_places(places)
    }

    /// Catalog bundled with the crate.
    pub fn builtin() -> &'static PlaceCatalog {
        &BUILTIN_CATALOG
    }

    /// Places in catalog order.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn find_by_id(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|place| &place.id == id)
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Places ordered by ascending distance from `origin`.
    pub fn sorted_by_distance(&self, origin: &Coordinates) -> Vec<&Place> {
        let mut ranked = self
            .places
            .iter()
            .map(|place| (distance_from(origin, place), place))
            .collect::<Vec<_>>();
        ranked.sort_by(|(left, _), (right, _)| left.total_cmp(right));
        ranked.into_iter().map(|(_, place)| place).collect()
    }

    /// Display order: by proximity when a position is known, otherwise
    /// catalog order unchanged.
    pub fn ordered_for(&self, origin: Option<&Coordinates>) -> Vec<&Place> {
        match origin {
            Some(origin) => self.sorted_by_distance(origin),
            None => self.places.iter().collect(),
        }
    }
}

fn distance_from(origin: &Coordinates, place: &Place) -> f64 {
    // Coordinates were validated at construction.
    Coordinates {
        latitude: place.lat,
        longitude: place.lon,
    }
    .distance_km(origin)
}
