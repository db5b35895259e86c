//! Place entity and identifier.
//!
//! # Responsibility
//! - Define the read-only catalog record shown in the picker.
//! - Validate identifiers at every construction and deserialization path.
//!
//! # Invariants
//! - Text `PlaceId`s match `PLACE_ID_PATTERN`.
//! - Numeric JSON identifiers stay numeric when written back.

use crate::model::geo::{Coordinates, CoordinatesError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Accepted identifier shape: short, URL/storage safe tokens.
pub const PLACE_ID_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.:-]{0,63}$";

static PLACE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PLACE_ID_PATTERN).expect("valid place id regex"));

/// Stable identifier of one catalog place.
///
/// Keeps the JSON type it was created from: text ids serialize as strings,
/// numeric ids as numbers. `4` and `"4"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaceId(IdRepr);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

impl PlaceId {
    /// Parses and validates identifier text (surrounding whitespace is trimmed).
    pub fn parse(value: &str) -> Result<Self, PlaceIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlaceIdError::Empty);
        }
        if !PLACE_ID_RE.is_match(trimmed) {
            return Err(PlaceIdError::Malformed(trimmed.to_string()));
        }
        Ok(Self(IdRepr::Text(trimmed.to_string())))
    }

    /// Text of a string id; `None` for numeric ids.
    pub fn as_text(&self) -> Option<&str> {
        match &self.0 {
            IdRepr::Text(text) => Some(text),
            IdRepr::Number(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.0, IdRepr::Number(_))
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            IdRepr::Text(text) => f.pad(text),
            IdRepr::Number(number) => f.pad(&number.to_string()),
        }
    }
}

impl FromStr for PlaceId {
    type Err = PlaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for PlaceId {
    fn from(value: u64) -> Self {
        Self(IdRepr::Number(value))
    }
}

impl<'de> Deserialize<'de> for PlaceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match IdRepr::deserialize(deserializer)? {
            IdRepr::Text(text) => PlaceId::parse(&text).map_err(serde::de::Error::custom),
            IdRepr::Number(number) => Ok(PlaceId::from(number)),
        }
    }
}

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceIdError {
    Empty,
    Malformed(String),
}

impl Display for PlaceIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "place id must not be empty"),
            Self::Malformed(value) => write!(f, "place id is malformed: `{value}`"),
        }
    }
}

impl Error for PlaceIdError {}

/// Image shown for a place card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceImage {
    /// Asset path or URL, resolved by the host.
    pub src: String,
    /// Accessible description.
    pub alt: String,
}

/// Read-only catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub title: String,
    pub image: PlaceImage,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// Validated coordinates of this place.
    pub fn coordinates(&self) -> Result<Coordinates, CoordinatesError> {
        Coordinates::new(self.lat, self.lon)
    }
}
