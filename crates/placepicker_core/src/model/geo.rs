//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Haversine distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Parses `"<lat>,<lon>"`.
impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordinatesError::Unparseable(s.to_string()))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Unparseable(s.to_string()))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Unparseable(s.to_string()))?;
        Self::new(latitude, longitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    Unparseable(String),
}

impl Display for CoordinatesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude must be within [-90, 90], got {value}")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude must be within [-180, 180], got {value}")
            }
            Self::Unparseable(value) => {
                write!(f, "coordinates must look like `<lat>,<lon>`, got `{value}`")
            }
        }
    }
}

impl Error for CoordinatesError {}

#[cfg(test)]
mod tests {
    use super::{Coordinates, CoordinatesError};

    #[test]
    fn distance_to_self_is_zero() {
        let here = Coordinates::new(48.8566, 2.3522).unwrap();
        assert!(here.distance_km(&here).abs() < 1e-9);
    }

    #[test]
    fn paris_to_london_is_roughly_344_km() {
        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        let london = Coordinates::new(51.5074, -0.1278).unwrap();
        let distance = paris.distance_km(&london);
        assert!((distance - 343.5).abs() < 2.0, "distance was {distance}");
        assert!((london.distance_km(&paris) - distance).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_and_non_finite_values() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinatesError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, f64::NAN),
            Err(CoordinatesError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn parses_comma_separated_pair() {
        let parsed: Coordinates = " 37.97 , 23.72 ".parse().unwrap();
        assert_eq!(parsed, Coordinates::new(37.97, 23.72).unwrap());
        assert!("37.97".parse::<Coordinates>().is_err());
    }
}
