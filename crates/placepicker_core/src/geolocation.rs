//! Position provider seam.
//!
//! A missing or denied position is never fatal: callers fall back to
//! catalog order.

use crate::model::geo::{Coordinates, CoordinatesError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a one-shot position sample is not available.
#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationError {
    Unavailable,
    PermissionDenied,
    Invalid(CoordinatesError),
}

impl GeolocationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::PermissionDenied => "permission_denied",
            Self::Invalid(_) => "invalid_position",
        }
    }
}

impl Display for GeolocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "position is unavailable"),
            Self::PermissionDenied => write!(f, "position access was denied"),
            Self::Invalid(err) => write!(f, "position is invalid: {err}"),
        }
    }
}

impl Error for GeolocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoordinatesError> for GeolocationError {
    fn from(value: CoordinatesError) -> Self {
        Self::Invalid(value)
    }
}

/// Supplies one position sample.
pub trait GeolocationProvider {
    fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Provider that always reports the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Coordinates);

impl GeolocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Provider for hosts without positioning support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLocation;

impl GeolocationProvider for NoLocation {
    fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Samples `provider` once; every failure maps to `None`.
pub fn locate_or_none(provider: &dyn GeolocationProvider) -> Option<Coordinates> {
    match provider.current_position() {
        Ok(position) => {
            debug!("event=geolocation module=geolocation status=ok");
            Some(position)
        }
        Err(err) => {
            info!(
                "event=geolocation module=geolocation status=skipped reason={}",
                err.code()
            );
            None
        }
    }
}
