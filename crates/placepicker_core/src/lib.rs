//! Core domain logic for the place picker.
//! This crate is the single source of truth for selection, ordering and
//! timed-confirmation invariants; UI hosts only render and forward input.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod confirmation;
pub mod db;
pub mod delete_confirmation;
pub mod geolocation;
pub mod logging;
pub mod model;
pub mod progress;
pub mod repo;
pub mod service;

pub use catalog::{CatalogError, CatalogResult, PlaceCatalog};
pub use clock::{Clock, ManualClock, SystemClock, TimerGuard, TimerPoll, TimerQueue, Timestamp};
pub use config::{ConfigError, DecisionConfig, PickerConfig};
pub use confirmation::{ConfirmationController, ConfirmationState, DecisionHandler};
pub use delete_confirmation::DeleteConfirmation;
pub use geolocation::{
    locate_or_none, FixedLocation, GeolocationError, GeolocationProvider, NoLocation,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::geo::{Coordinates, CoordinatesError};
pub use model::place::{Place, PlaceId, PlaceIdError, PlaceImage};
pub use progress::{ProgressIndicator, ProgressSnapshot};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult,
};
pub use repo::selection_repo::SelectionRepository;
pub use service::picker_service::{PickerError, PickerResult, PickerTick, PlacePicker};
pub use service::selection_service::SelectionService;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
