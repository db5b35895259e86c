//! Place picker session.
//!
//! # Responsibility
//! - Wire catalog ordering, the selection list and the delete confirmation
//!   into the use-cases a UI host calls.
//!
//! # Invariants
//! - The removal dialog is open exactly while a removal decision is pending.
//! - A confirmed removal (manual or by expiry) removes the target from the
//!   selection once and closes the dialog; cancel only closes the dialog.
//! - Only catalog places can be selected.

use crate::catalog::PlaceCatalog;
use crate::clock::TimerQueue;
use crate::config::DecisionConfig;
use crate::confirmation::DecisionHandler;
use crate::delete_confirmation::DeleteConfirmation;
use crate::geolocation::{locate_or_none, GeolocationProvider};
use crate::model::geo::Coordinates;
use crate::model::place::{Place, PlaceId};
use crate::progress::ProgressSnapshot;
use crate::repo::kv_repo::{KeyValueStore, StoreError};
use crate::service::selection_service::SelectionService;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PickerResult<T> = Result<T, PickerError>;

#[derive(Debug)]
pub enum PickerError {
    UnknownPlace(PlaceId),
    NotPicked(PlaceId),
    Store(StoreError),
}

impl Display for PickerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPlace(id) => write!(f, "place not found in catalog: {id}"),
            Self::NotPicked(id) => write!(f, "place is not in the selection: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PickerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::UnknownPlace(_) | Self::NotPicked(_) => None,
        }
    }
}

impl From<StoreError> for PickerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of one `poll()` of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PickerTick {
    /// Progress to render while the removal dialog stays open.
    pub progress: Option<ProgressSnapshot>,
    /// Place removed by automatic confirmation during this poll.
    pub removed: Option<PlaceId>,
}

/// Applies removal decisions to the selection.
struct RemovalHandler<'a, S: KeyValueStore> {
    selection: &'a mut SelectionService<S>,
    removed: Option<PlaceId>,
    failure: Option<StoreError>,
}

impl<'a, S: KeyValueStore> RemovalHandler<'a, S> {
    fn new(selection: &'a mut SelectionService<S>) -> Self {
        Self {
            selection,
            removed: None,
            failure: None,
        }
    }

    fn finish(self) -> PickerResult<Option<PlaceId>> {
        match self.failure {
            Some(err) => Err(err.into()),
            None => Ok(self.removed),
        }
    }
}

impl<S: KeyValueStore> DecisionHandler for RemovalHandler<'_, S> {
    fn confirmed(&mut self, target: &PlaceId) {
        match self.selection.remove(target) {
            Ok(_) => self.removed = Some(target.clone()),
            Err(err) => self.failure = Some(err),
        }
    }

    fn cancelled(&mut self, _target: &PlaceId) {}
}

pub struct PlacePicker<S: KeyValueStore> {
    catalog: PlaceCatalog,
    origin: Option<Coordinates>,
    selection: SelectionService<S>,
    removal: DeleteConfirmation,
}

impl<S: KeyValueStore> PlacePicker<S> {
    pub fn new(
        catalog: PlaceCatalog,
        selection: SelectionService<S>,
        timers: TimerQueue,
        decision: &DecisionConfig,
    ) -> Self {
        Self {
            catalog,
            origin: None,
            selection,
            removal: DeleteConfirmation::new(timers, decision),
        }
    }

    /// Startup: samples the position once and loads the persisted selection.
    pub fn start(&mut self, geolocation: &dyn GeolocationProvider) -> PickerResult<()> {
        self.origin = locate_or_none(geolocation);
        self.selection.initialize()?;
        info!(
            "event=picker_start module=picker status=ok located={} picked={}",
            self.origin.is_some(),
            self.selection.len()
        );
        Ok(())
    }

    pub fn origin(&self) -> Option<&Coordinates> {
        self.origin.as_ref()
    }

    /// Catalog places, nearest first when the position is known.
    pub fn available_places(&self) -> Vec<&Place> {
        self.catalog.ordered_for(self.origin.as_ref())
    }

    /// Picked places, most recently picked first.
    pub fn picked_places(&self) -> Vec<&Place> {
        self.selection.resolve(&self.catalog)
    }

    pub fn picked_ids(&self) -> &[PlaceId] {
        self.selection.ids()
    }

    /// Adds a catalog place to the selection. Returns whether it was new.
    pub fn select_place(&mut self, id: &PlaceId) -> PickerResult<bool> {
        if !self.catalog.contains(id) {
            return Err(PickerError::UnknownPlace(id.clone()));
        }
        Ok(self.selection.select(id.clone())?)
    }

    /// Opens the removal dialog for a picked place, restarting the countdown
    /// when it is already open.
    pub fn start_removal(&mut self, id: &PlaceId) -> PickerResult<()> {
        if !self.selection.contains(id) {
            return Err(PickerError::NotPicked(id.clone()));
        }
        self.removal.open(id.clone());
        Ok(())
    }

    /// User chose to keep the place.
    pub fn stop_removal(&mut self) -> bool {
        let mut handler = RemovalHandler::new(&mut self.selection);
        self.removal.cancel(&mut handler)
    }

    /// User confirmed before the deadline.
    pub fn confirm_removal(&mut self) -> PickerResult<Option<PlaceId>> {
        let mut handler = RemovalHandler::new(&mut self.selection);
        self.removal.confirm(&mut handler);
        handler.finish()
    }

    /// Dialog dismissed by the host (e.g. Escape); no decision is made.
    pub fn dismiss_removal(&mut self) -> bool {
        self.removal.close()
    }

    pub fn is_removal_open(&self) -> bool {
        self.removal.is_open()
    }

    pub fn removal_target(&self) -> Option<&PlaceId> {
        self.removal.target()
    }

    pub fn removal_progress(&self) -> Option<ProgressSnapshot> {
        self.removal.progress()
    }

    /// Drives the removal dialog timers.
    pub fn poll(&mut self) -> PickerResult<PickerTick> {
        let mut handler = RemovalHandler::new(&mut self.selection);
        let progress = self.removal.poll(&mut handler);
        let removed = handler.finish()?;
        Ok(PickerTick { progress, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::{PickerError, PlacePicker};
    use crate::catalog::PlaceCatalog;
    use crate::clock::{ManualClock, TimerQueue};
    use crate::config::DecisionConfig;
    use crate::geolocation::NoLocation;
    use crate::model::place::PlaceId;
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::repo::selection_repo::SelectionRepository;
    use crate::service::selection_service::SelectionService;
    use std::rc::Rc;

    fn picker(store: &MemoryKeyValueStore) -> (ManualClock, PlacePicker<&MemoryKeyValueStore>) {
        let clock = ManualClock::new();
        let timers = TimerQueue::new(Rc::new(clock.clone()));
        let mut picker = PlacePicker::new(
            PlaceCatalog::builtin().clone(),
            SelectionService::new(SelectionRepository::new(store)),
            timers,
            &DecisionConfig::default(),
        );
        picker.start(&NoLocation).unwrap();
        (clock, picker)
    }

    fn id(value: &str) -> PlaceId {
        PlaceId::parse(value).unwrap()
    }

    #[test]
    fn rejects_places_outside_catalog() {
        let store = MemoryKeyValueStore::new();
        let (_clock, mut picker) = picker(&store);
        let err = picker.select_place(&id("nowhere")).unwrap_err();
        assert!(matches!(err, PickerError::UnknownPlace(_)));
    }

    #[test]
    fn removal_requires_a_picked_place() {
        let store = MemoryKeyValueStore::new();
        let (_clock, mut picker) = picker(&store);
        let err = picker.start_removal(&id("p1")).unwrap_err();
        assert!(matches!(err, PickerError::NotPicked(_)));
        assert!(!picker.is_removal_open());
    }

    #[test]
    fn stop_removal_keeps_place_and_closes_dialog() {
        let store = MemoryKeyValueStore::new();
        let (clock, mut picker) = picker(&store);
        picker.select_place(&id("p1")).unwrap();
        picker.start_removal(&id("p1")).unwrap();

        assert!(picker.stop_removal());
        clock.advance(5_000);
        assert_eq!(picker.poll().unwrap().removed, None);
        assert_eq!(picker.picked_ids(), &[id("p1")]);
        assert!(!picker.is_removal_open());
    }
}
