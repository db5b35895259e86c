//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the picker session and removal dialog to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The session lives on the calling (UI) thread; every call is sync.
//! - Removal timers only advance when the host calls `removal_poll`.

use log::{info, warn};
use placepicker_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Coordinates, FixedLocation, GeolocationProvider, NoLocation, Place, PickerConfig, PlaceCatalog,
    PlaceId, PlacePicker, SelectionRepository, SelectionService, SqliteKeyValueStore, TimerQueue,
};
use std::cell::RefCell;
use std::path::PathBuf;

const SESSION_DB_FILE_NAME: &str = "placepicker.sqlite3";

type Session = PlacePicker<SqliteKeyValueStore>;

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Touches no session state; safe from any thread.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Touches no session state; safe from any thread.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; creates the log directory when missing.
/// - Idempotent for the same `level + log_dir`; other settings are rejected.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One place card for list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceItem {
    pub id: String,
    pub title: String,
    pub image_src: String,
    pub image_alt: String,
    pub lat: f64,
    pub lon: f64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceListResponse {
    pub ok: bool,
    pub items: Vec<PlaceItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerActionResponse {
    pub ok: bool,
    /// Place affected by the action, when any.
    pub place_id: Option<String>,
    pub message: String,
}

impl PickerActionResponse {
    fn success(message: impl Into<String>, place_id: Option<String>) -> Self {
        Self {
            ok: true,
            place_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            place_id: None,
            message: message.into(),
        }
    }
}

/// Removal dialog state for one animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalStatus {
    pub open: bool,
    pub target_id: Option<String>,
    pub remaining_ms: u64,
    pub duration_ms: u64,
    /// Set on the frame where automatic confirmation removed a place.
    pub removed_id: Option<String>,
    pub message: String,
}

impl RemovalStatus {
    fn closed(message: impl Into<String>) -> Self {
        Self {
            open: false,
            target_id: None,
            remaining_ms: 0,
            duration_ms: 0,
            removed_id: None,
            message: message.into(),
        }
    }
}

/// Starts (or restarts) the picker session.
///
/// Input semantics:
/// - `latitude`/`longitude`: one-shot device position; when either is
///   missing or invalid the catalog keeps its default order.
///
/// # FFI contract
/// - Sync call, DB-backed execution (opens and migrates the selection store).
/// - Binds the session to the calling thread; call from the UI thread.
/// - Replacing a running session closes its removal dialog.
/// - Never panics; failures are reported in the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_start(latitude: Option<f64>, longitude: Option<f64>) -> PickerActionResponse {
    let position = match (latitude, longitude) {
        (Some(lat), Some(lon)) => match Coordinates::new(lat, lon) {
            Ok(coords) => Some(coords),
            Err(err) => {
                warn!(
                    "event=picker_start module=ffi status=degraded reason=invalid_position error={err}"
                );
                None
            }
        },
        _ => None,
    };
    let provider: Box<dyn GeolocationProvider> = match position {
        Some(coords) => Box::new(FixedLocation(coords)),
        None => Box::new(NoLocation),
    };

    match open_session(provider.as_ref()) {
        Ok(session) => {
            let picked = session.picked_ids().len();
            SESSION.with(|slot| *slot.borrow_mut() = Some(session));
            PickerActionResponse::success(format!("Session started with {picked} picked."), None)
        }
        Err(err) => PickerActionResponse::failure(format!("picker_start failed: {err}")),
    }
}

/// Available places, nearest first when a position was supplied.
///
/// # FFI contract
/// - Sync call, in-memory read; opens a session without position when none
///   is running.
/// - UI-thread only, like every session call.
/// - Never panics; `ok = false` with a message when no session can be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn places_available() -> PlaceListResponse {
    list_response(with_session(|session| {
        Ok(session
            .available_places()
            .into_iter()
            .map(to_place_item)
            .collect())
    }))
}

/// Picked places, most recently picked first.
///
/// # FFI contract
/// - Sync call, in-memory read of the selection loaded at session start.
/// - UI-thread only.
/// - Never panics; ids unknown to the catalog are left out of `items`.
#[flutter_rust_bridge::frb(sync)]
pub fn places_picked() -> PlaceListResponse {
    list_response(with_session(|session| {
        Ok(session
            .picked_places()
            .into_iter()
            .map(to_place_item)
            .collect())
    }))
}

/// Adds a place to the selection.
///
/// # FFI contract
/// - Sync call, DB-backed execution (re-reads then writes the stored list).
/// - UI-thread only.
/// - Never panics; malformed or unknown ids fail in the envelope.
/// - Picking an already picked place succeeds without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn place_select(id: String) -> PickerActionResponse {
    let result = with_session(|session| {
        let place_id = PlaceId::parse(&id).map_err(|err| err.to_string())?;
        let added = session
            .select_place(&place_id)
            .map_err(|err| err.to_string())?;
        Ok((place_id, added))
    });
    match result {
        Ok((place_id, true)) => {
            PickerActionResponse::success("Place picked.", Some(place_id.to_string()))
        }
        Ok((place_id, false)) => {
            PickerActionResponse::success("Place already picked.", Some(place_id.to_string()))
        }
        Err(err) => PickerActionResponse::failure(format!("place_select failed: {err}")),
    }
}

/// Opens the timed removal dialog for a picked place.
///
/// # FFI contract
/// - Sync call, non-blocking; arms the deadline and refresh timers.
/// - UI-thread only.
/// - Re-opening restarts the countdown for the new target.
/// - Never panics; ids that are not picked fail in the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn removal_open(id: String) -> PickerActionResponse {
    let result = with_session(|session| {
        let place_id = PlaceId::parse(&id).map_err(|err| err.to_string())?;
        session
            .start_removal(&place_id)
            .map_err(|err| err.to_string())?;
        Ok(place_id)
    });
    match result {
        Ok(place_id) => {
            PickerActionResponse::success("Removal pending.", Some(place_id.to_string()))
        }
        Err(err) => PickerActionResponse::failure(format!("removal_open failed: {err}")),
    }
}

/// Keeps the place and closes the dialog.
///
/// # FFI contract
/// - Sync call, non-blocking; disarms both timers.
/// - UI-thread only.
/// - Idempotent: succeeds with "No removal pending." when closed.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn removal_cancel() -> PickerActionResponse {
    match with_session(|session| Ok(session.stop_removal())) {
        Ok(true) => PickerActionResponse::success("Removal cancelled.", None),
        Ok(false) => PickerActionResponse::success("No removal pending.", None),
        Err(err) => PickerActionResponse::failure(format!("removal_cancel failed: {err}")),
    }
}

/// Removes the place now instead of waiting for the deadline.
///
/// # FFI contract
/// - Sync call, DB-backed execution; timers are disarmed before the write.
/// - UI-thread only.
/// - Removes at most once per opened dialog; `place_id` is `None` when closed.
/// - Never panics; store failures are reported in the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn removal_confirm() -> PickerActionResponse {
    match with_session(|session| session.confirm_removal().map_err(|err| err.to_string())) {
        Ok(Some(place_id)) => {
            PickerActionResponse::success("Place removed.", Some(place_id.to_string()))
        }
        Ok(None) => PickerActionResponse::success("No removal pending.", None),
        Err(err) => PickerActionResponse::failure(format!("removal_confirm failed: {err}")),
    }
}

/// Closes the dialog without a decision (e.g. backdrop tap or back button).
///
/// # FFI contract
/// - Sync call, non-blocking; disarms both timers.
/// - UI-thread only.
/// - Neither keeps nor removes the place; safe to call when closed.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn removal_close() -> PickerActionResponse {
    match with_session(|session| Ok(session.dismiss_removal())) {
        Ok(_) => PickerActionResponse::success("Removal dialog closed.", None),
        Err(err) => PickerActionResponse::failure(format!("removal_close failed: {err}")),
    }
}

/// Advances the removal timers and reports what to render.
///
/// # FFI contract
/// - Sync call; DB-backed only on the frame where the deadline passes.
/// - UI-thread only; call once per frame (or on a ~10 ms ticker) while the
///   dialog is open.
/// - Never panics; failures close the status with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn removal_poll() -> RemovalStatus {
    let result = with_session(|session| {
        let tick = session.poll().map_err(|err| err.to_string())?;
        let target_id = session.removal_target().map(ToString::to_string);
        Ok((tick, target_id))
    });

    match result {
        Ok((tick, target_id)) => {
            let removed_id = tick.removed.as_ref().map(ToString::to_string);
            match tick.progress {
                Some(progress) => RemovalStatus {
                    open: true,
                    target_id,
                    remaining_ms: progress.remaining_ms,
                    duration_ms: progress.duration_ms,
                    removed_id,
                    message: String::new(),
                },
                None => RemovalStatus {
                    removed_id,
                    ..RemovalStatus::closed("")
                },
            }
        }
        Err(err) => RemovalStatus::closed(format!("removal_poll failed: {err}")),
    }
}

fn open_session(provider: &dyn GeolocationProvider) -> Result<Session, String> {
    let config = PickerConfig::from_env().map_err(|err| err.to_string())?;
    let db_path = config
        .db_path
        .clone()
        .unwrap_or_else(|| default_db_path(SESSION_DB_FILE_NAME));
    let store =
        SqliteKeyValueStore::open(&db_path).map_err(|err| format!("store open failed: {err}"))?;

    let mut session = PlacePicker::new(
        PlaceCatalog::builtin().clone(),
        SelectionService::new(SelectionRepository::with_key(
            store,
            config.storage_key.as_str(),
        )),
        TimerQueue::system(),
        &config.decision,
    );
    session.start(provider).map_err(|err| err.to_string())?;
    info!(
        "event=session_open module=ffi status=ok duration_ms={}",
        config.decision.duration_ms
    );
    Ok(session)
}

fn default_db_path(file_name: &str) -> PathBuf {
    std::env::temp_dir().join(file_name)
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    SESSION.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| "picker session is busy".to_string())?;
        if slot.is_none() {
            *slot = Some(open_session(&NoLocation)?);
        }
        match slot.as_mut() {
            Some(session) => f(session),
            None => Err("picker session is unavailable".to_string()),
        }
    })
}

fn list_response(result: Result<Vec<PlaceItem>, String>) -> PlaceListResponse {
    match result {
        Ok(items) => PlaceListResponse {
            ok: true,
            message: format!("{} place(s).", items.len()),
            items,
        },
        Err(err) => PlaceListResponse {
            ok: false,
            items: Vec::new(),
            message: err,
        },
    }
}

fn to_place_item(place: &Place) -> PlaceItem {
    PlaceItem {
        id: place.id.to_string(),
        title: place.title.clone(),
        image_src: place.image.src.clone(),
        image_alt: place.image.alt.clone(),
        lat: place.lat,
        lon: place.lon,
    }
}
