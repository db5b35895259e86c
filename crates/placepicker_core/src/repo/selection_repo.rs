//! Persisted selection list.
//!
//! # Responsibility
//! - Store the picked ids as one JSON array under a single key,
//!   most recently added first.
//!
//! # Invariants
//! - `load` fails closed: absent or malformed data reads as empty.
//! - Loaded lists never contain duplicates (first occurrence wins).

use crate::config::DEFAULT_STORAGE_KEY;
use crate::model::place::PlaceId;
use crate::repo::kv_repo::{KeyValueStore, StoreResult};
use log::warn;
use std::collections::HashSet;

/// Typed view of the selection entry in a `KeyValueStore`.
#[derive(Debug)]
pub struct SelectionRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SelectionRepository<S> {
    /// Repository under the default `selectedPlaces` key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the persisted ids.
    ///
    /// # Errors
    /// - Only store transport failures; decoding problems yield an empty list.
    pub fn load(&self) -> StoreResult<Vec<PlaceId>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<PlaceId>>(&raw) {
            Ok(ids) => Ok(dedup_keep_first(ids)),
            Err(err) => {
                warn!(
                    "event=selection_load module=repo status=fallback key={} reason=malformed error={}",
                    self.key, err
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the persisted ids.
    pub fn save(&self, ids: &[PlaceId]) -> StoreResult<()> {
        let encoded = serde_json::to_string(ids)?;
        self.store.set(&self.key, &encoded)
    }
}

fn dedup_keep_first(ids: Vec<PlaceId>) -> Vec<PlaceId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
