//! Selection list use-cases.
//!
//! # Responsibility
//! - Keep the in-memory selection and the persisted selection updated together.
//! - Resolve selected ids against the catalog for display.
//!
//! # Invariants
//! - The in-memory list never holds duplicates; new picks are prepended.
//! - The persisted list is read once by `initialize()` and then re-read before
//!   every write. Read and write are separate store calls, so a concurrent
//!   writer between them is overwritten.

use crate::catalog::PlaceCatalog;
use crate::model::place::{Place, PlaceId};
use crate::repo::kv_repo::{KeyValueStore, StoreResult};
use crate::repo::selection_repo::SelectionRepository;
use log::{info, warn};

#[derive(Debug)]
pub struct SelectionService<S: KeyValueStore> {
    repo: SelectionRepository<S>,
    ids: Vec<PlaceId>,
}

impl<S: KeyValueStore> SelectionService<S> {
    /// Creates an empty service; call `initialize()` to load persisted ids.
    pub fn new(repo: SelectionRepository<S>) -> Self {
        Self {
            repo,
            ids: Vec::new(),
        }
    }

    /// Replaces the in-memory list with the persisted one.
    pub fn initialize(&mut self) -> StoreResult<&[PlaceId]> {
        self.ids = self.repo.load()?;
        info!(
            "event=selection_init module=selection status=ok count={}",
            self.ids.len()
        );
        Ok(&self.ids)
    }

    /// Selected ids, most recent first.
    pub fn ids(&self) -> &[PlaceId] {
        &self.ids
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Prepends `id` when absent, in memory and in the store.
    ///
    /// Returns whether the in-memory list changed.
    pub fn select(&mut self, id: PlaceId) -> StoreResult<bool> {
        let mut stored = self.repo.load()?;
        if !stored.contains(&id) {
            stored.insert(0, id.clone());
            self.repo.save(&stored)?;
        }

        if self.ids.contains(&id) {
            return Ok(false);
        }
        info!("event=selection_add module=selection status=ok id={id}");
        self.ids.insert(0, id);
        Ok(true)
    }

    /// Removes `id` in memory and in the store.
    ///
    /// Returns whether the in-memory list changed.
    pub fn remove(&mut self, id: &PlaceId) -> StoreResult<bool> {
        let mut stored = self.repo.load()?;
        stored.retain(|stored_id| stored_id != id);
        self.repo.save(&stored)?;

        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        let removed = self.ids.len() != before;
        if removed {
            info!("event=selection_remove module=selection status=ok id={id}");
        }
        Ok(removed)
    }

    /// Selected places in selection order; ids missing from `catalog` are
    /// skipped.
    pub fn resolve<'c>(&self, catalog: &'c PlaceCatalog) -> Vec<&'c Place> {
        self.ids
            .iter()
            .filter_map(|id| {
                let place = catalog.find_by_id(id);
                if place.is_none() {
                    warn!("event=selection_resolve module=selection status=skipped id={id}");
                }
                place
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionService;
    use crate::catalog::PlaceCatalog;
    use crate::model::place::PlaceId;
    use crate::repo::kv_repo::{KeyValueStore, MemoryKeyValueStore};
    use crate::repo::selection_repo::SelectionRepository;

    fn id(value: &str) -> PlaceId {
        PlaceId::parse(value).unwrap()
    }

    #[test]
    fn select_prepends_and_ignores_repeats() {
        let store = MemoryKeyValueStore::new();
        let mut service = SelectionService::new(SelectionRepository::new(&store));

        assert!(service.select(id("p1")).unwrap());
        assert!(service.select(id("p2")).unwrap());
        assert!(!service.select(id("p1")).unwrap());

        assert_eq!(service.ids(), &[id("p2"), id("p1")]);
        assert_eq!(
            store.get("selectedPlaces").unwrap().as_deref(),
            Some(r#"["p2","p1"]"#)
        );
    }

    #[test]
    fn remove_filters_memory_and_store() {
        let store = MemoryKeyValueStore::new();
        store.set("selectedPlaces", r#"["p3","p2","p1"]"#).unwrap();
        let mut service = SelectionService::new(SelectionRepository::new(&store));
        service.initialize().unwrap();

        assert!(service.remove(&id("p2")).unwrap());
        assert!(!service.remove(&id("p2")).unwrap());
        assert_eq!(service.ids(), &[id("p3"), id("p1")]);
        assert_eq!(
            store.get("selectedPlaces").unwrap().as_deref(),
            Some(r#"["p3","p1"]"#)
        );
    }

    #[test]
    fn resolve_skips_ids_unknown_to_catalog() {
        let store = MemoryKeyValueStore::new();
        store.set("selectedPlaces", r#"["p5","ghost","p1"]"#).unwrap();
        let mut service = SelectionService::new(SelectionRepository::new(&store));
        service.initialize().unwrap();

        let titles = service
            .resolve(PlaceCatalog::builtin())
            .iter()
            .map(|place| place.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Ancient Grecian Ruins", "Forest Waterfall"]);
    }
}
