use placepicker_core::{
    KeyValueStore, PlaceId, SelectionRepository, SelectionService, SqliteKeyValueStore,
};

fn ids(values: &[u64]) -> Vec<PlaceId> {
    values.iter().copied().map(PlaceId::from).collect()
}

#[test]
fn saved_ids_round_trip_in_order() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    let repo = SelectionRepository::new(&store);

    repo.save(&ids(&[1, 2, 3])).unwrap();
    assert_eq!(repo.load().unwrap(), ids(&[1, 2, 3]));
}

#[test]
fn numeric_ids_written_by_other_hosts_are_accepted() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    store.set("selectedPlaces", "[1,2,3]").unwrap();

    let repo = SelectionRepository::new(&store);
    assert_eq!(repo.load().unwrap(), ids(&[1, 2, 3]));
}

#[test]
fn numeric_ids_keep_their_json_type_when_written_back() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    store.set("selectedPlaces", "[1,2,3]").unwrap();

    let mut service = SelectionService::new(SelectionRepository::new(&store));
    service.initialize().unwrap();
    service.select(PlaceId::from(4)).unwrap();
    assert_eq!(
        store.get("selectedPlaces").unwrap().as_deref(),
        Some("[4,1,2,3]")
    );

    service.select(PlaceId::parse("p1").unwrap()).unwrap();
    service.remove(&PlaceId::from(2)).unwrap();
    assert_eq!(
        store.get("selectedPlaces").unwrap().as_deref(),
        Some(r#"["p1",4,1,3]"#)
    );
}

#[test]
fn repeated_select_does_not_duplicate() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    let mut service = SelectionService::new(SelectionRepository::new(&store));
    service.initialize().unwrap();

    for id in [3, 2, 1, 1, 1] {
        service.select(PlaceId::from(id)).unwrap();
    }

    assert_eq!(service.ids(), ids(&[1, 2, 3]).as_slice());
    assert_eq!(
        SelectionRepository::new(&store).load().unwrap(),
        ids(&[1, 2, 3])
    );
}

#[test]
fn selection_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("picker.sqlite3");

    {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        let mut service = SelectionService::new(SelectionRepository::new(store));
        service.initialize().unwrap();
        service.select(PlaceId::parse("p4").unwrap()).unwrap();
        service.select(PlaceId::parse("p9").unwrap()).unwrap();
    }

    let store = SqliteKeyValueStore::open(&path).unwrap();
    let mut service = SelectionService::new(SelectionRepository::new(store));
    let loaded = service.initialize().unwrap().to_vec();
    assert_eq!(
        loaded,
        vec![PlaceId::parse("p9").unwrap(), PlaceId::parse("p4").unwrap()]
    );
}

#[test]
fn malformed_persisted_value_starts_empty_and_is_overwritten_on_next_write() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    store.set("selectedPlaces", "not json at all").unwrap();

    let mut service = SelectionService::new(SelectionRepository::new(&store));
    assert!(service.initialize().unwrap().is_empty());

    service.select(PlaceId::parse("p2").unwrap()).unwrap();
    assert_eq!(
        store.get("selectedPlaces").unwrap().as_deref(),
        Some(r#"["p2"]"#)
    );
}

#[test]
fn interleaved_writer_is_overwritten_by_read_modify_write() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    let mut first = SelectionService::new(SelectionRepository::new(&store));
    let mut second = SelectionService::new(SelectionRepository::new(&store));
    first.initialize().unwrap();
    second.initialize().unwrap();

    first.select(PlaceId::parse("p1").unwrap()).unwrap();
    second.select(PlaceId::parse("p2").unwrap()).unwrap();
    // Each write re-reads the store, so sequential writers compose.
    assert_eq!(
        SelectionRepository::new(&store).load().unwrap(),
        vec![PlaceId::parse("p2").unwrap(), PlaceId::parse("p1").unwrap()]
    );

    // The in-memory lists are not reconciled with each other.
    assert_eq!(first.ids(), &[PlaceId::parse("p1").unwrap()]);
    assert_eq!(second.ids(), &[PlaceId::parse("p2").unwrap()]);

    // A removal by `first` writes what it re-read, keeping p2 persisted.
    first.remove(&PlaceId::parse("p1").unwrap()).unwrap();
    assert_eq!(
        SelectionRepository::new(&store).load().unwrap(),
        vec![PlaceId::parse("p2").unwrap()]
    );
}
