mod support;

use dialkit::prelude::*;
use support::card_config;

#[test]
fn presets_survive_a_new_store() {
    let dir = tempfile::tempdir().unwrap();

    let store = DialStore::with_storage(JsonFileStorage::new(dir.path()));
    store.register_panel("card", "Card", card_config());
    store.update_value("card", "blur", 60.0).unwrap();
    let preset = store.save_preset("card", "Blurry").unwrap();
    store.update_value("card", "blur", 10.0).unwrap();
    store.load_preset("card", &preset.id).unwrap();

    let path = JsonFileStorage::new(dir.path()).path_for("card");
    assert!(path.exists());

    let reopened = DialStore::with_storage(JsonFileStorage::new(dir.path()));
    reopened.register_panel("card", "Card", card_config());
    let presets = reopened.get_presets("card").unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].name, "Blurry");
    assert_eq!(
        reopened.get_active_preset_id("card").unwrap(),
        Some(preset.id)
    );
    assert_eq!(
        reopened.get_resolved_values("card").unwrap().float("blur"),
        60.0
    );

    let next = reopened.save_preset("card", "Another").unwrap();
    assert_ne!(next.id, presets[0].id);
}

#[test]
fn deleting_and_clearing_are_persisted() {
    let storage = MemoryStorage::new();
    let store = DialStore::with_storage(storage.clone());
    store.register_panel("card", "Card", card_config());
    let a = store.save_preset("card", "A").unwrap();
    let b = store.save_preset("card", "B").unwrap();

    store.delete_preset("card", &a.id).unwrap();
    store.clear_active_preset_id("card").unwrap();

    let state = storage.load("card").unwrap().unwrap();
    assert_eq!(state.presets.len(), 1);
    assert_eq!(state.presets[0].id, b.id);
    assert_eq!(state.active_preset_id, None);
    assert_eq!(state, store.export_panel_state("card").unwrap());
}

#[test]
fn corrupt_storage_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::new(dir.path());
    std::fs::write(storage.path_for("card"), "{ not json").unwrap();

    let store = DialStore::with_storage(storage);
    store.register_panel("card", "Card", card_config());
    assert!(store.get_presets("card").unwrap().is_empty());
}

#[test]
fn non_finite_values_never_reach_storage() {
    let dir = tempfile::tempdir().unwrap();
    let store = DialStore::with_storage(JsonFileStorage::new(dir.path()));
    store.register_panel("card", "Card", card_config());
    store.save_preset("card", "Good").unwrap();
    let before = store.get_values("card").unwrap();

    assert!(matches!(
        store.update_value("card", "opacity", f64::NAN),
        Err(DialError::InvalidValue { .. })
    ));
    assert!(matches!(
        store.update_value(
            "card",
            "motion",
            SpringConfig::advanced(0.0, 10.0, 1.0)
        ),
        Err(DialError::InvalidValue { .. })
    ));
    assert_eq!(store.get_values("card").unwrap(), before);
    store.save_preset("card", "Second").unwrap();

    let reopened = DialStore::with_storage(JsonFileStorage::new(dir.path()));
    reopened.register_panel("card", "Card", card_config());
    let names: Vec<_> = reopened
        .get_presets("card")
        .unwrap()
        .into_iter()
        .map(|preset| preset.name)
        .collect();
    assert_eq!(names, vec!["Good", "Second"]);
}

#[test]
fn one_unreadable_preset_does_not_lose_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::new(dir.path());
    std::fs::write(
        storage.path_for("card"),
        r#"{
            "version": "1",
            "presets": [
                { "id": "preset-1", "name": "Kept", "values": { "blur": 40 } },
                { "id": "preset-2", "name": "Bad", "values": { "blur": null } }
            ],
            "activePresetId": "preset-1"
        }"#,
    )
    .unwrap();

    let store = DialStore::with_storage(storage);
    store.register_panel("card", "Card", card_config());
    let presets = store.get_presets("card").unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].name, "Kept");
    assert_eq!(
        store.get_resolved_values("card").unwrap().float("blur"),
        40.0
    );
}
