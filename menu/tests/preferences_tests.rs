use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use engine::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use menu::preferences::{AudioPreference, MUSIC_ENABLED_KEY, PreferenceStore, SFX_ENABLED_KEY};

fn temp_prefs_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("menu-prefs-{name}-{nanos}")).join("prefs.json")
}

#[test]
fn fresh_store_loads_both_enabled() {
    let path = temp_prefs_path("fresh");
    let mut prefs = PreferenceStore::new(JsonFileStore::open(&path));
    assert_eq!(prefs.load(), AudioPreference::default());
    assert!(prefs.current().sfx_enabled);
    assert!(prefs.current().music_enabled);
}

#[test]
fn writes_survive_a_restart_on_disk() {
    let path = temp_prefs_path("restart");

    let mut prefs = PreferenceStore::new(JsonFileStore::open(&path));
    prefs.set_sfx_enabled(false);
    drop(prefs);

    let mut reopened = PreferenceStore::new(JsonFileStore::open(&path));
    let loaded = reopened.load();
    assert!(!loaded.sfx_enabled);
    assert!(loaded.music_enabled);

    reopened.set_music_enabled(false);
    drop(reopened);

    let loaded = PreferenceStore::new(JsonFileStore::open(&path)).current();
    assert!(!loaded.sfx_enabled);
    assert!(!loaded.music_enabled);

    let _ = std::fs::remove_dir_all(path.parent().expect("temp dir"));
}

#[test]
fn setters_commit_before_returning() {
    let store = MemoryStore::new();
    let disk = store.clone();
    let mut prefs = PreferenceStore::new(store);

    prefs.set_music_enabled(false);
    assert_eq!(disk.durable_int(MUSIC_ENABLED_KEY), Some(0));
    assert_eq!(disk.save_count(), 1);

    prefs.set_sfx_enabled(true);
    assert_eq!(disk.durable_int(SFX_ENABLED_KEY), Some(1));
    assert_eq!(disk.save_count(), 2);
}

#[test]
fn corrupt_values_fall_back_to_enabled() {
    let store = MemoryStore::new()
        .with_entry(SFX_ENABLED_KEY, 7)
        .with_entry(MUSIC_ENABLED_KEY, -1);
    let prefs = PreferenceStore::new(store);
    assert_eq!(prefs.current(), AudioPreference::default());
}

#[test]
fn reset_restores_defaults_durably() {
    let store = MemoryStore::new()
        .with_entry(SFX_ENABLED_KEY, 0)
        .with_entry(MUSIC_ENABLED_KEY, 0);
    let disk = store.clone();
    let mut prefs = PreferenceStore::new(store);
    assert!(!prefs.current().music_enabled);

    assert_eq!(prefs.reset(), AudioPreference::default());
    let reopened = disk.reopen();
    assert_eq!(reopened.get_int(SFX_ENABLED_KEY), None);
    assert_eq!(PreferenceStore::new(reopened).current(), AudioPreference::default());
}
