use engine::storage::KeyValueStore;
use serde::{Deserialize, Serialize};

pub const SFX_ENABLED_KEY: &str = "SFXEnabled";
pub const MUSIC_ENABLED_KEY: &str = "MusicEnabled";

const ENABLED: i64 = 1;
const DISABLED: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioPreference {
    pub sfx_enabled: bool,
    pub music_enabled: bool,
}

impl Default for AudioPreference {
    fn default() -> Self {
        Self {
            sfx_enabled: true,
            music_enabled: true,
        }
    }
}

/// The audio preferences plus the store they persist to.
///
/// Every setter writes through and commits before returning. A failed commit is logged and
/// the in-memory value still changes, so the session stays consistent with what the user chose.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    store: S,
    current: AudioPreference,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        let current = read_preference(&store);
        Self { store, current }
    }

    /// Re-reads both flags from storage.
    pub fn load(&mut self) -> AudioPreference {
        self.current = read_preference(&self.store);
        self.current
    }

    pub fn current(&self) -> AudioPreference {
        self.current
    }

    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        self.current.sfx_enabled = enabled;
        self.write_flag(SFX_ENABLED_KEY, enabled);
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.current.music_enabled = enabled;
        self.write_flag(MUSIC_ENABLED_KEY, enabled);
    }

    /// Deletes both keys so the next load sees defaults.
    pub fn reset(&mut self) -> AudioPreference {
        self.store.remove(SFX_ENABLED_KEY);
        self.store.remove(MUSIC_ENABLED_KEY);
        self.commit();
        self.current = AudioPreference::default();
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn write_flag(&mut self, key: &str, enabled: bool) {
        let value = if enabled { ENABLED } else { DISABLED };
        self.store.set_int(key, value);
        self.commit();
        tracing::info!(key, enabled, "preference saved");
    }

    fn commit(&mut self) {
        if let Err(err) = self.store.save() {
            tracing::warn!("failed to persist preferences: {err}");
        }
    }
}

fn read_preference<S: KeyValueStore>(store: &S) -> AudioPreference {
    let defaults = AudioPreference::default();
    AudioPreference {
        sfx_enabled: read_flag(store, SFX_ENABLED_KEY, defaults.sfx_enabled),
        music_enabled: read_flag(store, MUSIC_ENABLED_KEY, defaults.music_enabled),
    }
}

fn read_flag<S: KeyValueStore>(store: &S, key: &str, default: bool) -> bool {
    match store.get_int(key) {
        Some(ENABLED) => true,
        Some(DISABLED) => false,
        Some(other) => {
            tracing::warn!(key, value = other, "ignoring out-of-range preference value");
            default
        }
        None => default,
    }
}
