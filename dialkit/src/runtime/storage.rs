//! Preset persistence. The store only needs something implementing
//! [`PresetStorage`]; where the bytes end up is up to the host.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use directories_next::BaseDirs;

use super::serialization::{DialSettings, PanelState};
use crate::core::prelude::*;

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("DialKit"))
}

pub fn default_storage_dir() -> String {
    config_dir()
        .or_else(|| {
            BaseDirs::new().map(|bd| bd.home_dir().join(".dialkit"))
        })
        .unwrap_or_else(|| PathBuf::from(".dialkit"))
        .to_string_lossy()
        .into_owned()
}

/// Durable key-value storage for panel presets, keyed by panel id
pub trait PresetStorage {
    fn load(&self, panel_id: &str) -> Result<Option<PanelState>>;
    fn save(&self, panel_id: &str, state: &PanelState) -> Result<()>;
}

/// Keeps serialized JSON in memory. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw JSON stored for `panel_id`
    pub fn raw(&self, panel_id: &str) -> Option<String> {
        self.entries.borrow().get(panel_id).cloned()
    }
}

impl PresetStorage for MemoryStorage {
    fn load(&self, panel_id: &str) -> Result<Option<PanelState>> {
        match self.entries.borrow().get(panel_id) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, panel_id: &str, state: &PanelState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.entries.borrow_mut().insert(panel_id.to_string(), json);
        Ok(())
    }
}

/// One pretty-printed JSON file per panel:
/// `<dir>/<escaped panel id>_presets.json`
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_settings(settings: &DialSettings) -> Self {
        Self::new(&settings.storage_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, panel_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}_presets.json", sanitize_file_stem(panel_id)))
    }
}

impl Default for JsonFileStorage {
    fn default() -> Self {
        Self::new(default_storage_dir())
    }
}

impl PresetStorage for JsonFileStorage {
    fn load(&self, panel_id: &str) -> Result<Option<PanelState>> {
        let path = self.path_for(panel_id);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, panel_id: &str, state: &PanelState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let path = self.path_for(panel_id);
        if let Some(parent_dir) = path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(&path, json)?;
        debug!("Saved presets for {} to {:?}", panel_id, path);
        Ok(())
    }
}

/// ASCII letters, digits and `-` pass through; every other character,
/// `_` included, becomes `_<hex code point>_`. Distinct ids therefore never
/// share a file.
fn sanitize_file_stem(panel_id: &str) -> String {
    let mut stem = String::with_capacity(panel_id.len());
    for c in panel_id.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            stem.push(c);
        } else {
            stem.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    stem
}

fn settings_path(dir: &str) -> PathBuf {
    PathBuf::from(dir).join("settings.json")
}

pub fn save_settings(dir: &str, settings: &DialSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    let path = settings_path(dir);
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir)?;
    }
    fs::write(&path, json)?;
    Ok(())
}

pub fn load_settings(dir: &str) -> Result<DialSettings> {
    let json = fs::read_to_string(settings_path(dir))?;
    Ok(serde_json::from_str(&json)?)
}

pub fn load_settings_if_exists(dir: &str) -> Result<Option<DialSettings>> {
    match load_settings(dir) {
        Ok(settings) => Ok(Some(settings)),
        Err(DialError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Card-1"), "Card-1");
        assert_eq!(sanitize_file_stem("My Panel-1"), "My_20_Panel-1");
        assert_eq!(sanitize_file_stem("My_Panel-1"), "My_5f_Panel-1");
        assert_eq!(sanitize_file_stem("../etc"), "_2e__2e__2f_etc");
    }

    #[test]
    fn test_similar_ids_use_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert_ne!(
            storage.path_for("My Panel-1"),
            storage.path_for("My_Panel-1")
        );

        let state = PanelState::new(vec![], Some("a".into()));
        storage.save("My Panel-1", &state).unwrap();
        assert_eq!(storage.load("My_Panel-1").unwrap(), None);
        assert_eq!(storage.load("My Panel-1").unwrap(), Some(state));
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("p").unwrap(), None);
        let state = PanelState::new(vec![], Some("x".into()));
        storage.save("p", &state).unwrap();
        assert_eq!(storage.load("p").unwrap(), Some(state));
        assert!(storage.raw("p").unwrap().contains("activePresetId"));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.load("panel").unwrap(), None);

        let state = PanelState::new(vec![], None);
        storage.save("panel", &state).unwrap();
        assert!(storage.path_for("panel").exists());
        assert_eq!(storage.load("panel").unwrap(), Some(state));
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dir = dir.path().to_string_lossy().into_owned();
        assert_eq!(load_settings_if_exists(&dir).unwrap(), None);

        let settings = DialSettings {
            max_notify_depth: 3,
            ..DialSettings::default()
        };
        save_settings(&dir, &settings).unwrap();
        assert_eq!(load_settings_if_exists(&dir).unwrap(), Some(settings));
    }
}
