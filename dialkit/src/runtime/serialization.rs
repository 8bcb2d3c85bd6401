use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::control::Preset;
use crate::control::dial_store::DEFAULT_MAX_NOTIFY_DEPTH;
use crate::motion::PREVIEW_DURATION;
use crate::runtime::storage;

pub const SETTINGS_VERSION: &str = "1";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialSettings {
    pub version: String,
    /// Where [`storage::JsonFileStorage`] keeps preset files
    pub storage_dir: String,
    /// Bounds nested notification passes caused by listeners that mutate the
    /// store they are listening to
    pub max_notify_depth: usize,
    /// Seconds of motion shown by spring previews
    pub preview_duration: f64,
}

impl Default for DialSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            storage_dir: storage::default_storage_dir(),
            max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
            preview_duration: PREVIEW_DURATION,
        }
    }
}

pub const PANEL_STATE_VERSION: &str = "1";

/// What gets persisted per panel: its presets and which one is selected.
/// Live values are deliberately not part of it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub version: String,
    #[serde(default, deserialize_with = "deserialize_presets")]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub active_preset_id: Option<String>,
}

impl PanelState {
    pub fn new(presets: Vec<Preset>, active_preset_id: Option<String>) -> Self {
        Self {
            version: PANEL_STATE_VERSION.to_string(),
            presets,
            active_preset_id,
        }
    }
}

/// Reads presets one at a time so a single unreadable entry is dropped
/// instead of taking every other preset of the panel down with it
fn deserialize_presets<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Preset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let presets = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Preset>(value) {
            Ok(preset) => Some(preset),
            Err(e) => {
                warn!("Skipping unreadable preset: {}", e);
                None
            }
        })
        .collect();
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlValue, ControlValues};
    use crate::motion::SpringConfig;

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings: DialSettings =
            serde_json::from_str(r#"{ "max_notify_depth": 4 }"#).unwrap();
        assert_eq!(settings.max_notify_depth, 4);
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.preview_duration, PREVIEW_DURATION);
    }

    #[test]
    fn test_panel_state_json() {
        let mut values = ControlValues::default();
        values.insert("opacity".into(), ControlValue::Number(0.5));
        values.insert(
            "motion".into(),
            ControlValue::Spring(SpringConfig::advanced(300.0, 20.0, 1.0)),
        );
        let state = PanelState::new(
            vec![Preset {
                id: "preset-1".into(),
                name: "Version 2".into(),
                values,
            }],
            Some("preset-1".into()),
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["activePresetId"], "preset-1");
        assert_eq!(json["presets"][0]["values"]["motion"]["type"], "spring");

        let back: PanelState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_unreadable_preset_is_skipped() {
        let json = r#"{
            "version": "1",
            "presets": [
                { "id": "preset-1", "name": "Good", "values": { "a": 0.5 } },
                { "id": "preset-2", "name": "Bad", "values": { "a": null } }
            ],
            "activePresetId": "preset-2"
        }"#;
        let state: PanelState = serde_json::from_str(json).unwrap();
        assert_eq!(state.presets.len(), 1);
        assert_eq!(state.presets[0].name, "Good");
        assert_eq!(state.active_preset_id.as_deref(), Some("preset-2"));
    }
}
