//! Turns a [`DialConfig`] into the flat default-value map and control tree a
//! panel is registered with, and rebuilds the nested value object hosts read
//! from the flat live values.

use indexmap::IndexMap;
use serde::Serialize;

use super::config::{DialConfig, DialValue};
use super::ui_controls::{ControlKind, ControlMeta, ControlValue, ControlValues};
use crate::core::prelude::*;
use crate::core::util::{
    first_option_value, is_hex_color, normalize_select_options, to_title_case,
};
use crate::motion::SpringConfig;

pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedSchema {
    /// One entry per value-carrying leaf path, in schema order
    pub defaults: ControlValues,
    /// Same nesting as the schema, minus constants
    pub controls: Vec<ControlMeta>,
}

/// Walks `schema` once, producing flat defaults keyed by dotted path and the
/// control tree adapters render
pub fn resolve_schema(schema: &DialConfig) -> ResolvedSchema {
    let mut defaults = ControlValues::default();
    let controls = resolve_level(schema, "", &mut defaults);
    trace!(
        "Resolved {} values / {} top-level controls",
        defaults.len(),
        controls.len()
    );
    ResolvedSchema { defaults, controls }
}

fn resolve_level(
    schema: &DialConfig,
    prefix: &str,
    defaults: &mut ControlValues,
) -> Vec<ControlMeta> {
    let mut controls = Vec::with_capacity(schema.len());

    for (key, value) in schema {
        let path = join_path(prefix, key);
        let label = to_title_case(key);

        if let Some(default) = default_value(value) {
            defaults.insert(path.clone(), default);
        }

        let kind = match value {
            DialValue::Number(_) => continue,
            DialValue::Bool(_) => ControlKind::Toggle,
            DialValue::String(s) => {
                if is_hex_color(s) {
                    ControlKind::Color
                } else {
                    ControlKind::Text { placeholder: None }
                }
            }
            DialValue::Slider(slider) => ControlKind::Slider {
                min: slider.min,
                max: slider.max,
                step: slider.step,
            },
            DialValue::Action(action) => {
                controls.push(ControlMeta {
                    label: action.label.clone().unwrap_or(label),
                    path,
                    kind: ControlKind::Action,
                });
                continue;
            }
            DialValue::Select(select) => ControlKind::Select {
                options: normalize_select_options(&select.options),
            },
            DialValue::Color(_) => ControlKind::Color,
            DialValue::Text(text) => ControlKind::Text {
                placeholder: text.placeholder.clone(),
            },
            DialValue::Spring(_) => ControlKind::Spring,
            DialValue::Group(group) => ControlKind::Folder {
                default_open: true,
                children: resolve_level(group, &path, defaults),
            },
        };

        controls.push(ControlMeta { path, label, kind });
    }

    controls
}

/// The value a leaf starts with. `None` for folders and actions, which have
/// no stored value.
pub fn default_value(value: &DialValue) -> Option<ControlValue> {
    Some(match value {
        DialValue::Number(v) => ControlValue::Number(*v),
        DialValue::Bool(v) => ControlValue::Bool(*v),
        DialValue::String(v) => ControlValue::String(v.clone()),
        DialValue::Slider(slider) => ControlValue::Number(slider.default),
        DialValue::Select(select) => ControlValue::String(
            select
                .default
                .clone()
                .or_else(|| first_option_value(&select.options))
                .unwrap_or_default(),
        ),
        DialValue::Color(color) => ControlValue::String(
            color
                .default
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        ),
        DialValue::Text(text) => {
            ControlValue::String(text.default.clone().unwrap_or_default())
        }
        DialValue::Spring(spring) => ControlValue::Spring(spring.clone()),
        DialValue::Action(_) | DialValue::Group(_) => return None,
    })
}

pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Nested values mirroring the schema. Each leaf is looked up in
/// `flat_values` under `prefix.key`, falling back to the schema default, so
/// value maps saved against an older schema still resolve: unknown keys are
/// ignored and missing ones defaulted. Actions carry no value and are left
/// out.
pub fn build_resolved_values(
    schema: &DialConfig,
    flat_values: &ControlValues,
    prefix: &str,
) -> ResolvedValues {
    let mut resolved = IndexMap::with_capacity(schema.len());

    for (key, value) in schema {
        let path = join_path(prefix, key);
        let entry = match value {
            DialValue::Group(group) => ResolvedValue::Group(
                build_resolved_values(group, flat_values, &path),
            ),
            DialValue::Action(_) => continue,
            _ => {
                let current = flat_values
                    .get(&path)
                    .cloned()
                    .or_else(|| default_value(value));
                match current {
                    Some(current) => ResolvedValue::Value(current),
                    None => continue,
                }
            }
        };
        resolved.insert(key.clone(), entry);
    }

    ResolvedValues(resolved)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Value(ControlValue),
    Group(ResolvedValues),
}

/// The nested value object a host reads. Getters take dotted paths.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedValues(IndexMap<String, ResolvedValue>);

impl ResolvedValues {
    pub fn entries(&self) -> &IndexMap<String, ResolvedValue> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn entry(&self, path: &str) -> Option<&ResolvedValue> {
        match path.split_once('.') {
            Some((head, rest)) => match self.0.get(head)? {
                ResolvedValue::Group(group) => group.entry(rest),
                ResolvedValue::Value(_) => None,
            },
            None => self.0.get(path),
        }
    }

    pub fn get(&self, path: &str) -> Option<&ControlValue> {
        match self.entry(path)? {
            ResolvedValue::Value(value) => Some(value),
            ResolvedValue::Group(_) => None,
        }
    }

    pub fn group(&self, path: &str) -> Option<&ResolvedValues> {
        match self.entry(path)? {
            ResolvedValue::Group(group) => Some(group),
            ResolvedValue::Value(_) => None,
        }
    }

    pub fn float(&self, path: &str) -> f64 {
        self.get(path)
            .and_then(ControlValue::as_float)
            .unwrap_or_else(|| {
                error!("No float for `{}`. Returning 0.0.", path);
                0.0
            })
    }

    pub fn bool(&self, path: &str) -> bool {
        self.get(path)
            .and_then(ControlValue::as_bool)
            .unwrap_or_else(|| {
                error!("No bool for `{}`. Returning false.", path);
                false
            })
    }

    pub fn string(&self, path: &str) -> String {
        self.get(path)
            .and_then(ControlValue::as_string)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| {
                error!("No String for `{}`. Returning empty.", path);
                String::new()
            })
    }

    pub fn spring(&self, path: &str) -> SpringConfig {
        self.get(path)
            .and_then(ControlValue::as_spring)
            .cloned()
            .unwrap_or_else(|| {
                error!("No spring for `{}`. Returning default.", path);
                SpringConfig::default()
            })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
