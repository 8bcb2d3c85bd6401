//! Schema types describing a panel's controls, plus parsing from the YAML or
//! JSON shorthand format:
//!
//! ```yaml
//! opacity: [1, 0, 1, 0.01]   # slider: [default, min, max, step?]
//! visible: true              # toggle
//! tint: "#ff5500"            # color
//! title: Hello               # text
//! scale: 2                   # read-only constant
//! easing:
//!   type: select
//!   options: [linear, ease-in, { value: spring, label: Springy }]
//! motion:
//!   type: spring
//!   visualDuration: 0.3
//!   bounce: 0.2
//! reset:
//!   type: action
//! fx:                        # folder
//!   blur: [24, 0, 100]
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use yaml_merge_keys::merge_keys_serde_yml;

use crate::core::prelude::*;
use crate::core::util::{DEFAULT_STEP, SelectOption};
use crate::motion::SpringConfig;

/// Uses [`IndexMap`] so the exact declaration order of controls survives
pub type DialConfig = IndexMap<String, DialValue>;

/// One entry of a schema. Shorthand forms are classified once, at the
/// declaration boundary, so everything downstream can match exhaustively.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawDialValue", into = "RawDialValue")]
pub enum DialValue {
    /// A constant: part of the resolved values but not a control
    Number(f64),
    /// Shorthand for a toggle
    Bool(bool),
    /// Shorthand for a color (when it is a hex color) or a text field
    String(String),
    Slider(SliderConfig),
    Action(ActionConfig),
    Select(SelectConfig),
    Color(ColorConfig),
    Text(TextConfig),
    Spring(SpringConfig),
    /// A folder of nested controls
    Group(DialConfig),
}

impl From<f64> for DialValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for DialValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for DialValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<SliderConfig> for DialValue {
    fn from(value: SliderConfig) -> Self {
        Self::Slider(value)
    }
}

impl From<SpringConfig> for DialValue {
    fn from(value: SpringConfig) -> Self {
        Self::Spring(value)
    }
}

impl From<DialConfig> for DialValue {
    fn from(value: DialConfig) -> Self {
        Self::Group(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliderConfig {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderConfig {
    pub fn new(default: f64, min: f64, max: f64) -> Self {
        Self {
            default,
            min,
            max,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }
}

impl TryFrom<Vec<f64>> for SliderConfig {
    type Error = String;

    fn try_from(tuple: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match tuple.as_slice() {
            [default, min, max] => Ok(Self::new(*default, *min, *max)),
            [default, min, max, step] => {
                Ok(Self::new(*default, *min, *max).with_step(*step))
            }
            _ => Err(format!(
                "slider shorthand needs [default, min, max, step?], got {} \
                 numbers",
                tuple.len()
            )),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ActionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SelectConfig {
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ColorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Canonical long-form controls, discriminated by their `type` key
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TypedControl {
    Action(ActionConfig),
    Select(SelectConfig),
    Color(ColorConfig),
    Text(TextConfig),
    Spring(SpringConfig),
}

/// The wire shape of [`DialValue`]. Order matters: typed objects must be
/// tried before plain groups.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum RawDialValue {
    Bool(bool),
    Number(f64),
    String(String),
    Tuple(Vec<f64>),
    Typed(TypedControl),
    Group(IndexMap<String, DialValue>),
}

impl TryFrom<RawDialValue> for DialValue {
    type Error = String;

    fn try_from(raw: RawDialValue) -> std::result::Result<Self, Self::Error> {
        Ok(match raw {
            RawDialValue::Bool(value) => DialValue::Bool(value),
            RawDialValue::Number(value) => DialValue::Number(value),
            RawDialValue::String(value) => DialValue::String(value),
            RawDialValue::Tuple(tuple) => {
                DialValue::Slider(SliderConfig::try_from(tuple)?)
            }
            RawDialValue::Typed(typed) => match typed {
                TypedControl::Action(c) => DialValue::Action(c),
                TypedControl::Select(c) => DialValue::Select(c),
                TypedControl::Color(c) => DialValue::Color(c),
                TypedControl::Text(c) => DialValue::Text(c),
                TypedControl::Spring(c) => DialValue::Spring(c),
            },
            RawDialValue::Group(group) => {
                if let Some(kind) = group.get("type") {
                    return Err(format!(
                        "unknown or malformed control type: {:?}",
                        kind
                    ));
                }
                DialValue::Group(group)
            }
        })
    }
}

impl From<DialValue> for RawDialValue {
    fn from(value: DialValue) -> Self {
        match value {
            DialValue::Number(v) => RawDialValue::Number(v),
            DialValue::Bool(v) => RawDialValue::Bool(v),
            DialValue::String(v) => RawDialValue::String(v),
            DialValue::Slider(s) => {
                RawDialValue::Tuple(vec![s.default, s.min, s.max, s.step])
            }
            DialValue::Action(c) => {
                RawDialValue::Typed(TypedControl::Action(c))
            }
            DialValue::Select(c) => {
                RawDialValue::Typed(TypedControl::Select(c))
            }
            DialValue::Color(c) => RawDialValue::Typed(TypedControl::Color(c)),
            DialValue::Text(c) => RawDialValue::Typed(TypedControl::Text(c)),
            DialValue::Spring(c) => {
                RawDialValue::Typed(TypedControl::Spring(c))
            }
            DialValue::Group(group) => RawDialValue::Group(group),
        }
    }
}

/// Parses a YAML schema. Supports `<<` merge keys so repeated control
/// definitions can share anchors.
pub fn parse_from_str(yaml_str: &str) -> Result<DialConfig> {
    let raw_config: serde_yml::Value = serde_yml::from_str(yaml_str)?;
    let merged_config = merge_keys_serde_yml(raw_config)
        .map_err(|e| DialError::Config(e.to_string()))?;
    let config: DialConfig = serde_yml::from_value(merged_config)?;
    Ok(config)
}

pub fn parse_from_json(json_str: &str) -> Result<DialConfig> {
    Ok(serde_json::from_str(json_str)?)
}

/// Loads a schema file, picking the format from the extension (`.json`,
/// anything else is read as YAML)
pub fn parse_from_path(path: &Path) -> Result<DialConfig> {
    let file_content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = ternary!(
        is_json,
        parse_from_json(&file_content)?,
        parse_from_str(&file_content)?
    );
    debug!("Loaded {} schema entries from {:?}", config.len(), path);
    Ok(config)
}

/// Declares a schema in Rust code
///
/// # Example
/// ```rust
/// let config = DialConfigBuilder::new()
///     .slider("opacity", 1.0, (0.0, 1.0), 0.01)
///     .color("tint", "#ff5500")
///     .folder("fx", |fx| fx.slider("blur", 24.0, (0.0, 100.0), 1.0))
///     .build();
/// ```
#[derive(Default)]
pub struct DialConfigBuilder {
    config: DialConfig,
}

impl DialConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &str, value: impl Into<DialValue>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    pub fn constant(self, key: &str, value: f64) -> Self {
        self.value(key, DialValue::Number(value))
    }

    pub fn slider(
        self,
        key: &str,
        default: f64,
        range: (f64, f64),
        step: f64,
    ) -> Self {
        self.value(
            key,
            SliderConfig::new(default, range.0, range.1).with_step(step),
        )
    }

    pub fn toggle(self, key: &str, default: bool) -> Self {
        self.value(key, DialValue::Bool(default))
    }

    pub fn color(self, key: &str, default: &str) -> Self {
        self.value(
            key,
            DialValue::Color(ColorConfig {
                default: Some(default.to_string()),
            }),
        )
    }

    pub fn text(self, key: &str, default: &str) -> Self {
        self.value(
            key,
            DialValue::Text(TextConfig {
                default: Some(default.to_string()),
                placeholder: None,
            }),
        )
    }

    pub fn select<S>(
        self,
        key: &str,
        options: &[S],
        default: Option<&str>,
    ) -> Self
    where
        S: AsRef<str>,
    {
        self.value(
            key,
            DialValue::Select(SelectConfig {
                options: options
                    .iter()
                    .map(|s| SelectOption::from(s.as_ref()))
                    .collect(),
                default: default.map(ToOwned::to_owned),
            }),
        )
    }

    pub fn spring(self, key: &str, spring: SpringConfig) -> Self {
        self.value(key, DialValue::Spring(spring))
    }

    pub fn action(self, key: &str, label: Option<&str>) -> Self {
        self.value(
            key,
            DialValue::Action(ActionConfig {
                label: label.map(ToOwned::to_owned),
            }),
        )
    }

    pub fn folder<F>(self, key: &str, build: F) -> Self
    where
        F: FnOnce(DialConfigBuilder) -> DialConfigBuilder,
    {
        let nested = build(DialConfigBuilder::new()).build();
        self.value(key, DialValue::Group(nested))
    }

    pub fn build(self) -> DialConfig {
        self.config
    }
}
