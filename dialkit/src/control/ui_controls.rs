//! Live control values and the render-facing control descriptors adapters
//! draw from. Neither type is coupled to a specific UI framework.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::util::NormalizedOption;
use crate::motion::SpringConfig;

/// The current value of a control. Serializes to plain JSON: numbers,
/// booleans, strings, and springs as `{"type": "spring", ...}` records.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "ValueRepr", into = "ValueRepr")]
pub enum ControlValue {
    Number(f64),
    Bool(bool),
    String(String),
    Spring(SpringConfig),
}

impl ControlValue {
    pub fn as_float(&self) -> Option<f64> {
        if let ControlValue::Number(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let ControlValue::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let ControlValue::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_spring(&self) -> Option<&SpringConfig> {
        if let ControlValue::Spring(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ControlValue::Number(_) => "a number",
            ControlValue::Bool(_) => "a boolean",
            ControlValue::String(_) => "a string",
            ControlValue::Spring(_) => "a spring",
        }
    }

    /// True when both values are the same variant
    pub fn same_kind(&self, other: &ControlValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Default for ControlValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ControlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for ControlValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<SpringConfig> for ControlValue {
    fn from(value: SpringConfig) -> Self {
        Self::Spring(value)
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum ValueRepr {
    Spring(TaggedSpring),
    Number(f64),
    Bool(bool),
    String(String),
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedSpring {
    Spring(SpringConfig),
}

impl From<ValueRepr> for ControlValue {
    fn from(repr: ValueRepr) -> Self {
        match repr {
            ValueRepr::Spring(TaggedSpring::Spring(s)) => Self::Spring(s),
            ValueRepr::Number(v) => Self::Number(v),
            ValueRepr::Bool(v) => Self::Bool(v),
            ValueRepr::String(v) => Self::String(v),
        }
    }
}

impl From<ControlValue> for ValueRepr {
    fn from(value: ControlValue) -> Self {
        match value {
            ControlValue::Spring(s) => Self::Spring(TaggedSpring::Spring(s)),
            ControlValue::Number(v) => Self::Number(v),
            ControlValue::Bool(v) => Self::Bool(v),
            ControlValue::String(v) => Self::String(v),
        }
    }
}

/// Flat `path => value` map in schema order
pub type ControlValues = IndexMap<String, ControlValue>;

/// Render-facing description of one schema entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlMeta {
    /// Dotted path, unique within the panel
    pub path: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ControlKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlKind {
    Slider {
        min: f64,
        max: f64,
        step: f64,
    },
    Toggle,
    Spring,
    Folder {
        #[serde(rename = "defaultOpen")]
        default_open: bool,
        children: Vec<ControlMeta>,
    },
    Action,
    Select {
        options: Vec<NormalizedOption>,
    },
    Color,
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
}

impl ControlMeta {
    pub fn variant_string(&self) -> &'static str {
        match self.kind {
            ControlKind::Slider { .. } => "slider",
            ControlKind::Toggle => "toggle",
            ControlKind::Spring => "spring",
            ControlKind::Folder { .. } => "folder",
            ControlKind::Action => "action",
            ControlKind::Select { .. } => "select",
            ControlKind::Color => "color",
            ControlKind::Text { .. } => "text",
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ControlKind::Folder { .. })
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, ControlKind::Action)
    }

    pub fn is_spring(&self) -> bool {
        matches!(self.kind, ControlKind::Spring)
    }

    pub fn children(&self) -> &[ControlMeta] {
        match &self.kind {
            ControlKind::Folder { children, .. } => children,
            _ => &[],
        }
    }

    /// Whether `value` is the right variant to be stored at this control
    pub fn accepts(&self, value: &ControlValue) -> bool {
        match (&self.kind, value) {
            (ControlKind::Slider { .. }, ControlValue::Number(_)) => true,
            (ControlKind::Toggle, ControlValue::Bool(_)) => true,
            (ControlKind::Spring, ControlValue::Spring(_)) => true,
            (ControlKind::Select { .. }, ControlValue::String(_)) => true,
            (ControlKind::Color, ControlValue::String(_)) => true,
            (ControlKind::Text { .. }, ControlValue::String(_)) => true,
            _ => false,
        }
    }

    pub fn expected_kind(&self) -> &'static str {
        match self.kind {
            ControlKind::Slider { .. } => "a number",
            ControlKind::Toggle => "a boolean",
            ControlKind::Spring => "a spring",
            ControlKind::Select { .. }
            | ControlKind::Color
            | ControlKind::Text { .. } => "a string",
            ControlKind::Folder { .. } | ControlKind::Action => "nothing",
        }
    }
}

/// Every non-folder descriptor in the tree, depth first, in schema order
pub fn leaf_controls(controls: &[ControlMeta]) -> Vec<&ControlMeta> {
    let mut leaves = Vec::new();
    collect_leaves(controls, &mut leaves);
    leaves
}

fn collect_leaves<'a>(
    controls: &'a [ControlMeta],
    leaves: &mut Vec<&'a ControlMeta>,
) {
    for control in controls {
        if control.is_folder() {
            collect_leaves(control.children(), leaves);
        } else {
            leaves.push(control);
        }
    }
}

/// Finds any descriptor, folders included, by its full path
pub fn find_control<'a>(
    controls: &'a [ControlMeta],
    path: &str,
) -> Option<&'a ControlMeta> {
    for control in controls {
        if control.path == path {
            return Some(control);
        }
        if control.is_folder()
            && path.starts_with(&control.path)
            && path[control.path.len()..].starts_with('.')
        {
            return find_control(control.children(), path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider(path: &str) -> ControlMeta {
        ControlMeta {
            path: path.into(),
            label: path.into(),
            kind: ControlKind::Slider {
                min: 0.0,
                max: 1.0,
                step: 0.01,
            },
        }
    }

    #[test]
    fn test_control_value_json_shape() {
        let values: ControlValues = [
            ("a".to_string(), ControlValue::Number(0.5)),
            ("b".to_string(), ControlValue::Bool(true)),
            ("c".to_string(), ControlValue::from("#fff")),
            (
                "d".to_string(),
                ControlValue::Spring(SpringConfig::simple(0.3, 0.2)),
            ),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["a"], 0.5);
        assert_eq!(json["b"], true);
        assert_eq!(json["c"], "#fff");
        assert_eq!(json["d"]["type"], "spring");
        assert_eq!(json["d"]["visualDuration"], 0.3);

        let back: ControlValues = serde_json::from_value(json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_meta_serializes_with_type_tag() {
        let folder = ControlMeta {
            path: "fx".into(),
            label: "Fx".into(),
            kind: ControlKind::Folder {
                default_open: true,
                children: vec![slider("fx.blur")],
            },
        };
        let json = serde_json::to_value(&folder).unwrap();
        assert_eq!(json["type"], "folder");
        assert_eq!(json["defaultOpen"], true);
        assert_eq!(json["children"][0]["type"], "slider");
        assert_eq!(json["children"][0]["step"], 0.01);
    }

    #[test]
    fn test_find_control_and_leaves() {
        let tree = vec![
            slider("a"),
            ControlMeta {
                path: "fx".into(),
                label: "Fx".into(),
                kind: ControlKind::Folder {
                    default_open: true,
                    children: vec![slider("fx.blur"), slider("fx.glow")],
                },
            },
            slider("fxx"),
        ];
        assert_eq!(find_control(&tree, "fx.glow").unwrap().path, "fx.glow");
        assert_eq!(find_control(&tree, "fxx").unwrap().path, "fxx");
        assert!(find_control(&tree, "fx.nope").is_none());
        let paths: Vec<&str> =
            leaf_controls(&tree).iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["a", "fx.blur", "fx.glow", "fxx"]);
    }

    #[test]
    fn test_accepts() {
        let control = slider("a");
        assert!(control.accepts(&ControlValue::Number(1.0)));
        assert!(!control.accepts(&ControlValue::Bool(true)));
    }
}
