use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap as StdHashMap;

pub const TWO_PI: f64 = std::f64::consts::PI * 2.0;

/// Slider step used when a shorthand tuple omits one
pub const DEFAULT_STEP: f64 = 0.01;

/// Normalized distance from a tenth within which [`snap_to_decile`] snaps
pub const DECILE_SNAP_THRESHOLD: f64 = 0.03125;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;

/// `ternary!(cond, true_case, false_case)`
#[macro_export]
macro_rules! ternary {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition { $_true } else { $_false }
    };
}

/// Number of decimal digits in the shortest textual form of `step`, e.g.
/// `0.05 => 2`, `1.0 => 0`
pub fn decimals_for_step(step: f64) -> usize {
    let s = step.to_string();
    match s.find('.') {
        Some(dot) => s.len() - dot - 1,
        None => 0,
    }
}

/// Rounds `value` to the nearest multiple of `step` then re-quantizes to the
/// precision implied by `step` so no floating point residue survives.
/// Idempotent. A non-positive or non-finite `step` leaves `value` untouched.
pub fn round_value(value: f64, step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 || !value.is_finite() {
        return value;
    }
    let raw = (value / step).round() * step;
    let decimals = decimals_for_step(step).min(15) as i32;
    let factor = 10f64.powi(decimals);
    (raw * factor).round() / factor
}

/// Gives slider drags a soft detent: when `raw` lands within
/// [`DECILE_SNAP_THRESHOLD`] (normalized) of a tenth of the range it snaps to
/// that tenth, otherwise it is returned unchanged.
pub fn snap_to_decile(raw: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return raw;
    }
    let normalized = (raw - min) / range;
    let nearest = (normalized * 10.0).round() / 10.0;
    if (normalized - nearest).abs() <= DECILE_SNAP_THRESHOLD {
        min + nearest * range
    } else {
        raw
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6 | 8)
                && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// `#abc => #aabbcc`. Anything that isn't a 3 digit shorthand passes through.
pub fn expand_shorthand_hex(hex: &str) -> String {
    if hex.len() != 4 || !hex.starts_with('#') {
        return hex.to_string();
    }
    let mut expanded = String::with_capacity(7);
    expanded.push('#');
    for c in hex.chars().skip(1) {
        expanded.push(c);
        expanded.push(c);
    }
    expanded
}

/// Uppercases the first character of every word, e.g. `"ease in" => "Ease
/// In"`. Word characters are alphanumerics and `_`.
pub fn to_title_case(s: &str) -> String {
    let mut previous_is_word = false;
    s.chars()
        .map(|c| {
            let is_word = c.is_alphanumeric() || c == '_';
            let mapped = ternary!(
                is_word && !previous_is_word,
                c.to_uppercase().next().unwrap_or(c),
                c
            );
            previous_is_word = is_word;
            mapped
        })
        .collect()
}

/// A select option as declared in a schema: either a bare value or an
/// explicit value/label pair
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SelectOption {
    Value(String),
    Labeled { value: String, label: String },
}

impl SelectOption {
    pub fn value(&self) -> &str {
        match self {
            SelectOption::Value(value) => value,
            SelectOption::Labeled { value, .. } => value,
        }
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NormalizedOption {
    pub value: String,
    pub label: String,
}

/// Maps every option to a value/label pair, title-casing bare values for
/// their label
pub fn normalize_select_options(
    options: &[SelectOption],
) -> Vec<NormalizedOption> {
    options
        .iter()
        .map(|option| match option {
            SelectOption::Value(value) => NormalizedOption {
                value: value.clone(),
                label: to_title_case(value),
            },
            SelectOption::Labeled { value, label } => NormalizedOption {
                value: value.clone(),
                label: label.clone(),
            },
        })
        .collect()
}

/// The implicit default of a select that doesn't declare one
pub fn first_option_value(options: &[SelectOption]) -> Option<String> {
    options.first().map(|option| option.value().to_string())
}

/// Parses text typed into a numeric field. Returns `None` (leaving the
/// control untouched) for anything that isn't a finite number, otherwise the
/// value clamped to `[min, max]` and rounded to `step`.
pub fn parse_numeric_input(
    text: &str,
    min: f64,
    max: f64,
    step: f64,
) -> Option<f64> {
    let parsed = text.trim().parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    let (lo, hi) = ternary!(min <= max, (min, max), (max, min));
    Some(round_value(parsed.clamp(lo, hi), step))
}

/// Validates text typed into a color field, tolerating a missing `#` and
/// expanding shorthand. `None` means the field should revert.
pub fn normalize_color_input(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let candidate = ternary!(
        trimmed.starts_with('#'),
        trimmed.to_string(),
        format!("#{}", trimmed)
    );
    if is_hex_color(&candidate) {
        Some(expand_shorthand_hex(&candidate).to_ascii_lowercase())
    } else {
        None
    }
}
