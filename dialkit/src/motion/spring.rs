//! Spring parameterizations and the step-response sampler used to preview
//! them.
//!
//! A spring can be described two ways:
//!
//! - **simple** – `visual_duration` (seconds) and `bounce` (`0` = critically
//!   damped, towards `1` = increasingly oscillatory), mass fixed at 1
//! - **advanced** – raw `stiffness`, `damping` and `mass`
//!
//! Both describe the same damped harmonic oscillator:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! with `ω = √(stiffness / mass) = 2π / visual_duration` and damping ratio
//! `ζ = damping / (2√(stiffness × mass)) = 1 - bounce`, so converting back and
//! forth preserves the motion. Everything here is pure and deterministic.

use serde::{Deserialize, Serialize};

use crate::core::util::TWO_PI;

pub const DEFAULT_VISUAL_DURATION: f64 = 0.3;
pub const DEFAULT_BOUNCE: f64 = 0.2;
pub const DEFAULT_STIFFNESS: f64 = 400.0;
pub const DEFAULT_DAMPING: f64 = 17.0;
pub const DEFAULT_MASS: f64 = 1.0;

/// Number of integration steps in a sampled curve. Curves contain one more
/// sample than this since `t = 0` is included.
pub const CURVE_STEPS: usize = 100;

/// Time window (seconds) rendered by spring previews
pub const PREVIEW_DURATION: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpringMode {
    #[default]
    Simple,
    Advanced,
}

impl SpringMode {
    pub fn is_simple(&self) -> bool {
        matches!(self, SpringMode::Simple)
    }

    /// The sub-controls a spring editor shows in this mode
    pub fn fields(&self) -> &'static [SpringField] {
        match self {
            SpringMode::Simple => &SIMPLE_FIELDS,
            SpringMode::Advanced => &ADVANCED_FIELDS,
        }
    }
}

/// Slider constraints for one editable spring field
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpringField {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

const SIMPLE_FIELDS: [SpringField; 2] = [
    SpringField {
        key: "visualDuration",
        label: "Duration",
        min: 0.1,
        max: 1.0,
        step: 0.05,
        default: DEFAULT_VISUAL_DURATION,
    },
    SpringField {
        key: "bounce",
        label: "Bounce",
        min: 0.0,
        max: 1.0,
        step: 0.05,
        default: DEFAULT_BOUNCE,
    },
];

const ADVANCED_FIELDS: [SpringField; 3] = [
    SpringField {
        key: "stiffness",
        label: "Stiffness",
        min: 1.0,
        max: 1000.0,
        step: 10.0,
        default: DEFAULT_STIFFNESS,
    },
    SpringField {
        key: "damping",
        label: "Damping",
        min: 1.0,
        max: 100.0,
        step: 1.0,
        default: DEFAULT_DAMPING,
    },
    SpringField {
        key: "mass",
        label: "Mass",
        min: 0.1,
        max: 10.0,
        step: 0.1,
        default: DEFAULT_MASS,
    },
];

/// A spring as declared in a schema and stored as a live value. Only one
/// half of the fields is meaningful at a time, see [`SpringMode`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
}

impl SpringConfig {
    pub fn simple(visual_duration: f64, bounce: f64) -> Self {
        Self {
            visual_duration: Some(visual_duration),
            bounce: Some(bounce),
            ..Self::default()
        }
    }

    pub fn advanced(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness: Some(stiffness),
            damping: Some(damping),
            mass: Some(mass),
            ..Self::default()
        }
    }

    fn has_timing(&self) -> bool {
        self.visual_duration.is_some() || self.bounce.is_some()
    }

    fn has_physics(&self) -> bool {
        self.stiffness.is_some() || self.damping.is_some() || self.mass.is_some()
    }

    /// The mode this value was written in: advanced only when it carries
    /// physical fields and no timing fields
    pub fn implied_mode(&self) -> SpringMode {
        if self.has_physics() && !self.has_timing() {
            SpringMode::Advanced
        } else {
            SpringMode::Simple
        }
    }

    /// Re-expresses the spring, read as `from`, in `to`'s fields. The result
    /// only populates the target mode's fields.
    pub fn convert(&self, from: SpringMode, to: SpringMode) -> SpringConfig {
        if from == to {
            return self.clone();
        }
        let physics = resolve_spring_physics(self, from.is_simple());
        match to {
            SpringMode::Advanced => SpringConfig::advanced(
                physics.stiffness,
                physics.damping,
                physics.mass,
            ),
            SpringMode::Simple => {
                let timing = resolve_spring_timing(&physics);
                SpringConfig::simple(timing.visual_duration, timing.bounce)
            }
        }
    }

    /// Wire name of the first populated field that cannot drive a spring:
    /// anything non-finite, a non-positive duration, stiffness or mass, or
    /// negative damping
    pub fn invalid_field(&self) -> Option<&'static str> {
        let checks: [(&'static str, Option<f64>, fn(f64) -> bool); 5] = [
            ("visualDuration", self.visual_duration, |v| v > 0.0),
            ("bounce", self.bounce, |_| true),
            ("stiffness", self.stiffness, |v| v > 0.0),
            ("damping", self.damping, |v| v >= 0.0),
            ("mass", self.mass, |v| v > 0.0),
        ];
        checks.into_iter().find_map(|(name, value, in_range)| match value {
            Some(v) if !v.is_finite() || !in_range(v) => Some(name),
            _ => None,
        })
    }

    pub fn to_mode(&self, mode: SpringMode) -> SpringConfig {
        self.convert(self.implied_mode(), mode)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpringPhysics {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringTiming {
    pub visual_duration: f64,
    pub bounce: f64,
}

/// Physical parameters for `spring`. In simple mode `visual_duration` and
/// `bounce` are converted (mass is fixed at 1); in advanced mode the physical
/// fields pass through. Missing fields take the module defaults.
pub fn resolve_spring_physics(
    spring: &SpringConfig,
    is_simple_mode: bool,
) -> SpringPhysics {
    if is_simple_mode {
        let visual_duration =
            spring.visual_duration.unwrap_or(DEFAULT_VISUAL_DURATION);
        let bounce = spring.bounce.unwrap_or(DEFAULT_BOUNCE);
        let mass = 1.0;

        let stiffness = (TWO_PI / visual_duration).powi(2);
        let damping_ratio = 1.0 - bounce;
        let damping = 2.0 * damping_ratio * (stiffness * mass).sqrt();

        return SpringPhysics {
            stiffness,
            damping,
            mass,
        };
    }

    SpringPhysics {
        stiffness: spring.stiffness.unwrap_or(DEFAULT_STIFFNESS),
        damping: spring.damping.unwrap_or(DEFAULT_DAMPING),
        mass: spring.mass.unwrap_or(DEFAULT_MASS),
    }
}

/// Inverse of the simple branch of [`resolve_spring_physics`]. Overdamped
/// springs have no bounce to express so `bounce` is clamped to `[0, 1]`.
pub fn resolve_spring_timing(physics: &SpringPhysics) -> SpringTiming {
    let natural_frequency = (physics.stiffness / physics.mass).sqrt();
    let visual_duration = TWO_PI / natural_frequency;
    let damping_ratio =
        physics.damping / (2.0 * (physics.stiffness * physics.mass).sqrt());

    SpringTiming {
        visual_duration,
        bounce: (1.0 - damping_ratio).clamp(0.0, 1.0),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurveSample {
    pub time: f64,
    pub position: f64,
}

/// Unit step response of the oscillator starting at rest at 0 and pulled
/// towards 1, integrated with semi-implicit Euler over [`CURVE_STEPS`] equal
/// steps spanning `duration`. Always returns `CURVE_STEPS + 1` samples
/// starting at `(0, 0)`.
pub fn generate_spring_curve(
    stiffness: f64,
    damping: f64,
    mass: f64,
    duration: f64,
) -> Vec<CurveSample> {
    let dt = duration / CURVE_STEPS as f64;
    let target = 1.0;

    let mut points = Vec::with_capacity(CURVE_STEPS + 1);
    let mut position = 0.0;
    let mut velocity = 0.0;

    for i in 0..=CURVE_STEPS {
        points.push(CurveSample {
            time: i as f64 * dt,
            position,
        });

        let spring_force = -stiffness * (position - target);
        let damping_force = -damping * velocity;
        let acceleration = (spring_force + damping_force) / mass;

        velocity += acceleration * dt;
        position += velocity * dt;
    }

    points
}

/// The curve a spring preview draws for `spring` interpreted in `mode`
pub fn preview_curve(
    spring: &SpringConfig,
    mode: SpringMode,
) -> Vec<CurveSample> {
    let physics = resolve_spring_physics(spring, mode.is_simple());
    generate_spring_curve(
        physics.stiffness,
        physics.damping,
        physics.mass,
        PREVIEW_DURATION,
    )
}
