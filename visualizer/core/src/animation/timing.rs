//! Easing Curves
//!
//! Easing functions applied by tween engines to a normalized progress value.
//! Curves are identified by name at the tween boundary (`"power2.out"`,
//! `"linear"`, ...) so a host engine can map them onto its own primitives.

use serde::{Deserialize, Serialize};

/// Easing curves used by the wizard and the pipeline card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// Constant speed; fades
    #[default]
    Linear,

    /// Cubic ease in (`power2.in`); flash up
    EaseInCubic,

    /// Cubic ease out (`power2.out`); flash down
    EaseOutCubic,

    /// Cubic ease in and out (`power2.inOut`); card hops
    EaseInOutCubic,
}

impl EasingFunction {
    /// Map progress in `0.0..=1.0` onto the curve
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInCubic => t.powi(3),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t.powi(3),
            Self::EaseInOutCubic => 1.0 - (2.0 - 2.0 * t).powi(3) / 2.0,
        }
    }

    /// Name passed across the tween boundary
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInCubic => "power2.in",
            Self::EaseOutCubic => "power2.out",
            Self::EaseInOutCubic => "power2.inOut",
        }
    }
}

impl std::fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
