//! Animation Boundary
//!
//! The engine never interpolates anything itself. It describes a tween as a
//! target element, a map of numeric properties, a duration and an easing
//! curve, and awaits the host's [`TweenEngine`] until the tween completes.
//! The only effect implemented here is the [`Typewriter`], which is text
//! rather than numeric and runs on its own tick.
//!
//! # Architecture
//!
//! ```text
//! ViewCoordinator / WizardController
//!     │  animate(target, properties, duration, easing).await
//!     ▼
//! TweenEngine (host)
//!     ├─→ FrameTweenEngine     (interpolates on a frame interval)
//!     ├─→ RecordingTweenEngine (records calls, completes at once)
//!     └─→ browser / GUI bridge (outside this crate)
//! ```

mod engines;
mod timing;
mod typewriter;

pub use engines::{FrameTweenEngine, RecordingTweenEngine, TweenCall};
pub use timing::EasingFunction;
pub use typewriter::{RevealOutcome, Typewriter, TypewriterPool, PLACEHOLDER};

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier of an element a tween can target
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    /// Create an element ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Numeric property a tween can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TweenProperty {
    /// Opacity (0.0 = transparent, 1.0 = opaque)
    Opacity,
    /// Horizontal translation in pixels
    X,
}

impl TweenProperty {
    /// Value an element has before any tween touched it
    #[must_use]
    pub fn resting_value(self) -> f32 {
        match self {
            Self::Opacity => 1.0,
            Self::X => 0.0,
        }
    }
}

/// Target values for a tween
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap(BTreeMap<TweenProperty, f32>);

impl PropertyMap {
    /// Empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property target
    #[must_use]
    pub fn with(mut self, property: TweenProperty, value: f32) -> Self {
        self.0.insert(property, value);
        self
    }

    /// Set a property target in place
    pub fn insert(&mut self, property: TweenProperty, value: f32) {
        self.0.insert(property, value);
    }

    /// Set the opacity target
    #[must_use]
    pub fn opacity(self, value: f32) -> Self {
        self.with(TweenProperty::Opacity, value.clamp(0.0, 1.0))
    }

    /// Set the horizontal offset target
    #[must_use]
    pub fn x(self, value: f32) -> Self {
        self.with(TweenProperty::X, value)
    }

    /// Target for a property, if set
    #[must_use]
    pub fn get(&self, property: TweenProperty) -> Option<f32> {
        self.0.get(&property).copied()
    }

    /// Iterate targets
    pub fn iter(&self) -> impl Iterator<Item = (TweenProperty, f32)> + '_ {
        self.0.iter().map(|(property, value)| (*property, *value))
    }

    /// Whether no property is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Host tween engine
///
/// `animate` resolves when the tween has finished. Implementations decide
/// how interpolation and easing are rendered.
#[async_trait]
pub trait TweenEngine: Send + Sync {
    /// Tween `target` towards `properties` over `duration`
    async fn animate(
        &self,
        target: &ElementId,
        properties: &PropertyMap,
        duration: Duration,
        easing: EasingFunction,
    );

    /// Apply `properties` immediately
    async fn set(&self, target: &ElementId, properties: &PropertyMap) {
        self.animate(target, properties, Duration::ZERO, EasingFunction::Linear)
            .await;
    }

    /// Fade `target` to fully transparent
    async fn fade_out(&self, target: &ElementId, duration: Duration) {
        self.animate(
            target,
            &PropertyMap::new().opacity(0.0),
            duration,
            EasingFunction::Linear,
        )
        .await;
    }

    /// Fade `target` to fully opaque
    async fn fade_in(&self, target: &ElementId, duration: Duration) {
        self.animate(
            target,
            &PropertyMap::new().opacity(1.0),
            duration,
            EasingFunction::Linear,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_map_builder() {
        let props = PropertyMap::new().opacity(1.5).x(-120.0);

        assert_eq!(props.get(TweenProperty::Opacity), Some(1.0));
        assert_eq!(props.get(TweenProperty::X), Some(-120.0));
        assert_eq!(props.iter().count(), 2);
        assert_eq!(PropertyMap::new().x(3.0).get(TweenProperty::Opacity), None);
    }

    #[test]
    fn test_resting_values() {
        assert!((TweenProperty::Opacity.resting_value() - 1.0).abs() < f32::EPSILON);
        assert!(TweenProperty::X.resting_value().abs() < f32::EPSILON);
    }

    #[test]
    fn test_element_id_display() {
        let id = ElementId::from("pipeline-card");
        assert_eq!(id.to_string(), "pipeline-card");
        assert_eq!(id.as_str(), "pipeline-card");
    }
}
