//! Tween Engines
//!
//! Two in-process [`TweenEngine`] implementations:
//!
//! - [`FrameTweenEngine`] interpolates every property on a fixed frame
//!   interval using the requested easing curve and keeps the current value
//!   of each element, for hosts without an animation runtime of their own.
//! - [`RecordingTweenEngine`] records each call and completes immediately,
//!   for headless runs and tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::MissedTickBehavior;

use super::{EasingFunction, ElementId, PropertyMap, TweenEngine, TweenProperty};

/// Default frame period (~60fps)
const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Frame-stepping interpolating engine
#[derive(Clone, Debug)]
pub struct FrameTweenEngine {
    frame: Duration,
    values: Arc<DashMap<ElementId, PropertyMap>>,
}

impl FrameTweenEngine {
    /// Engine stepping at the given frame period
    #[must_use]
    pub fn new(frame: Duration) -> Self {
        Self {
            frame: frame.max(Duration::from_millis(1)),
            values: Arc::new(DashMap::new()),
        }
    }

    /// Current value of a property on an element
    #[must_use]
    pub fn value(&self, target: &ElementId, property: TweenProperty) -> f32 {
        self.values
            .get(target)
            .and_then(|props| props.get(property))
            .unwrap_or_else(|| property.resting_value())
    }

    fn write(&self, target: &ElementId, property: TweenProperty, value: f32) {
        self.values
            .entry(target.clone())
            .or_default()
            .insert(property, value);
    }
}

impl Default for FrameTweenEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME)
    }
}

#[async_trait]
impl TweenEngine for FrameTweenEngine {
    async fn animate(
        &self,
        target: &ElementId,
        properties: &PropertyMap,
        duration: Duration,
        easing: EasingFunction,
    ) {
        let starts: Vec<(TweenProperty, f32, f32)> = properties
            .iter()
            .map(|(property, end)| (property, self.value(target, property), end))
            .collect();

        let frames = (duration.as_secs_f32() / self.frame.as_secs_f32()).ceil() as u32;
        if frames > 0 {
            let mut interval = tokio::time::interval(self.frame);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;

            for frame in 1..frames {
                interval.tick().await;
                let eased = easing.apply(frame as f32 / frames as f32);
                for (property, start, end) in &starts {
                    self.write(target, *property, start + (end - start) * eased);
                }
            }
            interval.tick().await;
        }

        for (property, _, end) in starts {
            self.write(target, property, end);
        }
        tracing::trace!(target_element = %target, ?duration, %easing, "tween complete");
    }
}

/// One recorded tween call
#[derive(Clone, Debug, PartialEq)]
pub struct TweenCall {
    /// Element the tween targeted
    pub target: ElementId,
    /// Requested property targets
    pub properties: PropertyMap,
    /// Requested duration
    pub duration: Duration,
    /// Requested easing curve
    pub easing: EasingFunction,
}

/// Engine that records every call and completes at once
#[derive(Clone, Debug, Default)]
pub struct RecordingTweenEngine {
    calls: Arc<Mutex<Vec<TweenCall>>>,
}

impl RecordingTweenEngine {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<TweenCall> {
        self.calls.lock().clone()
    }

    /// Calls that targeted one element
    #[must_use]
    pub fn calls_for(&self, target: &str) -> Vec<TweenCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.target.as_str() == target)
            .cloned()
            .collect()
    }

    /// Calls with a non-zero duration (actual animations, not `set`)
    #[must_use]
    pub fn animated_calls_for(&self, target: &str) -> Vec<TweenCall> {
        self.calls_for(target)
            .into_iter()
            .filter(|call| !call.duration.is_zero())
            .collect()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl TweenEngine for RecordingTweenEngine {
    async fn animate(
        &self,
        target: &ElementId,
        properties: &PropertyMap,
        duration: Duration,
        easing: EasingFunction,
    ) {
        self.calls.lock().push(TweenCall {
            target: target.clone(),
            properties: properties.clone(),
            duration,
            easing,
        });
        tokio::task::yield_now().await;
    }
}
