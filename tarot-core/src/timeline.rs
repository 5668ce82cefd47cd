//! # Animation Timeline
//!
//! Explicit, clock-driven tweens. An [`Animated`] value rests at a value
//! until it is given a target; it then follows a [`Tween`] that is sampled
//! against the controller clock. Nothing here runs on its own: whoever owns
//! the clock decides when time passes.
//!
//! ```text
//! set_target(to, start=100, duration=200)
//!
//!   t=100        t=200        t=300
//!   from ───────── ease ─────── to   (finished, rests at `to`)
//! ```

use serde::{Deserialize, Serialize};

use crate::transform::Interpolate;

/// Timing curve of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, gentle landing.
    #[default]
    EaseOutCubic,
    /// Gentle start and landing.
    EaseInOutCubic,
}

impl Easing {
    /// Map linear progress to eased progress. Input is clamped to 0.0..=1.0.
    #[must_use]
    pub fn apply(self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A single keyframe segment from one value to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween<T> {
    /// Value at the start of the segment.
    pub from: T,
    /// Value at the end of the segment.
    pub to: T,
    /// Clock time the segment starts at, in milliseconds.
    pub start_ms: u64,
    /// Length of the segment in milliseconds.
    pub duration_ms: u64,
    /// Timing curve.
    pub easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    /// Clock time the segment ends at.
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Whether the segment has finished at `now_ms`.
    #[must_use]
    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.end_ms()
    }

    /// Value of the segment at `now_ms`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, now_ms: u64) -> T {
        if self.is_finished(now_ms) {
            return self.to.clone();
        }
        if now_ms <= self.start_ms {
            return self.from.clone();
        }
        let progress = (now_ms - self.start_ms) as f32 / self.duration_ms as f32;
        self.from.interpolate(&self.to, self.easing.apply(progress))
    }
}

/// A value that is either at rest or following a tween.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animated<T> {
    resting: T,
    tween: Option<Tween<T>>,
}

impl<T: Interpolate> Animated<T> {
    /// A value at rest.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            resting: value,
            tween: None,
        }
    }

    /// Jump to `value` immediately, dropping any tween in flight.
    pub fn set_immediate(&mut self, value: T) {
        self.resting = value;
        self.tween = None;
    }

    /// Start moving from the current value towards `to`.
    ///
    /// The tween starts from wherever the value is at `now_ms`, so retargeting
    /// mid-flight never jumps. A zero duration behaves like [`Self::set_immediate`].
    pub fn set_target(&mut self, to: T, now_ms: u64, duration_ms: u64, easing: Easing) {
        if duration_ms == 0 {
            self.set_immediate(to);
            return;
        }
        let from = self.value_at(now_ms);
        self.tween = Some(Tween {
            from,
            to,
            start_ms: now_ms,
            duration_ms,
            easing,
        });
    }

    /// Value at `now_ms`.
    #[must_use]
    pub fn value_at(&self, now_ms: u64) -> T {
        match &self.tween {
            Some(tween) => tween.sample(now_ms),
            None => self.resting.clone(),
        }
    }

    /// The value this one will rest at once its tween completes.
    #[must_use]
    pub fn target(&self) -> &T {
        self.tween.as_ref().map_or(&self.resting, |tween| &tween.to)
    }

    /// End time of the tween in flight, if any.
    #[must_use]
    pub fn busy_until(&self) -> Option<u64> {
        self.tween.as_ref().map(Tween::end_ms)
    }

    /// Fold a finished tween into the resting value.
    ///
    /// Returns `true` if a tween completed at or before `now_ms`.
    pub fn settle(&mut self, now_ms: u64) -> bool {
        match self.tween.take() {
            Some(tween) if tween.is_finished(now_ms) => {
                self.resting = tween.to;
                true
            }
            other => {
                self.tween = other;
                false
            }
        }
    }

    /// Whether a tween is still running at `now_ms`.
    #[must_use]
    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.tween
            .as_ref()
            .is_some_and(|tween| !tween.is_finished(now_ms))
    }
}

impl<T: Interpolate + Default> Default for Animated<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
