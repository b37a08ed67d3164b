//! Field-tween descriptors

use crate::easing::Easing;
use crate::error::{Result, TweenError};

/// Interpolation of one numeric field over a duration.
///
/// `from` and `diff` are captured once at construction and never change,
/// so replaying the same descriptor always produces the same curve.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
    from: f32,
    diff: f32,
    /// Seconds, same unit as the `dt` passed to `Animator::update`
    duration: f32,
    easing: Easing,
}

impl Tween {
    /// Tween from `from` to `to` over `duration` seconds.
    ///
    /// A negative or NaN duration is stored as `0.0`, which completes on
    /// the first update.
    pub fn from_to_in(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        let duration = if duration.is_nan() { 0.0 } else { duration.max(0.0) };
        Self {
            from,
            diff: to - from,
            duration,
            easing,
        }
    }

    /// Like [`Tween::from_to_in`] but rejects durations that are negative,
    /// NaN or infinite.
    pub fn try_from_to_in(from: f32, to: f32, duration: f32, easing: Easing) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(TweenError::InvalidDuration(duration));
        }
        Ok(Self::from_to_in(from, to, duration, easing))
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.from + self.diff
    }

    pub fn diff(&self) -> f32 {
        self.diff
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Local progress after `elapsed` seconds, clamped to `1.0`.
    ///
    /// Zero-length tweens report `1.0` immediately.
    pub fn progress(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (elapsed / self.duration).min(1.0)
    }

    /// Field value at local progress `x`
    pub fn value_at(&self, x: f32) -> f32 {
        self.from + self.diff * self.easing.apply(x)
    }
}

/// Build a [`Tween`] using a named easing preset.
///
/// Unknown preset names resolve to linear.
pub fn tween(from: f32, to: f32, duration: f32, easing: &str) -> Tween {
    Tween::from_to_in(from, to, duration, Easing::from_name(easing))
}
