//! Keyframed curves for animating burst parameters.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A keyframed curve mapping normalized time [0..1] to a value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct Curve<T: Clone + PartialEq + Reflect> {
    pub keys: Vec<CurveKey<T>>,
}

/// Single keyframe in a curve.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct CurveKey<T: Clone + PartialEq + Reflect> {
    /// Normalized time (0.0 - 1.0).
    pub time: f32,
    /// Value at this keyframe.
    pub value: T,
    /// Interpolation mode to the next key.
    pub interp: Interp,
}

/// Interpolation mode between keyframes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Interp {
    #[default]
    Linear,
    EaseOut,
}

impl Interp {
    /// Apply easing to a linear factor `t` in [0..1].
    pub fn ease(&self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

impl<T: Clone + PartialEq + Reflect> Curve<T> {
    /// True when every key lies in [0..1] and times never decrease.
    pub fn is_well_formed(&self) -> bool {
        self.keys.iter().all(|k| (0.0..=1.0).contains(&k.time))
            && self.keys.windows(2).all(|w| w[0].time <= w[1].time)
    }
}

// -- f32 curve utilities --

impl Curve<f32> {
    /// Create a linear ramp from `start` to `end`.
    pub fn linear(start: f32, end: f32) -> Self {
        Self::keyframes(&[(0.0, start), (1.0, end)], Interp::Linear)
    }

    /// Build a curve from `(time, value)` pairs sharing one interpolation mode.
    pub fn keyframes(points: &[(f32, f32)], interp: Interp) -> Self {
        Self {
            keys: points
                .iter()
                .map(|&(time, value)| CurveKey {
                    time,
                    value,
                    interp,
                })
                .collect(),
        }
    }

    /// Sample the curve at normalized time `t` (clamped to [0..1]).
    ///
    /// Before the first key the first value holds; after the last key the last
    /// value holds.
    pub fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for window in self.keys.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            if t >= a.time && t <= b.time {
                let span = b.time - a.time;
                if span.abs() < 1e-6 {
                    return a.value;
                }
                let frac = (t - a.time) / span;
                let eased = a.interp.ease(frac);
                return a.value + (b.value - a.value) * eased;
            }
        }

        last.value
    }
}
