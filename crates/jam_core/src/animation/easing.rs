//! Easing curves for sequenced motion

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    /// smoothstep
    EaseInOut,
    /// smootherstep
    Smoother,
}

impl Easing {
    /// Map linear progress `t` (clamped to 0..=1) onto the curve.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
            Easing::Smoother => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

/// Parabolic arc height at progress `t` peaking at `apex`.
#[inline]
pub fn arc_height(apex: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    4.0 * apex * t * (1.0 - t)
}
