//! Court coordinates.
//!
//! The court grid is not square: one vertical unit covers roughly twice the
//! floor distance of a horizontal unit, so gameplay distances weight `dy`
//! (see [`CourtPos::weighted_distance`]).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 2D position on the court (court units, origin at the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CourtPos {
    pub x: f32,
    pub y: f32,
}

impl CourtPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_tuple(pos: (f32, f32)) -> Self {
        Self { x: pos.0, y: pos.1 }
    }

    /// Plain euclidean distance.
    #[inline]
    pub fn distance(self, other: CourtPos) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Gameplay distance with the vertical axis scaled by `vertical_weight`.
    #[inline]
    pub fn weighted_distance(self, other: CourtPos, vertical_weight: f32) -> f32 {
        let dx = self.x - other.x;
        let dy = (self.y - other.y) * vertical_weight;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn lerp(self, other: CourtPos, t: f32) -> CourtPos {
        CourtPos { x: self.x + (other.x - self.x) * t, y: self.y + (other.y - self.y) * t }
    }

    #[inline]
    pub fn sub(self, other: CourtPos) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Closest point on segment `a..b` to `p`, and the projection parameter `t` (0..=1).
pub fn closest_point_on_segment(p: CourtPos, a: CourtPos, b: CourtPos) -> (CourtPos, f32) {
    let (abx, aby) = b.sub(a);
    let len_sq = abx * abx + aby * aby;
    if len_sq < 1e-6 {
        // degenerate segment
        return (a, 0.0);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_distance_scales_vertical_axis() {
        let a = CourtPos::new(0.0, 0.0);
        assert!((a.weighted_distance(CourtPos::new(3.0, 0.0), 2.0) - 3.0).abs() < 1e-5);
        assert!((a.weighted_distance(CourtPos::new(0.0, 3.0), 2.0) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = CourtPos::new(0.0, 0.0);
        let b = CourtPos::new(10.0, 0.0);

        let (p, t) = closest_point_on_segment(CourtPos::new(4.0, 3.0), a, b);
        assert!((p.x - 4.0).abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!((t - 0.4).abs() < 1e-5);

        // beyond the end clamps to b
        let (p, t) = closest_point_on_segment(CourtPos::new(15.0, 1.0), a, b);
        assert_eq!(p, b);
        assert_eq!(t, 1.0);

        // degenerate
        let (p, _) = closest_point_on_segment(CourtPos::new(1.0, 1.0), a, a);
        assert_eq!(p, a);
    }
}
