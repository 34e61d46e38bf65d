//! Pass interception geometry
//!
//! The policy is injectable; the default picks the defender closest to the
//! pass segment within `intercept_radius`.

use crate::models::{closest_point_on_segment, CourtPos, PlayerId, TeamSide};
use crate::state::MatchState;

/// A defender able to reach the pass path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptCandidate {
    pub player: PlayerId,
    /// Point on the pass path
    pub point: CourtPos,
    /// Projection parameter along the path (0 = passer, 1 = target)
    pub t: f32,
    /// Distance from the defender to the path
    pub distance: f32,
}

pub trait InterceptionPolicy {
    /// At most one candidate; the point must lie on the segment.
    fn find(&self, state: &MatchState, passing_team: TeamSide, origin: CourtPos, target: CourtPos, radius: f32) -> Option<InterceptCandidate>;
}

/// Defender nearest to the lane; ties: smaller `t` (earliest), then lower id.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestPointOnSegment;

impl InterceptionPolicy for NearestPointOnSegment {
    fn find(&self, state: &MatchState, passing_team: TeamSide, origin: CourtPos, target: CourtPos, radius: f32) -> Option<InterceptCandidate> {
        state
            .roster(passing_team.opponent())
            .filter_map(|d| {
                let (point, t) = closest_point_on_segment(d.position, origin, target);
                let distance = d.position.distance(point);
                // a defender glued to the passer cannot cut the lane
                (t > 0.0 && distance <= radius).then_some(InterceptCandidate { player: d.id, point, t, distance })
            })
            .min_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.t.total_cmp(&b.t))
                    .then(a.player.cmp(&b.player))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::testkit::player;

    fn state(defenders: &[(f32, f32)]) -> MatchState {
        let mut players = vec![player(0, TeamSide::Home, 10.0, 10.0), player(1, TeamSide::Home, 20.0, 10.0)];
        for (i, (x, y)) in defenders.iter().enumerate() {
            players.push(player(2 + i as u8, TeamSide::Away, *x, *y));
        }
        MatchState::new(players, &EngineConfig::default())
    }

    #[test]
    fn test_no_defenders_clean() {
        let s = state(&[]);
        let found = NearestPointOnSegment.find(&s, TeamSide::Home, CourtPos::new(10.0, 10.0), CourtPos::new(20.0, 10.0), 2.0);
        assert_eq!(found, None);
    }

    #[test]
    fn test_closest_to_lane_wins() {
        let s = state(&[(14.0, 11.5), (17.0, 10.5), (15.0, 16.0)]);
        let found = NearestPointOnSegment
            .find(&s, TeamSide::Home, CourtPos::new(10.0, 10.0), CourtPos::new(20.0, 10.0), 2.0)
            .unwrap();
        assert_eq!(found.player, PlayerId(3));
        assert!(found.point.distance(CourtPos::new(17.0, 10.0)) < 1e-4);
    }

    #[test]
    fn test_tie_goes_to_earliest_point() {
        let s = state(&[(16.0, 11.0), (13.0, 9.0)]);
        let found = NearestPointOnSegment
            .find(&s, TeamSide::Home, CourtPos::new(10.0, 10.0), CourtPos::new(20.0, 10.0), 2.0)
            .unwrap();
        assert_eq!(found.player, PlayerId(3));
        assert!((found.t - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_defender_beyond_target_ignored_outside_radius() {
        let s = state(&[(25.0, 10.0)]);
        let found = NearestPointOnSegment.find(&s, TeamSide::Home, CourtPos::new(10.0, 10.0), CourtPos::new(20.0, 10.0), 2.0);
        assert_eq!(found, None);
    }
}
