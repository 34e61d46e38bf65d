//! Rubber-band tier selection and transition tracking

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::config::{RubberBandProfile, RubberBandTier};
use crate::models::{Score, TeamSide};

use super::RubberBandSnapshot;

/// Higher-priority tier compares `Greater`.
///
/// 1. clock ceiling: tighter ceiling wins, any ceiling beats none
/// 2. larger `min_deficit`
/// 3. id (lexicographically smaller wins) for a total order
fn priority(a: &RubberBandTier, b: &RubberBandTier) -> Ordering {
    let ceiling = match (a.clock_ceiling_secs, b.clock_ceiling_secs) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    ceiling.then(a.min_deficit.cmp(&b.min_deficit)).then_with(|| b.id.cmp(&a.id))
}

/// Highest-priority tier the deficit/clock qualifies for.
pub fn select_tier(profile: &RubberBandProfile, deficit: u32, game_clock_secs: f32) -> Option<&RubberBandTier> {
    if !profile.is_active() || deficit == 0 {
        return None;
    }
    profile.tiers.iter().filter(|t| t.accepts(deficit, game_clock_secs)).max_by(|a, b| priority(a, b))
}

/// Tier for the trailing team only. A tie yields an empty snapshot.
pub fn trailing_tiers(profile: Option<&RubberBandProfile>, score: &Score, game_clock_secs: f32) -> RubberBandSnapshot {
    let mut snapshot = RubberBandSnapshot::default();
    let (Some(profile), Some((team, deficit))) = (profile, score.trailing()) else {
        return snapshot;
    };
    if let Some(tier) = select_tier(profile, deficit, game_clock_secs) {
        snapshot.set_tier(team, Some(tier.id.clone()));
    }
    snapshot
}

/// One team's tier change
#[derive(Debug, Clone, PartialEq)]
pub struct TierTransition {
    pub team: TeamSide,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Cue of the entered tier, if any
    pub cue: Option<String>,
}

/// Remembers the last snapshot so transitions are reported once.
#[derive(Debug, Default)]
pub struct RubberBandService {
    last: RubberBandSnapshot,
    warned_missing: bool,
}

impl RubberBandService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &RubberBandSnapshot {
        &self.last
    }

    /// Re-evaluate; returns the new snapshot and any transitions since the last call.
    pub fn update(
        &mut self,
        profile: Option<&RubberBandProfile>,
        score: &Score,
        game_clock_secs: f32,
    ) -> (RubberBandSnapshot, Vec<TierTransition>) {
        let active_profile = profile.filter(|p| p.is_active());
        if active_profile.is_none() && !self.warned_missing {
            warn!("no active rubber-band profile configured; using neutral modifiers");
            self.warned_missing = true;
        }

        let next = trailing_tiers(active_profile, score, game_clock_secs);
        let mut transitions = Vec::new();
        for team in TeamSide::BOTH {
            let from = self.last.tier(team);
            let to = next.tier(team);
            if from == to {
                continue;
            }
            let cue = to
                .and_then(|id| active_profile?.tiers.iter().find(|t| t.id == id))
                .and_then(|t| t.announcer_cue.clone());
            debug!("rubber band {}: {:?} -> {:?}", team.as_str(), from, to);
            transitions.push(TierTransition {
                team,
                from: from.map(str::to_string),
                to: to.map(str::to_string),
                cue,
            });
        }
        self.last = next.clone();
        (next, transitions)
    }
}
