//! Modifier Service (Difficulty + Rubber-Banding)
//!
//! Sparse scalar bundle the resolution engines read instead of touching the
//! difficulty or rubber-band configuration directly. Recomputed once per tick
//! and cached in the state store (`MatchState::modifiers`).
//!
//! 계산 자체는 순수 함수 ([`compute_bundles`]); 랜덤을 쓰지 않는다.

pub mod difficulty;
pub mod rubber_band;

pub use difficulty::{DifficultyController, DifficultyOutcome, DifficultyPreset};
pub use rubber_band::{select_tier, trailing_tiers, RubberBandService, TierTransition};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, RubberBandTier};
use crate::models::TeamSide;

/// Per-team modifiers consumed by the resolution engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModifierBundle {
    /// AI 공격 확률 배율 (사람 팀은 1.0)
    pub offense_scale: f32,
    /// AI 수비 배율 (사람 팀은 1.0)
    pub defense_scale: f32,
    pub shot_multiplier: f32,
    pub shot_cap: Option<f32>,
    pub steal_bonus: f32,
    pub block_bonus: f32,
    pub shove_bonus: f32,
    pub turbo_capacity: f32,
    pub reaction_ticks: u32,
    /// Active rubber-band tier id
    pub tier: Option<String>,
}

impl ModifierBundle {
    pub fn neutral() -> Self {
        Self {
            offense_scale: 1.0,
            defense_scale: 1.0,
            shot_multiplier: 1.0,
            shot_cap: None,
            steal_bonus: 0.0,
            block_bonus: 0.0,
            shove_bonus: 0.0,
            turbo_capacity: 100.0,
            reaction_ticks: 0,
            tier: None,
        }
    }

    /// Apply the rubber-band multiplier and cap to a shot chance.
    pub fn apply_shot(&self, chance: f32) -> f32 {
        let boosted = chance * self.shot_multiplier;
        match self.shot_cap {
            Some(cap) => boosted.min(cap),
            None => boosted,
        }
    }
}

impl Default for ModifierBundle {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Active tier per team. At most one side is ever `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RubberBandSnapshot {
    pub home: Option<String>,
    pub away: Option<String>,
}

impl RubberBandSnapshot {
    pub fn tier(&self, team: TeamSide) -> Option<&str> {
        match team {
            TeamSide::Home => self.home.as_deref(),
            TeamSide::Away => self.away.as_deref(),
        }
    }

    pub fn set_tier(&mut self, team: TeamSide, tier: Option<String>) {
        match team {
            TeamSide::Home => self.home = tier,
            TeamSide::Away => self.away = tier,
        }
    }

    /// The (single) team currently rubber-banding.
    pub fn active(&self) -> Option<(TeamSide, &str)> {
        TeamSide::BOTH.into_iter().find_map(|team| self.tier(team).map(|t| (team, t)))
    }
}

/// Build one team's bundle from the difficulty scalars and its active tier.
pub fn bundle_for(config: &EngineConfig, team: TeamSide, tier: Option<&RubberBandTier>) -> ModifierBundle {
    let mut bundle = ModifierBundle::neutral();
    let difficulty = &config.difficulty;
    if config.control.is_ai(team) {
        bundle.offense_scale = difficulty.offense_scale;
        bundle.defense_scale = difficulty.defense_scale;
        bundle.reaction_ticks = difficulty.reaction_ticks;
    }
    bundle.turbo_capacity = difficulty.turbo_capacity;

    if let Some(tier) = tier {
        let b = &tier.bonuses;
        bundle.shot_multiplier = b.shot_multiplier;
        bundle.shot_cap = b.shot_cap;
        bundle.steal_bonus = b.steal_bonus;
        bundle.block_bonus = b.block_bonus;
        bundle.shove_bonus = b.shove_bonus;
        bundle.turbo_capacity += b.turbo_capacity_bonus;
        bundle.reaction_ticks = bundle.reaction_ticks.saturating_sub(b.reaction_bonus_ticks);
        bundle.tier = Some(tier.id.clone());
    }
    bundle
}

/// Pure mapping from config + active tiers to both teams' bundles.
pub fn compute_bundles(config: &EngineConfig, snapshot: &RubberBandSnapshot) -> [ModifierBundle; 2] {
    let tier_of = |team: TeamSide| {
        let id = snapshot.tier(team)?;
        config.rubber_band.as_ref()?.tiers.iter().find(|t| t.id == id)
    };
    [
        bundle_for(config, TeamSide::Home, tier_of(TeamSide::Home)),
        bundle_for(config, TeamSide::Away, tier_of(TeamSide::Away)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_bundle_leaves_shot_untouched() {
        let bundle = ModifierBundle::neutral();
        assert!((bundle.apply_shot(62.5) - 62.5).abs() < 1e-6);
    }

    #[test]
    fn test_cap_applies_after_multiplier() {
        let bundle =
            ModifierBundle { shot_multiplier: 1.2, shot_cap: Some(90.0), ..ModifierBundle::neutral() };
        assert!((bundle.apply_shot(50.0) - 60.0).abs() < 1e-4);
        assert!((bundle.apply_shot(80.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_difficulty_only_scales_ai_team() {
        let mut cfg = EngineConfig::default();
        cfg.difficulty.defense_scale = 1.3;
        let bundles = compute_bundles(&cfg, &RubberBandSnapshot::default());
        assert!((bundles[TeamSide::Home.index()].defense_scale - 1.0).abs() < 1e-6);
        assert!((bundles[TeamSide::Away.index()].defense_scale - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_tier_bonuses_flow_into_bundle() {
        let cfg = EngineConfig::default();
        let snapshot = RubberBandSnapshot { home: None, away: Some("big_deficit".into()) };
        let bundles = compute_bundles(&cfg, &snapshot);
        let away = &bundles[TeamSide::Away.index()];
        assert_eq!(away.tier.as_deref(), Some("big_deficit"));
        assert!((away.shot_multiplier - 1.08).abs() < 1e-6);
        assert!((away.turbo_capacity - 120.0).abs() < 1e-4);
        assert_eq!(bundles[TeamSide::Home.index()].tier, None);
    }

    #[test]
    fn test_snapshot_tier_for_unknown_id_is_neutral() {
        let cfg = EngineConfig::default();
        let snapshot = RubberBandSnapshot { home: Some("retired_tier".into()), away: None };
        let bundles = compute_bundles(&cfg, &snapshot);
        assert_eq!(bundles[0], bundle_for(&cfg, TeamSide::Home, None));
    }
}
