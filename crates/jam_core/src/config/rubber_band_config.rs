//! Rubber-banding tier definitions

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bonuses granted to the trailing team while a tier is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RubberBandBonuses {
    /// 슛 확률 배율
    pub shot_multiplier: f32,
    /// 슛 확률 상한 (있으면 적용)
    pub shot_cap: Option<f32>,
    /// 스틸 확률 가산 (%p)
    pub steal_bonus: f32,
    /// 블록 확률 가산 (%p)
    pub block_bonus: f32,
    /// 밀치기 확률 가산 (0..1)
    pub shove_bonus: f32,
    pub turbo_capacity_bonus: f32,
    /// AI 반응 속도 단축 (틱)
    pub reaction_bonus_ticks: u32,
}

impl Default for RubberBandBonuses {
    fn default() -> Self {
        Self {
            shot_multiplier: 1.0,
            shot_cap: None,
            steal_bonus: 0.0,
            block_bonus: 0.0,
            shove_bonus: 0.0,
            turbo_capacity_bonus: 0.0,
            reaction_bonus_ticks: 0,
        }
    }
}

/// One rubber-band tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RubberBandTier {
    pub id: String,
    /// 최소 점수차 (포함)
    pub min_deficit: u32,
    /// 최대 점수차 (포함, 없으면 무제한)
    #[serde(default)]
    pub max_deficit: Option<u32>,
    /// 게임 클락 상한 (초) - 남은 시간이 이 이하일 때만
    #[serde(default)]
    pub clock_ceiling_secs: Option<f32>,
    #[serde(default)]
    pub bonuses: RubberBandBonuses,
    /// 티어 진입 시 1회 아나운서 큐
    #[serde(default)]
    pub announcer_cue: Option<String>,
}

impl RubberBandTier {
    pub fn accepts(&self, deficit: u32, game_clock_secs: f32) -> bool {
        if deficit < self.min_deficit {
            return false;
        }
        if let Some(max) = self.max_deficit {
            if deficit > max {
                return false;
            }
        }
        match self.clock_ceiling_secs {
            Some(ceiling) => game_clock_secs <= ceiling,
            None => true,
        }
    }
}

/// Rubber-band profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RubberBandProfile {
    pub enabled: bool,
    pub tiers: Vec<RubberBandTier>,
}

impl Default for RubberBandProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: vec![
                RubberBandTier {
                    id: "losing".into(),
                    min_deficit: 4,
                    max_deficit: Some(7),
                    clock_ceiling_secs: None,
                    bonuses: RubberBandBonuses {
                        shot_multiplier: 1.04,
                        steal_bonus: 3.0,
                        block_bonus: 2.0,
                        shove_bonus: 0.03,
                        turbo_capacity_bonus: 10.0,
                        reaction_bonus_ticks: 1,
                        ..RubberBandBonuses::default()
                    },
                    announcer_cue: None,
                },
                RubberBandTier {
                    id: "big_deficit".into(),
                    min_deficit: 8,
                    max_deficit: Some(14),
                    clock_ceiling_secs: None,
                    bonuses: RubberBandBonuses {
                        shot_multiplier: 1.08,
                        steal_bonus: 6.0,
                        block_bonus: 4.0,
                        shove_bonus: 0.06,
                        turbo_capacity_bonus: 20.0,
                        reaction_bonus_ticks: 2,
                        ..RubberBandBonuses::default()
                    },
                    announcer_cue: Some("comeback_watch".into()),
                },
                RubberBandTier {
                    id: "blowout".into(),
                    min_deficit: 15,
                    max_deficit: None,
                    clock_ceiling_secs: None,
                    bonuses: RubberBandBonuses {
                        shot_multiplier: 1.12,
                        steal_bonus: 8.0,
                        block_bonus: 6.0,
                        shove_bonus: 0.08,
                        turbo_capacity_bonus: 30.0,
                        reaction_bonus_ticks: 3,
                        ..RubberBandBonuses::default()
                    },
                    announcer_cue: Some("blowout".into()),
                },
                RubberBandTier {
                    id: "endgame_desperation".into(),
                    min_deficit: 3,
                    max_deficit: Some(12),
                    clock_ceiling_secs: Some(30.0),
                    bonuses: RubberBandBonuses {
                        shot_multiplier: 1.10,
                        shot_cap: Some(90.0),
                        steal_bonus: 8.0,
                        block_bonus: 5.0,
                        shove_bonus: 0.10,
                        turbo_capacity_bonus: 40.0,
                        reaction_bonus_ticks: 3,
                    },
                    announcer_cue: Some("desperation".into()),
                },
            ],
        }
    }
}

impl RubberBandProfile {
    pub fn disabled() -> Self {
        Self { enabled: false, tiers: Vec::new() }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.tiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_accepts_range_and_clock() {
        let profile = RubberBandProfile::default();
        let endgame = profile.tiers.iter().find(|t| t.id == "endgame_desperation").unwrap();
        assert!(endgame.accepts(5, 25.0));
        assert!(!endgame.accepts(5, 45.0));
        assert!(!endgame.accepts(2, 10.0));
        assert!(!endgame.accepts(13, 10.0));

        let blowout = profile.tiers.iter().find(|t| t.id == "blowout").unwrap();
        assert!(blowout.accepts(40, 170.0));
    }
}
