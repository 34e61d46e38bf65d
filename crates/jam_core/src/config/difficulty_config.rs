//! Difficulty scalars and team control

use serde::{Deserialize, Serialize};

use crate::models::TeamSide;

/// 난이도 스칼라 - AI 팀에만 적용
///
/// [`crate::modifiers::difficulty::DifficultyController`]가 제자리에서 변경하고
/// reset 시 원래 값으로 복원한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyScalars {
    /// AI 공격 확률 배율
    pub offense_scale: f32,
    /// AI 수비 컨테스트/스틸/블록 배율
    pub defense_scale: f32,
    /// 터보 최대치
    pub turbo_capacity: f32,
    /// AI 반응 지연 (틱)
    pub reaction_ticks: u32,
}

impl Default for DifficultyScalars {
    fn default() -> Self {
        Self { offense_scale: 1.0, defense_scale: 1.0, turbo_capacity: 100.0, reaction_ticks: 8 }
    }
}

/// Which teams the built-in AI controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamControl {
    pub home_ai: bool,
    pub away_ai: bool,
}

impl Default for TeamControl {
    fn default() -> Self {
        Self { home_ai: false, away_ai: true }
    }
}

impl TeamControl {
    pub fn is_ai(&self, team: TeamSide) -> bool {
        match team {
            TeamSide::Home => self.home_ai,
            TeamSide::Away => self.away_ai,
        }
    }
}
