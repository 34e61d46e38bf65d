//! Court geometry configuration

use serde::{Deserialize, Serialize};

use crate::models::{CourtPos, TeamSide};

/// 코트 치수 및 슈팅 구역 정의 (코트 단위)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    /// 코트 폭 (x축) (기본: 88)
    pub width: f32,
    /// 코트 높이 (y축) (기본: 40)
    pub height: f32,
    /// 베이스라인에서 림까지 거리 (기본: 5)
    pub hoop_inset: f32,
    /// 세로 거리 가중치 - 비정사각 그리드 보정 (기본: 2.0)
    pub vertical_weight: f32,
    /// 슛 가능 영역 마진 (기본: 1.0)
    pub shot_margin: f32,
    /// 키(페인트) 깊이, 림 기준 x거리 (기본: 14)
    pub key_depth: f32,
    /// 키 반폭, 림 기준 y거리 (기본: 5)
    pub key_half_height: f32,
    /// 3점 라인 가중 거리 (기본: 22)
    pub three_point_distance: f32,
    /// 코너 3점: 림 기준 최대 x거리 (기본: 10)
    pub corner_three_depth: f32,
    /// 코너 3점: 림 기준 최소 y거리 (기본: 8)
    pub corner_three_offset: f32,
    /// 인바운드 지점: 베이스라인 안쪽 오프셋 (기본: 2)
    pub inbound_inset: f32,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            width: 88.0,
            height: 40.0,
            hoop_inset: 5.0,
            vertical_weight: 2.0,
            shot_margin: 1.0,
            key_depth: 14.0,
            key_half_height: 5.0,
            three_point_distance: 22.0,
            corner_three_depth: 10.0,
            corner_three_offset: 8.0,
            inbound_inset: 2.0,
        }
    }
}

impl CourtConfig {
    /// Basket a team shoots at. Home attacks right.
    pub fn basket_for(&self, team: TeamSide) -> CourtPos {
        let y = self.height / 2.0;
        match team {
            TeamSide::Home => CourtPos::new(self.width - self.hoop_inset, y),
            TeamSide::Away => CourtPos::new(self.hoop_inset, y),
        }
    }

    /// Basket a team defends.
    pub fn own_basket(&self, team: TeamSide) -> CourtPos {
        self.basket_for(team.opponent())
    }

    pub fn half_court_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Inbound spot for `team`, just inside its own baseline.
    pub fn inbound_spot(&self, team: TeamSide) -> CourtPos {
        let y = self.height / 2.0 + self.key_half_height + 2.0;
        match team {
            TeamSide::Home => CourtPos::new(self.inbound_inset, y),
            TeamSide::Away => CourtPos::new(self.width - self.inbound_inset, y),
        }
    }
}
