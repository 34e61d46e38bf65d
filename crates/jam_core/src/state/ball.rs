//! Ball, possession and scramble mirror state

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{CourtPos, PlayerId, TeamSide};

/// What is currently animating the ball outside of a shot phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlightKind {
    Pass,
    /// 득점 후 공이 인바운드 지점으로 돌아가는 중
    BallReturn,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BallState {
    /// `None` = 루즈볼 / 공중
    pub carrier: Option<PlayerId>,
    pub position: CourtPos,
    /// 슛/패스 시작 게이트
    pub in_flight: Option<FlightKind>,
}

/// Passer → receiver link that turns into an assist on a quick make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssistLink {
    pub passer: PlayerId,
    pub receiver: PlayerId,
    pub expires_tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BackcourtTracking {
    /// 하프코트를 넘었는지
    pub crossed_half: bool,
    /// 백코트 규칙 유예 틱
    pub grace_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PossessionState {
    pub team: TeamSide,
    /// 초 단위
    pub shot_clock: f32,
    pub inbounding: bool,
    pub assist: Option<AssistLink>,
    pub backcourt: BackcourtTracking,
}

/// Store-side mirror of the active rebound scramble
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReboundFlags {
    pub active: bool,
    pub target: Option<CourtPos>,
    pub is_loose_ball: bool,
}

/// Defensive assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Matchup {
    pub offense: PlayerId,
    pub defense: PlayerId,
}
