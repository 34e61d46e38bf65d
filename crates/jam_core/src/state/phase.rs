//! Possession phase state machine
//!
//! ```text
//! Live ──attempt_shot──▶ ShotQueued ──sequencer──▶ ShotInFlight ──complete──┬─▶ ShotResult (made) ──hold──▶ Live
//!   ▲                                                                         └─▶ Rebound (miss/block)
//!   └──────────────────────────── rebound secured / timeout ◀───────────────────────┘
//! ```
//!
//! Only one "ball in the air" event can occupy the phase at a time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::intents::{AttemptType, ShotQueueEntry};
use crate::animation::SequenceId;
use crate::models::PlayerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    /// 일반 플레이
    #[default]
    Live,
    /// 슛 결정됨, 애니메이션 대기
    ShotQueued { entry: ShotQueueEntry },
    /// 슛 애니메이션 재생 중
    ShotInFlight { shooter: PlayerId, attempt_type: AttemptType, sequence: SequenceId },
    /// 득점 처리 완료, 인바운드 전 대기 (terminal)
    ShotResult { shooter: PlayerId, hold_ticks: u32 },
    /// 리바운드 스크램블 진행 중
    Rebound,
}

impl Phase {
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Live => "live",
            Phase::ShotQueued { .. } => "shot_queued",
            Phase::ShotInFlight { .. } => "shot_in_flight",
            Phase::ShotResult { .. } => "shot_result",
            Phase::Rebound => "rebound",
        }
    }

    /// A shot or dunk is decided and not yet landed.
    pub fn is_shot_active(&self) -> bool {
        matches!(self, Phase::ShotQueued { .. } | Phase::ShotInFlight { .. })
    }

    /// A terminal shot result is pending its transition back to live play.
    pub fn is_terminal_pending(&self) -> bool {
        matches!(self, Phase::ShotResult { .. })
    }

    /// Phases during which a queued pass must not fire.
    pub fn must_wait(&self) -> bool {
        !matches!(self, Phase::Live)
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Phase::Live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(Phase::Live.is_live());
        assert!(!Phase::Live.must_wait());
        assert!(Phase::Rebound.must_wait());

        let result = Phase::ShotResult { shooter: PlayerId(0), hold_ticks: 3 };
        assert!(result.is_terminal_pending());
        assert!(!result.is_shot_active());
        assert_eq!(result.tag(), "shot_result");
    }
}
