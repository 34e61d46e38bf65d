//! Domain events published on the [`EventBus`]
//!
//! Side-effecting collaborators (announcer, stat tracking, multiplayer
//! broadcast) subscribe by topic and never touch resolution logic.

mod bus;

pub use bus::{EventBus, EventHandler, SubscriptionId};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{CourtPos, PlayerId, TeamSide};
use crate::state::{AttemptType, DunkStyle};

/// Why possession changed hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PossessionReason {
    MadeBasket,
    PassOob,
    Interception,
    ShotClock,
    DefensiveRebound,
    ReboundTimeout,
    NoPlayers,
    LooseBall,
}

impl PossessionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            PossessionReason::MadeBasket => "made_basket",
            PossessionReason::PassOob => "pass_oob",
            PossessionReason::Interception => "interception",
            PossessionReason::ShotClock => "shot_clock",
            PossessionReason::DefensiveRebound => "defensive_rebound",
            PossessionReason::ReboundTimeout => "rebound_timeout",
            PossessionReason::NoPlayers => "no_players",
            PossessionReason::LooseBall => "loose_ball",
        }
    }
}

/// How a scramble ended in a player's hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SecureKind {
    Capture,
    HardTimeout,
    SoftTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutKind {
    Hard,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GameEvent {
    ShotAttempt {
        shooter: PlayerId,
        team: TeamSide,
        attempt_type: AttemptType,
        chance: f32,
        made: bool,
        three_point: bool,
        blocked_by: Option<PlayerId>,
        dunk_style: Option<DunkStyle>,
    },
    ShotMade {
        shooter: PlayerId,
        team: TeamSide,
        attempt_type: AttemptType,
        points: u32,
        assist: Option<PlayerId>,
    },
    ShotMissed {
        shooter: PlayerId,
        team: TeamSide,
        attempt_type: AttemptType,
    },
    ShotBlocked {
        shooter: PlayerId,
        blocker: PlayerId,
        attempt_type: AttemptType,
        at: CourtPos,
    },
    PassAttempt {
        passer: PlayerId,
        receiver: Option<PlayerId>,
        target: CourtPos,
        intercepted_by: Option<PlayerId>,
        inbound: bool,
    },
    PassQueued {
        passer: PlayerId,
        receiver: PlayerId,
    },
    PassQueueExpired {
        passer: PlayerId,
    },
    PassQueueCancelled {
        passer: PlayerId,
        carrier: Option<PlayerId>,
    },
    PassComplete {
        passer: PlayerId,
        receiver: PlayerId,
        inbound: bool,
    },
    Interception {
        passer: PlayerId,
        interceptor: PlayerId,
        at: CourtPos,
    },
    Turnover {
        player: Option<PlayerId>,
        team: TeamSide,
        reason: PossessionReason,
    },
    PossessionChange {
        from: TeamSide,
        to: TeamSide,
        reason: PossessionReason,
    },
    ReboundScrambleStarted {
        target: CourtPos,
        is_loose_ball: bool,
    },
    ReboundSecured {
        player: PlayerId,
        team: TeamSide,
        offensive: bool,
        via: SecureKind,
    },
    ReboundTimeout {
        kind: TimeoutKind,
        awarded_to: Option<PlayerId>,
        team: TeamSide,
    },
    Shove {
        attacker: PlayerId,
        victim: PlayerId,
    },
    RubberBandTierChange {
        team: TeamSide,
        from: Option<String>,
        to: Option<String>,
    },
    ShotClockViolation {
        team: TeamSide,
    },
    Announcer {
        cue: String,
        payload: Value,
    },
    InconsistentState {
        context: String,
    },
}

impl GameEvent {
    /// Subscription topic (`shot_attempt`, `turnover`, ...)
    pub fn topic(&self) -> &'static str {
        match self {
            GameEvent::ShotAttempt { .. } => "shot_attempt",
            GameEvent::ShotMade { .. } => "shot_made",
            GameEvent::ShotMissed { .. } => "shot_missed",
            GameEvent::ShotBlocked { .. } => "shot_blocked",
            GameEvent::PassAttempt { .. } => "pass_attempt",
            GameEvent::PassQueued { .. } => "pass_queued",
            GameEvent::PassQueueExpired { .. } => "pass_queue_expired",
            GameEvent::PassQueueCancelled { .. } => "pass_queue_cancelled",
            GameEvent::PassComplete { .. } => "pass_complete",
            GameEvent::Interception { .. } => "interception",
            GameEvent::Turnover { .. } => "turnover",
            GameEvent::PossessionChange { .. } => "possession_change",
            GameEvent::ReboundScrambleStarted { .. } => "rebound_scramble_started",
            GameEvent::ReboundSecured { .. } => "rebound_secured",
            GameEvent::ReboundTimeout { .. } => "rebound_timeout",
            GameEvent::Shove { .. } => "shove",
            GameEvent::RubberBandTierChange { .. } => "rubber_band_tier_change",
            GameEvent::ShotClockViolation { .. } => "shot_clock_violation",
            GameEvent::Announcer { .. } => "announcer",
            GameEvent::InconsistentState { .. } => "inconsistent_state",
        }
    }

    pub fn announcer(cue: impl Into<String>, payload: Value) -> Self {
        GameEvent::Announcer { cue: cue.into(), payload }
    }
}
