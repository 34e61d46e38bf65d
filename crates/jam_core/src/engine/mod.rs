//! # Resolution Engines
//!
//! Shot, pass and rebound resolution plus the shared possession plumbing.
//!
//! ## 흐름
//! 1. `decide_*` (coordinator only): reads state + modifiers, draws outcomes
//! 2. `commit_*` / `apply_*` (every role): deterministic post-decision transitions
//! 3. animation completion: the actual score / possession / stat mutation
//!
//! Engines never block on animation. Everything they need is handed in through
//! [`ResolveCtx`]; rejected attempts come back as [`Rejection`] values.

pub mod capabilities;
pub mod dunk;
pub mod interception;
pub mod matchups;
pub mod pass;
pub mod possession;
pub mod rebound;
pub mod rng;
pub mod shot;
pub mod shot_model;
pub mod shove;
pub mod upkeep;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::animation::AnimationSequencer;
use crate::authority::AuthorityRole;
use crate::config::EngineConfig;
use crate::events::{EventBus, GameEvent};
use crate::models::{CourtPos, TeamSide};
use crate::state::{PassIntent, ShotQueueEntry, StateStore};

use capabilities::{AttributeProvider, ContestHooks, SpatialProvider};
use rng::OutcomeRng;

/// Caller-recoverable reasons an attempt was refused. Safe to retry next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    InvalidShooter,
    InvalidPasser,
    InvalidReceiver,
    ShotInProgress,
    ShotAlreadyQueued,
    OutOfBounds,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::InvalidShooter => "invalid_shooter",
            Rejection::InvalidPasser => "invalid_passer",
            Rejection::InvalidReceiver => "invalid_receiver",
            Rejection::ShotInProgress => "shot_in_progress",
            Rejection::ShotAlreadyQueued => "shot_already_queued",
            Rejection::OutOfBounds => "out_of_bounds",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful shot attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    /// Decided locally; the entry waits in the `shot_queued` phase
    Queued(ShotQueueEntry),
    /// Sent to the coordinator
    Forwarded,
}

impl ShotOutcome {
    pub fn entry(&self) -> Option<&ShotQueueEntry> {
        match self {
            ShotOutcome::Queued(entry) => Some(entry),
            ShotOutcome::Forwarded => None,
        }
    }
}

/// Successful pass attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// Animation queued toward the resolved endpoint
    InFlight(PassIntent),
    /// Ball busy; replayed once it is free
    Queued,
    Forwarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShotOptions {
    /// 덩크 판정 건너뛰기
    pub jump_shot_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PassOptions {
    /// Lead pass destination ahead of the receiver
    pub lead_target: Option<CourtPos>,
}

/// Continuation attached to a queued animation
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Shot(ShotQueueEntry),
    Pass(PassIntent),
    /// Missed shot / loose ball bounce
    Bounce,
    /// Ball returning to the inbounder after a score
    BallReturn,
}

/// Request to open a rebound scramble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrambleStart {
    /// Where the bounce starts (rim, block point, dropped pass)
    pub from: CourtPos,
    pub target: CourtPos,
    pub is_loose_ball: bool,
    /// Team in possession when the ball got loose
    pub offense: TeamSide,
}

/// Everything an engine may touch during one call
pub struct ResolveCtx<'a> {
    pub store: &'a mut StateStore,
    pub bus: &'a mut EventBus,
    pub sequencer: &'a mut AnimationSequencer<Completion>,
    pub rng: &'a mut OutcomeRng,
    pub config: &'a EngineConfig,
    pub attributes: &'a dyn AttributeProvider,
    pub spatial: &'a dyn SpatialProvider,
    pub hooks: &'a mut dyn ContestHooks,
    pub role: AuthorityRole,
}

impl ResolveCtx<'_> {
    pub fn emit(&mut self, event: GameEvent) {
        self.bus.publish(event);
    }

    pub fn is_coordinator(&self) -> bool {
        self.role.is_coordinator()
    }

    pub fn ticks(&self, secs: f32) -> u64 {
        self.config.ticks(secs)
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    //! Small fixture for engine unit tests.

    use super::capabilities::{BuffedAttributes, CourtGeometry, NoopHooks};
    use super::*;
    use crate::models::{AttributeSet, PlayerEntity};

    pub struct Rig {
        pub config: EngineConfig,
        pub store: StateStore,
        pub bus: EventBus,
        pub sequencer: AnimationSequencer<Completion>,
        pub rng: OutcomeRng,
        pub attributes: BuffedAttributes,
        pub spatial: CourtGeometry,
        pub hooks: NoopHooks,
        pub role: AuthorityRole,
    }

    impl Rig {
        pub fn new(players: Vec<PlayerEntity>) -> Self {
            Self::with_config(players, EngineConfig::deterministic())
        }

        pub fn with_config(players: Vec<PlayerEntity>, config: EngineConfig) -> Self {
            let store = StateStore::from_players(players, &config);
            Self {
                attributes: BuffedAttributes::from_config(&config),
                spatial: CourtGeometry::new(config.court.clone()),
                store,
                bus: EventBus::new(),
                sequencer: AnimationSequencer::new(),
                rng: OutcomeRng::new(7),
                hooks: NoopHooks,
                role: AuthorityRole::Coordinator,
                config,
            }
        }

        pub fn ctx(&mut self) -> ResolveCtx<'_> {
            ResolveCtx {
                store: &mut self.store,
                bus: &mut self.bus,
                sequencer: &mut self.sequencer,
                rng: &mut self.rng,
                config: &self.config,
                attributes: &self.attributes,
                spatial: &self.spatial,
                hooks: &mut self.hooks,
                role: self.role,
            }
        }
    }

    pub fn player(id: u8, team: TeamSide, x: f32, y: f32) -> PlayerEntity {
        PlayerEntity::new(id, format!("P{}", id), team, CourtPos::new(x, y), AttributeSet::uniform(5.0))
    }
}
