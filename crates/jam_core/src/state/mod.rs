//! Shared State Store
//!
//! Single owner of mutable simulation state. Engines receive the store as an
//! explicit dependency and mutate it through the typed setters below; every
//! setter tags the change with a [`ChangeReason`] so replication and debugging
//! can tell *why* a field moved. External collaborators use the dotted-path
//! API ([`StateStore::get`] / [`StateStore::set`]).
//!
//! Per-tick clock countdown is not written to the change log.

mod ball;
mod intents;
mod path;
mod phase;

pub use ball::{
    AssistLink, BackcourtTracking, BallState, FlightKind, Matchup, PossessionState, ReboundFlags,
};
pub use intents::{
    AttemptType, DunkStyle, FlightFrame, FlightPlan, PassIntent, ShotQueueEntry,
};
pub use path::StatePath;
pub use phase::Phase;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::models::{CourtPos, PlayerEntity, PlayerId, Score, StatCounter, TeamSide};
use crate::modifiers::{ModifierBundle, RubberBandSnapshot};

/// Why a state field changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Setup,
    ShotAttempt,
    ShotScored,
    ShotMissed,
    ShotBlocked,
    PassStarted,
    PassComplete,
    Interception,
    InboundComplete,
    Rebound,
    PossessionFlip,
    ShotClockViolation,
    Shove,
    Modifiers,
    Matchups,
    AssistExpired,
    Replicated,
    External,
}

/// One entry of the change log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub tick: u64,
    pub path: String,
    pub reason: ChangeReason,
}

/// Complete simulation state for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchState {
    pub tick: u64,
    pub score: Score,
    /// 남은 게임 시간 (초)
    pub game_clock: f32,
    pub players: Vec<PlayerEntity>,
    pub ball: BallState,
    pub possession: PossessionState,
    pub phase: Phase,
    pub rebound: ReboundFlags,
    pub rubber_banding: RubberBandSnapshot,
    /// 팀별 모디파이어 캐시 (틱마다 재계산)
    pub modifiers: [ModifierBundle; 2],
    pub matchups: Vec<Matchup>,
}

impl MatchState {
    /// Build the opening state. Player ids are reassigned to their roster index;
    /// the first home player starts with the ball.
    pub fn new(mut players: Vec<PlayerEntity>, config: &EngineConfig) -> Self {
        for (idx, player) in players.iter_mut().enumerate() {
            player.id = PlayerId(idx as u8);
            player.flags.turbo_capacity = config.difficulty.turbo_capacity;
            player.flags.turbo = player.flags.turbo.min(player.flags.turbo_capacity);
        }
        let carrier = players.iter().find(|p| p.team == TeamSide::Home).map(|p| p.id);
        let ball_pos = carrier
            .and_then(|id| players.get(id.index()))
            .map(|p| p.position)
            .unwrap_or_else(|| CourtPos::new(config.court.half_court_x(), config.court.height / 2.0));

        Self {
            tick: 0,
            score: Score::default(),
            game_clock: config.clock.quarter_secs,
            players,
            ball: BallState { carrier, position: ball_pos, in_flight: None },
            possession: PossessionState {
                team: TeamSide::Home,
                shot_clock: config.clock.shot_clock_secs,
                inbounding: false,
                assist: None,
                backcourt: BackcourtTracking::default(),
            },
            phase: Phase::Live,
            rebound: ReboundFlags::default(),
            rubber_banding: RubberBandSnapshot::default(),
            modifiers: [ModifierBundle::neutral(), ModifierBundle::neutral()],
            matchups: Vec::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerEntity> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerEntity> {
        self.players.get_mut(id.index())
    }

    pub fn team_of(&self, id: PlayerId) -> Option<TeamSide> {
        self.player(id).map(|p| p.team)
    }

    pub fn roster(&self, team: TeamSide) -> impl Iterator<Item = &PlayerEntity> {
        self.players.iter().filter(move |p| p.team == team)
    }

    pub fn roster_ids(&self, team: TeamSide) -> Vec<PlayerId> {
        self.roster(team).map(|p| p.id).collect()
    }

    pub fn carrier(&self) -> Option<&PlayerEntity> {
        self.ball.carrier.and_then(|id| self.player(id))
    }

    pub fn modifiers_for(&self, team: TeamSide) -> &ModifierBundle {
        &self.modifiers[team.index()]
    }
}

/// Path-addressable, change-tagged store
#[derive(Debug, Clone)]
pub struct StateStore {
    state: MatchState,
    changes: VecDeque<StateChange>,
    capacity: usize,
}

impl StateStore {
    pub fn new(state: MatchState, change_log_capacity: usize) -> Self {
        Self { state, changes: VecDeque::new(), capacity: change_log_capacity.max(1) }
    }

    pub fn from_players(players: Vec<PlayerEntity>, config: &EngineConfig) -> Self {
        Self::new(MatchState::new(players, config), config.change_log_capacity)
    }

    /// Read-only view for engines and renderers.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn changes(&self) -> impl Iterator<Item = &StateChange> {
        self.changes.iter()
    }

    /// Changes recorded for `path` (most recent last).
    pub fn changes_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a StateChange> {
        self.changes.iter().filter(move |c| c.path == path)
    }

    pub fn snapshot(&self) -> MatchState {
        self.state.clone()
    }

    fn log(&mut self, path: StatePath, reason: ChangeReason) {
        if self.changes.len() >= self.capacity {
            self.changes.pop_front();
        }
        self.changes.push_back(StateChange { tick: self.state.tick, path: path.to_string(), reason });
    }

    // ========================
    // Typed Mutators
    // ========================

    pub(crate) fn advance_tick(&mut self) {
        self.state.tick += 1;
    }

    pub fn set_ball_carrier(&mut self, carrier: Option<PlayerId>, reason: ChangeReason) {
        self.state.ball.carrier = carrier;
        if let Some(pos) = carrier.and_then(|id| self.state.player(id)).map(|p| p.position) {
            self.state.ball.position = pos;
        }
        self.log(StatePath::BallCarrier, reason);
    }

    pub fn set_ball_position(&mut self, pos: CourtPos, reason: ChangeReason) {
        self.state.ball.position = pos;
        self.log(StatePath::BallPosition, reason);
    }

    /// Follow an animating ball. Not logged.
    pub(crate) fn track_ball(&mut self, pos: CourtPos) {
        self.state.ball.position = pos;
    }

    pub fn set_ball_in_flight(&mut self, kind: Option<FlightKind>, reason: ChangeReason) {
        self.state.ball.in_flight = kind;
        self.log(StatePath::BallInFlight, reason);
    }

    pub fn set_phase(&mut self, phase: Phase, reason: ChangeReason) {
        self.state.phase = phase;
        self.log(StatePath::PhaseCurrent, reason);
    }

    /// Mutable access to the current phase (hold countdown) without logging.
    pub(crate) fn phase_mut(&mut self) -> &mut Phase {
        &mut self.state.phase
    }

    pub fn set_possession_team(&mut self, team: TeamSide, reason: ChangeReason) {
        self.state.possession.team = team;
        self.log(StatePath::PossessionTeam, reason);
    }

    pub fn set_inbounding(&mut self, inbounding: bool, reason: ChangeReason) {
        self.state.possession.inbounding = inbounding;
        self.log(StatePath::PossessionInbounding, reason);
    }

    pub fn reset_shot_clock(&mut self, secs: f32, reason: ChangeReason) {
        self.state.possession.shot_clock = secs;
        self.log(StatePath::ShotClock, reason);
    }

    /// Count both clocks down. Not logged.
    pub(crate) fn run_clocks(&mut self, dt: f32, shot_clock: bool, game_clock: bool) {
        if shot_clock {
            self.state.possession.shot_clock = (self.state.possession.shot_clock - dt).max(0.0);
        }
        if game_clock {
            self.state.game_clock = (self.state.game_clock - dt).max(0.0);
        }
    }

    pub fn add_score(&mut self, team: TeamSide, points: u32, reason: ChangeReason) {
        self.state.score.add(team, points);
        self.log(StatePath::Score(team), reason);
    }

    pub fn set_assist(&mut self, assist: Option<AssistLink>) {
        self.state.possession.assist = assist;
    }

    pub fn set_backcourt(&mut self, backcourt: BackcourtTracking) {
        self.state.possession.backcourt = backcourt;
    }

    pub(crate) fn backcourt_mut(&mut self) -> &mut BackcourtTracking {
        &mut self.state.possession.backcourt
    }

    pub fn set_rebound_flags(&mut self, flags: ReboundFlags, reason: ChangeReason) {
        self.state.rebound = flags;
        self.log(StatePath::ReboundActive, reason);
    }

    /// Track a moving loose ball. Only the target moves; `active` is untouched.
    pub(crate) fn set_rebound_target(&mut self, target: CourtPos) {
        self.state.rebound.target = Some(target);
    }

    pub fn set_modifiers(&mut self, bundles: [ModifierBundle; 2], snapshot: RubberBandSnapshot) {
        if self.state.rubber_banding != snapshot {
            for team in TeamSide::BOTH {
                if self.state.rubber_banding.tier(team) != snapshot.tier(team) {
                    self.log(StatePath::RubberBanding(team), ChangeReason::Modifiers);
                }
            }
        }
        self.state.modifiers = bundles;
        self.state.rubber_banding = snapshot;
    }

    pub fn set_matchups(&mut self, matchups: Vec<Matchup>) {
        self.state.matchups = matchups;
    }

    pub fn record_stat(&mut self, id: PlayerId, counter: StatCounter, delta: i32, reason: ChangeReason) {
        if let Some(player) = self.state.player_mut(id) {
            player.stats.add(counter, delta);
            self.log(StatePath::PlayerStat(id, counter), reason);
        }
    }

    /// Mutable player access; the write is logged against the player's position path.
    pub fn player_mut(&mut self, id: PlayerId, reason: ChangeReason) -> Option<&mut PlayerEntity> {
        if self.state.player(id).is_none() {
            return None;
        }
        self.log(StatePath::PlayerPosition(id), reason);
        self.state.player_mut(id)
    }

    /// Per-tick player upkeep (turbo, cooldowns). Not logged.
    pub(crate) fn players_mut_unlogged(&mut self) -> &mut [PlayerEntity] {
        &mut self.state.players
    }

    // ========================
    // Path API
    // ========================

    pub fn get_path(&self, path: StatePath) -> Result<Value> {
        let s = &self.state;
        let player = |id: PlayerId| s.player(id).ok_or(CoreError::UnknownPlayer { id: id.0 });
        let value = match path {
            StatePath::Score(team) => json!(s.score.get(team)),
            StatePath::ShotClock => json!(s.possession.shot_clock),
            StatePath::GameClock => json!(s.game_clock),
            StatePath::BallCarrier => serde_json::to_value(s.ball.carrier)?,
            StatePath::BallInFlight => json!(s.ball.in_flight.is_some()),
            StatePath::BallPosition => serde_json::to_value(s.ball.position)?,
            StatePath::PossessionTeam => serde_json::to_value(s.possession.team)?,
            StatePath::PossessionInbounding => json!(s.possession.inbounding),
            StatePath::PhaseCurrent => json!(s.phase.tag()),
            StatePath::RubberBanding(team) => json!(s.rubber_banding.tier(team)),
            StatePath::ReboundActive => json!(s.rebound.active),
            StatePath::ReboundTarget => serde_json::to_value(s.rebound.target)?,
            StatePath::ReboundLooseBall => json!(s.rebound.is_loose_ball),
            StatePath::PlayerStat(id, counter) => json!(player(id)?.stats.get(counter)),
            StatePath::PlayerPosition(id) => serde_json::to_value(player(id)?.position)?,
            StatePath::PlayerOnFire(id) => json!(player(id)?.flags.on_fire),
            StatePath::PlayerTurbo(id) => json!(player(id)?.flags.turbo),
        };
        Ok(value)
    }

    pub fn get(&self, path: &str) -> Result<Value> {
        self.get_path(path.parse()?)
    }

    pub fn set_path(&mut self, path: StatePath, value: Value, reason: ChangeReason) -> Result<()> {
        let invalid = |e: serde_json::Error| CoreError::InvalidValue {
            path: path.to_string(),
            reason: e.to_string(),
        };
        match path {
            StatePath::Score(team) => {
                let v: u32 = serde_json::from_value(value).map_err(invalid)?;
                match team {
                    TeamSide::Home => self.state.score.home = v,
                    TeamSide::Away => self.state.score.away = v,
                }
            }
            StatePath::ShotClock => {
                self.state.possession.shot_clock = serde_json::from_value(value).map_err(invalid)?
            }
            StatePath::GameClock => {
                self.state.game_clock = serde_json::from_value(value).map_err(invalid)?
            }
            StatePath::BallCarrier => {
                let carrier: Option<PlayerId> = serde_json::from_value(value).map_err(invalid)?;
                if let Some(id) = carrier {
                    self.state.player(id).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
                }
                self.state.ball.carrier = carrier;
            }
            StatePath::BallPosition => {
                self.state.ball.position = serde_json::from_value(value).map_err(invalid)?
            }
            StatePath::PossessionTeam => {
                self.state.possession.team = serde_json::from_value(value).map_err(invalid)?
            }
            StatePath::PossessionInbounding => {
                self.state.possession.inbounding =
                    serde_json::from_value(value).map_err(invalid)?
            }
            StatePath::RubberBanding(team) => {
                let tier: Option<String> = serde_json::from_value(value).map_err(invalid)?;
                self.state.rubber_banding.set_tier(team, tier);
            }
            StatePath::PlayerStat(id, counter) => {
                let v: u32 = serde_json::from_value(value).map_err(invalid)?;
                let player =
                    self.state.player_mut(id).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
                player.stats.set(counter, v);
            }
            StatePath::PlayerPosition(id) => {
                let pos: CourtPos = serde_json::from_value(value).map_err(invalid)?;
                let player =
                    self.state.player_mut(id).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
                player.position = pos;
            }
            StatePath::PlayerOnFire(id) => {
                let v: bool = serde_json::from_value(value).map_err(invalid)?;
                let player =
                    self.state.player_mut(id).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
                player.flags.on_fire = v;
            }
            StatePath::PlayerTurbo(id) => {
                let v: f32 = serde_json::from_value(value).map_err(invalid)?;
                let player =
                    self.state.player_mut(id).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
                player.flags.turbo = v.clamp(0.0, player.flags.turbo_capacity);
            }
            StatePath::BallInFlight
            | StatePath::PhaseCurrent
            | StatePath::ReboundActive
            | StatePath::ReboundTarget
            | StatePath::ReboundLooseBall => {
                return Err(CoreError::ReadOnlyPath { path: path.to_string() })
            }
        }
        self.log(path, reason);
        Ok(())
    }

    pub fn set(&mut self, path: &str, value: Value, reason: ChangeReason) -> Result<()> {
        self.set_path(path.parse()?, value, reason)
    }
}
