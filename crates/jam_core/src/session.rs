//! Possession Session
//!
//! Owns one match: store, bus, sequencer, engines and the authority link.
//!
//! ## Tick order
//! 1. inbox: coordinator handles requests, clients buffer broadcasts
//! 2. buffered broadcasts apply once the ball is settled
//! 3. modifiers (rubber band + difficulty) → turbo → clocks
//! 4. coordinator: queued pass
//! 5. shot phase, then animation completions
//! 6. rebound scramble
//! 7. coordinator: periodic clock/score delta

use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

use crate::animation::AnimationSequencer;
use crate::authority::{AuthorityMessage, AuthorityRole, Transport};
use crate::config::EngineConfig;
use crate::engine::capabilities::{AttributeProvider, BuffedAttributes, ContestHooks, CourtGeometry, NoopHooks, SpatialProvider};
use crate::engine::interception::InterceptionPolicy;
use crate::engine::matchups::assign_matchups;
use crate::engine::pass::{ball_busy, validate_pass, PassDecision, PassEngine};
use crate::engine::possession::{apply_flip, PossessionFlip};
use crate::engine::rebound::{ReboundResolution, ReboundResolver};
use crate::engine::rng::OutcomeRng;
use crate::engine::{shot, upkeep};
use crate::engine::{Completion, PassOptions, PassOutcome, Rejection, ResolveCtx, ShotOptions, ShotOutcome};
use crate::error::{CoreError, Result};
use crate::events::{EventBus, GameEvent};
use crate::models::{CourtPos, PlayerEntity, PlayerId};
use crate::modifiers::{compute_bundles, DifficultyController, DifficultyOutcome, RubberBandService};
use crate::state::{ChangeReason, MatchState, PassIntent, Phase, ShotQueueEntry, StatePath, StateStore};

/// Disjoint field borrows for one engine call.
macro_rules! ctx {
    ($s:ident) => {
        ResolveCtx {
            store: &mut $s.store,
            bus: &mut $s.bus,
            sequencer: &mut $s.sequencer,
            rng: &mut $s.rng,
            config: &$s.config,
            attributes: $s.attributes.as_ref(),
            spatial: $s.spatial.as_ref(),
            hooks: $s.hooks.as_mut(),
            role: $s.role,
        }
    };
}

pub struct PossessionSession {
    config: EngineConfig,
    store: StateStore,
    bus: EventBus,
    sequencer: AnimationSequencer<Completion>,
    rng: OutcomeRng,
    attributes: Box<dyn AttributeProvider>,
    spatial: Box<dyn SpatialProvider>,
    hooks: Box<dyn ContestHooks>,
    role: AuthorityRole,
    link: Option<Box<dyn Transport>>,
    passes: PassEngine,
    rebound: ReboundResolver,
    rubber_band: RubberBandService,
    difficulty: DifficultyController,
    next_shot_id: u64,
    /// Client: broadcasts waiting for the local ball to settle
    pending: VecDeque<AuthorityMessage>,
}

impl PossessionSession {
    /// Coordinator session with no link. Every participant of one match must
    /// use the same `seed` (presentation rolls are derived from it).
    pub fn new(config: EngineConfig, players: Vec<PlayerEntity>, seed: u64) -> Result<Self> {
        config.validate()?;
        if players.is_empty() {
            return Err(CoreError::InvalidConfig("session needs at least one player".into()));
        }
        let store = StateStore::from_players(players, &config);
        let mut session = Self {
            attributes: Box::new(BuffedAttributes::from_config(&config)),
            spatial: Box::new(CourtGeometry::new(config.court.clone())),
            hooks: Box::new(NoopHooks),
            store,
            bus: EventBus::new(),
            sequencer: AnimationSequencer::new(),
            rng: OutcomeRng::new(seed),
            role: AuthorityRole::Coordinator,
            link: None,
            passes: PassEngine::default(),
            rebound: ReboundResolver::new(),
            rubber_band: RubberBandService::new(),
            difficulty: DifficultyController::new(),
            next_shot_id: 1,
            pending: VecDeque::new(),
            config,
        };
        let matchups = assign_matchups(session.store.state());
        session.store.set_matchups(matchups);
        session.refresh_modifiers();
        info!("possession session ready: {} players, seed {}", session.store.state().players.len(), seed);
        Ok(session)
    }

    pub fn with_role(mut self, role: AuthorityRole, link: Box<dyn Transport>) -> Self {
        self.role = role;
        self.link = Some(link);
        self
    }

    pub fn with_hooks(mut self, hooks: Box<dyn ContestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_interception_policy(mut self, policy: Box<dyn InterceptionPolicy>) -> Self {
        self.passes = PassEngine::new(policy);
        self
    }

    // ========================
    // Accessors
    // ========================

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe collaborators here.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn role(&self) -> AuthorityRole {
        self.role
    }

    pub fn sequencer(&self) -> &AnimationSequencer<Completion> {
        &self.sequencer
    }

    pub fn rebound(&self) -> &ReboundResolver {
        &self.rebound
    }

    pub fn passes(&self) -> &PassEngine {
        &self.passes
    }

    /// Host write through the dotted-path API. Only `score.*`, `shotClock`
    /// and `gameClock` are accepted.
    pub fn set(&mut self, path: &str, value: serde_json::Value) -> Result<()> {
        let path: StatePath = path.parse()?;
        if !path.is_host_writable() {
            return Err(CoreError::ReadOnlyPath { path: path.to_string() });
        }
        self.store.set_path(path, value, ChangeReason::External)
    }

    pub fn is_finished(&self) -> bool {
        self.store.state().game_clock <= 0.0
    }

    // ========================
    // Player input
    // ========================

    /// Move a player (clamped to the court). The ball follows its carrier.
    pub fn move_player(&mut self, id: PlayerId, to: CourtPos) -> Result<()> {
        let pos = self.spatial.clamp_to_court(to);
        let player = self.store.player_mut(id, ChangeReason::External).ok_or(CoreError::UnknownPlayer { id: id.0 })?;
        player.position = pos;
        let state = self.store.state();
        if state.ball.carrier == Some(id) && state.ball.in_flight.is_none() {
            self.store.track_ball(pos);
        }
        Ok(())
    }

    pub fn attempt_shot(&mut self, shooter: PlayerId, options: ShotOptions) -> std::result::Result<ShotOutcome, Rejection> {
        shot::validate_shot(self.store.state(), self.spatial.as_ref(), &self.config, shooter)?;
        if !self.role.is_coordinator() {
            self.send(AuthorityMessage::ShotRequest { shooter, options });
            return Ok(ShotOutcome::Forwarded);
        }
        self.resolve_shot(shooter, options).map(ShotOutcome::Queued)
    }

    pub fn attempt_pass(
        &mut self,
        passer: PlayerId,
        receiver: PlayerId,
        options: PassOptions,
    ) -> std::result::Result<PassOutcome, Rejection> {
        validate_pass(self.store.state(), passer, receiver)?;
        if !self.role.is_coordinator() {
            self.send(AuthorityMessage::PassRequest { passer, receiver, options });
            return Ok(PassOutcome::Forwarded);
        }
        if ball_busy(self.store.state()) {
            let mut ctx = ctx!(self);
            self.passes.queue(&mut ctx, passer, receiver, options);
            return Ok(PassOutcome::Queued);
        }
        let decision = {
            let mut ctx = ctx!(self);
            self.passes.decide(&mut ctx, passer, receiver, options)
        };
        self.commit_pass_decision(decision).map(PassOutcome::InFlight)
    }

    /// Apply a difficulty preset (once; reset first to switch).
    pub fn apply_difficulty(&mut self, id: &str) -> DifficultyOutcome {
        let outcome = self.difficulty.apply(id, &mut self.config.difficulty);
        self.refresh_modifiers();
        outcome
    }

    pub fn reset_difficulty(&mut self) {
        self.difficulty.reset(&mut self.config.difficulty);
        self.refresh_modifiers();
    }

    // ========================
    // Tick
    // ========================

    pub fn tick(&mut self) {
        self.store.advance_tick();
        self.pump_inbox();
        self.apply_pending();

        self.refresh_modifiers();
        let flip = {
            let mut ctx = ctx!(self);
            upkeep::turbo_upkeep(&mut ctx);
            upkeep::run_clocks(&mut ctx)
        };
        if let Some(flip) = flip {
            self.resolve_flip(flip);
        }

        if self.role.is_coordinator() {
            let decision = {
                let mut ctx = ctx!(self);
                self.passes.service_queue(&mut ctx)
            };
            if let Some(decision) = decision {
                if let Err(rejection) = self.commit_pass_decision(decision) {
                    debug!("queued pass resolved as {}", rejection);
                }
            }
        }

        {
            let mut ctx = ctx!(self);
            shot::service_shot_phase(&mut ctx);
        }
        self.run_completions();
        self.sync_ball();
        self.apply_pending();

        let verdict = {
            let mut ctx = ctx!(self);
            self.rebound.tick(&mut ctx)
        };
        if let Some(resolution) = verdict {
            self.apply_rebound(resolution);
            let tick = self.store.tick();
            self.send(AuthorityMessage::ReboundResolved { tick, resolution });
        } else if !self.role.is_coordinator() {
            self.apply_pending();
        }

        self.broadcast_delta();
        {
            let mut ctx = ctx!(self);
            upkeep::expire_assist(&mut ctx);
            upkeep::track_backcourt(&mut ctx);
        }
    }

    // ========================
    // Internals
    // ========================

    fn resolve_shot(&mut self, shooter: PlayerId, options: ShotOptions) -> std::result::Result<ShotQueueEntry, Rejection> {
        let player = self.store.state().player(shooter).cloned().ok_or(Rejection::InvalidShooter)?;
        let id = self.next_shot_id;
        self.next_shot_id += 1;
        let entry = {
            let mut ctx = ctx!(self);
            let entry = shot::decide_shot(&mut ctx, &player, options, id);
            shot::commit_shot(&mut ctx, &entry);
            entry
        };
        self.send(AuthorityMessage::ShotResolved { entry: entry.clone() });
        Ok(entry)
    }

    fn commit_pass_decision(&mut self, decision: PassDecision) -> std::result::Result<PassIntent, Rejection> {
        match decision {
            PassDecision::Throw(intent) => {
                {
                    let mut ctx = ctx!(self);
                    self.passes.commit(&mut ctx, intent.clone());
                }
                self.send(AuthorityMessage::PassResolved { intent: intent.clone() });
                Ok(intent)
            }
            PassDecision::OutOfBounds(flip) => {
                self.resolve_flip(flip);
                Err(Rejection::OutOfBounds)
            }
        }
    }

    fn resolve_flip(&mut self, flip: PossessionFlip) {
        {
            let mut ctx = ctx!(self);
            apply_flip(&mut ctx, &flip);
        }
        self.send(AuthorityMessage::PossessionFlip { flip });
    }

    fn apply_rebound(&mut self, resolution: ReboundResolution) {
        let mut ctx = ctx!(self);
        self.rebound.apply(&mut ctx, resolution);
    }

    fn run_completions(&mut self) {
        for done in self.sequencer.advance() {
            let mut ctx = ctx!(self);
            let scramble = match done.completion {
                Completion::Shot(entry) => shot::complete_shot(&mut ctx, done.id, entry),
                Completion::Pass(intent) => self.passes.complete(&mut ctx, done.id, intent),
                Completion::Bounce => {
                    self.rebound.on_bounce_landed(&mut ctx, done.id, done.final_pos);
                    None
                }
                Completion::BallReturn => {
                    shot::complete_ball_return(&mut ctx);
                    None
                }
            };
            if let Some(start) = scramble {
                self.rebound.activate(&mut ctx, start);
            }
        }
    }

    /// Ball follows the shot / pass animation, or its carrier.
    fn sync_ball(&mut self) {
        let state = self.store.state();
        let animated = match state.phase {
            Phase::ShotInFlight { sequence, .. } => self.sequencer.position(sequence),
            _ => self.passes.in_flight().and_then(|id| self.sequencer.position(id)),
        };
        let carried = match state.ball.in_flight {
            None => state.carrier().map(|c| c.position),
            Some(_) => None,
        };
        if let Some(pos) = animated.or(carried) {
            self.store.track_ball(pos);
        }
    }

    fn refresh_modifiers(&mut self) {
        let state = self.store.state();
        let (snapshot, transitions) = self.rubber_band.update(self.config.rubber_band.as_ref(), &state.score, state.game_clock);
        let bundles = compute_bundles(&self.config, &snapshot);
        self.store.set_modifiers(bundles, snapshot);
        for t in transitions {
            self.bus.publish(GameEvent::RubberBandTierChange { team: t.team, from: t.from, to: t.to.clone() });
            if let Some(cue) = t.cue {
                self.bus.publish(GameEvent::announcer(cue, json!({ "team": t.team, "tier": t.to })));
            }
        }
    }

    fn broadcast_delta(&mut self) {
        let tick = self.store.tick();
        let every = self.config.clock.ticks_per_second.max(1) as u64;
        // deltas only go out between plays so clients never roll back a landing
        if !self.role.is_coordinator() || self.link.is_none() || tick % every != 0 || !ball_settled(self.store.state()) {
            return;
        }
        let mut values = BTreeMap::new();
        for path in ["shotClock", "gameClock", "score.home", "score.away"] {
            match self.store.get(path) {
                Ok(value) => {
                    values.insert(path.to_string(), value);
                }
                Err(e) => warn!("state delta skipped {}: {}", path, e),
            }
        }
        self.send(AuthorityMessage::StateDelta { tick, values });
    }

    /// Coordinator broadcasts; clients forward requests.
    fn send(&mut self, message: AuthorityMessage) {
        let Some(link) = self.link.as_mut() else { return };
        if self.role.is_coordinator() == message.is_request() {
            return;
        }
        if let Err(e) = link.send(&message) {
            warn!("{} send failed for {}: {}", self.role.as_str(), message.kind(), e);
        }
    }

    fn pump_inbox(&mut self) {
        let inbox = match self.link.as_mut() {
            Some(link) => link.drain_inbox(),
            None => return,
        };
        for message in inbox {
            match (self.role, message) {
                (AuthorityRole::Coordinator, AuthorityMessage::ShotRequest { shooter, options }) => {
                    if let Err(rejection) = self.attempt_shot(shooter, options) {
                        debug!("forwarded shot by {} rejected: {}", shooter, rejection);
                    }
                }
                (AuthorityRole::Coordinator, AuthorityMessage::PassRequest { passer, receiver, options }) => {
                    if let Err(rejection) = self.attempt_pass(passer, receiver, options) {
                        debug!("forwarded pass by {} rejected: {}", passer, rejection);
                    }
                }
                (AuthorityRole::Coordinator, other) => {
                    warn!("coordinator ignoring {} broadcast", other.kind());
                }
                (AuthorityRole::Client, message) if message.is_request() => {
                    warn!("client ignoring {}", message.kind());
                }
                (AuthorityRole::Client, message) => self.pending.push_back(message),
            }
        }
    }

    /// Client: apply buffered broadcasts in order while the ball is settled.
    fn apply_pending(&mut self) {
        while let Some(message) = self.pending.front() {
            if !ball_settled(self.store.state()) {
                debug!("{} deferred until the ball settles", message.kind());
                break;
            }
            if let AuthorityMessage::ReboundResolved { tick, .. } = message {
                if self.rebound.awaits_step(*tick) {
                    break;
                }
            }
            if let Some(message) = self.pending.pop_front() {
                self.apply_broadcast(message);
            }
        }
    }

    fn apply_broadcast(&mut self, message: AuthorityMessage) {
        match message {
            AuthorityMessage::ShotResolved { entry } => {
                self.next_shot_id = self.next_shot_id.max(entry.id + 1);
                let mut ctx = ctx!(self);
                shot::commit_shot(&mut ctx, &entry);
            }
            AuthorityMessage::PassResolved { intent } => {
                let mut ctx = ctx!(self);
                self.passes.commit(&mut ctx, intent);
            }
            AuthorityMessage::ReboundResolved { resolution, .. } => self.apply_rebound(resolution),
            AuthorityMessage::PossessionFlip { flip } => {
                let mut ctx = ctx!(self);
                apply_flip(&mut ctx, &flip);
            }
            AuthorityMessage::StateDelta { values, .. } => {
                for (path, value) in values {
                    if let Err(e) = self.store.set(&path, value, ChangeReason::Replicated) {
                        warn!("state delta {} rejected: {}", path, e);
                    }
                }
            }
            request => warn!("unexpected {} in client queue", request.kind()),
        }
    }
}

/// No shot, pass or ball return animating.
fn ball_settled(state: &MatchState) -> bool {
    state.ball.in_flight.is_none() && !state.phase.is_shot_active()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::LoopbackHub;
    use crate::models::{AttributeSet, TeamSide};

    fn players() -> Vec<PlayerEntity> {
        vec![
            PlayerEntity::new(0, "H1", TeamSide::Home, CourtPos::new(40.0, 20.0), AttributeSet::uniform(5.0)),
            PlayerEntity::new(1, "H2", TeamSide::Home, CourtPos::new(50.0, 12.0), AttributeSet::uniform(5.0)),
            PlayerEntity::new(2, "A1", TeamSide::Away, CourtPos::new(60.0, 35.0), AttributeSet::uniform(5.0)),
            PlayerEntity::new(3, "A2", TeamSide::Away, CourtPos::new(65.0, 5.0), AttributeSet::uniform(5.0)),
        ]
    }

    fn session() -> PossessionSession {
        PossessionSession::new(EngineConfig::deterministic(), players(), 11).unwrap()
    }

    fn run(session: &mut PossessionSession, ticks: u32) {
        for _ in 0..ticks {
            session.tick();
        }
    }

    #[test]
    fn test_empty_roster_rejected() {
        let err = PossessionSession::new(EngineConfig::default(), Vec::new(), 1).err().unwrap();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_clean_pass_lands() {
        let mut s = session();
        let outcome = s.attempt_pass(PlayerId(0), PlayerId(1), PassOptions::default()).unwrap();
        assert!(matches!(outcome, PassOutcome::InFlight(ref i) if i.interceptor.is_none()));
        assert_eq!(s.store().state().ball.carrier, None);

        run(&mut s, 20);
        let state = s.store().state();
        assert_eq!(state.ball.carrier, Some(PlayerId(1)));
        assert_eq!(state.ball.in_flight, None);
        assert_eq!(state.ball.position, CourtPos::new(50.0, 12.0));
        assert_eq!(s.bus().count("pass_complete"), 1);
    }

    #[test]
    fn test_second_action_while_pass_in_flight() {
        let mut s = session();
        s.attempt_pass(PlayerId(0), PlayerId(1), PassOptions::default()).unwrap();
        assert_eq!(s.attempt_shot(PlayerId(0), ShotOptions::default()), Err(Rejection::ShotInProgress));
        assert_eq!(s.attempt_pass(PlayerId(0), PlayerId(1), PassOptions::default()), Err(Rejection::InvalidPasser));
    }

    #[test]
    fn test_move_player_carries_ball() {
        let mut s = session();
        s.move_player(PlayerId(0), CourtPos::new(-5.0, 22.0)).unwrap();
        let state = s.store().state();
        assert_eq!(state.players[0].position, CourtPos::new(0.0, 22.0));
        assert_eq!(state.ball.position, CourtPos::new(0.0, 22.0));
        assert!(matches!(s.move_player(PlayerId(9), CourtPos::default()), Err(CoreError::UnknownPlayer { id: 9 })));
    }

    #[test]
    fn test_host_set_limited_to_scoreboard() {
        let mut s = session();
        s.set("score.away", json!(4)).unwrap();
        s.set("shotClock", json!(9.5)).unwrap();
        assert_eq!(s.store().state().score.away, 4);

        for path in ["ballCarrier", "possession.team", "players.0.stats.points", "players.1.onFire"] {
            assert!(matches!(s.set(path, json!(1)), Err(CoreError::ReadOnlyPath { .. })), "{}", path);
        }
        assert_eq!(s.store().state().ball.carrier, Some(PlayerId(0)));
        assert!(matches!(s.set("score.draw", json!(1)), Err(CoreError::UnknownPath { .. })));
    }

    #[test]
    fn test_shot_clock_violation_flips() {
        let mut s = session();
        let ticks = s.config().ticks(s.config().clock.shot_clock_secs) as u32;
        run(&mut s, ticks + 1);
        let state = s.store().state();
        assert_eq!(state.possession.team, TeamSide::Away);
        assert!(state.possession.inbounding);
        assert_eq!(s.bus().count("shot_clock_violation"), 1);
    }

    #[test]
    fn test_difficulty_feeds_ai_modifiers() {
        let mut config = EngineConfig::deterministic();
        config.control.away_ai = true;
        let mut s = PossessionSession::new(config, players(), 3).unwrap();
        assert_eq!(s.apply_difficulty("5"), DifficultyOutcome::Applied("5"));
        let away = s.store().state().modifiers_for(TeamSide::Away).defense_scale;
        let home = s.store().state().modifiers_for(TeamSide::Home).defense_scale;
        assert!(away > home);

        s.reset_difficulty();
        let away = s.store().state().modifiers_for(TeamSide::Away).defense_scale;
        assert!((away - EngineConfig::deterministic().difficulty.defense_scale).abs() < 1e-6);
    }

    #[test]
    fn test_client_forwards_and_mirrors_pass() {
        let hub = LoopbackHub::new();
        let mut coordinator = session().with_role(AuthorityRole::Coordinator, Box::new(hub.coordinator()));
        let mut client = session().with_role(AuthorityRole::Client, Box::new(hub.client()));

        let outcome = client.attempt_pass(PlayerId(0), PlayerId(1), PassOptions::default()).unwrap();
        assert_eq!(outcome, PassOutcome::Forwarded);
        assert_eq!(client.store().state().ball.carrier, Some(PlayerId(0)));

        for _ in 0..30 {
            coordinator.tick();
            client.tick();
        }
        assert_eq!(coordinator.bus().count("pass_complete"), 1);
        assert_eq!(client.bus().count("pass_complete"), 1);
        assert_eq!(client.store().state().ball.carrier, Some(PlayerId(1)));
    }
}
