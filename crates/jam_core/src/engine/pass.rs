//! Pass Resolution Engine
//!
//! - busy ball + passer holds it → queued, replayed when the ball is free
//! - target out of bounds → turnover, possession flip, no animation
//! - otherwise the interception policy may cut the path; the animation always
//!   ends at the resolved endpoint and the interceptor receives the ball

use tracing::{debug, error, warn};

use crate::animation::{SequenceId, SequenceSpec};
use crate::events::{GameEvent, PossessionReason};
use crate::models::{AttributeKind, PlayerId, StatCounter};
use crate::state::{AssistLink, ChangeReason, FlightKind, MatchState, PassIntent};

use super::interception::{InterceptionPolicy, NearestPointOnSegment};
use super::possession::{award_possession, PossessionFlip};
use super::upkeep::restart_shot_clock;
use super::{Completion, PassOptions, Rejection, ResolveCtx, ScrambleStart};

/// Pass waiting for the ball to free up
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedPass {
    pub passer: PlayerId,
    pub receiver: PlayerId,
    pub options: PassOptions,
    pub expires_tick: u64,
}

/// Coordinator decision for one pass
#[derive(Debug, Clone, PartialEq)]
pub enum PassDecision {
    Throw(PassIntent),
    OutOfBounds(PossessionFlip),
}

pub fn validate_pass(state: &MatchState, passer: PlayerId, receiver: PlayerId) -> Result<(), Rejection> {
    let passer_team = state.team_of(passer).ok_or(Rejection::InvalidPasser)?;
    match state.team_of(receiver) {
        Some(team) if team == passer_team && receiver != passer => {}
        _ => return Err(Rejection::InvalidReceiver),
    }
    if state.ball.carrier != Some(passer) {
        return Err(Rejection::InvalidPasser);
    }
    Ok(())
}

/// Ball animating or a must-wait phase active.
pub fn ball_busy(state: &MatchState) -> bool {
    state.ball.in_flight.is_some() || state.phase.must_wait()
}

pub struct PassEngine {
    policy: Box<dyn InterceptionPolicy>,
    queued: Option<QueuedPass>,
    in_flight: Option<SequenceId>,
    next_id: u64,
}

impl Default for PassEngine {
    fn default() -> Self {
        Self::new(Box::new(NearestPointOnSegment))
    }
}

impl PassEngine {
    pub fn new(policy: Box<dyn InterceptionPolicy>) -> Self {
        Self { policy, queued: None, in_flight: None, next_id: 1 }
    }

    pub fn queued(&self) -> Option<&QueuedPass> {
        self.queued.as_ref()
    }

    /// Sequence of the pass currently animating
    pub fn in_flight(&self) -> Option<SequenceId> {
        self.in_flight
    }

    pub fn queue(&mut self, ctx: &mut ResolveCtx<'_>, passer: PlayerId, receiver: PlayerId, options: PassOptions) {
        let expires_tick = ctx.store.tick() + ctx.ticks(ctx.config.pass.queue_timeout_secs);
        if let Some(prev) = self.queued.replace(QueuedPass { passer, receiver, options, expires_tick }) {
            debug!("queued pass {} -> {} replaced", prev.passer, prev.receiver);
        }
        ctx.emit(GameEvent::PassQueued { passer, receiver });
    }

    /// Coordinator-only: bounds check, interception policy and steal roll.
    pub fn decide(&mut self, ctx: &mut ResolveCtx<'_>, passer: PlayerId, receiver: PlayerId, options: PassOptions) -> PassDecision {
        let state = ctx.store.state();
        let team = state.possession.team;
        let origin = state.ball.position;
        let target = options
            .lead_target
            .or_else(|| state.player(receiver).map(|p| p.position))
            .unwrap_or(origin);

        if !ctx.spatial.in_bounds(target, 0.0) {
            debug!("pass {} -> {} out of bounds at ({:.1}, {:.1})", passer, receiver, target.x, target.y);
            return PassDecision::OutOfBounds(PossessionFlip {
                to: team.opponent(),
                reason: PossessionReason::PassOob,
                turnover_by: Some(passer),
            });
        }

        let pass_cfg = &ctx.config.pass;
        let candidate = self.policy.find(state, team, origin, target, pass_cfg.intercept_radius);
        let mut interceptor = None;
        let mut endpoint = target;
        if let Some(c) = candidate {
            let defense = state.modifiers_for(team.opponent());
            let steal = state.player(c.player).map(|p| ctx.attributes.effective(p, AttributeKind::Steal)).unwrap_or(0.0);
            let proximity = if pass_cfg.intercept_radius > 0.0 {
                0.5 + 0.5 * (1.0 - c.distance / pass_cfg.intercept_radius)
            } else {
                1.0
            };
            let chance = ((pass_cfg.steal_base + pass_cfg.steal_per_skill * steal + defense.steal_bonus)
                * proximity
                * defense.defense_scale)
                .clamp(0.0, pass_cfg.steal_max);
            if ctx.rng.chance(chance) {
                interceptor = Some(c.player);
                endpoint = c.point;
            }
        }

        let distance = origin.distance(endpoint);
        let duration_ticks = ((distance / pass_cfg.pass_speed.max(0.1)).ceil() as u32).max(pass_cfg.min_duration_ticks);
        let id = self.next_id;
        self.next_id += 1;

        PassDecision::Throw(PassIntent {
            id,
            passer,
            receiver: Some(receiver),
            team,
            origin,
            endpoint,
            lead_target: options.lead_target,
            interceptor,
            inbound: state.possession.inbounding,
            duration_ticks,
            consumed: false,
        })
    }

    /// Every role: start the pass animation for a decided intent.
    pub fn commit(&mut self, ctx: &mut ResolveCtx<'_>, intent: PassIntent) {
        self.next_id = self.next_id.max(intent.id + 1);
        ctx.emit(GameEvent::PassAttempt {
            passer: intent.passer,
            receiver: intent.receiver,
            target: intent.lead_target.unwrap_or(intent.endpoint),
            intercepted_by: intent.interceptor,
            inbound: intent.inbound,
        });
        ctx.store.set_ball_in_flight(Some(FlightKind::Pass), ChangeReason::PassStarted);
        ctx.store.set_ball_carrier(None, ChangeReason::PassStarted);
        ctx.store.set_ball_position(intent.origin, ChangeReason::PassStarted);

        let spec = SequenceSpec::straight("pass", intent.origin, intent.endpoint, intent.duration_ticks, Completion::Pass(intent))
            .with_arc(0.5);
        self.in_flight = Some(ctx.sequencer.enqueue(spec));
    }

    /// Coordinator-only: expire, cancel, or fire the queued pass.
    pub fn service_queue(&mut self, ctx: &mut ResolveCtx<'_>) -> Option<PassDecision> {
        let queued = self.queued.clone()?;
        let state = ctx.store.state();
        if state.ball.carrier != Some(queued.passer) {
            self.queued = None;
            let carrier = state.ball.carrier;
            ctx.emit(GameEvent::PassQueueCancelled { passer: queued.passer, carrier });
            return None;
        }
        if ctx.store.tick() > queued.expires_tick {
            self.queued = None;
            ctx.emit(GameEvent::PassQueueExpired { passer: queued.passer });
            return None;
        }
        if ball_busy(state) {
            return None;
        }
        self.queued = None;
        if let Err(rejection) = validate_pass(state, queued.passer, queued.receiver) {
            debug!("queued pass dropped: {}", rejection);
            return None;
        }
        Some(self.decide(ctx, queued.passer, queued.receiver, queued.options))
    }

    /// Animation finished. Returns a loose-ball scramble when the receiver is missing.
    pub fn complete(&mut self, ctx: &mut ResolveCtx<'_>, sequence: SequenceId, mut intent: PassIntent) -> Option<ScrambleStart> {
        if self.in_flight != Some(sequence) || intent.consumed {
            warn!("stale pass completion {:?} ignored", sequence);
            return None;
        }
        self.in_flight = None;
        intent.consumed = true;
        ctx.store.set_ball_in_flight(None, ChangeReason::PassComplete);

        if let Some(thief) = intent.interceptor {
            ctx.store.record_stat(thief, StatCounter::Steals, 1, ChangeReason::Interception);
            ctx.store.record_stat(intent.passer, StatCounter::Turnovers, 1, ChangeReason::Interception);
            ctx.emit(GameEvent::Interception { passer: intent.passer, interceptor: thief, at: intent.endpoint });
            ctx.emit(GameEvent::Turnover {
                player: Some(intent.passer),
                team: intent.team,
                reason: PossessionReason::Interception,
            });
            award_possession(ctx, intent.team.opponent(), PossessionReason::Interception, Some(thief), false);
            ctx.emit(GameEvent::announcer("steal", serde_json::json!({ "player": thief })));
            return None;
        }

        let receiver = intent.resolved_receiver().filter(|id| ctx.store.state().player(*id).is_some());
        let Some(receiver) = receiver else {
            error!("pass {} from {} completed without a receiver; ball is loose", intent.id, intent.passer);
            ctx.emit(GameEvent::InconsistentState { context: format!("pass {} has no resolved receiver", intent.id) });
            ctx.store.set_ball_carrier(None, ChangeReason::PassComplete);
            ctx.store.set_ball_position(intent.endpoint, ChangeReason::PassComplete);
            return Some(ScrambleStart {
                from: intent.endpoint,
                target: intent.endpoint,
                is_loose_ball: true,
                offense: intent.team,
            });
        };

        ctx.store.set_ball_carrier(Some(receiver), ChangeReason::PassComplete);
        if intent.inbound {
            ctx.store.set_inbounding(false, ChangeReason::InboundComplete);
            restart_shot_clock(ctx, ChangeReason::InboundComplete);
        } else {
            let expires_tick = ctx.store.tick() + ctx.ticks(ctx.config.pass.assist_window_secs);
            ctx.store.set_assist(Some(AssistLink { passer: intent.passer, receiver, expires_tick }));
        }
        ctx.emit(GameEvent::PassComplete { passer: intent.passer, receiver, inbound: intent.inbound });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testkit::{player, Rig};
    use crate::models::{CourtPos, TeamSide};
    use crate::state::Phase;

    fn rig(defenders: &[(f32, f32)]) -> Rig {
        let mut players = vec![player(0, TeamSide::Home, 10.0, 10.0), player(1, TeamSide::Home, 20.0, 10.0)];
        for (i, (x, y)) in defenders.iter().enumerate() {
            players.push(player(2 + i as u8, TeamSide::Away, *x, *y));
        }
        Rig::new(players)
    }

    fn run_to_completion(rig: &mut Rig, engine: &mut PassEngine) -> Option<ScrambleStart> {
        for _ in 0..200 {
            for done in rig.sequencer.advance() {
                if let Completion::Pass(intent) = done.completion {
                    return engine.complete(&mut rig.ctx(), done.id, intent);
                }
            }
        }
        panic!("pass never completed");
    }

    #[test]
    fn test_validation() {
        let rig = rig(&[(50.0, 20.0)]);
        let s = rig.store.state();
        assert_eq!(validate_pass(s, PlayerId(0), PlayerId(1)), Ok(()));
        assert_eq!(validate_pass(s, PlayerId(1), PlayerId(0)), Err(Rejection::InvalidPasser));
        assert_eq!(validate_pass(s, PlayerId(0), PlayerId(2)), Err(Rejection::InvalidReceiver));
        assert_eq!(validate_pass(s, PlayerId(0), PlayerId(0)), Err(Rejection::InvalidReceiver));
        assert_eq!(validate_pass(s, PlayerId(9), PlayerId(0)), Err(Rejection::InvalidPasser));
    }

    #[test]
    fn test_clean_pass_sets_assist_link() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        let PassDecision::Throw(intent) = engine.decide(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default()) else {
            panic!("expected a throw");
        };
        assert_eq!(intent.interceptor, None);
        assert_eq!(intent.duration_ticks, 4);
        engine.commit(&mut rig.ctx(), intent);
        assert_eq!(rig.store.state().ball.in_flight, Some(FlightKind::Pass));
        assert_eq!(rig.store.state().ball.carrier, None);

        assert!(run_to_completion(&mut rig, &mut engine).is_none());
        let s = rig.store.state();
        assert_eq!(s.ball.carrier, Some(PlayerId(1)));
        assert_eq!(s.ball.in_flight, None);
        assert_eq!(s.possession.assist.map(|a| a.passer), Some(PlayerId(0)));
        assert_eq!(rig.bus.count("pass_complete"), 1);
    }

    #[test]
    fn test_interception_truncates_path() {
        let mut config = crate::config::EngineConfig::deterministic();
        config.pass.steal_max = 100.0;
        let players = vec![
            player(0, TeamSide::Home, 10.0, 10.0),
            player(1, TeamSide::Home, 20.0, 10.0),
            player(2, TeamSide::Away, 15.0, 10.0),
        ];
        let mut rig = Rig::with_config(players, config);
        rig.store.players_mut_unlogged()[2].attributes.steal = 20.0;
        let mut engine = PassEngine::default();
        let PassDecision::Throw(intent) = engine.decide(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default()) else {
            panic!("expected a throw");
        };
        assert_eq!(intent.interceptor, Some(PlayerId(2)));
        assert!(intent.endpoint.distance(CourtPos::new(15.0, 10.0)) < 1e-3);
        engine.commit(&mut rig.ctx(), intent);
        run_to_completion(&mut rig, &mut engine);

        let s = rig.store.state();
        assert_eq!(s.ball.carrier, Some(PlayerId(2)));
        assert_eq!(s.possession.team, TeamSide::Away);
        assert_eq!(s.players[2].stats.steals, 1);
        assert_eq!(s.players[0].stats.turnovers, 1);
        assert!((s.possession.shot_clock - 24.0).abs() < 1e-4);
        assert_eq!(rig.bus.count("interception"), 1);
    }

    #[test]
    fn test_out_of_bounds_decision() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        let options = PassOptions { lead_target: Some(CourtPos::new(-10.0, -6.0)) };
        let decision = engine.decide(&mut rig.ctx(), PlayerId(0), PlayerId(1), options);
        assert!(matches!(decision, PassDecision::OutOfBounds(flip) if flip.to == TeamSide::Away));
        assert_eq!(rig.sequencer.active_count(), 0);
    }

    #[test]
    fn test_queue_cancelled_when_carrier_changes() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        rig.store.set_phase(Phase::Rebound, ChangeReason::External);
        engine.queue(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default());
        assert!(engine.service_queue(&mut rig.ctx()).is_none());
        assert!(engine.queued().is_some());

        rig.store.set_ball_carrier(Some(PlayerId(1)), ChangeReason::External);
        assert!(engine.service_queue(&mut rig.ctx()).is_none());
        assert!(engine.queued().is_none());
        assert_eq!(rig.bus.count("pass_queue_cancelled"), 1);
    }

    #[test]
    fn test_queue_fires_when_ball_frees() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        rig.store.set_phase(Phase::Rebound, ChangeReason::External);
        engine.queue(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default());
        rig.store.set_phase(Phase::Live, ChangeReason::External);
        assert!(matches!(engine.service_queue(&mut rig.ctx()), Some(PassDecision::Throw(_))));
    }

    #[test]
    fn test_queue_expires() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        rig.store.set_phase(Phase::Rebound, ChangeReason::External);
        engine.queue(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default());
        for _ in 0..31 {
            rig.store.advance_tick();
        }
        assert!(engine.service_queue(&mut rig.ctx()).is_none());
        assert_eq!(rig.bus.count("pass_queue_expired"), 1);
    }

    #[test]
    fn test_missing_receiver_drops_loose_ball() {
        let mut rig = rig(&[]);
        let mut engine = PassEngine::default();
        let PassDecision::Throw(mut intent) = engine.decide(&mut rig.ctx(), PlayerId(0), PlayerId(1), PassOptions::default()) else {
            panic!("expected a throw");
        };
        intent.receiver = None;
        engine.commit(&mut rig.ctx(), intent);
        let scramble = run_to_completion(&mut rig, &mut engine).expect("loose ball");
        assert!(scramble.is_loose_ball);
        assert_eq!(rig.store.state().ball.carrier, None);
        assert_eq!(rig.bus.count("inconsistent_state"), 1);
    }
}
