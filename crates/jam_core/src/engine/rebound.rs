//! Rebound Scramble Resolver
//!
//! ```text
//! Inactive ──activate──▶ Active ──┬─ capture ──────────┐
//!                                 ├─ hard timeout ─────┼──▶ teardown ──▶ Inactive
//!                                 ├─ soft timeout ─────┤
//!                                 └─ no players (flip) ┘
//! ```
//!
//! Only the coordinator picks the winner. Every role applies the
//! [`ReboundResolution`] through [`ReboundResolver::apply`], and every role runs
//! the scramble shoves.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::animation::{SequenceId, SequenceSpec};
use crate::events::{GameEvent, PossessionReason, SecureKind, TimeoutKind};
use crate::models::{CourtPos, PlayerId, StatCounter, TeamSide};
use crate::state::{ChangeReason, Phase, ReboundFlags};

use super::capabilities::closest_player;
use super::possession::award_possession;
use super::shove::run_shoves;
use super::{Completion, ResolveCtx, ScrambleStart};

/// The one active scramble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReboundScramble {
    pub target: CourtPos,
    pub started_tick: u64,
    pub is_loose_ball: bool,
    /// Team that lost control of the ball
    pub offense: TeamSide,
    bounce: Option<SequenceId>,
}

impl ReboundScramble {
    pub fn is_bouncing(&self) -> bool {
        self.bounce.is_some()
    }
}

/// Coordinator verdict for one scramble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReboundResolution {
    Secured { player: PlayerId, via: SecureKind },
    /// 코트에 선수가 없음: 공격권만 넘긴다
    Flip { to: TeamSide, timeout: TimeoutKind },
}

#[derive(Debug, Default)]
pub struct ReboundResolver {
    active: Option<ReboundScramble>,
    /// Last tick the active scramble was stepped
    last_step: u64,
}

impl ReboundResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn scramble(&self) -> Option<&ReboundScramble> {
        self.active.as_ref()
    }

    /// Open a scramble. A prior one is torn down first.
    pub fn activate(&mut self, ctx: &mut ResolveCtx<'_>, start: ScrambleStart) {
        if self.active.is_some() {
            warn!("rebound scramble replaced before it resolved");
            self.teardown(ctx);
        }

        let spec = SequenceSpec::straight("bounce", start.from, start.target, ctx.config.shot.bounce_ticks, Completion::Bounce)
            .with_arc(1.5);
        let bounce = ctx.sequencer.enqueue(spec);

        ctx.store.set_rebound_flags(
            ReboundFlags { active: true, target: Some(start.target), is_loose_ball: start.is_loose_ball },
            ChangeReason::Rebound,
        );
        ctx.store.set_phase(Phase::Rebound, ChangeReason::Rebound);
        ctx.store.set_ball_carrier(None, ChangeReason::Rebound);
        ctx.store.set_ball_in_flight(None, ChangeReason::Rebound);
        ctx.store.set_ball_position(start.from, ChangeReason::Rebound);
        ctx.store.set_assist(None);

        self.active = Some(ReboundScramble {
            target: start.target,
            started_tick: ctx.store.tick(),
            is_loose_ball: start.is_loose_ball,
            offense: start.offense,
            bounce: Some(bounce),
        });
        ctx.emit(GameEvent::ReboundScrambleStarted { target: start.target, is_loose_ball: start.is_loose_ball });
        debug!("rebound scramble opened at ({:.1}, {:.1})", start.target.x, start.target.y);
    }

    /// Bounce animation finished: the ball rests at `final_pos`.
    pub fn on_bounce_landed(&mut self, ctx: &mut ResolveCtx<'_>, sequence: SequenceId, final_pos: CourtPos) {
        let Some(scramble) = self.active.as_mut() else { return };
        if scramble.bounce != Some(sequence) {
            return;
        }
        scramble.bounce = None;
        scramble.target = final_pos;
        ctx.store.set_rebound_target(final_pos);
        ctx.store.track_ball(final_pos);
    }

    /// One scramble step. Returns the coordinator's verdict, if any.
    pub fn tick(&mut self, ctx: &mut ResolveCtx<'_>) -> Option<ReboundResolution> {
        if self.active.is_none() {
            return None;
        }
        self.last_step = ctx.store.tick();
        let scramble = self.active.as_mut()?;

        if let Some(pos) = scramble.bounce.and_then(|id| ctx.sequencer.position(id)) {
            scramble.target = pos;
            ctx.store.set_rebound_target(pos);
            ctx.store.track_ball(pos);
        }
        let scramble = *scramble;
        let elapsed = ctx.store.tick().saturating_sub(scramble.started_tick);
        let cfg = &ctx.config.rebound;
        let hard = ctx.ticks(cfg.hard_timeout_secs);
        let soft = ctx.ticks(cfg.soft_timeout_secs);
        let capture_radius = cfg.capture_radius;

        let mut verdict = None;
        if ctx.is_coordinator() {
            if elapsed >= hard {
                verdict = Some(Self::force_resolve(ctx, &scramble, TimeoutKind::Hard));
            } else {
                verdict = closest_player(&ctx.store.state().players, scramble.target)
                    .filter(|(_, d)| *d <= capture_radius)
                    .map(|(player, _)| ReboundResolution::Secured { player, via: SecureKind::Capture });
            }
        }

        run_shoves(ctx, scramble.target);

        if verdict.is_none() && ctx.is_coordinator() && elapsed >= soft {
            verdict = Some(Self::force_resolve(ctx, &scramble, TimeoutKind::Soft));
        }
        verdict
    }

    /// Client: a verdict from `resolved_tick` waits until this replica has
    /// stepped the scramble on that tick, so its shoves land first.
    pub fn awaits_step(&self, resolved_tick: u64) -> bool {
        self.active.is_some() && self.last_step < resolved_tick
    }

    fn force_resolve(ctx: &ResolveCtx<'_>, scramble: &ReboundScramble, timeout: TimeoutKind) -> ReboundResolution {
        match closest_player(&ctx.store.state().players, scramble.target) {
            Some((player, _)) => {
                let via = match timeout {
                    TimeoutKind::Hard => SecureKind::HardTimeout,
                    TimeoutKind::Soft => SecureKind::SoftTimeout,
                };
                ReboundResolution::Secured { player, via }
            }
            None => ReboundResolution::Flip { to: scramble.offense.opponent(), timeout },
        }
    }

    /// Every role: end the scramble with the coordinator's verdict.
    pub fn apply(&mut self, ctx: &mut ResolveCtx<'_>, resolution: ReboundResolution) {
        let scramble = self.active;
        if scramble.is_none() {
            warn!("rebound resolution {:?} without an active scramble", resolution);
        }
        let is_loose_ball = scramble.map(|s| s.is_loose_ball).unwrap_or(false);
        self.teardown(ctx);

        match resolution {
            ReboundResolution::Secured { player, via } => {
                let Some(team) = ctx.store.state().team_of(player) else {
                    error!("rebounder {} is not on the court", player);
                    ctx.emit(GameEvent::InconsistentState { context: format!("unknown rebounder {}", player) });
                    return;
                };
                let before = ctx.store.state().possession.team;
                let offensive = team == before;
                ctx.store.record_stat(player, StatCounter::Rebounds, 1, ChangeReason::Rebound);
                let reason = if offensive { PossessionReason::LooseBall } else { PossessionReason::DefensiveRebound };
                award_possession(ctx, team, reason, Some(player), false);

                let grace = ctx.config.rebound.backcourt_grace_ticks;
                ctx.store.backcourt_mut().grace_ticks = grace;

                ctx.emit(GameEvent::ReboundSecured { player, team, offensive, via });
                let timeout = match via {
                    SecureKind::Capture => None,
                    SecureKind::HardTimeout => Some(TimeoutKind::Hard),
                    SecureKind::SoftTimeout => Some(TimeoutKind::Soft),
                };
                if let Some(kind) = timeout {
                    ctx.emit(GameEvent::ReboundTimeout { kind, awarded_to: Some(player), team });
                }
                if !is_loose_ball {
                    ctx.emit(GameEvent::announcer(
                        "rebound",
                        serde_json::json!({ "player": player, "offensive": offensive }),
                    ));
                }
            }
            ReboundResolution::Flip { to, timeout } => {
                error!("rebound scramble ended with no players on court");
                ctx.emit(GameEvent::InconsistentState { context: "rebound scramble with no players".into() });
                award_possession(ctx, to, PossessionReason::NoPlayers, None, true);
                ctx.emit(GameEvent::ReboundTimeout { kind: timeout, awarded_to: None, team: to });
            }
        }
    }

    /// Clear the scramble and its store mirror together.
    fn teardown(&mut self, ctx: &mut ResolveCtx<'_>) {
        if let Some(bounce) = self.active.take().and_then(|s| s.bounce) {
            ctx.sequencer.cancel(bounce);
        }
        ctx.store.set_rebound_flags(ReboundFlags::default(), ChangeReason::Rebound);
        if matches!(ctx.store.state().phase, Phase::Rebound) {
            ctx.store.set_phase(Phase::Live, ChangeReason::Rebound);
        }
    }
}
