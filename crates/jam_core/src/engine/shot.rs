//! Shot Resolution Engine
//!
//! 1. [`validate_shot`]: gate checks, every role
//! 2. [`decide_shot`]: coordinator only, draws make/miss/block and the rebound spot
//! 3. [`commit_shot`]: attempt counters + `shot_attempt`, phase → `ShotQueued`
//! 4. [`service_shot_phase`]: `ShotQueued` → animation, `ShotResult` hold → `Live`
//! 5. [`complete_shot`]: scoring / stats / possession when the animation lands

use std::f32::consts::TAU;

use tracing::{debug, warn};

use crate::animation::{SequenceId, SequenceSpec};
use crate::config::EngineConfig;
use crate::events::{GameEvent, PossessionReason};
use crate::models::{AttributeKind, CourtPos, PlayerEntity, PlayerId, StatCounter, TeamSide};
use crate::state::{AttemptType, ChangeReason, FlightKind, MatchState, Phase, ShotQueueEntry};

use super::capabilities::{closest_player, SpatialProvider};
use super::dunk;
use super::possession::award_possession;
use super::shot_model::{self, BlockInputs, DefenderContest, DunkInputs, JumpShotInputs};
use super::{Completion, Rejection, ResolveCtx, ScrambleStart, ShotOptions};

/// Gate checks shared by every role.
///
/// A made basket's result hold outranks the ball-return flight running under
/// it, so a shot there reports [`Rejection::ShotAlreadyQueued`].
pub fn validate_shot(
    state: &MatchState,
    spatial: &dyn SpatialProvider,
    config: &EngineConfig,
    shooter: PlayerId,
) -> Result<(), Rejection> {
    let player = state.player(shooter).ok_or(Rejection::InvalidShooter)?;
    if state.phase.is_terminal_pending() {
        return Err(Rejection::ShotAlreadyQueued);
    }
    if state.ball.in_flight.is_some() || state.phase.is_shot_active() {
        return Err(Rejection::ShotInProgress);
    }
    if state.ball.carrier != Some(shooter) {
        return Err(Rejection::InvalidShooter);
    }
    if !spatial.in_bounds(player.position, config.court.shot_margin) {
        return Err(Rejection::OutOfBounds);
    }
    Ok(())
}

/// cos(angle) between shooter→rim and shooter→defender
fn facing(origin: CourtPos, rim: CourtPos, defender: CourtPos) -> f32 {
    let (rx, ry) = rim.sub(origin);
    let (dx, dy) = defender.sub(origin);
    let norm = (rx * rx + ry * ry).sqrt() * (dx * dx + dy * dy).sqrt();
    if norm <= f32::EPSILON {
        1.0
    } else {
        (rx * dx + ry * dy) / norm
    }
}

/// Coordinator-only: decide the whole shot up front.
pub fn decide_shot(ctx: &mut ResolveCtx<'_>, shooter: &PlayerEntity, options: ShotOptions, id: u64) -> ShotQueueEntry {
    let team = shooter.team;
    let origin = shooter.position;
    let rim = ctx.spatial.basket_for(team);
    let distance = ctx.spatial.distance(origin, rim);
    let inside_key = ctx.spatial.inside_key(origin, team);
    let raw_dunk = ctx.attributes.base(shooter, AttributeKind::Dunk);
    let eff_dunk = ctx.attributes.effective(shooter, AttributeKind::Dunk);

    let dunkable = !options.jump_shot_only
        && dunk::is_eligible(&ctx.config.dunk, distance, inside_key, raw_dunk, eff_dunk, shooter.flags.on_fire);

    let mut entry = if dunkable {
        decide_dunk(ctx, shooter, rim, distance, eff_dunk, id)
    } else {
        decide_jump_shot(ctx, shooter, rim, distance, id)
    };

    if entry.blocked_by.is_some() {
        entry.made = false;
    }
    if !entry.made {
        entry.rebound_target = rebound_spot(ctx, entry.destination, entry.blocked_by.is_some());
    }
    debug!(
        "{} {} chance {:.1}% made={} blocked_by={:?}",
        shooter.id,
        entry.attempt_type.as_str(),
        entry.chance,
        entry.made,
        entry.blocked_by
    );
    entry
}

fn decide_dunk(
    ctx: &mut ResolveCtx<'_>,
    shooter: &PlayerEntity,
    rim: CourtPos,
    distance: f32,
    eff_dunk: f32,
    id: u64,
) -> ShotQueueEntry {
    let cfg = &ctx.config.dunk;
    let state = ctx.store.state();
    let team = shooter.team;
    let origin = shooter.position;
    let offense = state.modifiers_for(team);
    let defense = state.modifiers_for(team.opponent());

    let style = dunk::choose_style(ctx.rng, ctx.attributes, shooter);
    let mut plan = dunk::build_flight_plan(cfg, style, origin, rim, eff_dunk);

    let nearest = closest_player(state.roster(team.opponent()), origin).and_then(|(pid, d)| {
        state.player(pid).map(|p| (d, ctx.attributes.effective(p, AttributeKind::Block)))
    });
    let chance = shot_model::dunk_chance(
        cfg,
        &DunkInputs {
            effective_dunk: eff_dunk,
            distance_to_rim: distance,
            nearest_defender: nearest,
            heat_streak: shooter.flags.heat_streak,
            on_fire: shooter.flags.on_fire,
            offense_scale: offense.offense_scale,
            defense_scale: defense.defense_scale,
        },
    );
    let chance = shot_model::clamp_dunk_chance(cfg, offense.apply_shot(chance));
    let made = ctx.rng.chance(chance);

    let contested_by = dunk::select_contest_defender(cfg, ctx.attributes, origin, rim, state.roster(team.opponent()));
    let mut blocked_by = None;
    if let Some(defender) = contested_by.and_then(|d| state.player(d)) {
        if let Some((frame, separation)) = dunk::closest_frame(&plan, defender.position) {
            let block = shot_model::block_chance(
                cfg,
                &BlockInputs {
                    block_skill: ctx.attributes.effective(defender, AttributeKind::Block),
                    separation,
                    shooter_skill: eff_dunk,
                    shooter_turbo: shooter.flags.turbo_active,
                    adjust: shot_model::style_block_adjust(style),
                    bonus: defense.block_bonus,
                    defense_scale: defense.defense_scale,
                },
            );
            if ctx.rng.chance(block) {
                plan.block_frame = Some(frame);
                blocked_by = Some(defender.id);
            }
        }
    }

    let destination = if blocked_by.is_some() { plan.end_position().unwrap_or(rim) } else { rim };
    ShotQueueEntry {
        id,
        shooter: shooter.id,
        team,
        attempt_type: AttemptType::Dunk,
        chance,
        made,
        blocked_by,
        contested_by,
        three_point: false,
        origin,
        destination,
        rebound_target: rim,
        dunk_style: Some(style),
        duration_ticks: plan.played_frames().len().max(1) as u32,
        flight_plan: Some(plan),
        consumed: false,
    }
}

fn decide_jump_shot(ctx: &mut ResolveCtx<'_>, shooter: &PlayerEntity, rim: CourtPos, distance: f32, id: u64) -> ShotQueueEntry {
    let cfg = &ctx.config.shot;
    let state = ctx.store.state();
    let team = shooter.team;
    let origin = shooter.position;
    let offense = state.modifiers_for(team);
    let defense = state.modifiers_for(team.opponent());

    let is_three = ctx.spatial.is_three_point(origin, team);
    let attempt_type = if is_three {
        AttemptType::ThreePointer
    } else if distance <= cfg.layup_range {
        AttemptType::Layup
    } else {
        AttemptType::JumpShot
    };
    let skill = if distance <= cfg.dunk_skill_range {
        ctx.attributes.effective(shooter, AttributeKind::Dunk)
    } else {
        ctx.attributes.effective(shooter, AttributeKind::ThreePoint)
    };

    // (id, distance, facing) of every defender inside the contest radius
    let contests: Vec<(PlayerId, f32, f32)> = state
        .roster(team.opponent())
        .map(|d| (d.id, ctx.spatial.distance(origin, d.position), facing(origin, rim, d.position)))
        .filter(|(_, d, _)| *d < cfg.contest_radius)
        .collect();

    let chance = shot_model::jump_shot_chance(
        cfg,
        &JumpShotInputs {
            distance,
            is_three,
            is_corner_three: ctx.spatial.is_corner_three(origin, team),
            skill,
            heat_streak: shooter.flags.heat_streak,
            on_fire: shooter.flags.on_fire,
            defenders: contests.iter().map(|(_, d, f)| DefenderContest { distance: *d, facing: *f }).collect(),
            offense_scale: offense.offense_scale,
            defense_scale: defense.defense_scale,
        },
    );
    let chance = shot_model::clamp_jump_chance(cfg, offense.apply_shot(chance), shooter.flags.on_fire);
    let made = ctx.rng.chance(chance);

    let frontal = contests
        .iter()
        .filter(|(_, _, f)| *f > 0.0)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .copied();
    let contested_by = frontal.map(|(pid, _, _)| pid);

    let mut blocked_by = None;
    let mut destination = rim;
    if let Some((pid, separation, _)) = frontal.filter(|(_, d, _)| *d <= cfg.jump_block_radius) {
        if let Some(defender) = state.player(pid) {
            let block = shot_model::block_chance(
                &ctx.config.dunk,
                &BlockInputs {
                    block_skill: ctx.attributes.effective(defender, AttributeKind::Block),
                    separation,
                    shooter_skill: skill,
                    shooter_turbo: shooter.flags.turbo_active,
                    adjust: cfg.jump_block_adjust,
                    bonus: defense.block_bonus,
                    defense_scale: defense.defense_scale,
                },
            );
            if ctx.rng.chance(block) {
                blocked_by = Some(pid);
                destination = origin.lerp(defender.position, 0.5);
            }
        }
    }

    let travel = origin.distance(destination);
    ShotQueueEntry {
        id,
        shooter: shooter.id,
        team,
        attempt_type,
        chance,
        made,
        blocked_by,
        contested_by,
        three_point: is_three,
        origin,
        destination,
        rebound_target: rim,
        dunk_style: None,
        flight_plan: None,
        duration_ticks: cfg.base_duration_ticks + (travel * cfg.duration_per_unit).round() as u32,
        consumed: false,
    }
}

/// Random bounce spot around `from`; blocks stay closer.
fn rebound_spot(ctx: &mut ResolveCtx<'_>, from: CourtPos, blocked: bool) -> CourtPos {
    let spread = if blocked { ctx.config.shot.rebound_spread * 0.5 } else { ctx.config.shot.rebound_spread };
    let angle = ctx.rng.range_f32(0.0, TAU);
    let radius = ctx.rng.range_f32(spread * 0.3, spread);
    ctx.spatial.clamp_to_court(CourtPos::new(from.x + angle.cos() * radius, from.y + angle.sin() * radius))
}

/// Every role: count the attempt, announce it and queue the phase.
pub fn commit_shot(ctx: &mut ResolveCtx<'_>, entry: &ShotQueueEntry) {
    let shooter = entry.shooter;
    ctx.store.record_stat(shooter, StatCounter::FgAttempts, 1, ChangeReason::ShotAttempt);
    if entry.three_point {
        ctx.store.record_stat(shooter, StatCounter::ThreeAttempts, 1, ChangeReason::ShotAttempt);
    }
    if entry.is_dunk() {
        ctx.store.record_stat(shooter, StatCounter::DunkAttempts, 1, ChangeReason::ShotAttempt);
    }
    ctx.emit(GameEvent::ShotAttempt {
        shooter,
        team: entry.team,
        attempt_type: entry.attempt_type,
        chance: entry.chance,
        made: entry.made,
        three_point: entry.three_point,
        blocked_by: entry.blocked_by,
        dunk_style: entry.dunk_style,
    });

    if let Some(defender) = entry.contested_by {
        contest(ctx, defender, entry);
    }

    ctx.store.set_ball_in_flight(None, ChangeReason::ShotAttempt);
    ctx.store.set_ball_carrier(None, ChangeReason::ShotAttempt);
    ctx.store.set_ball_position(entry.origin, ChangeReason::ShotAttempt);
    ctx.store.set_phase(Phase::ShotQueued { entry: entry.clone() }, ChangeReason::ShotAttempt);
}

/// AI turbo burst + block animation for the contesting defender.
fn contest(ctx: &mut ResolveCtx<'_>, defender: PlayerId, entry: &ShotQueueEntry) {
    let Some(team) = ctx.store.state().team_of(defender) else { return };
    let turbo_cfg = ctx.config.turbo.clone();
    if ctx.config.control.is_ai(team) {
        let can_burst = ctx
            .store
            .state()
            .player(defender)
            .map(|p| !p.flags.turbo_active && p.flags.turbo >= turbo_cfg.burst_cost)
            .unwrap_or(false);
        if can_burst {
            if let Some(p) = ctx.store.player_mut(defender, ChangeReason::ShotAttempt) {
                p.flags.turbo -= turbo_cfg.burst_cost;
                p.flags.turbo_active = true;
                p.flags.turbo_burst_ticks = turbo_cfg.burst_ticks;
            }
            ctx.hooks.activate_turbo_burst(defender);
        }
    }

    let Some(from) = ctx.store.state().player(defender).map(|p| p.position) else { return };
    let (dx, dy) = entry.destination.sub(from);
    let len = (dx * dx + dy * dy).sqrt();
    let direction = if len > f32::EPSILON { (dx / len, dy / len) } else { (0.0, 0.0) };
    let height = entry.flight_plan.as_ref().map(|p| p.apex_height).unwrap_or(2.5);
    ctx.hooks.attempt_block(defender, (entry.duration_ticks / 2).max(1), height, direction);
}

/// Every role, once per tick: start queued animations and run the result hold.
pub fn service_shot_phase(ctx: &mut ResolveCtx<'_>) {
    match ctx.store.state().phase.clone() {
        Phase::ShotQueued { entry } => {
            let (shooter, attempt_type) = (entry.shooter, entry.attempt_type);
            let sequence = enqueue_shot_animation(ctx, entry);
            ctx.store.set_phase(Phase::ShotInFlight { shooter, attempt_type, sequence }, ChangeReason::ShotAttempt);
        }
        Phase::ShotResult { hold_ticks, .. } => {
            if hold_ticks <= 1 {
                ctx.store.set_phase(Phase::Live, ChangeReason::ShotScored);
            } else if let Phase::ShotResult { hold_ticks, .. } = ctx.store.phase_mut() {
                *hold_ticks -= 1;
            }
        }
        _ => {}
    }
}

fn enqueue_shot_animation(ctx: &mut ResolveCtx<'_>, entry: ShotQueueEntry) -> SequenceId {
    let (origin, destination, duration) = (entry.origin, entry.destination, entry.duration_ticks);
    let dunk_path = entry
        .flight_plan
        .as_ref()
        .zip(entry.dunk_style)
        .map(|(plan, style)| (plan.played_frames().to_vec(), style));
    let spec = match dunk_path {
        Some((frames, style)) => SequenceSpec::straight("dunk", origin, destination, duration, Completion::Shot(entry))
            .with_easing(dunk::style_easing(style))
            .with_path(frames),
        None => SequenceSpec::straight("shot", origin, destination, duration, Completion::Shot(entry)).with_arc(4.0),
    };
    ctx.sequencer.enqueue(spec)
}

/// Shot animation landed. Returns the scramble to open on a miss or block.
pub fn complete_shot(ctx: &mut ResolveCtx<'_>, sequence: SequenceId, mut entry: ShotQueueEntry) -> Option<ScrambleStart> {
    let current = matches!(ctx.store.state().phase, Phase::ShotInFlight { sequence: s, .. } if s == sequence);
    if !current || entry.consumed {
        warn!("stale shot completion {:?} ignored", sequence);
        return None;
    }
    entry.consumed = true;

    if entry.made {
        score_basket(ctx, &entry);
        return None;
    }

    reset_streak(ctx, entry.shooter);
    let reason = if entry.blocked_by.is_some() { ChangeReason::ShotBlocked } else { ChangeReason::ShotMissed };
    ctx.store.set_phase(Phase::Rebound, reason);
    match entry.blocked_by {
        Some(blocker) => {
            ctx.store.record_stat(blocker, StatCounter::Blocks, 1, ChangeReason::ShotBlocked);
            ctx.emit(GameEvent::ShotBlocked {
                shooter: entry.shooter,
                blocker,
                attempt_type: entry.attempt_type,
                at: entry.destination,
            });
            ctx.emit(GameEvent::announcer(
                "block",
                serde_json::json!({ "blocker": blocker, "shooter": entry.shooter }),
            ));
        }
        None => ctx.emit(GameEvent::ShotMissed {
            shooter: entry.shooter,
            team: entry.team,
            attempt_type: entry.attempt_type,
        }),
    }
    Some(ScrambleStart {
        from: entry.destination,
        target: entry.rebound_target,
        is_loose_ball: false,
        offense: entry.team,
    })
}

fn score_basket(ctx: &mut ResolveCtx<'_>, entry: &ShotQueueEntry) {
    let shooter = entry.shooter;
    let points = entry.attempt_type.points();
    let reason = ChangeReason::ShotScored;
    ctx.store.add_score(entry.team, points, reason);
    ctx.store.record_stat(shooter, StatCounter::Points, points as i32, reason);
    ctx.store.record_stat(shooter, StatCounter::FgMade, 1, reason);
    if entry.three_point {
        ctx.store.record_stat(shooter, StatCounter::ThreeMade, 1, reason);
    }
    if entry.is_dunk() {
        ctx.store.record_stat(shooter, StatCounter::DunkMade, 1, reason);
    }

    let on_fire_streak = ctx.config.shot.on_fire_streak;
    let mut lit = false;
    if let Some(p) = ctx.store.player_mut(shooter, reason) {
        p.flags.heat_streak = p.flags.heat_streak.saturating_add(1);
        if p.flags.heat_streak >= on_fire_streak && !p.flags.on_fire {
            p.flags.on_fire = true;
            lit = true;
        }
    }
    if lit {
        ctx.emit(GameEvent::announcer("on_fire", serde_json::json!({ "player": shooter })));
    }

    let tick = ctx.store.tick();
    let assist = ctx
        .store
        .state()
        .possession
        .assist
        .filter(|link| link.receiver == shooter && link.passer != shooter && tick <= link.expires_tick)
        .map(|link| link.passer);
    if let Some(passer) = assist {
        ctx.store.record_stat(passer, StatCounter::Assists, 1, reason);
    }

    extinguish(ctx, entry.team.opponent());

    ctx.emit(GameEvent::ShotMade { shooter, team: entry.team, attempt_type: entry.attempt_type, points, assist });
    if let Some(style) = entry.dunk_style {
        ctx.emit(GameEvent::announcer("dunk", serde_json::json!({ "player": shooter, "style": style })));
    }

    let to = entry.team.opponent();
    award_possession(ctx, to, PossessionReason::MadeBasket, None, true);

    // ball drops through and travels back to the inbounder
    let hold = ctx.config.shot.result_hold_ticks;
    let spot = ctx.store.state().carrier().map(|c| c.position).unwrap_or_else(|| ctx.spatial.inbound_spot(to));
    ctx.store.set_ball_in_flight(Some(FlightKind::BallReturn), reason);
    ctx.store.set_ball_position(entry.destination, reason);
    ctx.sequencer.enqueue(SequenceSpec::straight("ball_return", entry.destination, spot, hold, Completion::BallReturn));
    ctx.store.set_phase(Phase::ShotResult { shooter, hold_ticks: hold }, reason);
}

/// The scored-on team loses its fire and streaks.
fn extinguish(ctx: &mut ResolveCtx<'_>, team: TeamSide) {
    for p in ctx.store.players_mut_unlogged().iter_mut().filter(|p| p.team == team) {
        p.flags.on_fire = false;
        p.flags.heat_streak = 0;
    }
}

fn reset_streak(ctx: &mut ResolveCtx<'_>, shooter: PlayerId) {
    if let Some(p) = ctx.store.player_mut(shooter, ChangeReason::ShotMissed) {
        p.flags.heat_streak = 0;
    }
}

/// Ball-return animation finished: hand the ball to the carrier.
pub fn complete_ball_return(ctx: &mut ResolveCtx<'_>) {
    if ctx.store.state().ball.in_flight != Some(FlightKind::BallReturn) {
        return;
    }
    ctx.store.set_ball_in_flight(None, ChangeReason::InboundComplete);
    let carrier = ctx.store.state().ball.carrier;
    ctx.store.set_ball_carrier(carrier, ChangeReason::InboundComplete);
}
