//! Per-tick bookkeeping: turbo, clocks, assist expiry, backcourt

use crate::models::TeamSide;
use crate::state::ChangeReason;

use super::possession::PossessionFlip;
use super::ResolveCtx;
use crate::events::PossessionReason;

/// Turbo regen, burst countdown and shove cooldowns.
pub fn turbo_upkeep(ctx: &mut ResolveCtx<'_>) {
    let capacities = [
        ctx.store.state().modifiers_for(TeamSide::Home).turbo_capacity,
        ctx.store.state().modifiers_for(TeamSide::Away).turbo_capacity,
    ];
    let regen = ctx.config.turbo.regen_per_tick;
    for p in ctx.store.players_mut_unlogged() {
        let flags = &mut p.flags;
        flags.turbo_capacity = capacities[p.team.index()];
        if flags.turbo_burst_ticks > 0 {
            flags.turbo_burst_ticks -= 1;
            if flags.turbo_burst_ticks == 0 {
                flags.turbo_active = false;
            }
        } else {
            flags.turbo = (flags.turbo + regen).min(flags.turbo_capacity);
        }
        flags.turbo = flags.turbo.min(flags.turbo_capacity);
        flags.shove_cooldown_ticks = flags.shove_cooldown_ticks.saturating_sub(1);
    }
}

/// Count the clocks down. Returns a shot-clock violation for the coordinator to
/// apply and broadcast.
pub fn run_clocks(ctx: &mut ResolveCtx<'_>) -> Option<PossessionFlip> {
    let state = ctx.store.state();
    let live = state.phase.is_live() && !state.possession.inbounding;
    let scramble = state.rebound.active && ctx.config.clock.shot_clock_runs_in_scramble;
    let dt = ctx.config.clock.tick_secs();
    ctx.store.run_clocks(dt, live || scramble, live);

    let state = ctx.store.state();
    let expired = state.possession.shot_clock <= 0.0
        && state.phase.is_live()
        && state.ball.in_flight.is_none()
        && !state.possession.inbounding;
    if !expired || !ctx.is_coordinator() {
        return None;
    }
    let team = state.possession.team;
    Some(PossessionFlip {
        to: team.opponent(),
        reason: PossessionReason::ShotClock,
        turnover_by: state.ball.carrier,
    })
}

/// Drop an assist link once its window closes.
pub fn expire_assist(ctx: &mut ResolveCtx<'_>) {
    let tick = ctx.store.tick();
    if let Some(link) = ctx.store.state().possession.assist {
        if tick > link.expires_tick {
            ctx.store.set_assist(None);
            tracing::trace!("assist window closed for {}", link.passer);
        }
    }
}

/// Track half-court crossing and count the post-rebound grace down.
pub fn track_backcourt(ctx: &mut ResolveCtx<'_>) {
    let state = ctx.store.state();
    let team = state.possession.team;
    let crossed = state.carrier().map(|c| ctx.spatial.in_frontcourt(c.position, team)).unwrap_or(false);
    let backcourt = ctx.store.backcourt_mut();
    backcourt.grace_ticks = backcourt.grace_ticks.saturating_sub(1);
    if crossed && !backcourt.crossed_half {
        backcourt.crossed_half = true;
    }
}

/// Reset the shot clock and leave possession untouched (used on inbound completion).
pub fn restart_shot_clock(ctx: &mut ResolveCtx<'_>, reason: ChangeReason) {
    ctx.store.reset_shot_clock(ctx.config.clock.shot_clock_secs, reason);
}
