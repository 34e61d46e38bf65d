//! Possession changes shared by every engine

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{GameEvent, PossessionReason};
use crate::models::{PlayerId, StatCounter, TeamSide};
use crate::state::{BackcourtTracking, ChangeReason};

use super::matchups::assign_matchups;
use super::ResolveCtx;

/// Authoritative possession flip (replicated as-is)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PossessionFlip {
    pub to: TeamSide,
    pub reason: PossessionReason,
    /// Player charged with the turnover, if any
    pub turnover_by: Option<PlayerId>,
}

impl PossessionFlip {
    /// Whether this flip is a turnover by the team losing the ball
    pub fn is_turnover(&self) -> bool {
        matches!(
            self.reason,
            PossessionReason::PassOob | PossessionReason::ShotClock | PossessionReason::Interception
        )
    }
}

/// Lowest-id player of `team` takes the inbound.
pub fn inbounder(ctx: &ResolveCtx<'_>, team: TeamSide) -> Option<PlayerId> {
    ctx.store.state().roster(team).map(|p| p.id).min()
}

/// Give the ball to `to`.
///
/// Resets the shot clock, clears the assist link and backcourt tracking on a
/// team change, reassigns matchups. With `inbound`, the carrier (explicit or
/// the inbounder) is moved to the inbound spot.
pub fn award_possession(
    ctx: &mut ResolveCtx<'_>,
    to: TeamSide,
    reason: PossessionReason,
    carrier: Option<PlayerId>,
    inbound: bool,
) {
    let from = ctx.store.state().possession.team;
    let change = if reason == PossessionReason::Interception {
        ChangeReason::Interception
    } else {
        ChangeReason::PossessionFlip
    };

    if from != to {
        ctx.store.set_possession_team(to, change);
        ctx.store.set_backcourt(BackcourtTracking::default());
        ctx.emit(GameEvent::PossessionChange { from, to, reason });
        ctx.hooks.possession_cue(to);
    }
    ctx.store.reset_shot_clock(ctx.config.clock.shot_clock_secs, change);
    ctx.store.set_assist(None);
    ctx.store.set_inbounding(inbound, change);

    let carrier = carrier.or_else(|| inbounder(ctx, to));
    if inbound {
        if let Some(id) = carrier {
            let spot = ctx.spatial.inbound_spot(to);
            if let Some(p) = ctx.store.player_mut(id, change) {
                p.position = spot;
            }
        }
    }
    ctx.store.set_ball_carrier(carrier, change);

    let matchups = assign_matchups(ctx.store.state());
    ctx.store.set_matchups(matchups);
    debug!("possession {} -> {} ({})", from.as_str(), to.as_str(), reason.as_str());
}

/// Apply an authoritative flip: turnover bookkeeping, then an inbound for `to`.
pub fn apply_flip(ctx: &mut ResolveCtx<'_>, flip: &PossessionFlip) {
    let losing = flip.to.opponent();
    if flip.is_turnover() {
        if let Some(id) = flip.turnover_by {
            ctx.store.record_stat(id, StatCounter::Turnovers, 1, ChangeReason::PossessionFlip);
        }
        ctx.emit(GameEvent::Turnover { player: flip.turnover_by, team: losing, reason: flip.reason });
    }
    if flip.reason == PossessionReason::ShotClock {
        ctx.emit(GameEvent::ShotClockViolation { team: losing });
    }
    ctx.store.set_ball_in_flight(None, ChangeReason::PossessionFlip);
    award_possession(ctx, flip.to, flip.reason, None, true);
}
