//! Scramble shoves
//!
//! Presentation-grade contact: every participant replays the same rolls from
//! [`presentation_roll`], so shoves never need replication.

use tracing::trace;

use crate::events::GameEvent;
use crate::models::{AttributeKind, CourtPos, PlayerId, StatCounter};
use crate::state::ChangeReason;

use super::rng::{presentation_roll, subcase};
use super::ResolveCtx;

/// Success chance in `[shove_min, shove_max]` (fractions).
pub fn shove_chance(ctx: &ResolveCtx<'_>, attacker: PlayerId, victim: PlayerId) -> f32 {
    let cfg = &ctx.config.rebound;
    let state = ctx.store.state();
    let (Some(a), Some(v)) = (state.player(attacker), state.player(victim)) else {
        return 0.0;
    };
    let bonus = state.modifiers_for(a.team).shove_bonus;
    let raw = cfg.shove_base + cfg.shove_per_power * ctx.attributes.effective(a, AttributeKind::Power)
        - cfg.shove_victim_resist * ctx.attributes.effective(v, AttributeKind::Power)
        + bonus;
    raw.clamp(cfg.shove_min, cfg.shove_max)
}

/// One pass over eligible attackers near the ball. Returns successful (attacker, victim) pairs.
pub fn run_shoves(ctx: &mut ResolveCtx<'_>, ball: CourtPos) -> Vec<(PlayerId, PlayerId)> {
    let cfg = ctx.config.rebound.clone();
    if !cfg.shove_enabled {
        return Vec::new();
    }
    let tick = ctx.store.tick();
    let seed = ctx.rng.seed();

    let attackers: Vec<PlayerId> = ctx
        .store
        .state()
        .players
        .iter()
        .filter(|p| p.flags.shove_cooldown_ticks == 0 && p.position.distance(ball) <= cfg.shove_ball_radius)
        .map(|p| p.id)
        .collect();

    let mut shoved: Vec<(PlayerId, PlayerId)> = Vec::new();
    for attacker in attackers {
        if shoved.iter().any(|(_, v)| *v == attacker) {
            continue;
        }
        let state = ctx.store.state();
        let Some(a) = state.player(attacker) else { continue };
        let victim = state
            .roster(a.team.opponent())
            .filter(|v| !shoved.iter().any(|(_, s)| *s == v.id))
            .map(|v| (v.id, v.position.distance(a.position)))
            .filter(|(_, d)| *d <= cfg.shove_reach)
            .min_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)))
            .map(|(id, _)| id);
        let Some(victim) = victim else { continue };

        let chance = shove_chance(ctx, attacker, victim);
        let roll = presentation_roll(seed, tick, attacker.index(), subcase::SHOVE_ATTEMPT);
        if roll >= chance {
            if let Some(p) = ctx.store.player_mut(attacker, ChangeReason::Shove) {
                p.flags.shove_cooldown_ticks = cfg.shove_cooldown_ticks / 2;
            }
            continue;
        }

        let state = ctx.store.state();
        let (Some(a_pos), Some(v_pos)) =
            (state.player(attacker).map(|p| p.position), state.player(victim).map(|p| p.position))
        else {
            continue;
        };
        let (dx, dy) = v_pos.sub(a_pos);
        let len = (dx * dx + dy * dy).sqrt();
        let base_angle = if len > f32::EPSILON { dy.atan2(dx) } else { 0.0 };
        let jitter = (presentation_roll(seed, tick, attacker.index(), subcase::SHOVE_JITTER) - 0.5) * 0.6;
        let angle = base_angle + jitter;
        let landing = ctx.spatial.clamp_to_court(CourtPos::new(
            v_pos.x + angle.cos() * cfg.shove_knockback,
            v_pos.y + angle.sin() * cfg.shove_knockback,
        ));

        if let Some(v) = ctx.store.player_mut(victim, ChangeReason::Shove) {
            v.position = landing;
        }
        if let Some(p) = ctx.store.player_mut(attacker, ChangeReason::Shove) {
            p.flags.shove_cooldown_ticks = cfg.shove_cooldown_ticks;
            if !p.flags.on_fire {
                p.flags.turbo = (p.flags.turbo - cfg.shove_turbo_cost).max(0.0);
            }
        }
        ctx.store.record_stat(attacker, StatCounter::Shoves, 1, ChangeReason::Shove);
        ctx.emit(GameEvent::Shove { attacker, victim });
        trace!("{} shoved {} (chance {:.2})", attacker, victim, chance);
        shoved.push((attacker, victim));
    }
    shoved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::testkit::{player, Rig};
    use crate::models::TeamSide;

    fn always_config() -> EngineConfig {
        let mut cfg = EngineConfig::deterministic();
        cfg.rebound.shove_enabled = true;
        cfg.rebound.shove_min = 1.0;
        cfg.rebound.shove_max = 1.0;
        cfg
    }

    #[test]
    fn test_disabled_does_nothing() {
        let mut rig = Rig::new(vec![player(0, TeamSide::Home, 50.0, 20.0), player(1, TeamSide::Away, 51.0, 20.0)]);
        assert!(run_shoves(&mut rig.ctx(), CourtPos::new(50.0, 20.0)).is_empty());
        assert_eq!(rig.bus.count("shove"), 0);
    }

    #[test]
    fn test_successful_shove_knocks_back_and_costs_turbo() {
        let mut rig = Rig::with_config(
            vec![player(0, TeamSide::Home, 50.0, 20.0), player(1, TeamSide::Away, 51.0, 20.0)],
            always_config(),
        );
        let pairs = run_shoves(&mut rig.ctx(), CourtPos::new(50.5, 20.0));
        assert_eq!(pairs, vec![(PlayerId(0), PlayerId(1))]);

        let s = rig.store.state();
        assert!(s.players[1].position.x > 51.5);
        assert_eq!(s.players[0].flags.shove_cooldown_ticks, 20);
        assert!((s.players[0].flags.turbo - 90.0).abs() < 1e-4);
        assert_eq!(s.players[0].stats.shoves, 1);
        assert_eq!(rig.bus.count("shove"), 1);
    }

    #[test]
    fn test_on_fire_shove_is_free() {
        let mut rig = Rig::with_config(
            vec![player(0, TeamSide::Home, 50.0, 20.0), player(1, TeamSide::Away, 51.0, 20.0)],
            always_config(),
        );
        rig.store.players_mut_unlogged()[0].flags.on_fire = true;
        run_shoves(&mut rig.ctx(), CourtPos::new(50.5, 20.0));
        assert!((rig.store.state().players[0].flags.turbo - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_cooldown_blocks_attacker() {
        let mut rig = Rig::with_config(
            vec![player(0, TeamSide::Home, 50.0, 20.0), player(1, TeamSide::Away, 51.0, 20.0)],
            always_config(),
        );
        rig.store.players_mut_unlogged()[0].flags.shove_cooldown_ticks = 5;
        let pairs = run_shoves(&mut rig.ctx(), CourtPos::new(50.5, 20.0));
        // 1번이 대신 밀친다
        assert_eq!(pairs, vec![(PlayerId(1), PlayerId(0))]);
    }

    #[test]
    fn test_rolls_replay_identically() {
        let players = || vec![player(0, TeamSide::Home, 50.0, 20.0), player(1, TeamSide::Away, 51.0, 20.0)];
        let mut cfg = EngineConfig::deterministic();
        cfg.rebound.shove_enabled = true;
        let mut a = Rig::with_config(players(), cfg.clone());
        let mut b = Rig::with_config(players(), cfg);
        let ball = CourtPos::new(50.5, 20.0);
        assert_eq!(run_shoves(&mut a.ctx(), ball), run_shoves(&mut b.ctx(), ball));
        assert_eq!(a.store.state().players, b.store.state().players);
    }
}
