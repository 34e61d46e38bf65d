//! End-to-end possession scenarios through the public session API.

use jam_core::events::{SecureKind, TimeoutKind};
use jam_core::{
    AttributeSet, CourtPos, EngineConfig, GameEvent, PassOptions, PassOutcome, Phase, PlayerEntity, PlayerId,
    PossessionSession, Rejection, ShotOptions, ShotOutcome, TeamSide,
};
use serde_json::json;

fn player(id: u8, team: TeamSide, x: f32, y: f32) -> PlayerEntity {
    PlayerEntity::new(id, format!("P{}", id), team, CourtPos::new(x, y), AttributeSet::uniform(5.0))
}

fn four(home: [(f32, f32); 2], away: [(f32, f32); 2]) -> Vec<PlayerEntity> {
    vec![
        player(0, TeamSide::Home, home[0].0, home[0].1),
        player(1, TeamSide::Home, home[1].0, home[1].1),
        player(2, TeamSide::Away, away[0].0, away[0].1),
        player(3, TeamSide::Away, away[1].0, away[1].1),
    ]
}

/// Every shot misses, nothing is blocked.
fn bricklayer() -> EngineConfig {
    let mut cfg = EngineConfig::deterministic();
    cfg.shot.min_chance = 0.0;
    cfg.shot.max_chance = 0.0;
    cfg.shot.on_fire_max_chance = 0.0;
    cfg.dunk.min_chance = 0.0;
    cfg.dunk.max_chance = 0.0;
    cfg
}

fn tick_until(session: &mut PossessionSession, limit: u32, done: impl Fn(&PossessionSession) -> bool) -> u32 {
    for n in 1..=limit {
        session.tick();
        if done(session) {
            return n;
        }
    }
    panic!("condition not reached within {} ticks", limit);
}

#[test]
fn clean_pass_reaches_receiver() {
    let players = vec![player(0, TeamSide::Home, 10.0, 10.0), player(1, TeamSide::Home, 20.0, 10.0)];
    let mut session = PossessionSession::new(EngineConfig::deterministic(), players, 1).unwrap();

    let outcome = session.attempt_pass(PlayerId(0), PlayerId(1), PassOptions::default()).unwrap();
    let PassOutcome::InFlight(intent) = outcome else { panic!("expected a pass in flight") };
    assert_eq!(intent.interceptor, None);
    assert_eq!(intent.endpoint, CourtPos::new(20.0, 10.0));

    tick_until(&mut session, 50, |s| s.bus().count("pass_complete") == 1);
    let state = session.store().state();
    assert_eq!(state.ball.carrier, Some(PlayerId(1)));
    assert_eq!(state.ball.in_flight, None);
    assert_eq!(session.store().get("ballCarrier").unwrap(), json!(1));
    assert_eq!(session.bus().count("interception"), 0);
}

#[test]
fn out_of_bounds_pass_flips_possession() {
    let players = four([(10.0, 10.0), (20.0, 10.0)], [(60.0, 20.0), (70.0, 30.0)]);
    let mut session = PossessionSession::new(EngineConfig::deterministic(), players, 1).unwrap();

    let options = PassOptions { lead_target: Some(CourtPos::new(-10.0, -6.0)) };
    let result = session.attempt_pass(PlayerId(0), PlayerId(1), options);
    assert_eq!(result, Err(Rejection::OutOfBounds));

    let state = session.store().state();
    assert_eq!(state.possession.team, TeamSide::Away);
    assert!(state.possession.inbounding);
    assert_eq!(state.players[0].stats.turnovers, 1);
    assert_eq!(session.bus().count("turnover"), 1);
    assert_eq!(session.bus().count("possession_change"), 1);
    assert_eq!(session.sequencer().active_count(), 0);
}

#[test]
fn duplicate_shot_is_rejected() {
    let players = four([(70.0, 20.0), (40.0, 10.0)], [(20.0, 30.0), (15.0, 5.0)]);
    let mut session = PossessionSession::new(EngineConfig::deterministic(), players, 5).unwrap();

    let first = session.attempt_shot(PlayerId(0), ShotOptions::default()).unwrap();
    assert!(matches!(first, ShotOutcome::Queued(_)));
    assert_eq!(session.attempt_shot(PlayerId(0), ShotOptions::default()), Err(Rejection::ShotInProgress));

    session.tick();
    assert!(matches!(session.store().state().phase, Phase::ShotInFlight { .. }));
    assert_eq!(session.attempt_shot(PlayerId(0), ShotOptions::default()), Err(Rejection::ShotInProgress));
    assert_eq!(session.store().state().players[0].stats.fg_attempts, 1);
    assert_eq!(session.bus().count("shot_attempt"), 1);
}

#[test]
fn rebound_hard_timeout_awards_closest_player() {
    let mut config = bricklayer();
    // keep the soft fallback out of the way so the hard ceiling decides
    config.rebound.soft_timeout_secs = 10.0;
    let hard_ticks = config.ticks(config.rebound.hard_timeout_secs) as u32;
    let players = four([(66.0, 20.0), (50.0, 10.0)], [(30.0, 30.0), (25.0, 10.0)]);
    let mut session = PossessionSession::new(config, players, 9).unwrap();

    session.attempt_shot(PlayerId(0), ShotOptions::default()).unwrap();
    tick_until(&mut session, 200, |s| s.rebound().is_active());
    assert!(session.store().state().rebound.active);

    let waited = tick_until(&mut session, hard_ticks + 5, |s| s.bus().count("rebound_secured") == 1);
    assert!(waited >= hard_ticks);

    let secured = session.bus().events_of("rebound_secured").next().cloned();
    assert!(matches!(
        secured,
        Some(GameEvent::ReboundSecured { player: PlayerId(0), offensive: true, via: SecureKind::HardTimeout, .. })
    ));
    let timeout = session.bus().events_of("rebound_timeout").next().cloned();
    assert!(matches!(timeout, Some(GameEvent::ReboundTimeout { kind: TimeoutKind::Hard, .. })));

    let state = session.store().state();
    assert!(!session.rebound().is_active());
    assert!(!state.rebound.active);
    assert_eq!(state.phase, Phase::Live);
    assert_eq!(state.ball.carrier, Some(PlayerId(0)));
    assert_eq!(state.players[0].stats.rebounds, 1);
}

#[test]
fn rubber_band_tier_change_fires_once() {
    let players = four([(40.0, 20.0), (45.0, 30.0)], [(55.0, 18.0), (55.0, 28.0)]);
    let mut session = PossessionSession::new(EngineConfig::arcade(), players, 2).unwrap();
    session.set("score.away", json!(10)).unwrap();

    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(session.bus().count("rubber_band_tier_change"), 1);
    let state = session.store().state();
    assert_eq!(state.rubber_banding.tier(TeamSide::Home), Some("big_deficit"));
    assert_eq!(state.rubber_banding.tier(TeamSide::Away), None);
    assert_eq!(state.modifiers_for(TeamSide::Home).tier.as_deref(), Some("big_deficit"));

    let cue = session.bus().events_of("announcer").find_map(|e| match e {
        GameEvent::Announcer { cue, .. } => Some(cue.clone()),
        _ => None,
    });
    assert_eq!(cue.as_deref(), Some("comeback_watch"));

    // tie: both teams neutral again
    session.set("score.home", json!(10)).unwrap();
    session.tick();
    assert_eq!(session.bus().count("rubber_band_tier_change"), 2);
    assert_eq!(session.store().state().rubber_banding.active(), None);
}

#[test]
fn one_ball_action_at_a_time() {
    let players = four([(60.0, 20.0), (70.0, 32.0)], [(64.0, 24.0), (72.0, 12.0)]);
    let mut session = PossessionSession::new(EngineConfig::arcade(), players, 77).unwrap();

    for tick in 0..900u32 {
        let state = session.store().state();
        if let Some(carrier) = state.ball.carrier {
            let team = state.team_of(carrier).unwrap_or(TeamSide::Home);
            let mate = state.roster(team).map(|p| p.id).find(|id| *id != carrier);
            if tick % 3 == 0 {
                let _ = session.attempt_shot(carrier, ShotOptions::default());
            } else if let Some(mate) = mate {
                let _ = session.attempt_pass(carrier, mate, PassOptions::default());
            }
            // a second action on the same tick never starts a second flight
            let _ = session.attempt_shot(carrier, ShotOptions::default());
        }
        session.tick();

        let flights = session
            .sequencer()
            .active_labels()
            .into_iter()
            .filter(|l| matches!(*l, "shot" | "dunk" | "pass"))
            .count();
        assert!(flights <= 1, "tick {}: {} ball flights", tick, flights);
        let state = session.store().state();
        assert!(!(state.phase.is_shot_active() && session.passes().in_flight().is_some()));
    }
    assert!(session.bus().count("shot_attempt") > 0);
}
