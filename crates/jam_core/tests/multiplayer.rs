//! Coordinator + client over the in-memory loopback hub.

use jam_core::{
    AttributeSet, AuthorityRole, CourtPos, EngineConfig, LoopbackHub, PassOptions, PassOutcome, Phase, PlayerEntity, PlayerId,
    PossessionSession, ShotOptions, ShotOutcome, TeamSide,
};

fn roster() -> Vec<PlayerEntity> {
    let at = |id: u8, team, x, y| PlayerEntity::new(id, format!("P{}", id), team, CourtPos::new(x, y), AttributeSet::uniform(5.0));
    vec![
        at(0, TeamSide::Home, 70.0, 20.0),
        at(1, TeamSide::Home, 40.0, 10.0),
        at(2, TeamSide::Away, 30.0, 30.0),
        at(3, TeamSide::Away, 56.0, 28.0),
    ]
}

/// Every shot goes in.
fn automatic() -> EngineConfig {
    let mut cfg = EngineConfig::deterministic();
    cfg.shot.min_chance = 100.0;
    cfg.shot.max_chance = 100.0;
    cfg.shot.on_fire_max_chance = 100.0;
    cfg.dunk.min_chance = 100.0;
    cfg.dunk.max_chance = 100.0;
    cfg
}

struct Pair {
    hub: LoopbackHub,
    coordinator: PossessionSession,
    client: PossessionSession,
}

impl Pair {
    fn new(config: EngineConfig, seed: u64) -> Self {
        Self::with_roster(config, roster(), seed)
    }

    fn with_roster(config: EngineConfig, players: Vec<PlayerEntity>, seed: u64) -> Self {
        let hub = LoopbackHub::new();
        let coordinator = PossessionSession::new(config.clone(), players.clone(), seed)
            .unwrap()
            .with_role(AuthorityRole::Coordinator, Box::new(hub.coordinator()));
        let client = PossessionSession::new(config, players, seed)
            .unwrap()
            .with_role(AuthorityRole::Client, Box::new(hub.client()));
        Self { hub, coordinator, client }
    }

    fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.coordinator.tick();
            self.client.tick();
        }
    }

    fn run_until(&mut self, limit: u32, done: impl Fn(&Pair) -> bool) {
        for _ in 0..limit {
            self.coordinator.tick();
            self.client.tick();
            if done(self) {
                return;
            }
        }
        panic!("condition not reached within {} ticks", limit);
    }
}

/// Carrier holding a settled ball in live play.
fn carrier(session: &PossessionSession) -> Option<PlayerId> {
    let state = session.store().state();
    match (state.ball.in_flight, &state.phase) {
        (None, Phase::Live) => state.ball.carrier,
        _ => None,
    }
}

#[test]
fn replicas_agree_on_score_and_box() {
    let mut pair = Pair::new(automatic(), 21);

    let shot = pair.coordinator.attempt_shot(PlayerId(0), ShotOptions::default()).unwrap();
    assert!(matches!(shot, ShotOutcome::Queued(_)));
    pair.run_until(300, |p| carrier(&p.client) == Some(PlayerId(2)));
    assert_eq!(pair.client.store().state().score.home, 2);
    assert_eq!(carrier(&pair.coordinator), Some(PlayerId(2)));

    // away inputs come from the client and are decided by the coordinator
    let pass = pair.client.attempt_pass(PlayerId(2), PlayerId(3), PassOptions::default()).unwrap();
    assert_eq!(pass, PassOutcome::Forwarded);
    pair.run_until(300, |p| carrier(&p.client) == Some(PlayerId(3)));
    assert_eq!(carrier(&pair.coordinator), Some(PlayerId(3)));

    let shot = pair.client.attempt_shot(PlayerId(3), ShotOptions::default()).unwrap();
    assert_eq!(shot, ShotOutcome::Forwarded);
    pair.run_until(300, |p| carrier(&p.client) == Some(PlayerId(0)) && p.client.store().state().score.away == 3);
    pair.run(10);

    let ours = pair.coordinator.store().state();
    let theirs = pair.client.store().state();
    assert_eq!(ours.score.home, 2);
    assert_eq!(ours.score.away, 3);
    assert_eq!(ours.score, theirs.score);
    for (a, b) in ours.players.iter().zip(&theirs.players) {
        assert_eq!(a.stats, b.stats, "stats diverged for {}", a.id);
    }
    for topic in ["shot_attempt", "shot_made", "pass_complete", "possession_change"] {
        assert_eq!(pair.coordinator.bus().count(topic), pair.client.bus().count(topic), "{}", topic);
    }
}

#[test]
fn client_never_resolves_a_rebound_on_its_own() {
    let mut config = automatic();
    config.shot.min_chance = 0.0;
    config.shot.max_chance = 0.0;
    config.shot.on_fire_max_chance = 0.0;
    config.dunk.min_chance = 0.0;
    config.dunk.max_chance = 0.0;
    let mut pair = Pair::new(config, 4);

    pair.coordinator.attempt_shot(PlayerId(0), ShotOptions::default()).unwrap();
    for _ in 0..400 {
        pair.coordinator.tick();
        pair.client.tick();
        let resolved_here = pair.client.bus().count("rebound_secured");
        let resolved_there = pair.coordinator.bus().count("rebound_secured");
        assert!(resolved_here <= resolved_there);
    }
    assert_eq!(pair.coordinator.bus().count("rebound_secured"), 1);
    assert_eq!(pair.client.bus().count("rebound_secured"), 1);
    assert!(!pair.client.store().state().rebound.active);
    assert_eq!(
        pair.client.store().state().possession.team,
        pair.coordinator.store().state().possession.team
    );
}

#[test]
fn replicas_agree_on_shoves_under_arcade_rules() {
    let mut config = EngineConfig::arcade();
    config.rebound.shove_enabled = true;
    config.rebound.shove_min = 1.0;
    config.rebound.shove_max = 1.0;
    config.shot.min_chance = 0.0;
    config.shot.max_chance = 0.0;
    config.shot.on_fire_max_chance = 0.0;
    config.dunk.min_chance = 0.0;
    config.dunk.max_chance = 0.0;
    config.shot.rebound_spread = 1.0;
    let at = |id: u8, team, x, y| PlayerEntity::new(id, format!("P{}", id), team, CourtPos::new(x, y), AttributeSet::uniform(5.0));
    // 림 밑에 양 팀 한 명씩
    let players = vec![
        at(0, TeamSide::Home, 60.0, 20.0),
        at(1, TeamSide::Home, 82.0, 21.5),
        at(2, TeamSide::Away, 83.0, 20.5),
        at(3, TeamSide::Away, 20.0, 30.0),
    ];
    let mut pair = Pair::with_roster(config, players, 13);

    pair.coordinator.attempt_shot(PlayerId(0), ShotOptions::default()).unwrap();
    pair.run_until(400, |p| {
        p.client.bus().count("rebound_secured") == 1 && !p.client.store().state().rebound.active
    });
    pair.run(10);

    assert!(pair.coordinator.bus().count("shove") > 0);
    let ours = pair.coordinator.store().state();
    let theirs = pair.client.store().state();
    assert_eq!(ours.score, theirs.score);
    assert_eq!(ours.possession.team, theirs.possession.team);
    assert_eq!(ours.ball.carrier, theirs.ball.carrier);
    for (a, b) in ours.players.iter().zip(&theirs.players) {
        assert_eq!(a.stats, b.stats, "stats diverged for {}", a.id);
        assert_eq!(a.position, b.position, "position diverged for {}", a.id);
    }
    for topic in ["shot_attempt", "shot_missed", "shove", "rebound_secured", "possession_change"] {
        assert_eq!(pair.coordinator.bus().count(topic), pair.client.bus().count(topic), "{}", topic);
    }
}

#[test]
fn garbage_frames_do_not_stop_the_coordinator() {
    let mut pair = Pair::new(automatic(), 8);
    pair.hub.inject_to_coordinator("{\"session\":\"nope\"}");
    pair.hub.inject_to_coordinator("\u{0}\u{1}");
    pair.run(3);
    assert_eq!(pair.coordinator.store().tick(), 3);
    assert_eq!(pair.client.store().tick(), 3);
}
