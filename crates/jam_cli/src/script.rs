//! Scripted 2-on-2 AI for headless runs
//!
//! Carrier drives at the rim, swings one pass per possession, shoots when in
//! range. Defenders shade their matchup toward the rim. Everybody chases a
//! loose ball.

use jam_core::config::EngineConfig;
use jam_core::models::{CourtPos, PlayerId, TeamSide};
use jam_core::{MatchState, Phase};

/// 틱당 이동 거리
const STEP: f32 = 0.5;
const SHOOT_RANGE: f32 = 16.0;
const SWING_PASS_TICK: u32 = 25;
const INBOUND_PASS_TICK: u32 = 8;
const FORCE_SHOT_TICK: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Shoot(PlayerId),
    Pass { passer: PlayerId, receiver: PlayerId },
}

impl Action {
    pub fn actor(self) -> PlayerId {
        match self {
            Action::Shoot(id) => id,
            Action::Pass { passer, .. } => passer,
        }
    }
}

/// Movement targets plus at most one action for this tick
#[derive(Debug, Default)]
pub struct Plan {
    pub moves: Vec<(PlayerId, CourtPos)>,
    pub action: Option<Action>,
}

#[derive(Debug, Default)]
pub struct Script {
    carrier: Option<PlayerId>,
    hold_ticks: u32,
    swung: bool,
}

fn step_toward(from: CourtPos, to: CourtPos) -> CourtPos {
    let d = from.distance(to);
    if d <= STEP {
        to
    } else {
        from.lerp(to, STEP / d)
    }
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&mut self, state: &MatchState, config: &EngineConfig) -> Plan {
        let mut plan = Plan::default();

        if let Phase::Rebound = state.phase {
            if let Some(target) = state.rebound.target {
                plan.moves = state.players.iter().map(|p| (p.id, step_toward(p.position, target))).collect();
            }
            return plan;
        }

        let carrier = if state.ball.in_flight.is_none() { state.carrier() } else { None };
        if carrier.map(|c| c.id) != self.carrier {
            self.carrier = carrier.map(|c| c.id);
            self.hold_ticks = 0;
            self.swung = false;
        }
        let Some(carrier) = carrier else { return plan };
        self.hold_ticks += 1;

        let team = carrier.team;
        let rim = config.court.basket_for(team);
        let toward_rim = if rim.x > config.court.half_court_x() { -1.0 } else { 1.0 };
        let teammate = state.roster(team).find(|p| p.id != carrier.id).map(|p| p.id);

        for p in &state.players {
            let target = if p.id == carrier.id {
                if state.possession.inbounding {
                    p.position
                } else {
                    rim
                }
            } else if p.team == team {
                let side = if carrier.position.y < rim.y { 10.0 } else { -10.0 };
                CourtPos::new(rim.x + toward_rim * 18.0, rim.y + side)
            } else {
                let mark = state
                    .matchups
                    .iter()
                    .find(|m| m.defense == p.id)
                    .and_then(|m| state.player(m.offense))
                    .map(|o| o.position)
                    .unwrap_or(carrier.position);
                mark.lerp(rim, 0.25)
            };
            // carriers stop at shooting range
            let next = step_toward(p.position, target);
            if p.id == carrier.id && next.distance(rim) < SHOOT_RANGE * 0.5 {
                continue;
            }
            plan.moves.push((p.id, next));
        }

        if !state.phase.is_live() {
            return plan;
        }
        let in_range = carrier.position.distance(rim) <= SHOOT_RANGE;
        plan.action = match teammate {
            Some(receiver) if state.possession.inbounding => {
                (self.hold_ticks >= INBOUND_PASS_TICK).then_some(Action::Pass { passer: carrier.id, receiver })
            }
            Some(receiver) if !self.swung && self.hold_ticks >= SWING_PASS_TICK => {
                self.swung = true;
                Some(Action::Pass { passer: carrier.id, receiver })
            }
            _ if in_range || self.hold_ticks >= FORCE_SHOT_TICK => Some(Action::Shoot(carrier.id)),
            _ => None,
        };
        plan
    }
}

/// Default roster: two per side, home attacking the right rim.
pub fn roster() -> Vec<jam_core::PlayerEntity> {
    use jam_core::{AttributeSet, PlayerEntity};

    let mut slasher = AttributeSet::uniform(6.0);
    slasher.dunk = 8.0;
    slasher.speed = 7.0;
    let mut shooter = AttributeSet::uniform(5.0);
    shooter.three_point = 8.0;
    let mut big = AttributeSet::uniform(5.0);
    big.block = 8.0;
    big.power = 8.0;
    let mut thief = AttributeSet::uniform(6.0);
    thief.steal = 8.0;

    vec![
        PlayerEntity::new(0, "Blaze", TeamSide::Home, CourtPos::new(40.0, 20.0), slasher),
        PlayerEntity::new(1, "Rook", TeamSide::Home, CourtPos::new(46.0, 30.0), shooter),
        PlayerEntity::new(2, "Vandal", TeamSide::Away, CourtPos::new(56.0, 18.0), big),
        PlayerEntity::new(3, "Hex", TeamSide::Away, CourtPos::new(56.0, 28.0), thief),
    ]
}
