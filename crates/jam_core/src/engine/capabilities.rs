//! Narrow capability interfaces the engines depend on
//!
//! Each engine receives these through [`super::ResolveCtx`] instead of a loose
//! helper bag, so tests can swap any of them.

use crate::config::{CourtConfig, EngineConfig};
use crate::models::{AttributeKind, CourtPos, PlayerEntity, PlayerId, TeamSide};

/// Attribute accessors
pub trait AttributeProvider {
    fn base(&self, player: &PlayerEntity, kind: AttributeKind) -> f32;

    /// Post-buff value
    fn effective(&self, player: &PlayerEntity, kind: AttributeKind) -> f32;
}

/// base + buffs, plus the on-fire shooting bonus
#[derive(Debug, Clone, Copy)]
pub struct BuffedAttributes {
    pub on_fire_bonus: f32,
}

impl BuffedAttributes {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self { on_fire_bonus: config.shot.on_fire_attribute_bonus }
    }
}

impl AttributeProvider for BuffedAttributes {
    fn base(&self, player: &PlayerEntity, kind: AttributeKind) -> f32 {
        player.attributes.get(kind)
    }

    fn effective(&self, player: &PlayerEntity, kind: AttributeKind) -> f32 {
        let mut value = player.attributes.get(kind) + player.buffs.get(kind);
        if player.flags.on_fire && matches!(kind, AttributeKind::ThreePoint | AttributeKind::Dunk) {
            value += self.on_fire_bonus;
        }
        value.max(0.0)
    }
}

/// Court geometry helpers
pub trait SpatialProvider {
    /// Shooting distance (vertical axis weighted)
    fn distance(&self, a: CourtPos, b: CourtPos) -> f32;
    fn in_bounds(&self, p: CourtPos, margin: f32) -> bool;
    fn clamp_to_court(&self, p: CourtPos) -> CourtPos;
    fn basket_for(&self, team: TeamSide) -> CourtPos;
    fn inbound_spot(&self, team: TeamSide) -> CourtPos;
    fn is_corner_three(&self, p: CourtPos, team: TeamSide) -> bool;
    fn is_three_point(&self, p: CourtPos, team: TeamSide) -> bool;
    fn inside_key(&self, p: CourtPos, team: TeamSide) -> bool;
    /// In the attacking half for `team`
    fn in_frontcourt(&self, p: CourtPos, team: TeamSide) -> bool;
}

#[derive(Debug, Clone)]
pub struct CourtGeometry {
    court: CourtConfig,
}

impl CourtGeometry {
    pub fn new(court: CourtConfig) -> Self {
        Self { court }
    }

    pub fn court(&self) -> &CourtConfig {
        &self.court
    }
}

impl SpatialProvider for CourtGeometry {
    fn distance(&self, a: CourtPos, b: CourtPos) -> f32 {
        a.weighted_distance(b, self.court.vertical_weight)
    }

    fn in_bounds(&self, p: CourtPos, margin: f32) -> bool {
        p.is_finite()
            && p.x >= margin
            && p.y >= margin
            && p.x <= self.court.width - margin
            && p.y <= self.court.height - margin
    }

    fn clamp_to_court(&self, p: CourtPos) -> CourtPos {
        let x = if p.x.is_finite() { p.x } else { self.court.half_court_x() };
        let y = if p.y.is_finite() { p.y } else { self.court.height / 2.0 };
        CourtPos::new(x.clamp(0.0, self.court.width), y.clamp(0.0, self.court.height))
    }

    fn basket_for(&self, team: TeamSide) -> CourtPos {
        self.court.basket_for(team)
    }

    fn inbound_spot(&self, team: TeamSide) -> CourtPos {
        self.court.inbound_spot(team)
    }

    fn is_corner_three(&self, p: CourtPos, team: TeamSide) -> bool {
        let rim = self.basket_for(team);
        (p.x - rim.x).abs() <= self.court.corner_three_depth
            && (p.y - rim.y).abs() >= self.court.corner_three_offset
    }

    fn is_three_point(&self, p: CourtPos, team: TeamSide) -> bool {
        self.is_corner_three(p, team)
            || self.distance(p, self.basket_for(team)) >= self.court.three_point_distance
    }

    fn inside_key(&self, p: CourtPos, team: TeamSide) -> bool {
        let rim = self.basket_for(team);
        (p.x - rim.x).abs() <= self.court.key_depth && (p.y - rim.y).abs() <= self.court.key_half_height
    }

    fn in_frontcourt(&self, p: CourtPos, team: TeamSide) -> bool {
        let half = self.court.half_court_x();
        match team {
            TeamSide::Home => p.x > half,
            TeamSide::Away => p.x < half,
        }
    }
}

/// Closest player to `target` by plain distance; ties go to the lower id.
pub fn closest_player<'a>(
    players: impl IntoIterator<Item = &'a PlayerEntity>,
    target: CourtPos,
) -> Option<(PlayerId, f32)> {
    players
        .into_iter()
        .map(|p| (p.id, p.position.distance(target)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
}

/// Presentation hooks for contest animations
pub trait ContestHooks {
    /// AI turbo burst fired by a contesting defender
    fn activate_turbo_burst(&mut self, _player: PlayerId) {}

    /// Block animation with duration, jump height and facing direction
    fn attempt_block(&mut self, _blocker: PlayerId, _duration_ticks: u32, _height: f32, _direction: (f32, f32)) {}

    /// Possession-change audio cue
    fn possession_cue(&mut self, _team: TeamSide) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ContestHooks for NoopHooks {}
