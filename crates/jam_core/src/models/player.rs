//! Player entity: position, attributes, per-possession flags and box-score counters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::geometry::CourtPos;
use super::team::TeamSide;

/// Session-local player identifier (index into the roster)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Rated attribute kinds (0..10 scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Speed,
    ThreePoint,
    Dunk,
    Power,
    Steal,
    Block,
}

/// Attribute ratings. Also used as the additive buff set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AttributeSet {
    pub speed: f32,
    pub three_point: f32,
    pub dunk: f32,
    pub power: f32,
    pub steal: f32,
    pub block: f32,
}

impl AttributeSet {
    pub fn uniform(value: f32) -> Self {
        Self {
            speed: value,
            three_point: value,
            dunk: value,
            power: value,
            steal: value,
            block: value,
        }
    }

    pub fn get(&self, kind: AttributeKind) -> f32 {
        match kind {
            AttributeKind::Speed => self.speed,
            AttributeKind::ThreePoint => self.three_point,
            AttributeKind::Dunk => self.dunk,
            AttributeKind::Power => self.power,
            AttributeKind::Steal => self.steal,
            AttributeKind::Block => self.block,
        }
    }

    pub fn set(&mut self, kind: AttributeKind, value: f32) {
        match kind {
            AttributeKind::Speed => self.speed = value,
            AttributeKind::ThreePoint => self.three_point = value,
            AttributeKind::Dunk => self.dunk = value,
            AttributeKind::Power => self.power = value,
            AttributeKind::Steal => self.steal = value,
            AttributeKind::Block => self.block = value,
        }
    }
}

/// Mutable per-possession flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlayerFlags {
    pub has_dribble: bool,
    pub on_fire: bool,
    /// 연속 득점 수 (미스 시 0으로 리셋)
    pub heat_streak: u8,
    pub turbo: f32,
    pub turbo_capacity: f32,
    /// 터보 버스트 활성 중
    pub turbo_active: bool,
    /// 남은 버스트 틱
    pub turbo_burst_ticks: u32,
    pub shove_cooldown_ticks: u32,
}

impl Default for PlayerFlags {
    fn default() -> Self {
        Self {
            has_dribble: true,
            on_fire: false,
            heat_streak: 0,
            turbo: 100.0,
            turbo_capacity: 100.0,
            turbo_active: false,
            turbo_burst_ticks: 0,
            shove_cooldown_ticks: 0,
        }
    }
}

/// Box-score counter names, addressable as `players.<id>.stats.<counter>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatCounter {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    FgAttempts,
    FgMade,
    ThreeAttempts,
    ThreeMade,
    DunkAttempts,
    DunkMade,
    Shoves,
}

impl StatCounter {
    pub const ALL: [StatCounter; 13] = [
        StatCounter::Points,
        StatCounter::Rebounds,
        StatCounter::Assists,
        StatCounter::Steals,
        StatCounter::Blocks,
        StatCounter::Turnovers,
        StatCounter::FgAttempts,
        StatCounter::FgMade,
        StatCounter::ThreeAttempts,
        StatCounter::ThreeMade,
        StatCounter::DunkAttempts,
        StatCounter::DunkMade,
        StatCounter::Shoves,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatCounter::Points => "points",
            StatCounter::Rebounds => "rebounds",
            StatCounter::Assists => "assists",
            StatCounter::Steals => "steals",
            StatCounter::Blocks => "blocks",
            StatCounter::Turnovers => "turnovers",
            StatCounter::FgAttempts => "fg_attempts",
            StatCounter::FgMade => "fg_made",
            StatCounter::ThreeAttempts => "three_attempts",
            StatCounter::ThreeMade => "three_made",
            StatCounter::DunkAttempts => "dunk_attempts",
            StatCounter::DunkMade => "dunk_made",
            StatCounter::Shoves => "shoves",
        }
    }
}

impl FromStr for StatCounter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatCounter::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown stat counter '{}'", s))
    }
}

/// Cumulative box-score counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlayerStats {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fg_attempts: u32,
    pub fg_made: u32,
    pub three_attempts: u32,
    pub three_made: u32,
    pub dunk_attempts: u32,
    pub dunk_made: u32,
    pub shoves: u32,
}

impl PlayerStats {
    pub fn get(&self, counter: StatCounter) -> u32 {
        match counter {
            StatCounter::Points => self.points,
            StatCounter::Rebounds => self.rebounds,
            StatCounter::Assists => self.assists,
            StatCounter::Steals => self.steals,
            StatCounter::Blocks => self.blocks,
            StatCounter::Turnovers => self.turnovers,
            StatCounter::FgAttempts => self.fg_attempts,
            StatCounter::FgMade => self.fg_made,
            StatCounter::ThreeAttempts => self.three_attempts,
            StatCounter::ThreeMade => self.three_made,
            StatCounter::DunkAttempts => self.dunk_attempts,
            StatCounter::DunkMade => self.dunk_made,
            StatCounter::Shoves => self.shoves,
        }
    }

    fn slot(&mut self, counter: StatCounter) -> &mut u32 {
        match counter {
            StatCounter::Points => &mut self.points,
            StatCounter::Rebounds => &mut self.rebounds,
            StatCounter::Assists => &mut self.assists,
            StatCounter::Steals => &mut self.steals,
            StatCounter::Blocks => &mut self.blocks,
            StatCounter::Turnovers => &mut self.turnovers,
            StatCounter::FgAttempts => &mut self.fg_attempts,
            StatCounter::FgMade => &mut self.fg_made,
            StatCounter::ThreeAttempts => &mut self.three_attempts,
            StatCounter::ThreeMade => &mut self.three_made,
            StatCounter::DunkAttempts => &mut self.dunk_attempts,
            StatCounter::DunkMade => &mut self.dunk_made,
            StatCounter::Shoves => &mut self.shoves,
        }
    }

    pub fn set(&mut self, counter: StatCounter, value: u32) {
        *self.slot(counter) = value;
    }

    /// Apply a signed delta, saturating at zero.
    pub fn add(&mut self, counter: StatCounter, delta: i32) {
        let slot = self.slot(counter);
        *slot = (*slot as i64 + delta as i64).max(0) as u32;
    }
}

/// A player on the court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerEntity {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamSide,
    pub position: CourtPos,
    pub attributes: AttributeSet,
    /// 버프 (effective = base + buffs)
    #[serde(default)]
    pub buffs: AttributeSet,
    #[serde(default)]
    pub flags: PlayerFlags,
    #[serde(default)]
    pub stats: PlayerStats,
}

impl PlayerEntity {
    pub fn new(
        id: u8,
        name: impl Into<String>,
        team: TeamSide,
        position: CourtPos,
        attributes: AttributeSet,
    ) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            team,
            position,
            attributes,
            buffs: AttributeSet::default(),
            flags: PlayerFlags::default(),
            stats: PlayerStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_counter_names_roundtrip() {
        for counter in StatCounter::ALL {
            assert_eq!(counter.as_str().parse::<StatCounter>().unwrap(), counter);
        }
        assert!("dunks".parse::<StatCounter>().is_err());
    }

    #[test]
    fn test_stat_add_saturates() {
        let mut stats = PlayerStats::default();
        stats.add(StatCounter::Points, 3);
        stats.add(StatCounter::Points, -5);
        assert_eq!(stats.points, 0);
        stats.add(StatCounter::Rebounds, 2);
        assert_eq!(stats.get(StatCounter::Rebounds), 2);
    }

    #[test]
    fn test_attribute_set_accessors() {
        let mut set = AttributeSet::uniform(5.0);
        set.set(AttributeKind::Block, 9.0);
        assert_eq!(set.get(AttributeKind::Block), 9.0);
        assert_eq!(set.get(AttributeKind::Dunk), 5.0);
    }
}
