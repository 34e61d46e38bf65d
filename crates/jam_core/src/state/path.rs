//! Dotted state paths (`score.home`, `players.2.stats.points`, ...)

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::{PlayerId, StatCounter, TeamSide};

/// Addressable field of the shared state store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePath {
    Score(TeamSide),
    ShotClock,
    GameClock,
    BallCarrier,
    BallInFlight,
    BallPosition,
    PossessionTeam,
    PossessionInbounding,
    PhaseCurrent,
    RubberBanding(TeamSide),
    ReboundActive,
    ReboundTarget,
    ReboundLooseBall,
    PlayerStat(PlayerId, StatCounter),
    PlayerPosition(PlayerId),
    PlayerOnFire(PlayerId),
    PlayerTurbo(PlayerId),
}

impl StatePath {
    /// Paths owned by an engine invariant; external writers may only read them.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            StatePath::BallInFlight
                | StatePath::PhaseCurrent
                | StatePath::ReboundActive
                | StatePath::ReboundTarget
                | StatePath::ReboundLooseBall
        )
    }

    /// Scoreboard paths a host may overwrite on a live session. Everything
    /// else is written by the engines or by replication.
    pub fn is_host_writable(&self) -> bool {
        matches!(self, StatePath::Score(_) | StatePath::ShotClock | StatePath::GameClock)
    }
}

fn parse_team(s: &str) -> Option<TeamSide> {
    match s {
        "home" => Some(TeamSide::Home),
        "away" => Some(TeamSide::Away),
        _ => None,
    }
}

impl FromStr for StatePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CoreError::UnknownPath { path: s.to_string() };
        let parts: Vec<&str> = s.split('.').collect();
        let path = match parts.as_slice() {
            ["score", team] => StatePath::Score(parse_team(team).ok_or_else(unknown)?),
            ["shotClock"] => StatePath::ShotClock,
            ["gameClock"] => StatePath::GameClock,
            ["ballCarrier"] => StatePath::BallCarrier,
            ["ball", "inFlight"] => StatePath::BallInFlight,
            ["ball", "position"] => StatePath::BallPosition,
            ["possession", "team"] => StatePath::PossessionTeam,
            ["possession", "inbounding"] => StatePath::PossessionInbounding,
            ["phase", "current"] => StatePath::PhaseCurrent,
            ["rubberBanding", team] => {
                StatePath::RubberBanding(parse_team(team).ok_or_else(unknown)?)
            }
            ["reboundScramble", "active"] => StatePath::ReboundActive,
            ["reboundScramble", "target"] => StatePath::ReboundTarget,
            ["reboundScramble", "isLooseBall"] => StatePath::ReboundLooseBall,
            ["players", id, rest @ ..] => {
                let id = PlayerId(id.parse::<u8>().map_err(|_| unknown())?);
                match rest {
                    ["stats", counter] => {
                        StatePath::PlayerStat(id, counter.parse().map_err(|_| unknown())?)
                    }
                    ["position"] => StatePath::PlayerPosition(id),
                    ["onFire"] => StatePath::PlayerOnFire(id),
                    ["turbo"] => StatePath::PlayerTurbo(id),
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };
        Ok(path)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatePath::Score(team) => write!(f, "score.{}", team.as_str()),
            StatePath::ShotClock => write!(f, "shotClock"),
            StatePath::GameClock => write!(f, "gameClock"),
            StatePath::BallCarrier => write!(f, "ballCarrier"),
            StatePath::BallInFlight => write!(f, "ball.inFlight"),
            StatePath::BallPosition => write!(f, "ball.position"),
            StatePath::PossessionTeam => write!(f, "possession.team"),
            StatePath::PossessionInbounding => write!(f, "possession.inbounding"),
            StatePath::PhaseCurrent => write!(f, "phase.current"),
            StatePath::RubberBanding(team) => write!(f, "rubberBanding.{}", team.as_str()),
            StatePath::ReboundActive => write!(f, "reboundScramble.active"),
            StatePath::ReboundTarget => write!(f, "reboundScramble.target"),
            StatePath::ReboundLooseBall => write!(f, "reboundScramble.isLooseBall"),
            StatePath::PlayerStat(id, counter) => {
                write!(f, "players.{}.stats.{}", id.0, counter.as_str())
            }
            StatePath::PlayerPosition(id) => write!(f, "players.{}.position", id.0),
            StatePath::PlayerOnFire(id) => write!(f, "players.{}.onFire", id.0),
            StatePath::PlayerTurbo(id) => write!(f, "players.{}.turbo", id.0),
        }
    }
}
