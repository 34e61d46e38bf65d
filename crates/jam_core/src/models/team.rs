use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Team identifier. Home attacks the right-hand basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// Array slot for per-team tables.
    pub fn index(self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

/// Match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn get(&self, team: TeamSide) -> u32 {
        match team {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    pub fn add(&mut self, team: TeamSide, points: u32) {
        match team {
            TeamSide::Home => self.home += points,
            TeamSide::Away => self.away += points,
        }
    }

    /// Trailing team and its deficit. `None` on a tie.
    pub fn trailing(&self) -> Option<(TeamSide, u32)> {
        use std::cmp::Ordering;
        match self.home.cmp(&self.away) {
            Ordering::Less => Some((TeamSide::Home, self.away - self.home)),
            Ordering::Greater => Some((TeamSide::Away, self.home - self.away)),
            Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_team() {
        assert_eq!(Score::new(10, 14).trailing(), Some((TeamSide::Home, 4)));
        assert_eq!(Score::new(21, 14).trailing(), Some((TeamSide::Away, 7)));
        assert_eq!(Score::new(9, 9).trailing(), None);
    }

    #[test]
    fn test_opponent_roundtrip() {
        for team in TeamSide::BOTH {
            assert_eq!(team.opponent().opponent(), team);
            assert_ne!(team.opponent(), team);
        }
    }
}
