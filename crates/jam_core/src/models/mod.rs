//! Core data types shared by every engine: court positions, teams, players.

pub mod geometry;
pub mod player;
pub mod team;

pub use geometry::{closest_point_on_segment, CourtPos};
pub use player::{
    AttributeKind, AttributeSet, PlayerEntity, PlayerFlags, PlayerId, PlayerStats, StatCounter,
};
pub use team::{Score, TeamSide};
