//! Transient descriptors bridging "outcome decided" to "animation completed".
//!
//! Both descriptors carry a `consumed` flag; the completion handler refuses to
//! apply a descriptor twice.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{CourtPos, PlayerId, TeamSide};

/// Kind of field-goal attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttemptType {
    Layup,
    JumpShot,
    ThreePointer,
    Dunk,
}

impl AttemptType {
    pub fn points(self) -> u32 {
        match self {
            AttemptType::ThreePointer => 3,
            _ => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttemptType::Layup => "layup",
            AttemptType::JumpShot => "jump_shot",
            AttemptType::ThreePointer => "three_pointer",
            AttemptType::Dunk => "dunk",
        }
    }
}

/// Dunk animation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DunkStyle {
    Standard,
    Power,
    Glide,
    Hang,
    Windmill,
}

/// One sampled frame of a dunk flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightFrame {
    pub pos: CourtPos,
    pub height: f32,
    /// 0.0 (takeoff) ..= 1.0 (rim)
    pub progress: f32,
}

/// Precomputed dunk trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightPlan {
    pub style: DunkStyle,
    pub frames: Vec<FlightFrame>,
    pub apex_height: f32,
    /// Frame at which a contesting defender stops the flight
    pub block_frame: Option<usize>,
}

impl FlightPlan {
    pub fn duration_ticks(&self) -> u32 {
        self.frames.len().max(1) as u32
    }

    /// Frames actually played: truncated at the block frame.
    pub fn played_frames(&self) -> &[FlightFrame] {
        match self.block_frame {
            Some(idx) if idx < self.frames.len() => &self.frames[..=idx],
            _ => &self.frames,
        }
    }

    pub fn end_position(&self) -> Option<CourtPos> {
        self.played_frames().last().map(|f| f.pos)
    }
}

/// A decided shot waiting for (or playing) its animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShotQueueEntry {
    pub id: u64,
    pub shooter: PlayerId,
    pub team: TeamSide,
    pub attempt_type: AttemptType,
    pub chance: f32,
    pub made: bool,
    pub blocked_by: Option<PlayerId>,
    /// Defender who contested (may or may not have blocked)
    pub contested_by: Option<PlayerId>,
    pub three_point: bool,
    pub origin: CourtPos,
    /// Rim, or the block point when blocked
    pub destination: CourtPos,
    /// Where a miss bounces to (decided by the coordinator)
    pub rebound_target: CourtPos,
    pub dunk_style: Option<DunkStyle>,
    pub flight_plan: Option<FlightPlan>,
    pub duration_ticks: u32,
    #[serde(skip)]
    pub consumed: bool,
}

impl ShotQueueEntry {
    pub fn is_dunk(&self) -> bool {
        self.attempt_type == AttemptType::Dunk
    }
}

/// A decided pass waiting for its animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PassIntent {
    pub id: u64,
    pub passer: PlayerId,
    /// Intended receiver. `None` only through corrupted replication.
    pub receiver: Option<PlayerId>,
    pub team: TeamSide,
    pub origin: CourtPos,
    /// Actual endpoint: receiver/lead point, or the intercept point
    pub endpoint: CourtPos,
    pub lead_target: Option<CourtPos>,
    pub interceptor: Option<PlayerId>,
    pub inbound: bool,
    pub duration_ticks: u32,
    #[serde(skip)]
    pub consumed: bool,
}

impl PassIntent {
    /// Player who ends up with the ball.
    pub fn resolved_receiver(&self) -> Option<PlayerId> {
        self.interceptor.or(self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f32) -> FlightFrame {
        FlightFrame { pos: CourtPos::new(x, 20.0), height: 0.0, progress: x / 10.0 }
    }

    #[test]
    fn test_flight_plan_truncates_at_block() {
        let mut plan = FlightPlan {
            style: DunkStyle::Standard,
            frames: (0..10).map(|i| frame(i as f32)).collect(),
            apex_height: 3.0,
            block_frame: None,
        };
        assert_eq!(plan.played_frames().len(), 10);

        plan.block_frame = Some(4);
        assert_eq!(plan.played_frames().len(), 5);
        assert_eq!(plan.end_position(), Some(CourtPos::new(4.0, 20.0)));
    }

    #[test]
    fn test_interceptor_receives_ball() {
        let intent = PassIntent {
            id: 1,
            passer: PlayerId(0),
            receiver: Some(PlayerId(1)),
            team: TeamSide::Home,
            origin: CourtPos::new(10.0, 10.0),
            endpoint: CourtPos::new(15.0, 10.0),
            lead_target: None,
            interceptor: Some(PlayerId(2)),
            inbound: false,
            duration_ticks: 3,
            consumed: false,
        };
        assert_eq!(intent.resolved_receiver(), Some(PlayerId(2)));
    }

    #[test]
    fn test_three_pointer_points() {
        assert_eq!(AttemptType::ThreePointer.points(), 3);
        assert_eq!(AttemptType::Dunk.points(), 2);
    }
}
