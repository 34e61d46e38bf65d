//! # Multiplayer Authority Coordinator
//!
//! 세션당 정확히 하나의 coordinator가 모든 확률 판정을 내린다.
//!
//! - coordinator: validate → decide (RNG) → commit → broadcast
//! - client: validate → forward request; apply broadcasts in arrival order
//!
//! Both roles run the same deterministic commit/apply code, so a broadcast
//! replays the coordinator's transition exactly. Decision code is gated on
//! [`AuthorityRole::is_coordinator`] in one place per engine.

mod transport;

pub use transport::{Envelope, LoopbackEndpoint, LoopbackHub, Transport};

use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::engine::possession::PossessionFlip;
use crate::engine::rebound::ReboundResolution;
use crate::engine::{PassOptions, ShotOptions};
use crate::error::{CoreError, Result};
use crate::models::PlayerId;
use crate::state::{PassIntent, ShotQueueEntry};

/// Fixed for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityRole {
    Coordinator,
    Client,
}

impl AuthorityRole {
    pub fn is_coordinator(self) -> bool {
        matches!(self, AuthorityRole::Coordinator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorityRole::Coordinator => "coordinator",
            AuthorityRole::Client => "client",
        }
    }
}

/// Replicated payload: discriminated type tag + JSON data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AuthorityMessage {
    /// client → coordinator
    ShotRequest { shooter: PlayerId, options: ShotOptions },
    /// client → coordinator
    PassRequest { passer: PlayerId, receiver: PlayerId, options: PassOptions },
    ShotResolved { entry: ShotQueueEntry },
    PassResolved { intent: PassIntent },
    /// `tick`: coordinator tick the scramble was resolved on
    ReboundResolved { tick: u64, resolution: ReboundResolution },
    PossessionFlip { flip: PossessionFlip },
    /// Periodic clock/score sync keyed by state path
    StateDelta { tick: u64, values: BTreeMap<String, Value> },
}

impl AuthorityMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorityMessage::ShotRequest { .. } => "shot_request",
            AuthorityMessage::PassRequest { .. } => "pass_request",
            AuthorityMessage::ShotResolved { .. } => "shot_resolved",
            AuthorityMessage::PassResolved { .. } => "pass_resolved",
            AuthorityMessage::ReboundResolved { .. } => "rebound_resolved",
            AuthorityMessage::PossessionFlip { .. } => "possession_flip",
            AuthorityMessage::StateDelta { .. } => "state_delta",
        }
    }

    /// Requests flow client → coordinator; everything else is a broadcast.
    pub fn is_request(&self) -> bool {
        matches!(self, AuthorityMessage::ShotRequest { .. } | AuthorityMessage::PassRequest { .. })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::MalformedMessage(e.to_string()))
    }
}

/// JSON schema of the broadcast payload
pub fn authority_schema() -> RootSchema {
    schemars::schema_for!(Envelope)
}
