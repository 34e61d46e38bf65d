//! # jam_core - Deterministic 2-on-2 Possession Resolution
//!
//! Tick-driven core of an arcade two-on-two basketball simulation: shots,
//! dunks, passes, rebound scrambles and comeback modifiers.
//!
//! ## Features
//! - same seed + same inputs = same outcomes
//! - non-blocking: every resolution queues an animation and returns
//! - single-writer authority: one coordinator draws, every participant replays
//! - JSON / YAML config, JSON schema for the replicated messages

// Game engine APIs often require many parameters for physics, state, etc.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Large enum variants - boxing would require API changes
#![allow(clippy::large_enum_variant)]

pub mod animation;
pub mod authority;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod modifiers;
pub mod session;
pub mod state;

pub use authority::{authority_schema, AuthorityMessage, AuthorityRole, LoopbackHub, Transport};
pub use config::EngineConfig;
pub use engine::{PassOptions, PassOutcome, Rejection, ShotOptions, ShotOutcome};
pub use error::{CoreError, Result};
pub use events::{EventBus, GameEvent};
pub use models::{AttributeSet, CourtPos, PlayerEntity, PlayerId, Score, TeamSide};
pub use session::PossessionSession;
pub use state::{MatchState, Phase, StateStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
