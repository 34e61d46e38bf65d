//! Outcome randomness
//!
//! - [`OutcomeRng`]: the coordinator's seeded stream. Every stochastic decision
//!   (make/miss, block, interception, dunk style, rebound spot) goes through it.
//! - [`presentation_roll`]: 해시 기반 결정론적 롤 (seed, tick, actor, subcase).
//!   Used for presentation-only effects every participant replays locally.

use fxhash::FxHasher;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Subcase 상수
pub mod subcase {
    /// 스크램블 밀치기 성공 판정
    pub const SHOVE_ATTEMPT: u32 = 0x0100;
    /// 밀치기 넉백 흔들림
    pub const SHOVE_JITTER: u32 = 0x0101;
}

#[derive(Debug, Clone)]
pub struct OutcomeRng {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl OutcomeRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed, draws: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform in `[0, 100)`
    pub fn roll_percent(&mut self) -> f32 {
        self.draws += 1;
        self.rng.gen::<f32>() * 100.0
    }

    /// Single uniform comparison against a percentage.
    pub fn chance(&mut self, percent: f32) -> bool {
        self.roll_percent() < percent
    }

    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        self.draws += 1;
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Index in `0..len` (0 when empty)
    pub fn pick(&mut self, len: usize) -> usize {
        self.draws += 1;
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Deterministic `[0, 1)` roll for presentation effects.
#[inline]
pub fn presentation_roll(seed: u64, tick: u64, actor: usize, subcase: u32) -> f32 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    tick.hash(&mut hasher);
    actor.hash(&mut hasher);
    subcase.hash(&mut hasher);
    let t = (hasher.finish() as f64) / (u64::MAX as f64);
    (t as f32).min(0.999_999)
}
