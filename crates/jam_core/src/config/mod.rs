//! # Engine Configuration Module
//!
//! 모든 튜닝 상수를 중앙에서 관리하는 설정 시스템.
//!
//! ## 프리셋
//! - `arcade` (기본): 러버밴딩 on, 온파이어 on
//! - `tournament`: 러버밴딩 off, 슛 상한 낮춤
//! - `deterministic`: 테스트용 (러버밴딩 off, 밀치기 off)
//!
//! ## 사용법
//! ```rust
//! use jam_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let tournament = EngineConfig::tournament();
//! assert!(config.rubber_band.is_some());
//! assert!(tournament.rubber_band.is_none());
//! ```

mod court_config;
mod difficulty_config;
mod rebound_config;
mod resolution_config;
mod rubber_band_config;

pub use court_config::CourtConfig;
pub use difficulty_config::{DifficultyScalars, TeamControl};
pub use rebound_config::{ClockConfig, ReboundConfig, TurboConfig};
pub use resolution_config::{DunkConfig, PassConfig, ShotConfig};
pub use rubber_band_config::{RubberBandBonuses, RubberBandProfile, RubberBandTier};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// 전체 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub court: CourtConfig,
    pub shot: ShotConfig,
    pub dunk: DunkConfig,
    pub pass: PassConfig,
    pub rebound: ReboundConfig,
    pub clock: ClockConfig,
    pub turbo: TurboConfig,
    /// 없으면 중립 (보너스 없음)
    pub rubber_band: Option<RubberBandProfile>,
    pub difficulty: DifficultyScalars,
    pub control: TeamControl,
    /// 상태 변경 로그 최대 길이
    pub change_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            court: CourtConfig::default(),
            shot: ShotConfig::default(),
            dunk: DunkConfig::default(),
            pass: PassConfig::default(),
            rebound: ReboundConfig::default(),
            clock: ClockConfig::default(),
            turbo: TurboConfig::default(),
            rubber_band: Some(RubberBandProfile::default()),
            difficulty: DifficultyScalars::default(),
            control: TeamControl::default(),
            change_log_capacity: 512,
        }
    }
}

impl EngineConfig {
    /// 아케이드 (기본)
    pub fn arcade() -> Self {
        Self::default()
    }

    /// 토너먼트: 러버밴딩 없음, 슛 상한 낮춤
    pub fn tournament() -> Self {
        let mut cfg = Self::default();
        cfg.rubber_band = None;
        cfg.shot.max_chance = 90.0;
        cfg.shot.on_fire_max_chance = 95.0;
        cfg.dunk.max_chance = 95.0;
        cfg
    }

    /// 테스트용: 러버밴딩 off, 밀치기 off, 양 팀 사람 조작
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.rubber_band = None;
        cfg.rebound.shove_enabled = false;
        cfg.control = TeamControl { home_ai: false, away_ai: false };
        cfg
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Self::from_json_str(&data),
            "yaml" | "yml" => Self::from_yaml_str(&data),
            _ => Err(CoreError::UnsupportedFormat { extension }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.clock.ticks_per_second == 0 {
            return Err(CoreError::InvalidConfig("clock.ticks_per_second must be > 0".into()));
        }
        if self.court.width <= 0.0 || self.court.height <= 0.0 {
            return Err(CoreError::InvalidConfig("court dimensions must be positive".into()));
        }
        if self.shot.min_chance > self.shot.max_chance {
            return Err(CoreError::InvalidConfig(format!(
                "shot.min_chance {} > shot.max_chance {}",
                self.shot.min_chance, self.shot.max_chance
            )));
        }
        if self.dunk.min_chance > self.dunk.max_chance || self.dunk.block_min > self.dunk.block_max
        {
            return Err(CoreError::InvalidConfig("dunk chance bounds inverted".into()));
        }
        if self.rebound.hard_timeout_secs <= 0.0 {
            return Err(CoreError::InvalidConfig("rebound.hard_timeout_secs must be > 0".into()));
        }
        if let Some(profile) = &self.rubber_band {
            for tier in &profile.tiers {
                if let Some(max) = tier.max_deficit {
                    if tier.min_deficit > max {
                        return Err(CoreError::InvalidConfig(format!(
                            "rubber band tier '{}' has min_deficit {} > max_deficit {}",
                            tier.id, tier.min_deficit, max
                        )));
                    }
                }
                if tier.min_deficit == 0 {
                    // a tie never activates a tier
                    return Err(CoreError::InvalidConfig(format!(
                        "rubber band tier '{}' must have min_deficit >= 1",
                        tier.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn ticks(&self, secs: f32) -> u64 {
        self.clock.secs_to_ticks(secs)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert!((cfg.shot.min_chance - 15.0).abs() < 0.01);
        assert!((cfg.dunk.block_max - 92.0).abs() < 0.01);
        assert!(cfg.rubber_band.as_ref().map(|p| p.is_active()).unwrap_or(false));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_tournament_is_stricter() {
        let arcade = EngineConfig::arcade();
        let tournament = EngineConfig::tournament();
        assert!(tournament.rubber_band.is_none());
        assert!(tournament.shot.max_chance < arcade.shot.max_chance);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "pass": { "intercept_radius": 3.5 } }"#)
            .expect("partial config should parse");
        assert!((cfg.pass.intercept_radius - 3.5).abs() < 0.001);
        assert!((cfg.pass.queue_timeout_secs - 1.5).abs() < 0.001);
        assert_eq!(cfg.clock.ticks_per_second, 20);
    }

    #[test]
    fn test_inverted_tier_rejected() {
        let yaml = r#"
rubber_band:
  enabled: true
  tiers:
    - id: broken
      min_deficit: 9
      max_deficit: 3
"#;
        let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let err =
            EngineConfig::from_json_str(r#"{ "clock": { "ticks_per_second": 0 } }"#).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "rebound:\n  soft_timeout_secs: 1.25\nrubber_band: null").unwrap();

        let cfg = EngineConfig::load(file.path()).expect("yaml file should load");
        assert!((cfg.rebound.soft_timeout_secs - 1.25).abs() < 0.001);
        assert!(cfg.rubber_band.is_none());
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = EngineConfig::from_json_str(&json).unwrap();
        assert!((parsed.dunk.base_chance - cfg.dunk.base_chance).abs() < 0.001);
        assert_eq!(parsed.rubber_band, cfg.rubber_band);
    }
}
