//! Rebound scramble, clock and turbo configuration

use serde::{Deserialize, Serialize};

/// 리바운드 스크램블 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReboundConfig {
    /// 공 확보 반경 (기본: 1.5)
    pub capture_radius: f32,
    /// 하드 타임아웃 - 소프트 설정과 무관하게 발동 (기본: 3.0초)
    pub hard_timeout_secs: f32,
    /// 소프트 타임아웃 (기본: 2.0초)
    pub soft_timeout_secs: f32,
    /// 리바운드 후 백코트 규칙 유예 (기본: 40틱)
    pub backcourt_grace_ticks: u32,

    // === Scramble Shoving ===
    pub shove_enabled: bool,
    /// 공 주변 밀치기 가능 반경 (기본: 4.0)
    pub shove_ball_radius: f32,
    /// 상대와의 최대 거리 (기본: 2.0)
    pub shove_reach: f32,
    pub shove_base: f32,
    pub shove_per_power: f32,
    pub shove_victim_resist: f32,
    pub shove_min: f32,
    pub shove_max: f32,
    pub shove_knockback: f32,
    pub shove_cooldown_ticks: u32,
    pub shove_turbo_cost: f32,
}

impl Default for ReboundConfig {
    fn default() -> Self {
        Self {
            capture_radius: 1.5,
            hard_timeout_secs: 3.0,
            soft_timeout_secs: 2.0,
            backcourt_grace_ticks: 40,

            shove_enabled: true,
            shove_ball_radius: 4.0,
            shove_reach: 2.0,
            shove_base: 0.15,
            shove_per_power: 0.05,
            shove_victim_resist: 0.03,
            shove_min: 0.05,
            shove_max: 0.8,
            shove_knockback: 2.5,
            shove_cooldown_ticks: 20,
            shove_turbo_cost: 10.0,
        }
    }
}

/// 게임/샷 클락
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub ticks_per_second: u32,
    /// 쿼터 길이 (기본: 180초)
    pub quarter_secs: f32,
    pub shot_clock_secs: f32,
    pub shot_clock_runs_in_scramble: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            quarter_secs: 180.0,
            shot_clock_secs: 24.0,
            shot_clock_runs_in_scramble: false,
        }
    }
}

impl ClockConfig {
    pub fn secs_to_ticks(&self, secs: f32) -> u64 {
        (secs.max(0.0) * self.ticks_per_second as f32).round() as u64
    }

    pub fn tick_secs(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }
}

/// 터보 게이지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurboConfig {
    pub regen_per_tick: f32,
    /// AI 컨테스트 터보 버스트 비용 (기본: 15)
    pub burst_cost: f32,
    pub burst_ticks: u32,
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self { regen_per_tick: 0.5, burst_cost: 15.0, burst_ticks: 10 }
    }
}
