//! Shot / dunk / pass resolution tuning

use serde::{Deserialize, Serialize};

/// 점프슛 확률 모델 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    // === Distance Buckets (weighted units) ===
    /// 레이업 거리 (기본: 4)
    pub layup_range: f32,
    /// 근거리 (기본: 10)
    pub close_range: f32,
    /// 딥 3점 시작 거리 (기본: 30)
    pub deep_range: f32,
    /// 최대 유효 사거리 - 초과 시 페널티 (기본: 34)
    pub max_range: f32,

    // === Base Chances (%) ===
    pub base_layup: f32,
    pub base_close: f32,
    pub base_mid: f32,
    pub base_three: f32,
    pub base_deep: f32,

    // === Attribute Factor ===
    /// 능력치 0 → 0.7배
    pub attr_factor_min: f32,
    /// 능력치 10 → 1.3배
    pub attr_factor_max: f32,
    /// 이 거리 이내는 덩크 능력치, 밖은 3점 능력치 사용 (기본: 8)
    pub dunk_skill_range: f32,

    // === Bonuses / Penalties ===
    pub corner_three_bonus: f32,
    /// 사거리 초과 1단위당 페널티 (기본: 3)
    pub overshoot_penalty_per_unit: f32,
    pub heat_bonus_per_streak: f32,
    pub heat_bonus_cap: f32,
    pub on_fire_bonus: f32,

    // === Defender Contest ===
    /// 수비 컨테스트 반경 (기본: 6)
    pub contest_radius: f32,
    /// 최대 컨테스트 페널티 (기본: 30)
    pub max_contest_penalty: f32,
    /// 슈터 뒤쪽 수비수 커버리지 (기본: 0.3)
    pub behind_coverage: f32,

    // === Clamp ===
    pub min_chance: f32,
    pub max_chance: f32,
    pub on_fire_max_chance: f32,

    // === Jump Shot Block ===
    /// 점프슛 블록 가능 반경 (기본: 2.5)
    pub jump_block_radius: f32,
    /// 점프슛 블록 확률 보정 (기본: -14)
    pub jump_block_adjust: f32,

    // === Heat ===
    /// 온파이어 진입 연속 득점 (기본: 3)
    pub on_fire_streak: u8,
    /// 온파이어 시 유효 능력치 보너스 (기본: 2)
    pub on_fire_attribute_bonus: f32,

    // === Animation ===
    pub base_duration_ticks: u32,
    pub duration_per_unit: f32,
    /// 득점 후 인바운드까지 대기 (기본: 20틱)
    pub result_hold_ticks: u32,
    /// 리바운드 낙하 지점 분산 (기본: 6)
    pub rebound_spread: f32,
    /// 림 → 리바운드 지점 바운스 시간 (기본: 16틱)
    pub bounce_ticks: u32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            layup_range: 4.0,
            close_range: 10.0,
            deep_range: 30.0,
            max_range: 34.0,

            base_layup: 85.0,
            base_close: 70.0,
            base_mid: 55.0,
            base_three: 40.0,
            base_deep: 15.0,

            attr_factor_min: 0.7,
            attr_factor_max: 1.3,
            dunk_skill_range: 8.0,

            corner_three_bonus: 5.0,
            overshoot_penalty_per_unit: 3.0,
            heat_bonus_per_streak: 2.0,
            heat_bonus_cap: 6.0,
            on_fire_bonus: 12.0,

            contest_radius: 6.0,
            max_contest_penalty: 30.0,
            behind_coverage: 0.3,

            min_chance: 15.0,
            max_chance: 95.0,
            on_fire_max_chance: 99.0,

            jump_block_radius: 2.5,
            jump_block_adjust: -14.0,

            on_fire_streak: 3,
            on_fire_attribute_bonus: 2.0,

            base_duration_ticks: 12,
            duration_per_unit: 0.4,
            result_hold_ticks: 20,
            rebound_spread: 6.0,
            bounce_ticks: 16,
        }
    }
}

/// 덩크 서브모델 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DunkConfig {
    /// 덩크 가능 가중 거리 (기본: 8)
    pub range: f32,
    /// 온파이어 시 덩크 거리 (기본: 12)
    pub on_fire_range: f32,
    /// 최소 덩크 능력치 (기본: 4)
    pub min_skill: f32,

    // === Success Chance ===
    pub base_chance: f32,
    pub per_skill: f32,
    pub contest_radius: f32,
    pub contest_base_penalty: f32,
    pub contest_per_block: f32,
    pub close_range: f32,
    pub close_bonus: f32,
    pub heat_per_streak: f32,
    pub on_fire_bonus: f32,
    pub min_chance: f32,
    pub max_chance: f32,

    // === Block Roll ===
    pub block_base: f32,
    pub block_per_skill: f32,
    /// 분리 거리 1단위당 블록 확률 감소 (기본: 4)
    pub block_separation_penalty: f32,
    pub block_dunker_skill_penalty: f32,
    pub block_turbo_penalty: f32,
    pub block_min: f32,
    pub block_max: f32,

    // === Contest Defender Selection ===
    pub contest_search_radius: f32,
    pub weight_dunker_proximity: f32,
    pub weight_rim_proximity: f32,
    pub weight_block_skill: f32,
    pub weight_turbo: f32,

    // === Flight Plan ===
    pub base_arc: f32,
    pub arc_per_skill: f32,
    pub max_arc: f32,
    pub base_duration_ticks: u32,
    /// 행 덩크 정점 유지 틱 (기본: 6)
    pub hang_hold_ticks: u32,
}

impl Default for DunkConfig {
    fn default() -> Self {
        Self {
            range: 8.0,
            on_fire_range: 12.0,
            min_skill: 4.0,

            base_chance: 48.0,
            per_skill: 5.0,
            contest_radius: 5.0,
            contest_base_penalty: 10.0,
            contest_per_block: 3.0,
            close_range: 3.0,
            close_bonus: 6.0,
            heat_per_streak: 2.0,
            on_fire_bonus: 10.0,
            min_chance: 25.0,
            max_chance: 98.0,

            block_base: 34.0,
            block_per_skill: 7.0,
            block_separation_penalty: 4.0,
            block_dunker_skill_penalty: 2.0,
            block_turbo_penalty: 5.0,
            block_min: 12.0,
            block_max: 92.0,

            contest_search_radius: 10.0,
            weight_dunker_proximity: 0.4,
            weight_rim_proximity: 0.3,
            weight_block_skill: 0.2,
            weight_turbo: 0.1,

            base_arc: 2.0,
            arc_per_skill: 0.35,
            max_arc: 6.0,
            base_duration_ticks: 18,
            hang_hold_ticks: 6,
        }
    }
}

/// 패스 / 인터셉트 파라미터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// 패스 경로로부터 인터셉트 가능 거리 (기본: 2.0)
    pub intercept_radius: f32,
    pub steal_base: f32,
    pub steal_per_skill: f32,
    pub steal_max: f32,
    /// 패스 속도 (단위/틱) (기본: 2.5)
    pub pass_speed: f32,
    pub min_duration_ticks: u32,
    /// 대기 패스 만료 (기본: 1.5초)
    pub queue_timeout_secs: f32,
    /// 어시스트 인정 시간 (기본: 3초)
    pub assist_window_secs: f32,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            intercept_radius: 2.0,
            steal_base: 20.0,
            steal_per_skill: 6.0,
            steal_max: 85.0,
            pass_speed: 2.5,
            min_duration_ticks: 3,
            queue_timeout_secs: 1.5,
            assist_window_secs: 3.0,
        }
    }
}
