//! Shot probability models (pure functions)
//!
//! 모든 확률은 % 단위. Inputs are plain numbers so the models can be property
//! tested without a court.

use crate::config::{DunkConfig, ShotConfig};
use crate::state::DunkStyle;

/// One defender's contest on a jump shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefenderContest {
    pub distance: f32,
    /// cos(angle) between shooter→rim and shooter→defender. 1.0 = squarely in front.
    pub facing: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpShotInputs {
    /// Weighted distance to the rim
    pub distance: f32,
    pub is_three: bool,
    pub is_corner_three: bool,
    /// Relevant effective skill (dunk inside range, three-point outside)
    pub skill: f32,
    pub heat_streak: u8,
    pub on_fire: bool,
    pub defenders: Vec<DefenderContest>,
    pub offense_scale: f32,
    pub defense_scale: f32,
}

/// Base chance by distance bucket.
pub fn base_chance(cfg: &ShotConfig, distance: f32, is_three: bool) -> f32 {
    if is_three {
        if distance > cfg.deep_range {
            cfg.base_deep
        } else {
            cfg.base_three
        }
    } else if distance <= cfg.layup_range {
        cfg.base_layup
    } else if distance <= cfg.close_range {
        cfg.base_close
    } else {
        cfg.base_mid
    }
}

/// 0 → `attr_factor_min`, 10 → `attr_factor_max`. Buffed skill past 10 saturates.
pub fn attribute_factor(cfg: &ShotConfig, skill: f32) -> f32 {
    cfg.attr_factor_min + (cfg.attr_factor_max - cfg.attr_factor_min) * (skill.clamp(0.0, 10.0) / 10.0)
}

/// Defenders behind the shooter (facing ≤ 0) only cover `behind_coverage`.
pub fn coverage(cfg: &ShotConfig, facing: f32) -> f32 {
    let facing = facing.clamp(-1.0, 1.0);
    if facing <= 0.0 {
        cfg.behind_coverage
    } else {
        cfg.behind_coverage + (1.0 - cfg.behind_coverage) * facing
    }
}

pub fn contest_penalty(cfg: &ShotConfig, contest: &DefenderContest, defense_scale: f32) -> f32 {
    if cfg.contest_radius <= 0.0 || contest.distance >= cfg.contest_radius {
        return 0.0;
    }
    let closeness = 1.0 - contest.distance.max(0.0) / cfg.contest_radius;
    cfg.max_contest_penalty * closeness * coverage(cfg, contest.facing) * defense_scale.max(0.0)
}

pub fn chance_ceiling(cfg: &ShotConfig, on_fire: bool) -> f32 {
    if on_fire {
        cfg.on_fire_max_chance
    } else {
        cfg.max_chance
    }
}

pub fn clamp_jump_chance(cfg: &ShotConfig, chance: f32, on_fire: bool) -> f32 {
    let chance = if chance.is_finite() { chance } else { cfg.min_chance };
    chance.clamp(cfg.min_chance, chance_ceiling(cfg, on_fire))
}

/// Jump-shot make chance before rubber banding, clamped.
pub fn jump_shot_chance(cfg: &ShotConfig, inputs: &JumpShotInputs) -> f32 {
    let mut chance = base_chance(cfg, inputs.distance, inputs.is_three)
        * attribute_factor(cfg, inputs.skill);

    if inputs.is_corner_three {
        chance += cfg.corner_three_bonus;
    }
    if inputs.distance > cfg.max_range {
        chance -= (inputs.distance - cfg.max_range) * cfg.overshoot_penalty_per_unit;
    }
    chance += (inputs.heat_streak as f32 * cfg.heat_bonus_per_streak).min(cfg.heat_bonus_cap);
    if inputs.on_fire {
        chance += cfg.on_fire_bonus;
    }

    // 가장 강한 컨테스트 하나만 적용
    let penalty = inputs
        .defenders
        .iter()
        .map(|d| contest_penalty(cfg, d, inputs.defense_scale))
        .fold(0.0_f32, f32::max);
    chance -= penalty;

    chance *= inputs.offense_scale.max(0.0);
    clamp_jump_chance(cfg, chance, inputs.on_fire)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DunkInputs {
    pub effective_dunk: f32,
    pub distance_to_rim: f32,
    /// (distance, effective block) of the nearest defender
    pub nearest_defender: Option<(f32, f32)>,
    pub heat_streak: u8,
    pub on_fire: bool,
    pub offense_scale: f32,
    pub defense_scale: f32,
}

pub fn clamp_dunk_chance(cfg: &DunkConfig, chance: f32) -> f32 {
    let chance = if chance.is_finite() { chance } else { cfg.min_chance };
    chance.clamp(cfg.min_chance, cfg.max_chance)
}

/// Dunk success chance before rubber banding, clamped to `[min_chance, max_chance]`.
pub fn dunk_chance(cfg: &DunkConfig, inputs: &DunkInputs) -> f32 {
    let mut chance = cfg.base_chance + cfg.per_skill * inputs.effective_dunk;

    if let Some((distance, block)) = inputs.nearest_defender {
        if cfg.contest_radius > 0.0 && distance < cfg.contest_radius {
            let closeness = 1.0 - distance.max(0.0) / cfg.contest_radius;
            chance -= (cfg.contest_base_penalty + cfg.contest_per_block * block.max(0.0))
                * closeness
                * inputs.defense_scale.max(0.0);
        }
    }
    if inputs.distance_to_rim <= cfg.close_range {
        chance += cfg.close_bonus;
    }
    chance += inputs.heat_streak as f32 * cfg.heat_per_streak;
    if inputs.on_fire {
        chance += cfg.on_fire_bonus;
    }
    chance *= inputs.offense_scale.max(0.0);
    clamp_dunk_chance(cfg, chance)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInputs {
    pub block_skill: f32,
    pub separation: f32,
    pub shooter_skill: f32,
    pub shooter_turbo: bool,
    /// Style / shot-type adjustment (percentage points)
    pub adjust: f32,
    /// Rubber-band block bonus of the defending team
    pub bonus: f32,
    pub defense_scale: f32,
}

/// Block roll chance, clamped to `[block_min, block_max]`.
pub fn block_chance(cfg: &DunkConfig, inputs: &BlockInputs) -> f32 {
    let mut chance = cfg.block_base + cfg.block_per_skill * inputs.block_skill.max(0.0);
    chance -= cfg.block_separation_penalty * inputs.separation.max(0.0);
    chance -= cfg.block_dunker_skill_penalty * inputs.shooter_skill.max(0.0);
    if inputs.shooter_turbo {
        chance -= cfg.block_turbo_penalty;
    }
    chance += inputs.adjust + inputs.bonus;
    chance *= inputs.defense_scale.max(0.0);
    let chance = if chance.is_finite() { chance } else { cfg.block_min };
    chance.clamp(cfg.block_min, cfg.block_max)
}

/// How easy each dunk style is to meet at the rim.
pub fn style_block_adjust(style: DunkStyle) -> f32 {
    match style {
        DunkStyle::Standard => 0.0,
        DunkStyle::Power => 4.0,
        DunkStyle::Glide => -4.0,
        DunkStyle::Hang => -6.0,
        DunkStyle::Windmill => 2.0,
    }
}
