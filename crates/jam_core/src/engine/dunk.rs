//! Dunk sub-model: eligibility, style, flight plan and contest selection

use crate::animation::{arc_height, Easing};
use crate::config::DunkConfig;
use crate::models::{AttributeKind, CourtPos, PlayerEntity, PlayerId};
use crate::state::{DunkStyle, FlightFrame, FlightPlan};

use super::capabilities::AttributeProvider;
use super::rng::OutcomeRng;

/// 덩크 가능 여부
///
/// On fire: anywhere within `on_fire_range`. Otherwise the shooter must be in
/// the key, within `range`, and either rated for it or buffed well past it.
pub fn is_eligible(cfg: &DunkConfig, distance: f32, inside_key: bool, raw_skill: f32, effective_skill: f32, on_fire: bool) -> bool {
    if on_fire && distance <= cfg.on_fire_range {
        return true;
    }
    inside_key
        && distance <= cfg.range
        && (raw_skill >= cfg.min_skill || effective_skill >= cfg.min_skill + 2.0)
}

/// Styles the dunker can pull off.
pub fn available_styles(attributes: &dyn AttributeProvider, dunker: &PlayerEntity) -> Vec<DunkStyle> {
    let dunk = attributes.effective(dunker, AttributeKind::Dunk);
    let mut styles = vec![DunkStyle::Standard];
    if attributes.effective(dunker, AttributeKind::Power) >= 6.0 {
        styles.push(DunkStyle::Power);
    }
    if attributes.effective(dunker, AttributeKind::Speed) >= 6.0 {
        styles.push(DunkStyle::Glide);
    }
    if dunk >= 7.0 {
        styles.push(DunkStyle::Hang);
    }
    if dunk >= 8.0 || dunker.flags.on_fire {
        styles.push(DunkStyle::Windmill);
    }
    styles
}

pub fn choose_style(rng: &mut OutcomeRng, attributes: &dyn AttributeProvider, dunker: &PlayerEntity) -> DunkStyle {
    let styles = available_styles(attributes, dunker);
    styles.get(rng.pick(styles.len())).copied().unwrap_or(DunkStyle::Standard)
}

pub fn style_easing(style: DunkStyle) -> Easing {
    match style {
        DunkStyle::Standard => Easing::EaseInOut,
        DunkStyle::Power => Easing::EaseIn,
        DunkStyle::Glide => Easing::Linear,
        DunkStyle::Hang => Easing::EaseOut,
        DunkStyle::Windmill => Easing::Smoother,
    }
}

fn style_duration(cfg: &DunkConfig, style: DunkStyle) -> u32 {
    let base = cfg.base_duration_ticks.max(2);
    match style {
        DunkStyle::Power => base.saturating_sub(4).max(2),
        DunkStyle::Glide => base + 4,
        DunkStyle::Windmill => base + 2,
        DunkStyle::Standard | DunkStyle::Hang => base,
    }
}

/// Sampled takeoff → rim trajectory. Hang dunks hold the apex for `hang_hold_ticks`.
pub fn build_flight_plan(cfg: &DunkConfig, style: DunkStyle, origin: CourtPos, rim: CourtPos, skill: f32) -> FlightPlan {
    let apex = (cfg.base_arc + cfg.arc_per_skill * skill.max(0.0)).min(cfg.max_arc);
    let steps = style_duration(cfg, style);
    let easing = style_easing(style);

    let mut frames = Vec::with_capacity(steps as usize + cfg.hang_hold_ticks as usize);
    let mut held = false;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let frame = FlightFrame { pos: origin.lerp(rim, easing.apply(t)), height: arc_height(apex, t), progress: t };
        frames.push(frame);
        if style == DunkStyle::Hang && !held && t >= 0.5 {
            held = true;
            for _ in 0..cfg.hang_hold_ticks {
                frames.push(frame);
            }
        }
    }
    FlightPlan { style, frames, apex_height: apex, block_frame: None }
}

/// Frame with the smallest separation to `defender` (earliest on ties).
pub fn closest_frame(plan: &FlightPlan, defender: CourtPos) -> Option<(usize, f32)> {
    plan.frames
        .iter()
        .enumerate()
        .map(|(i, f)| (i, f.pos.distance(defender)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
}

/// Pick the contesting defender by weighted score; ties go to the lower id.
pub fn select_contest_defender<'a>(
    cfg: &DunkConfig,
    attributes: &dyn AttributeProvider,
    dunker: CourtPos,
    rim: CourtPos,
    defenders: impl IntoIterator<Item = &'a PlayerEntity>,
) -> Option<PlayerId> {
    let radius = cfg.contest_search_radius.max(f32::EPSILON);
    defenders
        .into_iter()
        .filter(|d| d.position.distance(dunker) <= radius)
        .map(|d| {
            let near_dunker = 1.0 - d.position.distance(dunker) / radius;
            let near_rim = (1.0 - d.position.distance(rim) / radius).max(0.0);
            let block = attributes.effective(d, AttributeKind::Block) / 10.0;
            let turbo = if d.flags.turbo_capacity > 0.0 { d.flags.turbo / d.flags.turbo_capacity } else { 0.0 };
            let score = cfg.weight_dunker_proximity * near_dunker
                + cfg.weight_rim_proximity * near_rim
                + cfg.weight_block_skill * block
                + cfg.weight_turbo * turbo;
            (d.id, score)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::capabilities::BuffedAttributes;
    use crate::models::{AttributeSet, TeamSide};

    fn attrs() -> BuffedAttributes {
        BuffedAttributes { on_fire_bonus: 2.0 }
    }

    #[test]
    fn test_eligibility() {
        let cfg = DunkConfig::default();
        assert!(is_eligible(&cfg, 6.0, true, 5.0, 5.0, false));
        assert!(!is_eligible(&cfg, 6.0, false, 9.0, 9.0, false));
        assert!(!is_eligible(&cfg, 6.0, true, 3.0, 5.0, false));
        assert!(is_eligible(&cfg, 6.0, true, 3.0, 6.0, false));
        assert!(is_eligible(&cfg, 11.0, false, 0.0, 0.0, true));
        assert!(!is_eligible(&cfg, 13.0, true, 9.0, 9.0, true));
    }

    #[test]
    fn test_flight_plan_reaches_rim() {
        let cfg = DunkConfig::default();
        let origin = CourtPos::new(76.0, 20.0);
        let rim = CourtPos::new(83.0, 20.0);
        for style in [DunkStyle::Standard, DunkStyle::Power, DunkStyle::Glide, DunkStyle::Windmill] {
            let plan = build_flight_plan(&cfg, style, origin, rim, 8.0);
            let last = plan.frames.last().unwrap();
            assert!(last.pos.distance(rim) < 1e-3, "{:?}", style);
            assert!(last.height.abs() < 1e-3);
            assert!(plan.apex_height <= cfg.max_arc);
        }
    }

    #[test]
    fn test_hang_holds_apex() {
        let cfg = DunkConfig::default();
        let origin = CourtPos::new(76.0, 20.0);
        let rim = CourtPos::new(83.0, 20.0);
        let standard = build_flight_plan(&cfg, DunkStyle::Standard, origin, rim, 5.0);
        let hang = build_flight_plan(&cfg, DunkStyle::Hang, origin, rim, 5.0);
        assert_eq!(hang.frames.len(), standard.frames.len() + cfg.hang_hold_ticks as usize);
    }

    #[test]
    fn test_contest_prefers_close_shot_blocker() {
        let cfg = DunkConfig::default();
        let dunker = CourtPos::new(76.0, 20.0);
        let rim = CourtPos::new(83.0, 20.0);
        let mut near = PlayerEntity::new(2, "B1", TeamSide::Away, CourtPos::new(79.0, 20.0), AttributeSet::uniform(5.0));
        near.attributes.block = 9.0;
        let far = PlayerEntity::new(3, "B2", TeamSide::Away, CourtPos::new(70.0, 30.0), AttributeSet::uniform(5.0));
        let outside = PlayerEntity::new(4, "B3", TeamSide::Away, CourtPos::new(40.0, 5.0), AttributeSet::uniform(9.0));
        let picked = select_contest_defender(&cfg, &attrs(), dunker, rim, [&far, &near, &outside]);
        assert_eq!(picked, Some(PlayerId(2)));
    }

    #[test]
    fn test_style_pool_grows_with_skill() {
        let average = PlayerEntity::new(0, "A", TeamSide::Home, CourtPos::default(), AttributeSet::uniform(5.0));
        assert_eq!(available_styles(&attrs(), &average), vec![DunkStyle::Standard]);
        let star = PlayerEntity::new(1, "S", TeamSide::Home, CourtPos::default(), AttributeSet::uniform(9.0));
        assert_eq!(available_styles(&attrs(), &star).len(), 5);
    }
}
