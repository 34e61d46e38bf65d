//! Difficulty presets
//!
//! 난이도 프리셋 테이블 (1..5 + 특수). `apply`는 설정을 제자리에서 바꾸고
//! 최초 값은 한 번만 캡처한다. reset 없이 반복 호출하면 no-op.

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::config::DifficultyScalars;

/// One row of the preset table
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyPreset {
    pub id: &'static str,
    /// 기준값에 곱해지는 AI 공격 배율
    pub offense_scale: f32,
    /// 기준값에 곱해지는 AI 수비 배율
    pub defense_scale: f32,
    /// 고정 터보 상한
    pub turbo_capacity: f32,
    pub reaction_ticks: u32,
}

static PRESETS: Lazy<Vec<DifficultyPreset>> = Lazy::new(|| {
    let row = |id, offense_scale, defense_scale, turbo_capacity, reaction_ticks| DifficultyPreset {
        id,
        offense_scale,
        defense_scale,
        turbo_capacity,
        reaction_ticks,
    };
    vec![
        row("1", 0.80, 0.75, 80.0, 14),
        row("2", 0.90, 0.88, 90.0, 11),
        row("3", 1.00, 1.00, 100.0, 8),
        row("4", 1.08, 1.12, 110.0, 6),
        row("5", 1.15, 1.25, 120.0, 4),
        row("showtime", 1.20, 0.90, 130.0, 6),
        row("nightmare", 1.25, 1.40, 140.0, 2),
    ]
});

/// Ordered preset table.
pub fn presets() -> &'static [DifficultyPreset] {
    &PRESETS
}

pub fn find_preset(id: &str) -> Option<&'static DifficultyPreset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DifficultyOutcome {
    Applied(&'static str),
    /// Already applied; nothing changed
    Unchanged,
    /// Unknown id, baseline kept
    Baseline,
}

/// Applies presets to [`DifficultyScalars`] in place, reversibly.
#[derive(Debug, Default)]
pub struct DifficultyController {
    baseline: Option<DifficultyScalars>,
    applied: Option<&'static str>,
}

impl DifficultyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Option<&'static str> {
        self.applied
    }

    pub fn apply(&mut self, id: &str, scalars: &mut DifficultyScalars) -> DifficultyOutcome {
        if self.applied.is_some() {
            return DifficultyOutcome::Unchanged;
        }
        let baseline = self.baseline.get_or_insert_with(|| scalars.clone()).clone();

        let Some(preset) = find_preset(id) else {
            warn!("unknown difficulty '{}'; keeping baseline", id);
            *scalars = baseline;
            return DifficultyOutcome::Baseline;
        };

        scalars.offense_scale = baseline.offense_scale * preset.offense_scale;
        scalars.defense_scale = baseline.defense_scale * preset.defense_scale;
        scalars.turbo_capacity = preset.turbo_capacity;
        scalars.reaction_ticks = preset.reaction_ticks;
        self.applied = Some(preset.id);
        info!("difficulty '{}' applied", preset.id);
        DifficultyOutcome::Applied(preset.id)
    }

    /// Restore the captured baseline.
    pub fn reset(&mut self, scalars: &mut DifficultyScalars) {
        if let Some(baseline) = self.baseline.take() {
            *scalars = baseline;
        }
        self.applied = None;
    }
}
