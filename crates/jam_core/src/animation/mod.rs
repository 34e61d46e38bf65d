//! Animation Sequencer
//!
//! Non-blocking cooperative scheduler for visual sequences. A resolution engine
//! enqueues a [`SequenceSpec`] carrying data plus a completion payload `C`; the
//! owning loop calls [`AnimationSequencer::advance`] once per tick and receives
//! the payloads of every sequence that finished on that tick. Each payload is
//! handed out exactly once.

mod easing;

pub use easing::{arc_height, Easing};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::CourtPos;
use crate::state::FlightFrame;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct SequenceId(pub u64);

/// Sample emitted for every advanced step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceFrame {
    pub id: SequenceId,
    pub step: u32,
    pub progress: f32,
    pub pos: CourtPos,
    pub height: f32,
}

/// Per-step callback
pub type StepHook = Box<dyn FnMut(&SequenceFrame)>;

/// Description of a visual sequence
pub struct SequenceSpec<C> {
    pub label: &'static str,
    pub from: CourtPos,
    pub to: CourtPos,
    pub duration_ticks: u32,
    pub easing: Easing,
    pub arc_height: f32,
    /// Precomputed frames (dunk flight plans). Overrides from/to interpolation.
    pub path: Option<Vec<FlightFrame>>,
    pub on_step: Option<StepHook>,
    pub completion: C,
}

impl<C> SequenceSpec<C> {
    pub fn straight(label: &'static str, from: CourtPos, to: CourtPos, duration_ticks: u32, completion: C) -> Self {
        Self {
            label,
            from,
            to,
            duration_ticks,
            easing: Easing::Linear,
            arc_height: 0.0,
            path: None,
            on_step: None,
            completion,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_arc(mut self, apex: f32) -> Self {
        self.arc_height = apex;
        self
    }

    pub fn with_path(mut self, frames: Vec<FlightFrame>) -> Self {
        self.duration_ticks = frames.len() as u32;
        self.path = Some(frames);
        self
    }

    pub fn with_step_hook(mut self, hook: StepHook) -> Self {
        self.on_step = Some(hook);
        self
    }
}

/// A finished sequence
#[derive(Debug)]
pub struct Completed<C> {
    pub id: SequenceId,
    pub label: &'static str,
    pub final_pos: CourtPos,
    pub completion: C,
}

struct ActiveSequence<C> {
    id: SequenceId,
    label: &'static str,
    from: CourtPos,
    to: CourtPos,
    duration_ticks: u32,
    easing: Easing,
    arc_height: f32,
    path: Option<Vec<FlightFrame>>,
    on_step: Option<StepHook>,
    elapsed: u32,
    current: CourtPos,
    completion: Option<C>,
    /// continuation 이미 발사됨
    consumed: bool,
}

impl<C> ActiveSequence<C> {
    fn sample(&self, step: u32) -> (CourtPos, f32, f32) {
        let progress = if self.duration_ticks == 0 {
            1.0
        } else {
            (step as f32 / self.duration_ticks as f32).min(1.0)
        };
        if let Some(frames) = &self.path {
            if let Some(frame) = frames.get((step.max(1) - 1) as usize).or(frames.last()) {
                return (frame.pos, frame.height, progress);
            }
        }
        let eased = self.easing.apply(progress);
        (self.from.lerp(self.to, eased), arc_height(self.arc_height, progress), progress)
    }
}

/// Cooperative sequencer; never blocks
pub struct AnimationSequencer<C> {
    sequences: Vec<ActiveSequence<C>>,
    next_id: u64,
    completed_total: u64,
}

impl<C> Default for AnimationSequencer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> AnimationSequencer<C> {
    pub fn new() -> Self {
        Self { sequences: Vec::new(), next_id: 1, completed_total: 0 }
    }

    pub fn enqueue(&mut self, spec: SequenceSpec<C>) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        log::trace!("sequence {:?} '{}' queued for {} ticks", id, spec.label, spec.duration_ticks);
        self.sequences.push(ActiveSequence {
            id,
            label: spec.label,
            from: spec.from,
            to: spec.to,
            duration_ticks: spec.duration_ticks,
            easing: spec.easing,
            arc_height: spec.arc_height,
            path: spec.path,
            on_step: spec.on_step,
            elapsed: 0,
            current: spec.from,
            completion: Some(spec.completion),
            consumed: false,
        });
        id
    }

    /// Advance every sequence one step. Returns the completions that fired this tick,
    /// in enqueue order.
    pub fn advance(&mut self) -> Vec<Completed<C>> {
        let mut finished = Vec::new();
        for seq in self.sequences.iter_mut() {
            seq.elapsed = seq.elapsed.saturating_add(1);
            let (pos, height, progress) = seq.sample(seq.elapsed);
            seq.current = pos;
            if let Some(hook) = seq.on_step.as_mut() {
                hook(&SequenceFrame { id: seq.id, step: seq.elapsed, progress, pos, height });
            }
            if seq.elapsed >= seq.duration_ticks && !seq.consumed {
                seq.consumed = true;
                if let Some(completion) = seq.completion.take() {
                    finished.push(Completed {
                        id: seq.id,
                        label: seq.label,
                        final_pos: pos,
                        completion,
                    });
                }
            }
        }
        self.sequences.retain(|s| !s.consumed);
        self.completed_total += finished.len() as u64;
        if !finished.is_empty() {
            log::trace!("{} sequence(s) completed", finished.len());
        }
        finished
    }

    /// Live position of an active sequence.
    pub fn position(&self, id: SequenceId) -> Option<CourtPos> {
        self.sequences.iter().find(|s| s.id == id).map(|s| s.current)
    }

    pub fn is_active(&self, id: SequenceId) -> bool {
        self.sequences.iter().any(|s| s.id == id)
    }

    /// Drop a sequence without firing its completion.
    pub fn cancel(&mut self, id: SequenceId) -> bool {
        let before = self.sequences.len();
        self.sequences.retain(|s| s.id != id);
        before != self.sequences.len()
    }

    pub fn active_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn active_labels(&self) -> Vec<&'static str> {
        self.sequences.iter().map(|s| s.label).collect()
    }

    pub fn completed_total(&self) -> u64 {
        self.completed_total
    }
}
