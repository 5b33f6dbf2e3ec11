//! Fixed-tick effect scheduler.
//!
//! Every timed effect is a task advanced once per [`Animator::tick`]. Stepped
//! tasks walk `progress = step / steps` through their easing; timed tasks
//! (reveal, shakes) accumulate elapsed milliseconds. Object tasks look their
//! target up on every tick and skip the update when it is gone.

use novella_script::rich_text::{self, Color};
use novella_script::timing::{Easing, lerp};

use crate::runtime::stage::{Stage, StageObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Tween {
    Alpha { from: f32, to: f32 },
    Position { from: (i32, i32), to: (i32, i32) },
    Scale { from: (f32, f32), to: (f32, f32) },
    Rotation { from: f32, to: f32 },
    Tint { from: Color, to: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Alpha,
    Position,
    Scale,
    Rotation,
    Tint,
}

impl Tween {
    fn channel(&self) -> Channel {
        match self {
            Tween::Alpha { .. } => Channel::Alpha,
            Tween::Position { .. } => Channel::Position,
            Tween::Scale { .. } => Channel::Scale,
            Tween::Rotation { .. } => Channel::Rotation,
            Tween::Tint { .. } => Channel::Tint,
        }
    }

    fn apply(&self, object: &mut StageObject, t: f32) {
        match *self {
            Tween::Alpha { from, to } => object.alpha = lerp(from, to, t).clamp(0.0, 1.0),
            Tween::Position { from, to } => {
                object.x = lerp(from.0 as f32, to.0 as f32, t) as i32;
                object.y = lerp(from.1 as f32, to.1 as f32, t) as i32;
            }
            Tween::Scale { from, to } => {
                object.scale_x = lerp(from.0, to.0, t);
                object.scale_y = lerp(from.1, to.1, t);
            }
            Tween::Rotation { from, to } => object.rotation = lerp(from, to, t),
            Tween::Tint { from, to } => object.tint = Some(from.lerp(to, t)),
        }
    }
}

/// Side effects the player has to carry out on behalf of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// The reveal reached visible character `index` (1-based) and wants a letter sound.
    Letter { index: usize },
    BackgroundSwapped { name: String, locator: Option<String> },
}

#[derive(Debug, Clone)]
enum Task {
    Tween { target: String, tween: Tween },
    FadeOut { target: String },
    Crossfade { name: String, locator: Option<String>, swapped: bool },
    Transition { from: f32, to: f32 },
    Flash { color: Color },
    ObjectShake { target: String, remaining_ms: i64 },
    ScreenShake { remaining_ms: i64 },
    Reveal { text: String, total: usize, shown: usize, interval_ms: u32, elapsed_ms: u32 },
}

impl Task {
    fn target(&self) -> Option<&str> {
        match self {
            Task::Tween { target, .. } | Task::FadeOut { target } | Task::ObjectShake { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: TaskId,
    task: Task,
    step: u32,
    steps: u32,
    easing: Easing,
}

impl Slot {
    fn step(&mut self) -> f32 {
        self.step += 1;
        self.easing.apply(self.step as f32 / self.steps as f32)
    }

    fn done(&self) -> bool {
        self.step >= self.steps
    }
}

#[derive(Debug, Default)]
pub struct Animator {
    slots: Vec<Slot>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, task: Task, steps: u32, easing: Easing) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.slots.push(Slot { id, task, step: 0, steps: steps.max(1), easing });
        id
    }

    /// Starts a tween, replacing any running tween of the same property on `target`.
    pub fn tween(&mut self, target: &str, tween: Tween, steps: u32, easing: Easing) -> TaskId {
        let channel = tween.channel();
        self.slots.retain(|slot| {
            !matches!(&slot.task, Task::Tween { target: t, tween: old } if t == target && old.channel() == channel)
        });
        self.push(Task::Tween { target: target.to_string(), tween }, steps, easing)
    }

    pub fn fade_out(&mut self, target: &str, steps: u32, easing: Easing) -> TaskId {
        self.slots.retain(|slot| {
            !matches!(&slot.task, Task::Tween { target: t, tween: Tween::Alpha { .. } } if t == target)
        });
        self.push(Task::FadeOut { target: target.to_string() }, steps, easing)
    }

    /// Covers the screen over `half_steps`, swaps the background, then uncovers it.
    pub fn crossfade(&mut self, name: &str, locator: Option<String>, half_steps: u32) -> TaskId {
        self.slots.retain(|slot| !matches!(slot.task, Task::Crossfade { .. }));
        let half = half_steps.max(1);
        self.push(
            Task::Crossfade { name: name.to_string(), locator, swapped: false },
            half * 2,
            Easing::Linear,
        )
    }

    pub fn transition(&mut self, from: f32, to: f32, steps: u32) -> TaskId {
        self.slots.retain(|slot| !matches!(slot.task, Task::Transition { .. }));
        self.push(Task::Transition { from, to }, steps, Easing::Linear)
    }

    pub fn flash(&mut self, color: Color, steps: u32, easing: Easing) -> TaskId {
        self.slots.retain(|slot| !matches!(slot.task, Task::Flash { .. }));
        self.push(Task::Flash { color }, steps, easing)
    }

    /// Clears the object's shake flag after `duration_ms`.
    pub fn shake_object(&mut self, target: &str, duration_ms: u32) -> TaskId {
        self.slots
            .retain(|slot| !matches!(&slot.task, Task::ObjectShake { target: t, .. } if t == target));
        self.push(
            Task::ObjectShake { target: target.to_string(), remaining_ms: duration_ms as i64 },
            1,
            Easing::Linear,
        )
    }

    pub fn shake_screen(&mut self, duration_ms: u32) -> TaskId {
        self.slots.retain(|slot| !matches!(slot.task, Task::ScreenShake { .. }));
        self.push(Task::ScreenShake { remaining_ms: duration_ms as i64 }, 1, Easing::Linear)
    }

    /// Reveals `text` one visible character every `interval_ms`, the first at once.
    pub fn reveal(&mut self, text: &str, interval_ms: u32) -> TaskId {
        self.slots.retain(|slot| !matches!(slot.task, Task::Reveal { .. }));
        let total = rich_text::visible_length(text);
        self.push(
            Task::Reveal { text: text.to_string(), total, shown: 0, interval_ms: interval_ms.max(1), elapsed_ms: 0 },
            1,
            Easing::Linear,
        )
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        self.slots.len() != before
    }

    pub fn cancel_target(&mut self, target: &str) {
        self.slots.retain(|slot| slot.task.target() != Some(target));
    }

    pub fn cancel_all(&mut self) {
        if !self.slots.is_empty() {
            log::debug!("Cancelling {} animation task(s)", self.slots.len());
        }
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Writes the final state of every running task into `stage`, leaving the
    /// tasks themselves untouched.
    pub fn finish_all(&self, stage: &mut Stage) {
        for slot in &self.slots {
            match &slot.task {
                Task::Tween { target, tween } => {
                    if let Some(object) = stage.object_mut(target) {
                        tween.apply(object, 1.0);
                    }
                }
                Task::FadeOut { target } => {
                    stage.remove_object(target);
                }
                Task::Crossfade { name, locator, swapped } => {
                    if !*swapped {
                        stage.set_background(name, locator.clone());
                    }
                    stage.transition_alpha = 0.0;
                }
                Task::Transition { to, .. } => stage.transition_alpha = *to,
                Task::Flash { .. } => stage.overlay = Color::TRANSPARENT,
                Task::ObjectShake { target, .. } => {
                    if let Some(object) = stage.object_mut(target) {
                        object.shaking = false;
                    }
                }
                Task::ScreenShake { .. } => stage.screen_shake = 0.0,
                Task::Reveal { text, .. } => stage.message = text.clone(),
            }
        }
    }

    pub fn tick(&mut self, dt_ms: u32, stage: &mut Stage) -> Vec<Signal> {
        let mut signals = Vec::new();
        let mut finished = Vec::new();

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if advance(slot, dt_ms, stage, &mut signals) {
                finished.push(i);
            }
        }

        for i in finished.iter().rev() {
            self.slots.remove(*i);
        }
        signals
    }
}

/// Runs one tick of `slot`; `true` when the task is complete.
fn advance(slot: &mut Slot, dt_ms: u32, stage: &mut Stage, signals: &mut Vec<Signal>) -> bool {
    let steps = slot.steps;
    let stepped = matches!(
        slot.task,
        Task::Tween { .. } | Task::FadeOut { .. } | Task::Flash { .. } | Task::Transition { .. }
    );
    if stepped {
        let t = slot.step();
        match &slot.task {
            Task::Tween { target, tween } => {
                if let Some(object) = stage.object_mut(target) {
                    tween.apply(object, t);
                }
            }
            Task::FadeOut { target } => {
                if let Some(object) = stage.object_mut(target) {
                    object.alpha = (1.0 - t).clamp(0.0, 1.0);
                }
                if slot.done() {
                    stage.remove_object(target);
                }
            }
            Task::Flash { color } => {
                stage.overlay = if slot.done() {
                    Color::TRANSPARENT
                } else {
                    color.with_alpha(color.alpha() * (1.0 - t))
                };
            }
            Task::Transition { from, to } => {
                stage.transition_alpha = lerp(*from, *to, t);
            }
            _ => {}
        }
        return slot.done();
    }

    match &mut slot.task {
        Task::Crossfade { name, locator, swapped } => {
            slot.step += 1;
            let half = steps / 2;
            if slot.step <= half {
                stage.transition_alpha = slot.step as f32 / half as f32;
            } else {
                if !*swapped {
                    *swapped = true;
                    stage.set_background(name, locator.clone());
                    signals.push(Signal::BackgroundSwapped { name: name.clone(), locator: locator.clone() });
                }
                stage.transition_alpha = 1.0 - (slot.step - half) as f32 / half as f32;
            }
            if slot.step >= steps {
                stage.transition_alpha = 0.0;
                true
            } else {
                false
            }
        }
        Task::ObjectShake { target, remaining_ms } => {
            *remaining_ms -= dt_ms as i64;
            if *remaining_ms > 0 {
                return false;
            }
            if let Some(object) = stage.object_mut(target) {
                object.shaking = false;
            }
            true
        }
        Task::ScreenShake { remaining_ms } => {
            *remaining_ms -= dt_ms as i64;
            if *remaining_ms > 0 {
                return false;
            }
            stage.screen_shake = 0.0;
            true
        }
        Task::Reveal { text, total, shown, interval_ms, elapsed_ms } => {
            let due = (*elapsed_ms / *interval_ms + 1) as usize;
            let due = due.min(*total);
            for index in *shown + 1..=due {
                if index % 2 == 1 {
                    signals.push(Signal::Letter { index });
                }
            }
            if due > *shown {
                *shown = due;
                let end = rich_text::raw_index_for_visible_index(text, due);
                stage.message = text[..end].to_string();
            }
            *elapsed_ms += dt_ms;
            *shown >= *total
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::stage::ObjectKind;

    fn stage_with(name: &str) -> Stage {
        let mut stage = Stage::default();
        stage.insert_object(StageObject::new(name, ObjectKind::Image, None, 0, 0));
        stage
    }

    #[test]
    fn tween_lands_on_target() {
        let mut stage = stage_with("a");
        let mut animator = Animator::new();
        animator.tween("a", Tween::Position { from: (0, 0), to: (100, 50) }, 4, Easing::EaseOut);
        for _ in 0..4 {
            animator.tick(16, &mut stage);
        }
        assert!(animator.is_empty());
        assert_eq!((stage.objects["a"].x, stage.objects["a"].y), (100, 50));
    }

    #[test]
    fn tween_skips_missing_target() {
        let mut stage = Stage::default();
        let mut animator = Animator::new();
        animator.tween("ghost", Tween::Alpha { from: 0.0, to: 1.0 }, 2, Easing::Linear);
        animator.tick(16, &mut stage);
        animator.tick(16, &mut stage);
        assert!(animator.is_empty());
        assert!(stage.objects.is_empty());
    }

    #[test]
    fn same_channel_replaces() {
        let mut animator = Animator::new();
        animator.tween("a", Tween::Rotation { from: 0.0, to: 90.0 }, 10, Easing::Linear);
        animator.tween("a", Tween::Rotation { from: 0.0, to: 45.0 }, 10, Easing::Linear);
        animator.tween("a", Tween::Alpha { from: 0.0, to: 1.0 }, 10, Easing::Linear);
        assert_eq!(animator.len(), 2);
    }

    #[test]
    fn crossfade_swaps_at_midpoint() {
        let mut stage = Stage::default();
        let mut animator = Animator::new();
        animator.crossfade("room", Some("bg/room".into()), 2);

        assert!(animator.tick(16, &mut stage).is_empty());
        assert_eq!(stage.transition_alpha, 0.5);
        animator.tick(16, &mut stage);
        assert_eq!(stage.transition_alpha, 1.0);
        assert!(stage.background.is_none());

        let signals = animator.tick(16, &mut stage);
        assert_eq!(signals.len(), 1);
        assert_eq!(stage.background_name, "room");
        assert_eq!(stage.transition_alpha, 0.5);
        animator.tick(16, &mut stage);
        assert_eq!(stage.transition_alpha, 0.0);
        assert!(animator.is_empty());
    }

    #[test]
    fn reveal_emits_letters_on_odd_characters() {
        let mut stage = Stage::default();
        let mut animator = Animator::new();
        animator.reveal("<b>abc</b>", 16);
        let mut letters = Vec::new();
        for _ in 0..3 {
            letters.extend(animator.tick(16, &mut stage));
        }
        assert_eq!(letters, vec![Signal::Letter { index: 1 }, Signal::Letter { index: 3 }]);
        assert_eq!(stage.message, "<b>abc");
        assert!(animator.is_empty());
    }

    #[test]
    fn fade_out_removes_object() {
        let mut stage = stage_with("a");
        let mut animator = Animator::new();
        animator.fade_out("a", 2, Easing::Linear);
        animator.tick(16, &mut stage);
        assert_eq!(stage.objects["a"].alpha, 0.5);
        animator.tick(16, &mut stage);
        assert!(stage.objects.is_empty());
    }

    #[test]
    fn finish_all_writes_end_states() {
        let mut stage = stage_with("a");
        stage.insert_object(StageObject::new("b", ObjectKind::Image, None, 0, 0));
        let mut animator = Animator::new();
        animator.tween("a", Tween::Scale { from: (1.0, 1.0), to: (2.0, 0.5) }, 10, Easing::Linear);
        animator.fade_out("b", 10, Easing::Linear);
        animator.crossfade("room", None, 5);
        animator.tick(16, &mut stage);

        let mut settled = stage.clone();
        animator.finish_all(&mut settled);
        assert_eq!((settled.objects["a"].scale_x, settled.objects["a"].scale_y), (2.0, 0.5));
        assert!(!settled.objects.contains_key("b"));
        assert_eq!(settled.background_name, "room");
        assert_eq!(settled.transition_alpha, 0.0);
        assert_eq!(animator.len(), 3);
        assert!(stage.objects.contains_key("b"));
    }
}
