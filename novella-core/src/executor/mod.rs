mod call_stack;
mod frame;
mod scanner;
pub mod walk;

use std::sync::Arc;

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use novella_script::ast::{NodeId, SceneKind, SceneNode};
use novella_script::edit::{self, BranchStep};

use crate::animator::{Animator, Signal, TaskId};
use crate::config::{AudioConfig, PlayerConfig};
use crate::eval::{self, Variables};
use crate::event::OutputEvent;
use crate::runtime::assets::{AssetKind, AssetResolver};
use crate::runtime::audio::AudioSink;
use crate::runtime::stage::Stage;
use crate::runtime::Ctx;
use crate::storager::types::{FrameSnapshot, SaveFile};

pub use call_stack::CallStack;
pub use frame::Frame;
pub use scanner::Scanner;
use walk::{Env, NextAction, StmtEffect, walk_node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Loading,
    Running,
    /// Blocking `@wait`; the cursor is already past the node.
    Delaying { remaining_ms: u32 },
    WaitingForClick,
    WaitingForChoice,
    Closing,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    Fading(TaskId),
    Grace { remaining_ms: i64 },
}

/// Walks a scene tree one suspension at a time. The host drives it with
/// [`Player::tick`] and the two re-entry points [`Player::advance`] and
/// [`Player::select_choice`].
pub struct Player {
    ctx: Ctx,
    env: Env,
    root: Arc<[SceneNode]>,
    frame: Frame,
    call_stack: CallStack,
    labels: FxHashMap<String, usize>,
    state: PlayerState,
    reveal: Option<TaskId>,
    pending_fade_in: bool,
    fade_in: Option<TaskId>,
    closing: Option<Closing>,
    current: Option<NodeId>,
}

impl Player {
    pub fn new(
        assets: Box<dyn AssetResolver>,
        audio: Box<dyn AudioSink>,
        player: PlayerConfig,
        sound: AudioConfig,
    ) -> Self {
        let root: Arc<[SceneNode]> = Arc::from(Vec::new());
        Self {
            ctx: Ctx::default(),
            env: Env { animator: Animator::new(), assets, audio, player, sound, letter_pool: false },
            frame: Frame::root(root.clone(), 0),
            root,
            call_stack: CallStack::default(),
            labels: FxHashMap::default(),
            state: PlayerState::Loading,
            reveal: None,
            pending_fade_in: false,
            fade_in: None,
            closing: None,
            current: None,
        }
    }

    pub fn with_defaults(assets: Box<dyn AssetResolver>, audio: Box<dyn AudioSink>) -> Self {
        Self::new(assets, audio, PlayerConfig::default(), AudioConfig::default())
    }

    /// Starts a fresh session at `start_index` of `scenes`. Nodes before the
    /// start index are applied instantly so the stage matches that point.
    pub fn start(&mut self, scenes: impl Into<Arc<[SceneNode]>>, start_index: usize) {
        let root: Arc<[SceneNode]> = scenes.into();
        log::info!("Starting playback: {} node(s), start index {}", root.len(), start_index);

        self.env.animator.cancel_all();
        self.ctx = Ctx::default();
        self.call_stack.clear();
        self.reveal = None;
        self.fade_in = None;
        self.closing = None;
        self.current = None;
        self.labels = build_label_table(&root);
        self.load_letter_pool();

        let start = start_index.min(root.len().saturating_sub(1));
        for node in root[..start].iter() {
            self.apply_instant(node);
        }

        self.root = root.clone();
        self.frame = Frame::root(root, start);
        self.ctx.stage.transition_alpha = 1.0;
        self.pending_fade_in = true;
        self.set_state(PlayerState::Running);
        self.run();
    }

    fn load_letter_pool(&mut self) {
        if self.env.letter_pool {
            self.env.audio.release_pool();
            self.env.letter_pool = false;
        }
        let Some(locator) = self.env.assets.find(AssetKind::System, &self.env.sound.letter_sound) else {
            log::info!("Letter sound '{}' not found, reveal is silent", self.env.sound.letter_sound);
            return;
        };
        match self.env.audio.load_pool(&locator, self.env.sound.letter_pool_size) {
            Ok(()) => self.env.letter_pool = true,
            Err(e) => log::error!("Failed to load letter sound {}: {:#}", locator, e),
        }
    }

    /// Applies the end state of `node` without tasks or suspension.
    /// Conditionals apply the branch their condition selects.
    pub fn apply_instant(&mut self, node: &SceneNode) {
        if node.kind == SceneKind::Conditional {
            let branch = node.branch(self.condition_holds(node)).clone();
            for child in branch.iter() {
                self.apply_instant(child);
            }
            return;
        }
        let effect = walk_node(&mut self.ctx, &mut self.env, node, true);
        self.ctx.event_queue.extend(effect.events);
    }

    /// One fixed tick: delays count down, the loop resumes if it can, and
    /// every animation task takes one step.
    pub fn tick(&mut self) {
        let dt = self.env.player.tick_ms;

        if let PlayerState::Delaying { remaining_ms } = self.state {
            if remaining_ms <= dt {
                self.set_state(PlayerState::Running);
            } else {
                self.state = PlayerState::Delaying { remaining_ms: remaining_ms - dt };
            }
        }
        if self.state == PlayerState::Running {
            self.run();
        }

        for signal in self.env.animator.tick(dt, &mut self.ctx.stage) {
            match signal {
                Signal::Letter { .. } => {
                    if self.env.letter_pool {
                        self.env.audio.play_from_pool(self.env.sound.letter_volume);
                    }
                }
                Signal::BackgroundSwapped { name, locator } => {
                    let name = (name != "_").then_some(name);
                    self.ctx.push(OutputEvent::BackgroundChanged { name, locator });
                }
            }
        }

        if self.state == PlayerState::Closing {
            self.tick_close(dt);
        }
    }

    /// Click-to-continue. A running reveal is completed first; the cursor
    /// only moves on the next call.
    pub fn advance(&mut self) {
        if self.state != PlayerState::WaitingForClick {
            log::debug!("advance ignored in state {:?}", self.state);
            return;
        }
        if let Some(id) = self.reveal.take() {
            if self.env.animator.cancel(id) {
                self.ctx.stage.message = self.ctx.stage.target_message.clone();
                return;
            }
        }
        self.set_state(PlayerState::Running);
        self.frame.advance();
        self.run();
    }

    /// Resumes after a choice. `*label` jumps to a root label and clears the
    /// call stack; anything else continues after the choice node.
    pub fn select_choice(&mut self, next: &str) {
        if self.state != PlayerState::WaitingForChoice {
            log::debug!("select_choice ignored in state {:?}", self.state);
            return;
        }
        self.ctx.stage.choices.clear();

        let target = next.strip_prefix('*').and_then(|name| self.labels.get(name).copied());
        match target {
            Some(index) => self.jump(index),
            None => {
                if next.starts_with('*') {
                    log::warn!("Choice target '{}' not found, continuing", next);
                }
                self.frame.advance();
            }
        }
        self.set_state(PlayerState::Running);
        self.run();
    }

    pub fn select_option(&mut self, index: usize) {
        if self.state != PlayerState::WaitingForChoice {
            return;
        }
        let target = self
            .frame
            .current()
            .and_then(|node| node.options.get(index))
            .map(|option| option.target.clone());
        match target {
            Some(target) => self.select_choice(&target),
            None => log::warn!("Choice index {} out of range", index),
        }
    }

    /// Immediate teardown: no fade, no grace period.
    pub fn dispose(&mut self) {
        self.env.animator.cancel_all();
        self.env.audio.stop();
        if self.env.letter_pool {
            self.env.audio.release_pool();
            self.env.letter_pool = false;
        }
        self.ctx.stage.clear_presentation();
        self.ctx.stage.choices.clear();
        self.reveal = None;
        self.closing = None;
        self.set_state(PlayerState::Terminated);
    }

    fn run(&mut self) {
        let budget = self.env.player.steps_per_run.max(1);

        for _ in 0..budget {
            let Some(node) = self.frame.current().cloned() else {
                match self.call_stack.pop() {
                    Some(parent) => {
                        self.frame = parent;
                        continue;
                    }
                    None => {
                        self.begin_close();
                        return;
                    }
                }
            };

            match node.kind {
                SceneKind::Label => {
                    self.frame.advance();
                    continue;
                }
                SceneKind::Goto => {
                    let target = node.goto_target();
                    if let Some(&index) = self.labels.get(target) {
                        self.jump(index);
                        continue;
                    }
                    log::warn!("@goto: label '{}' not found", target);
                    self.frame.advance();
                    continue;
                }
                SceneKind::Conditional => {
                    self.enter_branch(&node);
                    continue;
                }
                _ => {}
            }

            self.current = Some(node.id);
            let StmtEffect { events, next, reveal } = walk_node(&mut self.ctx, &mut self.env, &node, false);
            self.ctx.event_queue.extend(events);
            if reveal.is_some() {
                self.reveal = reveal;
            }

            match next {
                NextAction::Continue => self.frame.advance(),
                NextAction::WaitClick => {
                    self.suspend(PlayerState::WaitingForClick);
                    return;
                }
                NextAction::WaitChoice => {
                    self.suspend(PlayerState::WaitingForChoice);
                    return;
                }
                NextAction::Delay(ms) => {
                    self.frame.advance();
                    self.set_state(PlayerState::Delaying { remaining_ms: ms });
                    return;
                }
            }
        }
        log::debug!("Run budget of {} node(s) spent, yielding", budget);
    }

    fn enter_branch(&mut self, node: &SceneNode) {
        let then = self.condition_holds(node);
        let branch = node.branch(then).clone();
        if branch.is_empty() {
            self.frame.advance();
            return;
        }
        let mut path = self.frame.path.clone();
        path.push(BranchStep { index: self.frame.pc, then });

        let mut parent = std::mem::replace(&mut self.frame, Frame::new(branch, 0, path));
        parent.advance();
        self.call_stack.push(parent);
    }

    fn condition_holds(&self, node: &SceneNode) -> bool {
        let op = match node.param(1) {
            "" => "==",
            op => op,
        };
        eval::check_condition(node.param(0), op, node.param(2), &self.ctx.variables)
    }

    fn jump(&mut self, index: usize) {
        self.call_stack.clear();
        self.frame = Frame::root(self.root.clone(), index);
    }

    fn suspend(&mut self, state: PlayerState) {
        self.set_state(state);
        self.emit_preload();
        if self.pending_fade_in {
            self.pending_fade_in = false;
            let from = self.ctx.stage.transition_alpha;
            self.fade_in = Some(self.env.animator.transition(from, 0.0, self.env.player.transition_steps));
        }
    }

    fn emit_preload(&mut self) {
        let (images, audios) = Scanner::scan(
            &self.frame.stmts,
            self.frame.pc + 1,
            self.env.player.preload_ahead,
            self.env.assets.as_ref(),
        );
        if !images.is_empty() || !audios.is_empty() {
            self.ctx.push(OutputEvent::Preload { images, audios });
        }
    }

    fn begin_close(&mut self) {
        log::info!("Reached the end of the script");
        self.pending_fade_in = false;
        if let Some(id) = self.fade_in.take() {
            self.env.animator.cancel(id);
        }
        self.set_state(PlayerState::Closing);

        let alpha = self.ctx.stage.transition_alpha;
        if alpha < 1.0 {
            let id = self.env.animator.transition(alpha, 1.0, self.env.player.transition_steps);
            self.closing = Some(Closing::Fading(id));
        } else {
            self.finish_close();
        }
    }

    fn finish_close(&mut self) {
        self.env.audio.stop();
        self.ctx.stage.clear_presentation();
        self.closing = Some(Closing::Grace { remaining_ms: self.env.player.close_grace_ms as i64 });
    }

    fn tick_close(&mut self, dt: u32) {
        match self.closing {
            Some(Closing::Fading(id)) if !self.env.animator.is_running(id) => {
                self.ctx.stage.transition_alpha = 1.0;
                self.finish_close();
            }
            Some(Closing::Grace { remaining_ms }) => {
                let left = remaining_ms - dt as i64;
                if left > 0 {
                    self.closing = Some(Closing::Grace { remaining_ms: left });
                } else {
                    self.closing = None;
                    self.set_state(PlayerState::Terminated);
                    self.ctx.push(OutputEvent::End);
                }
            }
            _ => {}
        }
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            log::debug!("Player state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Captures the session with every running effect already at its end state.
    pub fn snapshot(&self) -> SaveFile {
        let mut ctx = self.ctx.clone();
        self.env.animator.finish_all(&mut ctx.stage);
        SaveFile {
            ctx,
            state: self.state,
            frame: FrameSnapshot::of(&self.frame),
            stack: self.call_stack.stack.iter().map(FrameSnapshot::of).collect(),
        }
    }

    /// Resumes a saved session of the script this player is running. The
    /// node the session was waiting on is presented again.
    pub fn restore(&mut self, save: SaveFile) -> anyhow::Result<()> {
        let frame = self.resolve_frame(&save.frame)?;
        let stack = save
            .stack
            .iter()
            .map(|snap| self.resolve_frame(snap))
            .collect::<anyhow::Result<Vec<_>>>()?;

        self.env.animator.cancel_all();
        self.ctx = save.ctx;
        self.ctx.stage.settle();
        self.ctx.event_queue.clear();

        // The waiting text node records itself again when it re-runs.
        let waiting_on_text = save.state == PlayerState::WaitingForClick
            && frame.current().is_some_and(|node| node.kind == SceneKind::Text);
        if waiting_on_text {
            self.ctx.stage.history.pop();
        }

        self.frame = frame;
        self.call_stack.stack = stack;
        self.reveal = None;
        self.fade_in = None;
        self.closing = None;
        self.pending_fade_in = false;

        log::info!("Session restored at {:?} pc {}", save.frame.path, save.frame.pc);
        match save.state {
            PlayerState::Delaying { remaining_ms } => self.set_state(PlayerState::Delaying { remaining_ms }),
            _ => {
                self.set_state(PlayerState::Running);
                self.run();
            }
        }
        Ok(())
    }

    fn resolve_frame(&self, snap: &FrameSnapshot) -> anyhow::Result<Frame> {
        let stmts = edit::resolve_block(&self.root, &snap.path)
            .with_context(|| format!("Saved block {:?} does not exist in this script", snap.path))?;
        if snap.pc > stmts.len() {
            anyhow::bail!("Saved pc {} out of range for a block of {} node(s)", snap.pc, stmts.len());
        }
        Ok(Frame::new(stmts, snap.pc, snap.path.clone()))
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn stage(&self) -> &Stage {
        &self.ctx.stage
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub fn variables(&self) -> &Variables {
        &self.ctx.variables
    }

    pub fn drain_events(&mut self) -> Vec<OutputEvent> {
        self.ctx.drain()
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some_and(|id| self.env.animator.is_running(id))
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn animator(&self) -> &Animator {
        &self.env.animator
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.env.player
    }
}

fn build_label_table(root: &[SceneNode]) -> FxHashMap<String, usize> {
    let mut labels = FxHashMap::default();
    for (index, node) in root.iter().enumerate() {
        if node.kind != SceneKind::Label {
            continue;
        }
        if let Some(previous) = labels.insert(node.label.clone(), index) {
            log::warn!("Label '{}' defined twice (index {} and {}), using the later", node.label, previous, index);
        }
    }
    labels
}
