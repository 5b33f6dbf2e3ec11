use std::sync::Arc;
use std::time::Duration;

use novella_script::ast::SceneNode;

use crate::event::InputEvent;
use crate::executor::{Player, PlayerState};
use crate::renderer::Renderer;
use crate::storager;

/// Pumps a player: ticks it, hands its events to the renderer and feeds the
/// renderer's input back.
pub struct Driver<R: Renderer> {
    player: Player,
    renderer: R,
    /// Sleep one tick between ticks instead of running flat out.
    realtime: bool,
}

impl<R: Renderer> Driver<R> {
    pub fn new(player: Player, renderer: R) -> Self {
        Self { player, renderer, realtime: false }
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (Player, R) {
        (self.player, self.renderer)
    }

    pub fn play(&mut self, scenes: impl Into<Arc<[SceneNode]>>, start_index: usize) {
        self.player.start(scenes, start_index);
        self.pump();
    }

    pub fn pump(&mut self) {
        let tick = Duration::from_millis(self.player.config().tick_ms as u64);
        loop {
            let mut input = self.render_pending();
            if self.player.state() == PlayerState::Terminated {
                break;
            }

            let waiting = matches!(
                self.player.state(),
                PlayerState::WaitingForClick | PlayerState::WaitingForChoice
            );
            if input.is_none() && waiting && !self.player.is_revealing() {
                input = self.renderer.prompt(self.player.state(), self.player.stage());
            }
            if let Some(ev) = input {
                self.feed(ev);
                continue;
            }

            self.player.tick();
            if self.realtime {
                std::thread::sleep(tick);
            }
        }
        log::info!("Playback finished");
    }

    fn render_pending(&mut self) -> Option<InputEvent> {
        let mut input = None;
        for ev in self.player.drain_events() {
            if let Some(answer) = self.renderer.render(&ev, self.player.stage()) {
                input = Some(answer);
            }
        }
        input
    }

    pub fn feed(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Continue => {
                if self.player.is_revealing() {
                    self.player.advance();
                }
                self.player.advance();
            }
            InputEvent::ChoiceMade { index } => self.player.select_option(index),
            InputEvent::Exit => {
                log::info!("Exit requested");
                self.player.dispose();
            }
            InputEvent::SaveRequest { slot } => {
                log::info!("Save request slot: {}", slot);
                if let Err(e) = storager::save(storager::slot_path(slot), &self.player) {
                    log::error!("Save failed: {:#}", e);
                }
            }
            InputEvent::LoadRequest { slot } => {
                log::info!("Load request slot: {}", slot);
                if let Err(e) = storager::load(storager::slot_path(slot), &mut self.player) {
                    log::error!("Load failed: {:#}", e);
                }
            }
        }
    }
}
