#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use novella_core::executor::{Player, PlayerState};
use novella_core::runtime::{AnyAssets, AssetResolver, AudioSink, NullAudio};
use novella_script::ast::SceneNode;
use novella_script::parser::parse_str;

pub fn scenes(src: &str) -> Vec<SceneNode> {
    parse_str(src).scenes
}

pub fn player() -> Player {
    Player::with_defaults(Box::new(AnyAssets), Box::new(NullAudio))
}

pub fn started(src: &str) -> Player {
    let mut p = player();
    p.start(scenes(src), 0);
    p
}

/// Completes a running reveal, then moves on.
pub fn click(p: &mut Player) {
    if p.is_revealing() {
        p.advance();
    }
    p.advance();
}

pub fn tick_until(p: &mut Player, max_ticks: usize, done: impl Fn(&Player) -> bool) -> bool {
    for _ in 0..max_ticks {
        if done(p) {
            return true;
        }
        p.tick();
    }
    done(p)
}

pub fn run_to_end(p: &mut Player) -> bool {
    tick_until(p, 1_000, |p| p.state() == PlayerState::Terminated)
}

/// Audio sink that writes every trigger into a shared log.
#[derive(Clone, Default)]
pub struct RecordingAudio {
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl RecordingAudio {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, locator: &str, volume: u32) -> anyhow::Result<()> {
        self.record(format!("play {locator} {volume}"));
        Ok(())
    }
    fn stop(&mut self) {
        self.record("stop".into());
    }
    fn load_pool(&mut self, locator: &str, count: usize) -> anyhow::Result<()> {
        self.record(format!("pool {locator} {count}"));
        Ok(())
    }
    fn play_from_pool(&mut self, volume: u32) {
        self.record(format!("letter {volume}"));
    }
    fn release_pool(&mut self) {
        self.record("release".into());
    }
}

pub fn recording_player(assets: impl AssetResolver + 'static) -> (Player, RecordingAudio) {
    let audio = RecordingAudio::default();
    let p = Player::with_defaults(Box::new(assets), Box::new(audio.clone()));
    (p, audio)
}
