use novella_script::ast::{SceneKind, SceneNode};
use novella_script::rich_text::Color;
use novella_script::timing::{Easing, TimeSpec, step_count};

use crate::animator::{Animator, TaskId, Tween};
use crate::config::{AudioConfig, PlayerConfig};
use crate::eval;
use crate::event::OutputEvent;
use crate::runtime::assets::{AssetKind, AssetResolver};
use crate::runtime::audio::AudioSink;
use crate::runtime::stage::{DialogueRecord, ObjectKind, StageObject};
use crate::runtime::Ctx;

pub struct Env {
    pub animator: Animator,
    pub assets: Box<dyn AssetResolver>,
    pub audio: Box<dyn AudioSink>,
    pub player: PlayerConfig,
    pub sound: AudioConfig,
    /// Whether the letter sample pool is loaded.
    pub letter_pool: bool,
}

impl Env {
    fn steps(&self, duration_ms: u32) -> u32 {
        step_count(duration_ms, self.player.tick_ms)
    }
}

#[derive(Debug, Clone)]
pub struct StmtEffect {
    pub events: Vec<OutputEvent>,
    pub next: NextAction,
    pub reveal: Option<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Continue,
    WaitClick,
    WaitChoice,
    /// Blocking delay in milliseconds; the loop moves past the node first.
    Delay(u32),
}

impl StmtEffect {
    fn next(next: NextAction) -> Self {
        Self { events: Vec::new(), next, reveal: None }
    }
}

/// Applies the effect of one node. `instant` applies end states only: no
/// tasks are spawned and nothing suspends.
pub fn walk_node(ctx: &mut Ctx, env: &mut Env, node: &SceneNode, instant: bool) -> StmtEffect {
    log::trace!("walk_node: {} {} {:?}", node.id, node.token, node.params);
    let p = |i: usize| node.param(i);

    match node.kind {
        SceneKind::Text => return text(ctx, env, node, instant),
        SceneKind::BackgroundSet => return background(ctx, env, p(0), p(1), instant),
        SceneKind::CharacterShow | SceneKind::ImageShow => show(ctx, env, node, instant),
        SceneKind::CharacterHide | SceneKind::ImageHide => {
            let id = p(0);
            let time = TimeSpec::parse(p(1));
            if !instant && time.ms > 0 {
                let steps = env.steps(time.ms);
                env.animator.fade_out(id, steps, time.easing);
            } else {
                env.animator.cancel_target(id);
                ctx.stage.remove_object(id);
            }
        }
        SceneKind::Move => {
            let id = p(0);
            let to = (node.param_i32(1, 0), node.param_i32(2, 0));
            let time = if p(3).contains('@') {
                TimeSpec::parse(p(3))
            } else {
                TimeSpec { ms: node.param_i32(3, 0).max(0) as u32, easing: Easing::from_name(p(4)) }
            };
            if let Some(object) = ctx.stage.object_mut(id) {
                let from = (object.x, object.y);
                if !instant && time.ms > 0 {
                    let steps = env.steps(time.ms);
                    env.animator.tween(id, Tween::Position { from, to }, steps, time.easing);
                } else {
                    (object.x, object.y) = to;
                }
            } else {
                log::debug!("@move: no object '{}'", id);
            }
        }
        SceneKind::Scale => {
            let id = p(0);
            let to = (node.param_i32(1, 0) as f32 / 100.0, node.param_i32(2, 0) as f32 / 100.0);
            let time = TimeSpec::parse(p(3));
            if let Some(object) = ctx.stage.object_mut(id) {
                let from = (object.scale_x, object.scale_y);
                if !instant && time.ms > 0 {
                    let steps = env.steps(time.ms);
                    env.animator.tween(id, Tween::Scale { from, to }, steps, time.easing);
                } else {
                    (object.scale_x, object.scale_y) = to;
                }
            } else {
                log::debug!("@scale: no object '{}'", id);
            }
        }
        SceneKind::Rotate => {
            let id = p(0);
            let to = node.param_f32(1, 0.0);
            let time = TimeSpec::parse(p(2));
            if let Some(object) = ctx.stage.object_mut(id) {
                let from = object.rotation;
                if !instant && time.ms > 0 {
                    let steps = env.steps(time.ms);
                    env.animator.tween(id, Tween::Rotation { from, to }, steps, time.easing);
                } else {
                    object.rotation = to;
                }
            } else {
                log::debug!("@rotate: no object '{}'", id);
            }
        }
        SceneKind::Tint => tint(ctx, env, node, instant),
        SceneKind::ObjectShake => {
            let id = p(0);
            let intensity = p(1).parse::<f32>().unwrap_or(10.0);
            let ms = node.param_i32(2, 0).max(0) as u32;
            if instant {
                return StmtEffect::next(NextAction::Continue);
            }
            if let Some(object) = ctx.stage.object_mut(id) {
                object.shaking = true;
                object.shake_amount = intensity;
                env.animator.shake_object(id, ms);
            }
        }
        SceneKind::ScreenShake => {
            let intensity = p(0).parse::<f32>().unwrap_or(10.0);
            let time = TimeSpec::parse(p(1));
            if !instant && time.ms > 0 {
                ctx.stage.screen_shake = intensity;
                env.animator.shake_screen(time.ms);
            }
        }
        SceneKind::ScreenFlash => {
            let color = Color::parse_hex(p(0)).unwrap_or(Color::WHITE);
            let time = TimeSpec::parse(p(1));
            if !instant && time.ms > 0 {
                ctx.stage.overlay = color;
                let steps = env.steps(time.ms);
                env.animator.flash(color, steps, time.easing);
            } else {
                ctx.stage.overlay = Color::TRANSPARENT;
            }
        }
        SceneKind::MusicPlay => {
            let volume = env.sound.music_volume;
            play(env, AssetKind::Bgm, p(0), volume);
        }
        SceneKind::SoundEffect => {
            if !instant {
                let volume = env.sound.sound_volume;
                play(env, AssetKind::Se, p(0), volume);
            }
        }
        SceneKind::MusicStop => env.audio.stop(),
        SceneKind::Wait | SceneKind::WaitForClick => {
            let click = node.kind == SceneKind::WaitForClick || node.token == SceneKind::WaitForClick.token();
            if instant {
                return StmtEffect::next(NextAction::Continue);
            }
            if click {
                return StmtEffect::next(NextAction::WaitClick);
            }
            let ms = node.param_i32(0, 0);
            if ms > 0 {
                return StmtEffect::next(NextAction::Delay(ms as u32));
            }
        }
        SceneKind::ChoicePrompt => {
            if !node.options.is_empty() && !instant {
                ctx.stage.choices = node.options.clone();
                let options = node.options.iter().map(|o| o.text.clone()).collect();
                return StmtEffect {
                    events: vec![OutputEvent::ShowChoices { options }],
                    next: NextAction::WaitChoice,
                    reveal: None,
                };
            }
        }
        SceneKind::VariableSet => eval::apply_assignment(&mut ctx.variables, p(0), p(1), p(2)),
        SceneKind::ScriptInvoke => log::debug!("@script {:?}: no handler registered", node.params),
        SceneKind::Unknown => log::debug!("skipping unknown directive '{}'", node.token),
        SceneKind::Label | SceneKind::Goto | SceneKind::Conditional | SceneKind::ChoiceEnd => {}
    }
    StmtEffect::next(NextAction::Continue)
}

fn text(ctx: &mut Ctx, env: &mut Env, node: &SceneNode, instant: bool) -> StmtEffect {
    let stage = &mut ctx.stage;
    stage.message_visible = true;
    stage.speaker = node.speaker.clone();
    stage.target_message = node.text.clone();

    if instant {
        stage.message = node.text.clone();
        return StmtEffect::next(NextAction::Continue);
    }

    stage.message.clear();
    stage.history.push(DialogueRecord { speaker: node.speaker.clone(), text: node.text.clone() });
    let reveal = env.animator.reveal(&node.text, env.player.reveal_interval_ms);
    StmtEffect {
        events: vec![OutputEvent::ShowText { speaker: node.speaker.clone(), text: node.text.clone() }],
        next: NextAction::WaitClick,
        reveal: Some(reveal),
    }
}

fn background(ctx: &mut Ctx, env: &mut Env, name: &str, time: &str, instant: bool) -> StmtEffect {
    let time = TimeSpec::parse(time);
    if name.is_empty() || name == ctx.stage.background_name {
        return StmtEffect::next(NextAction::Continue);
    }

    let locator = if name == "_" {
        None
    } else {
        match env.assets.find(AssetKind::Bg, name) {
            Some(locator) => Some(locator),
            None => {
                log::warn!("Background '{}' not found, keeping current", name);
                return StmtEffect::next(NextAction::Continue);
            }
        }
    };

    let mut effect = StmtEffect::next(NextAction::Continue);
    if !instant && time.ms > 0 {
        let half_steps = env.steps(time.ms / 2);
        env.animator.crossfade(name, locator, half_steps);
    } else {
        let shown = (name != "_").then(|| name.to_string());
        ctx.stage.set_background(name, locator.clone());
        effect.events.push(OutputEvent::BackgroundChanged { name: shown, locator });
    }
    effect
}

/// Image for a show node: `<id>_<face>`, then `<face>`, then `<id>` for
/// characters; `<id>` for images.
pub(crate) fn resolve_show_asset(assets: &dyn AssetResolver, node: &SceneNode) -> Option<String> {
    let id = node.param(0);
    if node.kind == SceneKind::CharacterShow {
        let face = node.param(1);
        assets
            .find(AssetKind::Characters, &format!("{id}_{face}"))
            .or_else(|| assets.find(AssetKind::Characters, face))
            .or_else(|| assets.find(AssetKind::Characters, id))
    } else {
        assets.find(AssetKind::Image, id)
    }
}

fn show(ctx: &mut Ctx, env: &mut Env, node: &SceneNode, instant: bool) {
    let id = node.param(0);
    if id.is_empty() {
        return;
    }
    let (kind, x_index) = if node.kind == SceneKind::CharacterShow {
        (ObjectKind::Character, 2)
    } else {
        (ObjectKind::Image, 1)
    };
    let x = node.param_i32(x_index, 0);
    let y = node.param_i32(x_index + 1, 0);
    // Fade sits at index 4 for both kinds.
    let fade = TimeSpec::parse(node.param(4));

    let asset = resolve_show_asset(env.assets.as_ref(), node);
    if asset.is_none() {
        log::warn!("No image found for '{}' ({})", id, node.token);
    }

    let fading = !instant && fade.ms > 0;
    let mut object = StageObject::new(id, kind, asset, x, y);
    object.alpha = if fading { 0.0 } else { 1.0 };

    env.animator.cancel_target(id);
    ctx.stage.insert_object(object);
    if fading {
        let steps = env.steps(fade.ms);
        env.animator.tween(id, Tween::Alpha { from: 0.0, to: 1.0 }, steps, fade.easing);
    }
}

fn tint(ctx: &mut Ctx, env: &mut Env, node: &SceneNode, instant: bool) {
    let id = node.param(0);
    let first = node.param(1);
    let target = if first.starts_with('#') {
        Color::parse_hex(first)
    } else {
        let channel = |i: usize| node.param_i32(i, 255).clamp(0, 255) as u8;
        Some(Color::rgb(channel(1), channel(2), channel(3)))
    };
    let time = TimeSpec::parse(node.param(4));

    let Some(object) = ctx.stage.object_mut(id) else {
        log::debug!("@tint: no object '{}'", id);
        return;
    };
    match target {
        Some(to) if !instant && time.ms > 0 => {
            let from = object.tint.unwrap_or(Color::WHITE);
            let steps = env.steps(time.ms);
            env.animator.tween(id, Tween::Tint { from, to }, steps, time.easing);
        }
        _ => object.tint = target,
    }
}

fn play(env: &mut Env, kind: AssetKind, name: &str, volume: u32) {
    let Some(locator) = env.assets.find(kind, name) else {
        log::warn!("Audio '{}/{}' not found", kind.dir(), name);
        return;
    };
    if let Err(e) = env.audio.play(&locator, volume) {
        log::error!("Audio play failed for {}: {:#}", locator, e);
    }
}
