use novella_script::ast::{SceneKind, SceneNode};

use crate::executor::walk::resolve_show_asset;
use crate::runtime::assets::{AssetKind, AssetResolver};

pub struct Scanner;

impl Scanner {
    /// Collects the assets of up to `lookahead_steps` nodes from `start_pc`,
    /// stopping at the first control-flow node.
    pub fn scan(
        start_stmts: &[SceneNode],
        start_pc: usize,
        lookahead_steps: usize,
        assets: &dyn AssetResolver,
    ) -> (Vec<String>, Vec<String>) {
        let mut images = Vec::new();
        let mut audios = Vec::new();

        let mut pc = start_pc;
        let mut steps_taken = 0;

        while steps_taken < lookahead_steps && pc < start_stmts.len() {
            let node = &start_stmts[pc];
            steps_taken += 1;
            pc += 1;

            let found = match node.kind {
                SceneKind::CharacterShow | SceneKind::ImageShow => {
                    resolve_show_asset(assets, node).map(|a| (a, false))
                }
                SceneKind::BackgroundSet if node.param(0) != "_" => {
                    assets.find(AssetKind::Bg, node.param(0)).map(|a| (a, false))
                }
                SceneKind::MusicPlay => assets.find(AssetKind::Bgm, node.param(0)).map(|a| (a, true)),
                SceneKind::SoundEffect => assets.find(AssetKind::Se, node.param(0)).map(|a| (a, true)),
                SceneKind::Label | SceneKind::Goto | SceneKind::ChoicePrompt | SceneKind::Conditional => break,
                _ => None,
            };

            match found {
                Some((locator, true)) if !audios.contains(&locator) => audios.push(locator),
                Some((locator, false)) if !images.contains(&locator) => images.push(locator),
                _ => {}
            }
        }
        (images, audios)
    }
}
