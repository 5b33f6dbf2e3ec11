//! Presentation state published by the player and read by a renderer.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use novella_script::ast::ChoiceOption;
use novella_script::rich_text::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Character,
    Image,
}

/// One character or image on screen, keyed by its script id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Resolved image locator; `None` when the asset was not found.
    pub asset: Option<String>,
    pub x: i32,
    pub y: i32,
    pub visible: bool,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
    pub tint: Option<Color>,
    pub shaking: bool,
    pub shake_amount: f32,
}

impl StageObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, asset: Option<String>, x: i32, y: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            asset,
            x,
            y,
            visible: true,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
            tint: None,
            shaking: false,
            shake_amount: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub background: Option<String>,
    pub background_name: String,
    /// Opacity of the black cover used by fades, 0 is fully visible.
    pub transition_alpha: f32,
    pub overlay: Color,
    pub screen_shake: f32,
    pub message_visible: bool,
    pub speaker: String,
    /// Revealed prefix of `target_message`, markup included.
    pub message: String,
    pub target_message: String,
    pub choices: Vec<ChoiceOption>,
    pub objects: FxHashMap<String, StageObject>,
    /// Bumped whenever an object is added or removed.
    pub revision: u64,
    pub history: Vec<DialogueRecord>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            background: None,
            background_name: String::new(),
            transition_alpha: 0.0,
            overlay: Color::TRANSPARENT,
            screen_shake: 0.0,
            message_visible: false,
            speaker: String::new(),
            message: String::new(),
            target_message: String::new(),
            choices: Vec::new(),
            objects: FxHashMap::default(),
            revision: 0,
            history: Vec::new(),
        }
    }
}

impl Stage {
    pub fn insert_object(&mut self, object: StageObject) {
        self.objects.insert(object.name.clone(), object);
        self.revision += 1;
    }

    pub fn remove_object(&mut self, name: &str) -> Option<StageObject> {
        let removed = self.objects.remove(name);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut StageObject> {
        self.objects.get_mut(name)
    }

    pub fn set_background(&mut self, name: &str, locator: Option<String>) {
        self.background_name = name.to_string();
        self.background = locator;
    }

    pub fn clear_presentation(&mut self) {
        self.objects.clear();
        self.revision += 1;
        self.background = None;
    }

    /// Clears screen-wide effects that do not survive a reload.
    pub fn settle(&mut self) {
        self.transition_alpha = 0.0;
        self.overlay = Color::TRANSPARENT;
        self.screen_shake = 0.0;
        for object in self.objects.values_mut() {
            object.shaking = false;
        }
    }
}
