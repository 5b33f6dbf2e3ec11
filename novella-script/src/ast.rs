//! Scene tree for the narrative script format.
//!
//! Every meaningful script line becomes one [`SceneNode`]. Conditional blocks
//! own their branches as independent scene lists; choice blocks collapse into
//! a single node carrying its options.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a node. Survives every `with_*` edit so a
/// running node can be matched back to the node an author is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SceneKind {
    /// A line of dialogue or narration.
    Text,
    /// Jump target. Only root-level labels are addressable.
    Label,
    BackgroundSet,
    CharacterShow,
    CharacterHide,
    ImageShow,
    ImageHide,
    MusicPlay,
    MusicStop,
    SoundEffect,
    /// Blocking delay in milliseconds.
    Wait,
    WaitForClick,
    ScreenShake,
    ScreenFlash,
    Move,
    Scale,
    Rotate,
    ObjectShake,
    Tint,
    Goto,
    /// Multi-way choice; options live in [`SceneNode::options`].
    ChoicePrompt,
    /// Terminator of a choice block. Never stored in a tree.
    ChoiceEnd,
    /// Hook for host-defined scripts. Has no built-in effect.
    ScriptInvoke,
    VariableSet,
    /// `@if` block; branches live in [`SceneNode::then_branch`] / [`SceneNode::else_branch`].
    Conditional,
    Unknown,
}

const TOKEN_TABLE: &[(SceneKind, &str)] = &[
    (SceneKind::Text, "text"),
    (SceneKind::Label, "label"),
    (SceneKind::BackgroundSet, "@bg"),
    (SceneKind::CharacterShow, "@chara_in"),
    (SceneKind::CharacterHide, "@chara_out"),
    (SceneKind::ImageShow, "@image_in"),
    (SceneKind::ImageHide, "@image_out"),
    (SceneKind::MusicPlay, "@bgm"),
    (SceneKind::MusicStop, "@stop_bgm"),
    (SceneKind::SoundEffect, "@se"),
    (SceneKind::Wait, "@wait"),
    (SceneKind::WaitForClick, "@wait_click"),
    (SceneKind::ScreenShake, "@shake"),
    (SceneKind::ScreenFlash, "@flash"),
    (SceneKind::Move, "@move"),
    (SceneKind::Scale, "@scale"),
    (SceneKind::Rotate, "@rotate"),
    (SceneKind::ObjectShake, "@shake_obj"),
    (SceneKind::Tint, "@tint"),
    (SceneKind::Goto, "@goto"),
    (SceneKind::ChoicePrompt, "@choice"),
    (SceneKind::ChoiceEnd, "@end_choice"),
    (SceneKind::ScriptInvoke, "@script"),
    (SceneKind::VariableSet, "@set"),
    (SceneKind::Conditional, "@if"),
    (SceneKind::Unknown, "unknown"),
];

pub const ELSE_TOKEN: &str = "@else";
pub const ENDIF_TOKEN: &str = "@endif";
pub const END_CHOICE_TOKEN: &str = "@end_choice";

/// Directive words that only close a block and never become nodes.
pub const STRUCTURAL_TOKENS: [&str; 3] = [ENDIF_TOKEN, ELSE_TOKEN, END_CHOICE_TOKEN];

/// Sigil marking a variable reference in `@set` and `@if`.
pub const VARIABLE_SIGIL: char = '$';

impl SceneKind {
    /// Canonical directive word of this kind.
    pub fn token(self) -> &'static str {
        TOKEN_TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, token)| *token)
            .unwrap_or("unknown")
    }

    /// Exact lookup of a directive word; anything unlisted is [`SceneKind::Unknown`].
    pub fn from_token(token: &str) -> SceneKind {
        TOKEN_TABLE
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(kind, _)| *kind)
            .unwrap_or(SceneKind::Unknown)
    }

    pub fn is_structural_token(token: &str) -> bool {
        STRUCTURAL_TOKENS.contains(&token)
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One selectable entry of a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub target: String,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self { text: text.into(), target: target.into() }
    }
}

/// A single parsed unit of script.
///
/// Nodes are values: edits go through the `with_*` methods, which return a new
/// node with the same [`NodeId`]. Branch lists are shared `Arc` slices so the
/// player can hold on to a block without copying it.
#[derive(Debug, Clone, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    /// 1-based position within the enclosing block.
    pub seq: u32,
    pub kind: SceneKind,
    pub speaker: String,
    pub text: String,
    pub label: String,
    /// Literal directive word. Never empty.
    pub token: String,
    pub params: Vec<String>,
    pub options: Vec<ChoiceOption>,
    pub then_branch: Arc<[SceneNode]>,
    pub else_branch: Arc<[SceneNode]>,
}

impl SceneNode {
    pub fn new(kind: SceneKind) -> Self {
        Self {
            id: NodeId::fresh(),
            seq: 0,
            kind,
            speaker: String::new(),
            text: String::new(),
            label: String::new(),
            token: kind.token().to_string(),
            params: Vec::new(),
            options: Vec::new(),
            then_branch: Arc::from(Vec::new()),
            else_branch: Arc::from(Vec::new()),
        }
    }

    pub fn text(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::new(SceneKind::Text);
        node.speaker = speaker.into();
        node.text = text.into();
        node
    }

    pub fn label(name: impl Into<String>) -> Self {
        let mut node = Self::new(SceneKind::Label);
        node.label = name.into();
        node
    }

    pub fn goto(target: impl Into<String>) -> Self {
        let target = target.into();
        let mut node = Self::new(SceneKind::Goto);
        node.params = vec![target.clone()];
        node.label = target;
        node
    }

    /// A directive node from its literal word, e.g. `("@bg", ["room"])`.
    pub fn directive<I, S>(token: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SceneKind::from_token(token))
            .with_token(token)
            .with_params(params)
    }

    pub fn choice(options: Vec<ChoiceOption>) -> Self {
        let mut node = Self::new(SceneKind::ChoicePrompt);
        node.options = options;
        node
    }

    pub fn conditional<I, S>(params: I, then_branch: Vec<SceneNode>, else_branch: Vec<SceneNode>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SceneKind::Conditional)
            .with_params(params)
            .with_branches(then_branch, else_branch)
    }

    pub fn with_seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    /// Replaces the directive word; an empty word falls back to the canonical one.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { self.kind.token().to_string() } else { token };
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_branches(mut self, then_branch: Vec<SceneNode>, else_branch: Vec<SceneNode>) -> Self {
        self.then_branch = Arc::from(then_branch);
        self.else_branch = Arc::from(else_branch);
        self
    }

    pub fn with_then_branch(mut self, branch: Vec<SceneNode>) -> Self {
        self.then_branch = Arc::from(branch);
        self
    }

    pub fn with_else_branch(mut self, branch: Vec<SceneNode>) -> Self {
        self.else_branch = Arc::from(branch);
        self
    }

    /// Positional parameter, empty when absent.
    pub fn param(&self, index: usize) -> &str {
        self.params.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn param_i32(&self, index: usize, default: i32) -> i32 {
        self.param(index).parse().unwrap_or(default)
    }

    pub fn param_f32(&self, index: usize, default: f32) -> f32 {
        self.param(index).parse().unwrap_or(default)
    }

    /// Label a `@goto` jumps to.
    pub fn goto_target(&self) -> &str {
        if self.label.is_empty() { self.param(0) } else { &self.label }
    }

    pub fn is_directive(&self) -> bool {
        self.token.starts_with('@')
    }

    /// Branch list by side, `true` for the then-branch.
    pub fn branch(&self, then: bool) -> &Arc<[SceneNode]> {
        if then { &self.then_branch } else { &self.else_branch }
    }
}

/// Structural equality: identity is not part of a node's content.
impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
            && self.kind == other.kind
            && self.speaker == other.speaker
            && self.text == other.text
            && self.label == other.label
            && self.token == other.token
            && self.params == other.params
            && self.options == other.options
            && self.then_branch[..] == other.then_branch[..]
            && self.else_branch[..] == other.else_branch[..]
    }
}

/// A parsed script document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneFile {
    /// File stem when loaded from disk, empty for raw text.
    pub title: String,
    pub scenes: Vec<SceneNode>,
}
