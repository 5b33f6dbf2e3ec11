use novella_script::edit::BlockPath;
use serde::{Deserialize, Serialize};

use crate::executor::{Frame, PlayerState};
use crate::runtime::Ctx;

/// A frame stored by position: which block, and where in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub path: BlockPath,
    pub pc:   usize,
}

impl FrameSnapshot {
    pub fn of(frame: &Frame) -> Self {
        Self { path: frame.path.clone(), pc: frame.pc }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub ctx:   Ctx,
    /// State the player was in when saved.
    pub state: PlayerState,
    pub frame: FrameSnapshot,
    /// Return frames, outermost first.
    pub stack: Vec<FrameSnapshot>,
}
