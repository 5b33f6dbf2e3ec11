use std::sync::Arc;

use novella_script::ast::SceneNode;
use novella_script::edit::BlockPath;

/// A cursor into one block: the root list or a conditional branch.
#[derive(Debug, Clone)]
pub struct Frame {
    pub stmts: Arc<[SceneNode]>,
    pub pc: usize,
    /// Where `stmts` sits in the root tree.
    pub path: BlockPath,
}

impl Frame {
    pub fn new(stmts: impl Into<Arc<[SceneNode]>>, pc: usize, path: BlockPath) -> Self {
        Self { stmts: stmts.into(), pc, path }
    }

    pub fn root(stmts: Arc<[SceneNode]>, pc: usize) -> Self {
        Self::new(stmts, pc, BlockPath::new())
    }

    pub fn current(&self) -> Option<&SceneNode> {
        self.stmts.get(self.pc)
    }

    pub fn advance(&mut self) {
        self.pc += 1;
    }
}
