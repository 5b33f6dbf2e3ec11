//! Persistent edits of a scene tree.
//!
//! Every operation locates its target by [`NodeId`], rebuilds only the blocks
//! on the path from the root to the target and returns a new root. Shared
//! branch lists are never mutated in place. `None` means the target was not
//! found (or, for [`set_coordinates`], has no coordinate parameters).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{NodeId, SceneKind, SceneNode};

/// One step from a block into a conditional's branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStep {
    /// Index of the conditional node in the enclosing block.
    pub index: usize,
    /// `true` for the then-branch.
    pub then: bool,
}

/// Chain of branch steps from the root list to a nested block.
pub type BlockPath = Vec<BranchStep>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Root { index: usize },
    Branch { parent: NodeId, then: bool, index: usize },
}

pub fn find(nodes: &[SceneNode], id: NodeId) -> Option<&SceneNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.then_branch, id).or_else(|| find(&node.else_branch, id)) {
            return Some(found);
        }
    }
    None
}

/// Block path and index of the node with `id`.
pub fn find_path(nodes: &[SceneNode], id: NodeId) -> Option<(BlockPath, usize)> {
    for (index, node) in nodes.iter().enumerate() {
        if node.id == id {
            return Some((Vec::new(), index));
        }
        for then in [true, false] {
            if let Some((mut path, at)) = find_path(node.branch(then), id) {
                path.insert(0, BranchStep { index, then });
                return Some((path, at));
            }
        }
    }
    None
}

/// Follows a block path from the root. `None` if the tree no longer has it.
pub fn resolve_block(root: &Arc<[SceneNode]>, path: &[BranchStep]) -> Option<Arc<[SceneNode]>> {
    let mut block = root.clone();
    for step in path {
        let next = block.get(step.index)?.branch(step.then).clone();
        block = next;
    }
    Some(block)
}

pub fn replace(nodes: &[SceneNode], id: NodeId, replacement: SceneNode) -> Option<Vec<SceneNode>> {
    let mut replacement = Some(replacement);
    edit_block(nodes, id, &mut |block, pos| {
        if let Some(node) = replacement.take() {
            block[pos] = node;
        }
    })
}

/// Rebuilds the node with `id` through `f`.
pub fn update<F>(nodes: &[SceneNode], id: NodeId, f: F) -> Option<Vec<SceneNode>>
where
    F: FnOnce(&SceneNode) -> SceneNode,
{
    let mut f = Some(f);
    edit_block(nodes, id, &mut |block, pos| {
        if let Some(f) = f.take() {
            let updated = f(&block[pos]);
            block[pos] = updated;
        }
    })
}

pub fn remove(nodes: &[SceneNode], id: NodeId) -> Option<Vec<SceneNode>> {
    edit_block(nodes, id, &mut |block, pos| {
        block.remove(pos);
        renumber_in_place(block);
    })
}

pub fn insert(nodes: &[SceneNode], at: InsertAt, node: SceneNode) -> Option<Vec<SceneNode>> {
    match at {
        InsertAt::Root { index } => {
            let mut block = nodes.to_vec();
            block.insert(index.min(block.len()), node);
            renumber_in_place(&mut block);
            Some(block)
        }
        InsertAt::Branch { parent, then, index } => update(nodes, parent, |p| {
            let mut branch = p.branch(then).to_vec();
            branch.insert(index.min(branch.len()), node);
            renumber_in_place(&mut branch);
            if then {
                p.clone().with_then_branch(branch)
            } else {
                p.clone().with_else_branch(branch)
            }
        }),
    }
}

/// Assigns 1-based sequence numbers per block, recursively.
pub fn renumber(nodes: &[SceneNode]) -> Vec<SceneNode> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let then_branch = renumber(&node.then_branch);
            let else_branch = renumber(&node.else_branch);
            node.clone().with_seq(i as u32 + 1).with_branches(then_branch, else_branch)
        })
        .collect()
}

/// Writes `x`/`y` into the coordinate parameters of a show or move node.
pub fn set_coordinates(nodes: &[SceneNode], id: NodeId, x: i32, y: i32) -> Option<Vec<SceneNode>> {
    let (xi, yi) = match find(nodes, id)?.kind {
        SceneKind::CharacterShow => (2, 3),
        SceneKind::ImageShow | SceneKind::Move => (1, 2),
        _ => return None,
    };
    update(nodes, id, |node| {
        let mut params = node.params.clone();
        while params.len() <= yi {
            params.push("0".to_string());
        }
        params[xi] = x.to_string();
        params[yi] = y.to_string();
        node.clone().with_params(params)
    })
}

fn renumber_in_place(block: &mut [SceneNode]) {
    for (i, node) in block.iter_mut().enumerate() {
        node.seq = i as u32 + 1;
    }
}

fn edit_block<F>(nodes: &[SceneNode], id: NodeId, edit: &mut F) -> Option<Vec<SceneNode>>
where
    F: FnMut(&mut Vec<SceneNode>, usize),
{
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        let mut block = nodes.to_vec();
        edit(&mut block, pos);
        return Some(block);
    }
    for (pos, node) in nodes.iter().enumerate() {
        for then in [true, false] {
            if let Some(branch) = edit_block(node.branch(then), id, edit) {
                let mut block = nodes.to_vec();
                block[pos] = if then {
                    node.clone().with_then_branch(branch)
                } else {
                    node.clone().with_else_branch(branch)
                };
                return Some(block);
            }
        }
    }
    None
}
