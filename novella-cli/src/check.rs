use std::collections::HashSet;

use novella_core::manager::count_nodes;
use novella_script::ast::{SceneKind, SceneNode};

/// Static findings for one script.
#[derive(Debug, Default)]
pub struct Report {
    pub nodes: usize,
    pub labels: Vec<String>,
    /// Directive words that map to no known kind.
    pub unknown: Vec<String>,
    /// Goto and choice targets with no root label.
    pub unresolved: Vec<String>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub fn analyze(scenes: &[SceneNode]) -> Report {
    let labels: Vec<String> = scenes
        .iter()
        .filter(|n| n.kind == SceneKind::Label)
        .map(|n| n.label.clone())
        .collect();
    let known: HashSet<&str> = labels.iter().map(String::as_str).collect();

    let mut report = Report { nodes: count_nodes(scenes), ..Default::default() };
    walk(scenes, &known, &mut report);
    report.labels = labels;
    report
}

fn walk(nodes: &[SceneNode], known: &HashSet<&str>, report: &mut Report) {
    for node in nodes {
        match node.kind {
            SceneKind::Unknown => report.unknown.push(node.token.clone()),
            SceneKind::Goto => {
                let target = node.goto_target();
                if !known.contains(target) {
                    report.unresolved.push(format!("@goto {}", target));
                }
            }
            SceneKind::ChoicePrompt => {
                for option in &node.options {
                    if let Some(label) = option.target.strip_prefix('*') {
                        if !known.contains(label) {
                            report.unresolved.push(format!("choice \"{}\" >> {}", option.text, option.target));
                        }
                    }
                }
            }
            SceneKind::Conditional => {
                walk(&node.then_branch, known, report);
                walk(&node.else_branch, known, report);
            }
            _ => {}
        }
    }
}
