//! Serializes a scene tree back to script text.

use crate::ast::{ELSE_TOKEN, END_CHOICE_TOKEN, ENDIF_TOKEN, SceneKind, SceneNode};

impl SceneNode {
    /// The single-line form of this node, without any nested block content.
    ///
    /// Directive nodes whose word does not start with `@` have no textual form
    /// and yield an empty string.
    pub fn to_script_line(&self) -> String {
        match self.kind {
            SceneKind::Text => {
                if self.speaker.trim().is_empty() {
                    self.text.clone()
                } else {
                    format!("[{}] \"{}\"", self.speaker, self.text)
                }
            }
            SceneKind::Label => format!("*{}", self.label),
            SceneKind::ChoicePrompt => "@choice".to_string(),
            SceneKind::ChoiceEnd => END_CHOICE_TOKEN.to_string(),
            _ if !self.is_directive() => String::new(),
            _ if self.params.is_empty() => self.token.clone(),
            _ => format!("{} {}", self.token, self.params.join(" ")),
        }
    }
}

/// Serializes a full scene list, recursing into blocks.
pub fn to_text(scenes: &[SceneNode]) -> String {
    let mut out = String::new();
    write_block(&mut out, scenes);
    out
}

fn write_block(out: &mut String, scenes: &[SceneNode]) {
    for scene in scenes {
        match scene.kind {
            SceneKind::ChoicePrompt => {
                push_line(out, "@choice");
                for option in &scene.options {
                    push_line(out, &format!("\"{}\" >> {}", option.text, option.target));
                }
                push_line(out, END_CHOICE_TOKEN);
            }
            SceneKind::Conditional => {
                push_line(out, &scene.to_script_line());
                write_block(out, &scene.then_branch);
                if !scene.else_branch.is_empty() {
                    push_line(out, ELSE_TOKEN);
                    write_block(out, &scene.else_branch);
                }
                push_line(out, ENDIF_TOKEN);
            }
            _ => push_line(out, &scene.to_script_line()),
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    out.push_str(line);
    out.push('\n');
}
