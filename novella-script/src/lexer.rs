//! Line classifier.
//!
//! The script format is line oriented, so the lexer turns each source line
//! into one [`Line`] with its classification. Context (which block a line sits
//! in) is the parser's business; lines inside a choice block are re-read from
//! [`Line::raw`].

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{ChoiceOption, ELSE_TOKEN, END_CHOICE_TOKEN, ENDIF_TOKEN};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Block terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    EndIf,
    Else,
    EndChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Blank,
    Comment,
    Terminator(Terminator),
    Label(String),
    ChoiceOpen,
    IfOpen { token: String, params: Vec<String> },
    Directive { token: String, params: Vec<String> },
    Text { speaker: String, text: String },
}

/// One classified source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-based line number in the source.
    pub number: usize,
    /// The trimmed source text.
    pub raw: String,
    pub tok: Tok,
}

pub struct Lexer<I> {
    lines: I,
}

impl<'a> Lexer<std::str::Lines<'a>> {
    pub fn new(src: &'a str) -> Self {
        Lexer { lines: src.lines() }
    }
}

impl<I, S> Lexer<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn from_lines(lines: I) -> Self {
        Lexer { lines }
    }

    pub fn run(self) -> Vec<Line> {
        self.lines
            .enumerate()
            .map(|(idx, line)| {
                let raw = line.as_ref().trim().to_string();
                let tok = classify(&raw);
                Line { number: idx + 1, raw, tok }
            })
            .collect()
    }
}

/// Classifies a trimmed line. Rules are checked in order, first match wins.
pub fn classify(line: &str) -> Tok {
    if line.is_empty() {
        return Tok::Blank;
    }
    if line.starts_with("//") {
        return Tok::Comment;
    }
    if let Some(term) = terminator(line) {
        return Tok::Terminator(term);
    }
    if let Some(name) = line.strip_prefix('*') {
        return Tok::Label(name.trim().to_string());
    }
    if line.starts_with("@choice") {
        return Tok::ChoiceOpen;
    }
    if line.starts_with("@if") {
        let (token, params) = split_command(line);
        return Tok::IfOpen { token, params };
    }
    if line.starts_with('@') {
        let (token, params) = split_command(line);
        return Tok::Directive { token, params };
    }
    let (speaker, text) = split_dialogue(line);
    Tok::Text { speaker, text }
}

/// Prefix match against the block terminators.
pub fn terminator(line: &str) -> Option<Terminator> {
    if line.starts_with(ENDIF_TOKEN) {
        Some(Terminator::EndIf)
    } else if line.starts_with(ELSE_TOKEN) {
        Some(Terminator::Else)
    } else if line.starts_with(END_CHOICE_TOKEN) {
        Some(Terminator::EndChoice)
    } else {
        None
    }
}

/// Whitespace tokenizer: `(command, params)`. Quotes are not respected.
pub fn split_command(line: &str) -> (String, Vec<String>) {
    let mut parts = WHITESPACE.split(line.trim()).map(str::to_string);
    let command = parts.next().unwrap_or_default();
    (command, parts.collect())
}

/// `[Name] "text"` or bare text.
pub fn split_dialogue(line: &str) -> (String, String) {
    if line.starts_with('[') {
        if let Some(close) = line.find(']') {
            let speaker = line[1..close].to_string();
            let content = line[close + 1..].trim();
            return (speaker, strip_quotes(content).to_string());
        }
    }
    (String::new(), line.to_string())
}

/// Splits `"text" >> label` at the first `>>`.
pub fn split_choice_arm(line: &str) -> Option<ChoiceOption> {
    let (text, target) = line.split_once(">>")?;
    Some(ChoiceOption::new(strip_quotes(text.trim()), target.trim()))
}

/// Removes a single pair of surrounding double quotes.
pub fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
