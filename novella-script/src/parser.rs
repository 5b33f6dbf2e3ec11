use crate::ast::{SceneFile, SceneKind, SceneNode};
use crate::lexer::{self, Lexer, Line, Terminator, Tok};

/// Recursive block parser over classified lines.
///
/// Parsing never fails. Unterminated blocks run to end of input, unknown
/// directives become [`SceneKind::Unknown`] nodes and stray terminators are
/// skipped.
pub struct Parser<'a> {
    lines: &'a [Line],
    cursor: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        Self { lines, cursor: 0 }
    }

    fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.cursor)
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    fn at_terminator(&self, term: Terminator) -> bool {
        matches!(self.peek(), Some(Line { tok: Tok::Terminator(t), .. }) if *t == term)
    }

    /// Parses the root block.
    pub fn parse(mut self) -> Vec<SceneNode> {
        let mut seq = 1;
        let mut scenes = Vec::new();
        loop {
            scenes.extend(self.block(&mut seq));
            match self.peek() {
                Some(line) => {
                    log::warn!("Line {}: stray '{}' outside any block, skipped", line.number, line.raw);
                    self.bump();
                }
                None => break,
            }
        }
        scenes
    }

    /// Parses until a terminator or end of input. The cursor is left on the
    /// terminator so the caller can consume it.
    fn block(&mut self, seq: &mut u32) -> Vec<SceneNode> {
        let mut scenes = Vec::new();
        while let Some(line) = self.peek() {
            let node = match &line.tok {
                Tok::Blank | Tok::Comment => {
                    self.bump();
                    continue;
                }
                Tok::Terminator(_) => return scenes,
                Tok::Label(name) => {
                    self.bump();
                    SceneNode::label(name.clone())
                }
                Tok::ChoiceOpen => self.choice(),
                Tok::IfOpen { token, params } => self.conditional(token, params),
                Tok::Directive { token, params } => {
                    self.bump();
                    if SceneKind::is_structural_token(token) {
                        continue;
                    }
                    let node = SceneNode::directive(token, params.iter().cloned());
                    if node.kind == SceneKind::Unknown {
                        log::warn!("Line {}: unknown directive '{}'", line.number, token);
                    }
                    node
                }
                Tok::Text { speaker, text } => {
                    self.bump();
                    SceneNode::text(speaker.clone(), text.clone())
                }
            };
            scenes.push(node.with_seq(*seq));
            *seq += 1;
        }
        scenes
    }

    fn choice(&mut self) -> SceneNode {
        let opened_at = self.peek().map(|l| l.number).unwrap_or_default();
        self.bump();
        let mut options = Vec::new();
        loop {
            let Some(line) = self.peek() else {
                log::warn!("Line {}: @choice without @end_choice", opened_at);
                break;
            };
            self.bump();
            if line.tok == Tok::Terminator(Terminator::EndChoice) {
                break;
            }
            if let Some(option) = lexer::split_choice_arm(&line.raw) {
                options.push(option);
            }
        }
        SceneNode::choice(options)
    }

    fn conditional(&mut self, token: &str, params: &[String]) -> SceneNode {
        let opened_at = self.peek().map(|l| l.number).unwrap_or_default();
        self.bump();

        let mut then_seq = 1;
        let then_branch = self.block(&mut then_seq);

        let mut else_branch = Vec::new();
        if self.at_terminator(Terminator::Else) {
            self.bump();
            let mut else_seq = 1;
            else_branch = self.block(&mut else_seq);
        }

        if self.at_terminator(Terminator::EndIf) {
            self.bump();
        } else if self.peek().is_none() {
            log::warn!("Line {}: @if without @endif", opened_at);
        }

        SceneNode::new(SceneKind::Conditional)
            .with_token(token)
            .with_params(params.iter().cloned())
            .with_branches(then_branch, else_branch)
    }
}

/// Parses a sequence of script lines.
pub fn parse<I, S>(lines: I) -> SceneFile
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines = Lexer::from_lines(lines.into_iter()).run();
    let scenes = Parser::new(&lines).parse();
    SceneFile { title: String::new(), scenes }
}

pub fn parse_str(src: &str) -> SceneFile {
    let lines = Lexer::new(src).run();
    let scenes = Parser::new(&lines).parse();
    SceneFile { title: String::new(), scenes }
}
