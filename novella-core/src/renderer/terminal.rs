use std::io::{self, BufRead, Write};

use novella_script::rich_text::styled_render;

use crate::event::{InputEvent, OutputEvent};
use crate::executor::PlayerState;
use crate::renderer::Renderer;
use crate::runtime::stage::Stage;

/// Line-based renderer. End of input counts as `exit`.
pub struct TerminalRenderer<R, W> {
    input: R,
    output: W,
}

impl TerminalRenderer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalRenderer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            log::error!("Terminal write failed: {}", e);
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{}", prompt).and_then(|_| self.output.flush()) {
            log::error!("Terminal write failed: {}", e);
        }
        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf.trim_end().to_string()),
            Err(e) => {
                log::error!("Terminal read failed: {}", e);
                None
            }
        }
    }

    fn wait_continue(&mut self) -> Option<InputEvent> {
        loop {
            let Some(line) = self.read_line("> ") else {
                return Some(InputEvent::Exit);
            };
            if let Some(ev) = parse_command(&line) {
                return Some(ev);
            }
            self.say("invalid");
        }
    }

    fn wait_choice(&mut self, len: usize) -> Option<InputEvent> {
        loop {
            let Some(line) = self.read_line("Select> ") else {
                return Some(InputEvent::Exit);
            };
            if let Ok(n) = line.trim().parse::<usize>() {
                if n >= 1 && n <= len {
                    return Some(InputEvent::ChoiceMade { index: n - 1 });
                }
            }
            match parse_command(&line) {
                Some(ev @ (InputEvent::Exit | InputEvent::SaveRequest { .. } | InputEvent::LoadRequest { .. })) => {
                    return Some(ev);
                }
                _ => self.say("invalid"),
            }
        }
    }
}

/// Enter continues; `exit`, `:save N` and `:load N` are commands.
fn parse_command(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Some(InputEvent::Continue);
    }
    if trimmed.eq_ignore_ascii_case("exit") {
        return Some(InputEvent::Exit);
    }
    if let Some(rest) = trimmed.strip_prefix(":save") {
        return rest.trim().parse::<u32>().ok().map(|slot| InputEvent::SaveRequest { slot });
    }
    if let Some(rest) = trimmed.strip_prefix(":load") {
        return rest.trim().parse::<u32>().ok().map(|slot| InputEvent::LoadRequest { slot });
    }
    None
}

impl<R: BufRead, W: Write> Renderer for TerminalRenderer<R, W> {
    fn render(&mut self, ev: &OutputEvent, _stage: &Stage) -> Option<InputEvent> {
        match ev {
            OutputEvent::ShowText { speaker, text } => {
                let plain = styled_render(text).plain();
                if speaker.is_empty() {
                    self.say(&plain);
                } else {
                    self.say(&format!("[{}] {}", speaker, plain));
                }
                self.wait_continue()
            }
            OutputEvent::ShowChoices { options } => {
                for (i, o) in options.iter().enumerate() {
                    self.say(&format!("  [{}] {}", i + 1, styled_render(o).plain()));
                }
                self.wait_choice(options.len())
            }
            OutputEvent::BackgroundChanged { name, .. } => {
                let name = name.as_deref().unwrap_or("-");
                self.say(&format!("[Background] {}", name));
                None
            }
            OutputEvent::Preload { images, audios } => {
                log::debug!("Preload: {} image(s), {} audio(s)", images.len(), audios.len());
                None
            }
            OutputEvent::End => {
                self.say("[End]");
                None
            }
        }
    }

    fn prompt(&mut self, state: PlayerState, stage: &Stage) -> Option<InputEvent> {
        match state {
            PlayerState::WaitingForChoice => self.wait_choice(stage.choices.len()),
            _ => self.wait_continue(),
        }
    }
}
