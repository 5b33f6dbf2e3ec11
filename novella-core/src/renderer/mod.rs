pub mod driver;
pub mod terminal;

use crate::event::{InputEvent, OutputEvent};
use crate::executor::PlayerState;
use crate::runtime::stage::Stage;

pub trait Renderer {
    fn render(&mut self, ev: &OutputEvent, stage: &Stage) -> Option<InputEvent>;

    /// Asked when the player waits for input no event prompted for, such as
    /// after `@wait_click` or a save.
    fn prompt(&mut self, state: PlayerState, _stage: &Stage) -> Option<InputEvent> {
        match state {
            PlayerState::WaitingForChoice => Some(InputEvent::ChoiceMade { index: 0 }),
            _ => Some(InputEvent::Continue),
        }
    }
}
