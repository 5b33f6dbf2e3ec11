use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::eval::Variables;
use crate::event::OutputEvent;
use crate::runtime::stage::Stage;

/// Session state that survives a save: the stage and the variables. The
/// event queue is transient.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Ctx {
    pub stage: Stage,
    pub variables: Variables,
    #[serde(skip)]
    pub event_queue: VecDeque<OutputEvent>,
}

impl Ctx {
    pub fn push(&mut self, event: OutputEvent) {
        self.event_queue.push_back(event);
    }
    pub fn drain(&mut self) -> Vec<OutputEvent> {
        self.event_queue.drain(..).collect()
    }
}
