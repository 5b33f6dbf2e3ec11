use crate::executor::frame::Frame;

/// Return points of the blocks currently entered, innermost last.
#[derive(Debug, Default, Clone)]
pub struct CallStack {
    pub stack: Vec<Frame>
}

impl CallStack {
    pub fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }
    pub fn pop(&mut self) -> Option<Frame> {
        self.stack.pop()
    }
    pub fn clear(&mut self) {
        self.stack.clear();
    }
    pub fn len(&self) -> usize {
        self.stack.len()
    }
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
