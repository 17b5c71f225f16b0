//! Parser context frames
//!
//! One frame per open block. The frame records what kind of construct owns the
//! block and whether the last statement parsed in it left an `if` chain open,
//! so `elif`/`else` and `return` legality follows the actual nesting.

/// Construct that opened a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Module,
    Class,
    Function,
    /// Body of an if/elif/else/for/while
    Block,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    if_chain_open: bool,
}

/// Stack of parser context frames, rooted at the module frame
#[derive(Debug, Clone)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Module,
                if_chain_open: false,
            }],
        }
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            if_chain_open: false,
        });
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the previous statement of the current block was an `if` or `elif`
    pub fn in_if_chain(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.if_chain_open)
    }

    pub fn set_if_chain(&mut self, open: bool) {
        if let Some(frame) = self.frames.last_mut() {
            frame.if_chain_open = open;
        }
    }

    /// Whether `return` is legal here: the nearest enclosing class or function
    /// frame must be a function.
    pub fn in_function_body(&self) -> bool {
        for frame in self.frames.iter().rev() {
            match frame.kind {
                FrameKind::Function => return true,
                FrameKind::Class | FrameKind::Module => return false,
                FrameKind::Block => continue,
            }
        }
        false
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}
