//! Scoped variable environment for the RobotML interpreter.

use std::collections::HashMap;

use crate::value::Value;

/// Index of the global frame.
const GLOBAL: usize = 0;

/// A single frame of bindings, linked to the frame it was opened in.
#[derive(Debug, Clone)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<usize>,
}

impl Frame {
    fn new(parent: Option<usize>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent,
        }
    }
}

/// Chain of variable frames mirroring lexical scope at run time.
///
/// Frames are pushed and popped in stack order, so the current frame is
/// always the last one. Lookups follow `parent` links rather than stack order:
/// a block frame links to the frame it was opened in, while a call frame links
/// straight to the global frame so a callee never sees its caller's locals.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Create a new environment with one global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(None)],
        }
    }

    /// Number of live frames, including the global one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a frame for a block, nested in the current frame.
    pub fn push_scope(&mut self) {
        let parent = self.current();
        self.frames.push(Frame::new(Some(parent)));
    }

    /// Push a frame for a function call, parented to the global frame.
    pub fn push_call_scope(&mut self) {
        self.frames.push(Frame::new(Some(GLOBAL)));
    }

    /// Pop the current frame. The global frame is never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind `name` in the current frame, replacing any binding it already has.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(name.to_string(), value);
        }
    }

    /// Look up a variable, following the chain from the current frame.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.chain()
            .find_map(|index| self.frames[index].bindings.get(name))
    }

    /// Update the nearest frame in the chain that binds `name`.
    /// Returns `true` if found and updated, `false` if not found.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let Some(index) = self
            .chain()
            .find(|&index| self.frames[index].bindings.contains_key(name))
        else {
            return false;
        };
        self.frames[index].bindings.insert(name.to_string(), value);
        true
    }

    fn current(&self) -> usize {
        self.frames.len() - 1
    }

    /// Frame indices from the current frame out to the global frame.
    fn chain(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.current()), move |&index| {
            self.frames[index].parent
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
