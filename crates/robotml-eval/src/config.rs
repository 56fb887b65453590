//! Interpreter configuration.

use serde::Deserialize;

/// Configuration for one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Function whose body is executed. A program without it records nothing.
    pub entry_point: String,
    /// Maximum number of nested function calls, entry function included.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            max_call_depth: 256,
        }
    }
}

impl InterpreterConfig {
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
