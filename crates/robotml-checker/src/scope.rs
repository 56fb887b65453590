//! Compile-time symbol table with lexical scoping.
//!
//! [`ScopeTable`] manages a stack of scopes. The root scope sits at depth 0;
//! every `enter_scope` pushes a new level and `exit_scope` drops every symbol
//! declared at the current level.

use std::collections::HashMap;

use robotml_types::Span;
use thiserror::Error;

use crate::ty::Type;

/// A declared variable or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    /// Where the declaring node sits in the source.
    pub span: Span,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScopeError {
    #[error("'{name}' is already declared in this scope")]
    DuplicateSymbol { name: String, previous: Span },
    #[error("'{0}' is not declared in any enclosing scope")]
    Unresolved(String),
}

/// A stack of scopes for name resolution and type tracking.
#[derive(Debug)]
pub struct ScopeTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl ScopeTable {
    /// Create a table holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Current nesting depth; the root scope is depth 0.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drop every symbol at the current depth. The root scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare `name` at the current depth.
    ///
    /// Shadowing a symbol from an enclosing depth is allowed; a second
    /// declaration at the same depth is not.
    pub fn declare(&mut self, name: &str, ty: Type, span: Span) -> Result<(), ScopeError> {
        let depth = self.depth();
        let scope = &mut self.scopes[depth];
        if let Some(existing) = scope.get(name) {
            return Err(ScopeError::DuplicateSymbol {
                name: name.to_string(),
                previous: existing.span,
            });
        }
        scope.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                span,
                depth,
            },
        );
        Ok(())
    }

    /// Find the nearest visible symbol, searching from the current depth down
    /// to the root.
    pub fn resolve(&self, name: &str) -> Result<&Symbol, ScopeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| ScopeError::Unresolved(name.to_string()))
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}
