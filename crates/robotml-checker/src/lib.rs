//! RobotML semantic checker.
//!
//! ```text
//! parser JSON → Program → TypeChecker (ScopeTable + unit tags) → Diagnostics
//! ```
//!
//! Checking never fails: every problem becomes a [`Diagnostic`] with a
//! severity, and the complete set is returned.
//!
//! [`Diagnostic`]: robotml_types::Diagnostic

pub mod checker;
pub mod scope;
pub mod ty;

use robotml_types::ast::Program;
use robotml_types::Diagnostics;

pub use checker::{TypeChecker, ENTRY_POINT};
pub use scope::{ScopeError, ScopeTable, Symbol};
pub use ty::{FnSig, Type};

/// Type-check a program and return every diagnostic found.
pub fn check(program: &Program) -> Diagnostics {
    check_with_entry(program, ENTRY_POINT)
}

/// Type-check a program that is run from `entry_point` rather than `main`.
pub fn check_with_entry(program: &Program, entry_point: &str) -> Diagnostics {
    let mut checker = TypeChecker::new().with_entry_point(entry_point);
    checker.check(program);
    checker.into_diagnostics()
}

/// Decode the parser's JSON output and type-check it.
pub fn check_json(json: &str) -> serde_json::Result<Diagnostics> {
    let program = Program::from_json(json)?;
    Ok(check(&program))
}
