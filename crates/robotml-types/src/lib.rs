//! Shared types for RobotML.
//!
//! This crate defines the AST node types (as decoded from the parser's JSON
//! output), source spans, and the diagnostic model shared by the checker and
//! any host that renders its output.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostic, DiagnosticCategory, DiagnosticCode, Diagnostics, Severity};
pub use span::Span;
