//! RobotML tree-walking interpreter.
//!
//! Executes a program's entry function and records every robot command it
//! issues, each stamped with a logical time starting at 1.
//!
//! ```text
//! Program → Interpreter (Environment + function table) → InterpreterResult
//! ```

pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod value;

use robotml_types::ast::Program;

pub use command::{CommandKind, CommandRecorder, InterpreterResult, MoveDirection, RobotCommand};
pub use config::InterpreterConfig;
pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use interpreter::{Flow, Interpreter};
pub use value::Value;

/// Run `program` from `main` with the default configuration.
pub fn interpret(program: &Program) -> EvalResult<InterpreterResult> {
    interpret_with(program, InterpreterConfig::default())
}

pub fn interpret_with(
    program: &Program,
    config: InterpreterConfig,
) -> EvalResult<InterpreterResult> {
    Interpreter::new(config).run(program)
}

/// Decode the parser's JSON output and run it.
///
/// A document that does not decode is reported as
/// [`EvalError::MalformedProgram`].
pub fn interpret_json(json: &str) -> EvalResult<InterpreterResult> {
    let program = Program::from_json(json)?;
    interpret(&program)
}
