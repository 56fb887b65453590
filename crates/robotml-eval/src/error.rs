//! Runtime error types for the RobotML interpreter.

use thiserror::Error;

/// Evaluation error. The first one raised aborts the run.
///
/// Unresolved variables and functions are the language's own runtime
/// failures, and unknown node or operator tags surface as
/// [`EvalError::MalformedProgram`] at decode time. The remaining variants are
/// stricter than a plain tree walk would be: a wrong argument count, a
/// boolean where a number is needed (in arithmetic or a cast), division or
/// modulo by zero, non-finite results and runaway recursion all stop the run
/// instead of yielding `NaN` or a coerced value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Read or assignment of a name no enclosing frame binds.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("undefined function: {0}")]
    UndefinedFunction(String),
    #[error("function '{name}' expects {expected} argument(s), but got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// A value of the wrong kind reached an operator or command.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// Division or modulo by zero, or a non-finite result.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),
    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),
    /// The program document could not be decoded.
    #[error("malformed program: {0}")]
    MalformedProgram(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::MalformedProgram(err.to_string())
    }
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
