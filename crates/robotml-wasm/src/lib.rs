//! RobotML checker and interpreter as a WASM module for browser environments.
//!
//! The editor's parser hands over its AST as JSON; this crate type-checks it
//! and runs it, returning JSON the simulator understands.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { check, interpret } from 'robotml-wasm';
//!
//! await init();
//!
//! const diagnostics = JSON.parse(check(astJson));
//! const reply = JSON.parse(interpret(astJson));
//! // { success: true, result: { commands: [...], timestamps: [1, 2, ...] } }
//! ```

use robotml_eval::{EvalError, InterpreterConfig, InterpreterResult};
use robotml_types::ast::Program;
use robotml_types::{Diagnostic, DiagnosticCode, Diagnostics, Span};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Reply to an `interpret` request, in the shape the browser host listens for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<InterpreterResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<InterpreterResult, EvalError>> for InterpretResponse {
    fn from(outcome: Result<InterpreterResult, EvalError>) -> Self {
        match outcome {
            Ok(result) => Self {
                success: true,
                result: Some(result),
                error: None,
            },
            Err(err) => Self {
                success: false,
                result: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Type-check a program given as AST JSON.
///
/// Returns a JSON string containing `Diagnostics`:
/// ```json
/// { "diagnostics": [ ... ], "total_errors": 0, "total_warnings": 1, "total_infos": 0 }
/// ```
///
/// A document that does not decode yields a single `E405` error.
#[wasm_bindgen]
pub fn check(ast_json: &str) -> String {
    let diagnostics = robotml_checker::check_json(ast_json).unwrap_or_else(|e| {
        let mut diagnostics = Diagnostics::empty();
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::MALFORMED_PROGRAM,
            format!("Malformed program: {e}"),
            Span::default(),
        ));
        diagnostics
    });
    serde_json::to_string(&diagnostics).unwrap_or_else(|e| {
        format!(
            r#"{{"diagnostics":[],"total_errors":1,"total_warnings":0,"total_infos":0,"error":"Serialization error: {}"}}"#,
            e
        )
    })
}

/// Run a program given as AST JSON.
///
/// Returns `{"success":true,"result":{...}}` or
/// `{"success":false,"error":"..."}`.
#[wasm_bindgen]
pub fn interpret(ast_json: &str) -> String {
    let response = InterpretResponse::from(robotml_eval::interpret_json(ast_json));
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e)
    })
}

/// Run a program given as a JS object, with an optional configuration object
/// (`{ entry_point, max_call_depth }`). Returns the `InterpreterResult` as a
/// plain JS object or throws on a runtime error.
#[wasm_bindgen]
pub fn interpret_value(ast: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let program: Program = serde_wasm_bindgen::from_value(ast)
        .map_err(|e| JsError::new(&EvalError::MalformedProgram(e.to_string()).to_string()))?;
    let config: InterpreterConfig = if config.is_undefined() || config.is_null() {
        InterpreterConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
    };

    let result = robotml_eval::interpret_with(&program, config)
        .map_err(|e| JsError::new(&e.to_string()))?;
    result
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Return the package version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
