//! Core statement and expression interpreter.

use std::collections::HashMap;

use robotml_types::ast::*;
use tracing::{debug, trace};

use crate::command::{CommandKind, CommandRecorder, InterpreterResult, MoveDirection};
use crate::config::InterpreterConfig;
use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// How a statement or block finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell through; carry on with the next statement.
    Continue,
    /// A `return` ran; unwind to the enclosing call.
    Return(Value),
}

/// Walks a [`Program`] and records the robot commands it issues.
///
/// One interpreter serves exactly one run; [`Interpreter::run`] consumes it.
pub struct Interpreter<'p> {
    /// Variable environment (scoped).
    env: Environment,
    /// User functions by name. A later definition replaces an earlier one.
    functions: HashMap<&'p str, &'p FunctionDef>,
    recorder: CommandRecorder,
    /// Number of calls currently executing.
    depth: usize,
    config: InterpreterConfig,
}

impl<'p> Interpreter<'p> {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            env: Environment::new(),
            functions: HashMap::new(),
            recorder: CommandRecorder::new(),
            depth: 0,
            config,
        }
    }

    /// Execute the entry function of `program` and hand back its commands.
    pub fn run(mut self, program: &'p Program) -> EvalResult<InterpreterResult> {
        for func in &program.functions {
            self.functions.insert(func.name.as_str(), func);
        }

        let Some(entry) = self.functions.get(self.config.entry_point.as_str()).copied() else {
            debug!(entry = %self.config.entry_point, "no entry function, nothing to run");
            return Ok(self.recorder.finish());
        };

        self.invoke(entry, Vec::new())?;
        debug!(commands = self.recorder.len(), "run finished");
        Ok(self.recorder.finish())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    fn eval_call(&mut self, callee: &str, args: &[Expr]) -> EvalResult<Value> {
        let func = self
            .functions
            .get(callee)
            .copied()
            .ok_or_else(|| EvalError::UndefinedFunction(callee.to_string()))?;

        // Arguments are evaluated in the caller's frame.
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        self.invoke(func, values)
    }

    fn invoke(&mut self, func: &'p FunctionDef, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != func.params.len() {
            return Err(EvalError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                actual: args.len(),
            });
        }
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::CallDepthExceeded(self.config.max_call_depth));
        }

        debug!(function = %func.name, depth = self.depth + 1, "call");
        self.depth += 1;
        self.env.push_call_scope();
        for (param, value) in func.params.iter().zip(args) {
            self.env.define(&param.name, value);
        }

        let flow = self.exec_block(&func.body);

        self.env.pop_scope();
        self.depth -= 1;

        Ok(match flow? {
            Flow::Return(value) => value,
            Flow::Continue => Value::Void,
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Block & Statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Execute a block in a fresh frame. Stops at the first `return`.
    pub fn exec_block(&mut self, block: &Block) -> EvalResult<Flow> {
        self.env.push_scope();
        trace!(
            statements = block.statements.len(),
            frames = self.env.depth(),
            "enter block"
        );
        let flow = self.exec_statements(&block.statements);
        self.env.pop_scope();
        flow
    }

    fn exec_statements(&mut self, statements: &[Stmt]) -> EvalResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    /// Execute a single statement.
    pub fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::VariableDecl(decl) => {
                let value = match &decl.init {
                    Some(init) => self.eval_expr(init)?,
                    None => Value::zero(decl.ty),
                };
                self.env.define(&decl.name, value);
            }
            Stmt::VariableAssign(assign) => {
                let value = self.eval_expr(&assign.value)?;
                if !self.env.set(&assign.target.name, value) {
                    return Err(EvalError::UndefinedVariable(assign.target.name.clone()));
                }
            }
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Loop(lp) => {
                while self.eval_expr(&lp.condition)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_block(&lp.body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::FunctionCall(call) => {
                self.eval_call(&call.callee, &call.args)?;
            }
            Stmt::Comment(_) => {}
            Stmt::Movement(cmd) => self.exec_movement(cmd)?,
            Stmt::Rotation(cmd) => {
                let angle = self.eval_expr(&cmd.angle)?.magnitude()?;
                self.recorder.record(CommandKind::Turn { angle });
            }
            Stmt::Clock(cmd) => {
                let angle = self.eval_expr(&cmd.angle)?.magnitude()?;
                let angle = match cmd.sign {
                    Some(Sign::Minus) => -angle,
                    _ => angle,
                };
                self.recorder.record(CommandKind::Turn { angle });
            }
            Stmt::Speed(cmd) => {
                let value = self.eval_expr(&cmd.value)?.magnitude()?;
                self.recorder.record(CommandKind::SetSpeed { value });
            }
            Stmt::Forward(cmd) => {
                self.recorder.record(CommandKind::Move {
                    distance: cmd.distance,
                    unit: cmd.unit,
                    direction: MoveDirection::Forward,
                });
            }
        }
        Ok(Flow::Continue)
    }

    fn exec_movement(&mut self, cmd: &MovementCmd) -> EvalResult<()> {
        let (magnitude, unit) = self.eval_expr(&cmd.value)?.as_distance(cmd.unit)?;
        let distance = match cmd.direction {
            Direction::Backward => -magnitude,
            _ => magnitude,
        };
        self.recorder.record(CommandKind::Move {
            distance,
            unit,
            direction: cmd.direction.into(),
        });
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLiteral { .. } => Ok(Value::Number(
                expr.literal_number().unwrap_or_default(),
            )),
            ExprKind::BooleanLiteral { value } => Ok(Value::Bool(*value)),
            ExprKind::Variable(var) => self
                .env
                .get(&var.name)
                .copied()
                .ok_or_else(|| EvalError::UndefinedVariable(var.name.clone())),
            ExprKind::FunctionCall { callee, args } => self.eval_call(callee, args),
            ExprKind::BinaryOperation { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::BooleanExpr {
                left,
                comparator,
                right,
            } => self.eval_comparison(left, *comparator, right),
            ExprKind::LogicalExpr { left, op, right } => self.eval_logical(left, *op, right),
            ExprKind::Cast { target, value } => self.eval_expr(value)?.cast(*target),
            ExprKind::ParenExpr { inner } => self.eval_expr(inner),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(&mut self, left: &Expr, op: ArithOp, right: &Expr) -> EvalResult<Value> {
        let a = self.eval_expr(left)?.magnitude()?;
        let b = self.eval_expr(right)?.magnitude()?;

        let result = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    return Err(EvalError::ArithmeticTrap("division by zero".into()));
                }
                a / b
            }
            ArithOp::Mod => {
                if b == 0.0 {
                    return Err(EvalError::ArithmeticTrap("modulo by zero".into()));
                }
                a % b
            }
        };
        if !result.is_finite() {
            return Err(EvalError::ArithmeticTrap(format!(
                "'{op}' produced NaN/Infinity"
            )));
        }
        Ok(Value::Number(result))
    }

    fn eval_comparison(
        &mut self,
        left: &Expr,
        comparator: Comparator,
        right: &Expr,
    ) -> EvalResult<Value> {
        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;

        let result = match comparator {
            // Strict: both kind and value must match.
            Comparator::Eq => lv == rv,
            Comparator::NotEq => lv != rv,
            Comparator::Less => lv.magnitude()? < rv.magnitude()?,
            Comparator::LessEq => lv.magnitude()? <= rv.magnitude()?,
            Comparator::Greater => lv.magnitude()? > rv.magnitude()?,
            Comparator::GreaterEq => lv.magnitude()? >= rv.magnitude()?,
        };
        Ok(Value::Bool(result))
    }

    fn eval_logical(&mut self, left: &Expr, op: LogicalOp, right: &Expr) -> EvalResult<Value> {
        let lv = self.eval_expr(left)?.is_truthy();
        let result = match op {
            LogicalOp::And if !lv => false,
            LogicalOp::Or if lv => true,
            _ => self.eval_expr(right)?.is_truthy(),
        };
        Ok(Value::Bool(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expr(value: serde_json::Value) -> Expr {
        serde_json::from_value(value).expect("invalid expression json")
    }

    fn num(value: f64) -> serde_json::Value {
        json!({ "$type": "NumberLiteral", "value": value })
    }

    fn eval(value: serde_json::Value) -> EvalResult<Value> {
        Interpreter::new(InterpreterConfig::default()).eval_expr(&expr(value))
    }

    #[test]
    fn test_signed_literal() {
        let v = eval(json!({ "$type": "NumberLiteral", "value": 4, "sign": "-" })).unwrap();
        assert_eq!(v, Value::Number(-4.0));
    }

    #[test]
    fn test_arithmetic_unwraps_lengths() {
        let v = eval(json!({
            "$type": "BinaryOperation",
            "left": { "$type": "Cast", "target": "cm", "value": num(3.0) },
            "op": "*",
            "right": num(2.0)
        }))
        .unwrap();
        assert_eq!(v, Value::Number(6.0));
    }

    #[test]
    fn test_modulo_by_zero_traps() {
        let err = eval(json!({
            "$type": "BinaryOperation", "left": num(3.0), "op": "%", "right": num(0.0)
        }))
        .unwrap_err();
        assert_eq!(err, EvalError::ArithmeticTrap("modulo by zero".into()));
    }

    #[test]
    fn test_strict_equality_compares_kind() {
        let v = eval(json!({
            "$type": "BooleanExpr",
            "left": { "$type": "Cast", "target": "mm", "value": num(5.0) },
            "comparator": "==",
            "right": num(5.0)
        }))
        .unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn test_ordering_is_numeric() {
        let v = eval(json!({
            "$type": "BooleanExpr",
            "left": { "$type": "Cast", "target": "mm", "value": num(5.0) },
            "comparator": "<=",
            "right": num(5.0)
        }))
        .unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_logical_short_circuit_skips_right() {
        // The right side would fail if evaluated.
        let v = eval(json!({
            "$type": "LogicalExpr",
            "left": { "$type": "BooleanLiteral", "value": false },
            "op": "and",
            "right": { "$type": "Variable", "name": "missing" }
        }))
        .unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn test_unbound_variable() {
        let err = eval(json!({ "$type": "Variable", "name": "x", "declared": "number" }))
            .unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable("x".into()));
    }

    #[test]
    fn test_block_returns_early() {
        let block: Block = serde_json::from_value(json!({
            "statements": [
                { "$type": "Return", "value": num(1.0) },
                { "$type": "Rotation", "angle": num(90.0) }
            ]
        }))
        .unwrap();
        let mut interp = Interpreter::new(InterpreterConfig::default());
        assert_eq!(
            interp.exec_block(&block).unwrap(),
            Flow::Return(Value::Number(1.0))
        );
        assert!(interp.recorder.is_empty());
        assert_eq!(interp.env.depth(), 1);
    }

    #[test]
    fn test_unit_declaration_stores_bare_number() {
        let decl: Stmt = serde_json::from_value(json!({
            "$type": "VariableDecl", "name": "d", "type": "cm", "init": num(10.0)
        }))
        .unwrap();
        let mut interp = Interpreter::new(InterpreterConfig::default());
        interp.exec_stmt(&decl).unwrap();
        assert_eq!(interp.env.get("d"), Some(&Value::Number(10.0)));
    }
}
