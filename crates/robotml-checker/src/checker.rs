//! RobotML type checker: walks a decoded AST and validates types.
//!
//! Entry point: [`TypeChecker::check`].
//!
//! Every finding is a [`Diagnostic`]; nothing aborts the walk, so checking is
//! total over any well-formed AST. Codes emitted:
//! - E100–E105: duplicate / unresolved names
//! - E200–E205: type mismatches, arity, casts, conditions, operands, implicit unit casts
//! - E300–E301: literal division by zero, negative speed
//! - E400–E404: return rules, empty program, missing `main`
//! - E500–E503: robot command unit rules

use std::collections::HashMap;

use robotml_types::ast::*;
use robotml_types::{Diagnostic, DiagnosticCode, Diagnostics, Span};
use tracing::{debug, trace};

use crate::scope::{ScopeError, ScopeTable};
use crate::ty::{FnSig, Type};

/// Name of the function the interpreter starts from unless configured otherwise.
pub const ENTRY_POINT: &str = "main";

/// Identity of an expression node inside the borrowed program.
///
/// The AST is borrowed immutably for the whole pass, so node addresses are
/// stable and unique for its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey(*const Expr);

impl NodeKey {
    fn of(expr: &Expr) -> Self {
        Self(expr as *const Expr)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// TypeChecker
// ══════════════════════════════════════════════════════════════════════════════

/// Walks a [`Program`] once and collects diagnostics.
pub struct TypeChecker<'p> {
    scopes: ScopeTable,
    diagnostics: Diagnostics,
    /// User function signatures by name.
    functions: HashMap<String, FnSig>,
    /// Number literals implicitly cast to a unit type, keyed by node.
    unit_tags: HashMap<NodeKey, Type>,
    /// Function whose body is being checked.
    current_fn: Option<&'p FunctionDef>,
    /// Function a run starts from; its absence is warned about.
    entry_point: String,
}

impl<'p> TypeChecker<'p> {
    pub fn new() -> Self {
        Self {
            scopes: ScopeTable::new(),
            diagnostics: Diagnostics::empty(),
            functions: HashMap::new(),
            unit_tags: HashMap::new(),
            current_fn: None,
            entry_point: ENTRY_POINT.to_string(),
        }
    }

    /// Check against an entry function other than [`ENTRY_POINT`].
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    /// Type-check a complete program.
    pub fn check(&mut self, program: &'p Program) {
        if program.functions.is_empty() {
            self.warning(
                DiagnosticCode::EMPTY_PROGRAM,
                "Program has no functions defined".to_string(),
                program.span,
            );
            return;
        }

        // 1. Register every signature so calls may precede definitions
        for func in &program.functions {
            let sig = FnSig {
                params: func
                    .params
                    .iter()
                    .map(|p| (p.name.clone(), Type::from(p.ty)))
                    .collect(),
                ret: Type::from(func.return_type),
            };
            self.functions.insert(func.name.clone(), sig);
        }

        // 2. Program-level structure
        for func in &program.functions {
            let count = program
                .functions
                .iter()
                .filter(|f| f.name == func.name)
                .count();
            if count > 1 {
                self.accept(
                    Diagnostic::error(
                        DiagnosticCode::DUPLICATE_FUNCTION,
                        format!("Function name '{}' is already defined", func.name),
                        func.span,
                    )
                    .with_property("name"),
                );
            }
        }
        if program.function(&self.entry_point).is_none() {
            let message = format!(
                "Program has no entry point function named \"{}\"",
                self.entry_point
            );
            self.warning(DiagnosticCode::MISSING_ENTRY_POINT, message, program.span);
        }

        // 3. Function bodies
        for func in &program.functions {
            self.check_function(func);
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// The unit a number literal was implicitly cast to, if any.
    pub fn unit_tag(&self, expr: &Expr) -> Option<Type> {
        self.unit_tags.get(&NodeKey::of(expr)).copied()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Functions & Blocks
    // ══════════════════════════════════════════════════════════════════════

    fn check_function(&mut self, func: &'p FunctionDef) {
        trace!(function = %func.name, "checking function");
        self.current_fn = Some(func);
        self.scopes.enter_scope();

        for param in &func.params {
            if let Err(ScopeError::DuplicateSymbol { name, .. }) =
                self.scopes.declare(&param.name, Type::from(param.ty), param.span)
            {
                self.error(
                    DiagnosticCode::DUPLICATE_PARAMETER,
                    format!(
                        "Function '{}' has duplicate parameter name '{}'",
                        func.name, name
                    ),
                    param.span,
                );
            }
        }

        if !func.is_void() && !block_has_return(&func.body) {
            self.accept(
                Diagnostic::error(
                    DiagnosticCode::MISSING_RETURN,
                    format!(
                        "Function \"{}\" has return type \"{}\" but no return statement",
                        func.name, func.return_type
                    ),
                    func.span,
                )
                .with_property("name"),
            );
        }

        self.check_block(&func.body);

        self.scopes.exit_scope();
        self.current_fn = None;
    }

    fn check_block(&mut self, block: &Block) {
        self.scopes.enter_scope();
        for stmt in &block.statements {
            self.check_stmt(stmt);
        }
        self.scopes.exit_scope();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VariableDecl(decl) => self.check_variable_decl(decl),
            Stmt::VariableAssign(assign) => {
                let target_ty = self.resolve_reference(&assign.target, assign.span);
                self.check_assignment(target_ty, &assign.value, assign.span);
                self.check_expr(&assign.value);
            }
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::Loop(lp) => {
                let cond_ty = self.type_of(&lp.condition);
                if !matches!(cond_ty, Type::Boolean | Type::Unknown) {
                    self.accept(
                        Diagnostic::error(
                            DiagnosticCode::NON_BOOLEAN_CONDITION,
                            format!("Loop condition must be boolean, got \"{cond_ty}\""),
                            lp.span,
                        )
                        .with_property("condition"),
                    );
                }
                self.check_expr(&lp.condition);
                self.check_block(&lp.body);
            }
            Stmt::FunctionCall(call) => self.check_call(&call.callee, &call.args, call.span),
            Stmt::Comment(_) => {}
            Stmt::Movement(cmd) => self.check_movement(cmd),
            Stmt::Rotation(cmd) => {
                self.check_numeric(&cmd.angle, "Rotation angle must be numeric", cmd.span, "angle");
                self.check_expr(&cmd.angle);
            }
            Stmt::Clock(cmd) => {
                self.check_numeric(&cmd.angle, "Clock angle must be numeric", cmd.span, "angle");
                if matches!(cmd.angle.unparen().kind, ExprKind::Cast { .. }) {
                    self.accept(
                        Diagnostic::error(
                            DiagnosticCode::CAST_CLOCK_ANGLE,
                            "Clock angle cannot be cast",
                            cmd.span,
                        )
                        .with_property("angle"),
                    );
                }
                self.check_expr(&cmd.angle);
            }
            Stmt::Speed(cmd) => self.check_speed(cmd),
            // Literal distance and unit are enforced by the grammar.
            Stmt::Forward(_) => {}
        }
    }

    fn check_variable_decl(&mut self, decl: &VariableDecl) {
        let declared = Type::from(decl.ty);

        // Declare first so the initializer may reference the new name
        if let Err(ScopeError::DuplicateSymbol { name, .. }) =
            self.scopes.declare(&decl.name, declared, decl.span)
        {
            self.error(
                DiagnosticCode::DUPLICATE_DECLARATION,
                format!("Variable '{name}' is already declared in this scope"),
                decl.span,
            );
        }

        if let Some(init) = &decl.init {
            self.check_expr(init);
            self.check_assignment(declared, init, decl.span);
        }
    }

    fn check_return(&mut self, ret: &ReturnStmt) {
        let Some(func) = self.current_fn else {
            return;
        };

        match (&ret.value, func.is_void()) {
            (Some(_), true) => {
                self.error(
                    DiagnosticCode::VOID_RETURNS_VALUE,
                    "Void function should not return a value".to_string(),
                    ret.span,
                );
            }
            (None, false) => {
                self.error(
                    DiagnosticCode::MISSING_RETURN_VALUE,
                    format!(
                        "Function '{}' must return a value of type '{}'",
                        func.name, func.return_type
                    ),
                    ret.span,
                );
            }
            (Some(value), false) => {
                let expected = Type::from(func.return_type);
                let value_ty = self.type_of(value);
                if !value_ty.is_assignable_to(expected) {
                    self.accept(
                        Diagnostic::error(
                            DiagnosticCode::TYPE_MISMATCH,
                            format!(
                                "Cannot return value of type \"{value_ty}\" from function that returns \"{expected}\""
                            ),
                            ret.span,
                        )
                        .with_property("value"),
                    );
                }
            }
            (None, true) => {}
        }

        if let Some(value) = &ret.value {
            self.check_expr(value);
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────

    fn check_movement(&mut self, cmd: &MovementCmd) {
        self.check_numeric(&cmd.value, "Movement value must be numeric", cmd.span, "value");

        match &cmd.value.unparen().kind {
            ExprKind::Cast { target, .. } if target.as_unit().is_none() => {
                self.accept(
                    Diagnostic::error(
                        DiagnosticCode::INVALID_MOVEMENT_UNIT,
                        "Movement value can only be cast to mm or cm",
                        cmd.span,
                    )
                    .with_property("value"),
                );
            }
            ExprKind::Cast { .. } => {}
            _ => {
                if cmd.unit.is_none() && self.type_of(&cmd.value) == Type::Number {
                    self.accept(
                        Diagnostic::warning(
                            DiagnosticCode::MISSING_UNIT,
                            "Movement value should include a unit (using cast to cm or mm)",
                            cmd.span,
                        )
                        .with_property("value"),
                    );
                }
            }
        }

        self.check_expr(&cmd.value);
    }

    fn check_speed(&mut self, cmd: &SpeedCmd) {
        self.check_numeric(&cmd.value, "Speed value must be numeric", cmd.span, "value");

        let value = cmd.value.unparen();
        if value.literal_number().is_some_and(|v| v < 0.0) {
            self.accept(
                Diagnostic::error(
                    DiagnosticCode::NEGATIVE_SPEED,
                    "Speed value must be positive",
                    cmd.span,
                )
                .with_property("value"),
            );
        }
        if let ExprKind::Cast { target, .. } = &value.kind {
            if target.as_unit().is_none() {
                self.accept(
                    Diagnostic::error(
                        DiagnosticCode::INVALID_SPEED_UNIT,
                        "Speed value can only be cast to cm or mm",
                        cmd.span,
                    )
                    .with_property("value"),
                );
            }
        }

        self.check_expr(&cmd.value);
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Visit an expression and report problems in it and its children.
    fn check_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::NumberLiteral { .. } | ExprKind::BooleanLiteral { .. } => {}

            ExprKind::Variable(var) => {
                self.resolve_reference(var, expr.span);
            }

            ExprKind::FunctionCall { callee, args } => self.check_call(callee, args, expr.span),

            ExprKind::BinaryOperation { left, op, right } => {
                self.check_numeric(
                    left,
                    "Left operand of binary operation must be numeric",
                    expr.span,
                    "left",
                );
                self.check_expr(left);
                self.check_numeric(
                    right,
                    "Right operand of binary operation must be numeric",
                    expr.span,
                    "right",
                );
                self.check_expr(right);

                if *op == ArithOp::Div && right.unparen().literal_number() == Some(0.0) {
                    self.accept(
                        Diagnostic::error(
                            DiagnosticCode::DIVISION_BY_ZERO,
                            "Division by zero",
                            expr.span,
                        )
                        .with_property("right"),
                    );
                }
            }

            ExprKind::BooleanExpr {
                left,
                comparator,
                right,
            } => {
                let left_ty = self.type_of(left);
                let right_ty = self.type_of(right);
                if left_ty == Type::Boolean && right_ty == Type::Boolean && comparator.is_ordering() {
                    self.error(
                        DiagnosticCode::TYPE_MISMATCH,
                        format!("Cannot use '{comparator}' operator with boolean values"),
                        expr.span,
                    );
                } else if !left_ty.is_assignable_to(right_ty) {
                    self.error(
                        DiagnosticCode::TYPE_MISMATCH,
                        format!("Cannot compare incompatible types \"{left_ty}\" and \"{right_ty}\""),
                        expr.span,
                    );
                }
                self.check_expr(left);
                self.check_expr(right);
            }

            ExprKind::LogicalExpr { left, op, right } => {
                for (side, operand) in [("left", left), ("right", right)] {
                    let ty = self.type_of(operand);
                    if !matches!(ty, Type::Boolean | Type::Unknown) {
                        let which = if side == "left" { "Left" } else { "Right" };
                        self.accept(
                            Diagnostic::error(
                                DiagnosticCode::NON_BOOLEAN_CONDITION,
                                format!(
                                    "{which} operand of '{op}' must be boolean, got \"{ty}\""
                                ),
                                expr.span,
                            )
                            .with_property(side),
                        );
                    }
                    self.check_expr(operand);
                }
            }

            ExprKind::Cast { target, value } => {
                let value_ty = self.type_of(value);
                let target_ty = Type::from(*target);
                if target_ty == Type::Void {
                    self.accept(
                        Diagnostic::error(
                            DiagnosticCode::INVALID_CAST,
                            format!("Invalid cast type \"{target}\""),
                            expr.span,
                        )
                        .with_property("target"),
                    );
                } else if value_ty == Type::Boolean && target_ty.is_numeric() {
                    self.error(
                        DiagnosticCode::INVALID_CAST,
                        format!("Cannot cast boolean to \"{target}\""),
                        expr.span,
                    );
                } else if value_ty.is_numeric() && target_ty == Type::Boolean {
                    self.error(
                        DiagnosticCode::INVALID_CAST,
                        format!("Cannot cast \"{value_ty}\" to boolean"),
                        expr.span,
                    );
                }
                self.check_expr(value);
            }

            ExprKind::ParenExpr { inner } => self.check_expr(inner),
        }
    }

    /// Infer the static type of an expression without reporting anything.
    pub fn type_of(&self, expr: &Expr) -> Type {
        if let Some(tagged) = self.unit_tag(expr) {
            return tagged;
        }
        match &expr.kind {
            ExprKind::NumberLiteral { .. } => Type::Number,
            ExprKind::BooleanLiteral { .. } => Type::Boolean,
            ExprKind::Variable(var) => match self.scopes.resolve(&var.name) {
                Ok(symbol) => symbol.ty,
                Err(_) => var.declared.map(Type::from).unwrap_or(Type::Unknown),
            },
            ExprKind::BinaryOperation { .. } => Type::Number,
            ExprKind::BooleanExpr { .. } | ExprKind::LogicalExpr { .. } => Type::Boolean,
            ExprKind::ParenExpr { inner } => self.type_of(inner),
            ExprKind::Cast { target, .. } => Type::from(*target),
            ExprKind::FunctionCall { callee, .. } => self
                .functions
                .get(callee)
                .map(|sig| sig.ret)
                .unwrap_or(Type::Unknown),
        }
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    fn check_call(&mut self, callee: &str, args: &[Expr], span: Span) {
        let Some(sig) = self.functions.get(callee).cloned() else {
            self.error(
                DiagnosticCode::UNDEFINED_FUNCTION,
                format!("Reference to undefined function '{callee}'"),
                span,
            );
            for arg in args {
                self.check_expr(arg);
            }
            return;
        };

        if args.len() != sig.params.len() {
            self.error(
                DiagnosticCode::WRONG_ARG_COUNT,
                format!(
                    "Function call '{callee}' expects {} argument(s), but got {}.",
                    sig.params.len(),
                    args.len()
                ),
                span,
            );
            return;
        }

        for (index, (arg, (_, param_ty))) in args.iter().zip(sig.params.iter()).enumerate() {
            let arg_ty = self.coerce_literal(*param_ty, arg, span, "args");
            if !arg_ty.is_assignable_to(*param_ty) {
                self.accept(
                    Diagnostic::error(
                        DiagnosticCode::TYPE_MISMATCH,
                        format!(
                            "Argument {} of function '{callee}' expects type '{param_ty}', but got '{arg_ty}'",
                            index + 1
                        ),
                        span,
                    )
                    .with_property("args"),
                );
            }
            self.check_expr(arg);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Shared rules
    // ══════════════════════════════════════════════════════════════════════

    /// Resolve a variable reference, reporting when it is out of scope.
    fn resolve_reference(&mut self, var: &VarRef, span: Span) -> Type {
        if let Ok(symbol) = self.scopes.resolve(&var.name) {
            return symbol.ty;
        }
        match var.declared {
            Some(declared) => {
                self.warning(
                    DiagnosticCode::OUT_OF_SCOPE_VARIABLE,
                    format!("Variable '{}' might be used outside its scope", var.name),
                    span,
                );
                Type::from(declared)
            }
            None => {
                self.error(
                    DiagnosticCode::UNDEFINED_VARIABLE,
                    format!("Reference to undefined variable '{}'", var.name),
                    span,
                );
                Type::Unknown
            }
        }
    }

    /// Check that `value` may be stored in a slot of type `target`.
    fn check_assignment(&mut self, target: Type, value: &Expr, span: Span) {
        let value_ty = self.type_of(value);

        if (target == Type::Boolean && value_ty == Type::Number)
            || (target == Type::Number && value_ty == Type::Boolean)
        {
            self.error(
                DiagnosticCode::TYPE_MISMATCH,
                format!("Cannot assign {value_ty} to {target}"),
                span,
            );
            return;
        }

        let value_ty = self.coerce_literal(target, value, span, "value");
        if !value_ty.is_assignable_to(target) {
            self.accept(
                Diagnostic::error(
                    DiagnosticCode::TYPE_MISMATCH,
                    format!(
                        "Cannot assign value of type \"{value_ty}\" to variable of type \"{target}\""
                    ),
                    span,
                )
                .with_property("value"),
            );
        }
    }

    /// Tag a bare number literal flowing into a unit-typed slot with that
    /// unit. Returns the type the value has from now on.
    fn coerce_literal(&mut self, target: Type, value: &Expr, span: Span, property: &str) -> Type {
        let value_ty = self.type_of(value);
        if target.is_unit()
            && value_ty == Type::Number
            && matches!(value.kind, ExprKind::NumberLiteral { .. })
        {
            self.unit_tags.insert(NodeKey::of(value), target);
            self.accept(
                Diagnostic::info(
                    DiagnosticCode::IMPLICIT_UNIT_CAST,
                    format!("Automatically cast number to {target}"),
                    span,
                )
                .with_property(property),
            );
            return target;
        }
        value_ty
    }

    fn check_numeric(&mut self, expr: &Expr, message: &str, span: Span, property: &str) {
        let ty = self.type_of(expr);
        if !(ty.is_numeric() || ty == Type::Unknown) {
            self.accept(
                Diagnostic::error(
                    DiagnosticCode::NON_NUMERIC_OPERAND,
                    format!("{message}, got \"{ty}\""),
                    span,
                )
                .with_property(property),
            );
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Diagnostic Reporting
    // ══════════════════════════════════════════════════════════════════════

    fn accept(&mut self, diagnostic: Diagnostic) {
        debug!(
            code = %diagnostic.code,
            severity = %diagnostic.severity,
            at = %diagnostic.span,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    fn error(&mut self, code: DiagnosticCode, message: String, span: Span) {
        self.accept(Diagnostic::error(code, message, span));
    }

    fn warning(&mut self, code: DiagnosticCode, message: String, span: Span) {
        self.accept(Diagnostic::warning(code, message, span));
    }
}

impl Default for TypeChecker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Whether a block contains a `return`, directly or inside any nested loop
/// body. Other nesting is not inspected.
fn block_has_return(block: &Block) -> bool {
    block.statements.iter().any(|stmt| match stmt {
        Stmt::Return(_) => true,
        Stmt::Loop(lp) => block_has_return(&lp.body),
        _ => false,
    })
}
