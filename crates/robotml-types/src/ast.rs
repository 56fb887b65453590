//! AST node types for the RobotML language.
//!
//! The tree is produced by the external parser and decoded here with serde.
//! Statements and expressions are internally tagged with a `"$type"` field
//! naming the concrete node kind. Every node carries an optional [`Span`];
//! absent spans decode as [`Span::default`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete RobotML program: an ordered list of function definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
    #[serde(default)]
    pub span: Span,
}

impl Program {
    /// Decode a program from the parser's JSON output.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// First function declared with `name`.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// `let returnType name(params) { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub return_type: TypeName,
    #[serde(default)]
    pub params: Vec<Param>,
    pub body: Block,
    #[serde(default)]
    pub span: Span,
}

impl FunctionDef {
    pub fn is_void(&self) -> bool {
        self.return_type == TypeName::Void
    }
}

/// A typed parameter: `number n`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default)]
    pub span: Span,
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub statements: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Names & Enumerations
// ══════════════════════════════════════════════════════════════════════════════

/// A type as written in the source: declarations, parameters, casts and
/// function return types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    #[default]
    Void,
    Number,
    Boolean,
    Cm,
    Mm,
}

impl TypeName {
    /// The physical unit this type denotes, if any.
    pub fn as_unit(self) -> Option<Unit> {
        match self {
            TypeName::Cm => Some(Unit::Cm),
            TypeName::Mm => Some(Unit::Mm),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeName::Void => "void",
            TypeName::Number => "number",
            TypeName::Boolean => "boolean",
            TypeName::Cm => "cm",
            TypeName::Mm => "mm",
        };
        f.write_str(s)
    }
}

/// Physical distance unit. `1 cm == 10 mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Cm,
    Mm,
}

impl From<Unit> for TypeName {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Cm => TypeName::Cm,
            Unit::Mm => TypeName::Mm,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&TypeName::from(*self), f)
    }
}

/// Explicit sign prefix on literals and clock angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

/// Direction of a `Movement` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Forward => "Forward",
            Direction::Backward => "Backward",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(s)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Stmt {
    /// `var number x = expr`
    VariableDecl(VariableDecl),
    /// `x = expr`
    VariableAssign(VariableAssign),
    /// `return expr`
    Return(ReturnStmt),
    /// `loop cond { ... }`
    Loop(LoopStmt),
    /// `f(args)` in statement position
    FunctionCall(CallStmt),
    /// `// text`
    Comment(CommentStmt),

    // ── Robot commands ──
    /// `Forward expr in cm`
    Movement(MovementCmd),
    /// `Rotation expr`
    Rotation(RotationCmd),
    /// `Clock [+|-] expr`
    Clock(ClockCmd),
    /// `Speed expr`
    Speed(SpeedCmd),
    /// Legacy literal form: `Forward 100 cm`
    Forward(ForwardCmd),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VariableDecl(s) => s.span,
            Stmt::VariableAssign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Loop(s) => s.span,
            Stmt::FunctionCall(s) => s.span,
            Stmt::Comment(s) => s.span,
            Stmt::Movement(s) => s.span,
            Stmt::Rotation(s) => s.span,
            Stmt::Clock(s) => s.span,
            Stmt::Speed(s) => s.span,
            Stmt::Forward(s) => s.span,
        }
    }
}

/// `var type name [= init]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// `target = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssign {
    pub target: VarRef,
    pub value: Expr,
    #[serde(default)]
    pub span: Span,
}

/// `return [value]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    #[serde(default)]
    pub value: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

/// `loop condition { body }`, a while-loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStmt {
    pub condition: Expr,
    pub body: Block,
    #[serde(default)]
    pub span: Span,
}

/// A call whose value is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStmt {
    pub callee: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentStmt {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementCmd {
    pub direction: Direction,
    pub value: Expr,
    /// Explicit trailing unit (`in cm`). `None` when the value carries its
    /// own unit via a cast, or when the program relies on the default.
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationCmd {
    pub angle: Expr,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockCmd {
    pub angle: Expr,
    #[serde(default)]
    pub sign: Option<Sign>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedCmd {
    pub value: Expr,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardCmd {
    pub distance: f64,
    pub unit: Unit,
    #[serde(default)]
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The signed value of a number literal, `None` for anything else.
    pub fn literal_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::NumberLiteral { value, sign } => Some(match sign {
                Some(Sign::Minus) => -value,
                _ => *value,
            }),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::ParenExpr { inner } = &expr.kind {
            expr = inner;
        }
        expr
    }
}

/// A resolved reference to a variable or parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    /// Type of the declaration the parser linked this reference to.
    #[serde(default)]
    pub declared: Option<TypeName>,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum ExprKind {
    // ── Literals ──
    /// `42`, `-3.5`
    NumberLiteral {
        value: f64,
        #[serde(default)]
        sign: Option<Sign>,
    },
    /// `true` / `false`
    BooleanLiteral { value: bool },

    // ── References & Calls ──
    Variable(VarRef),
    /// `f(args...)`
    FunctionCall {
        callee: String,
        #[serde(default)]
        args: Vec<Expr>,
    },

    // ── Operators ──
    /// `a + b`, `a % b`, ...
    BinaryOperation {
        left: Box<Expr>,
        op: ArithOp,
        right: Box<Expr>,
    },
    /// `a < b`, `a == b`, ...
    BooleanExpr {
        left: Box<Expr>,
        comparator: Comparator,
        right: Box<Expr>,
    },
    /// `a and b`, `a or b`
    LogicalExpr {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// `(type) expr`
    Cast {
        target: TypeName,
        value: Box<Expr>,
    },

    // ── Grouping ──
    /// `(expr)`
    ParenExpr { inner: Box<Expr> },
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        };
        f.write_str(s)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEq,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEq,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
}

impl Comparator {
    /// `<`, `<=`, `>`, `>=`; meaningless on booleans.
    pub fn is_ordering(self) -> bool {
        !matches!(self, Comparator::Eq | Comparator::NotEq)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Less => "<",
            Comparator::LessEq => "<=",
            Comparator::Greater => ">",
            Comparator::GreaterEq => ">=",
            Comparator::Eq => "==",
            Comparator::NotEq => "!=",
        };
        f.write_str(s)
    }
}

/// Short-circuiting boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("and"),
            LogicalOp::Or => f.write_str("or"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decode_minimal_program() {
        let prog: Program = serde_json::from_value(json!({
            "functions": [{
                "name": "main",
                "return_type": "void",
                "body": { "statements": [
                    { "$type": "Forward", "distance": 100, "unit": "cm" }
                ]}
            }]
        }))
        .unwrap();

        assert_eq!(prog.functions.len(), 1);
        let main = prog.function("main").unwrap();
        assert!(main.is_void());
        assert!(main.params.is_empty());
        assert_eq!(
            main.body.statements[0],
            Stmt::Forward(ForwardCmd {
                distance: 100.0,
                unit: Unit::Cm,
                span: Span::default(),
            })
        );
    }

    #[test]
    fn decode_nested_expression_with_span() {
        let expr: Expr = serde_json::from_value(json!({
            "$type": "BinaryOperation",
            "op": "/",
            "left": { "$type": "NumberLiteral", "value": 1 },
            "right": {
                "$type": "ParenExpr",
                "inner": { "$type": "NumberLiteral", "value": 0, "sign": "-" }
            },
            "span": { "start_line": 3, "start_col": 9, "end_line": 3, "end_col": 14 }
        }))
        .unwrap();

        assert_eq!(expr.span, Span::new(3, 9, 3, 14));
        let ExprKind::BinaryOperation { left, op, right } = &expr.kind else {
            panic!("expected binary operation, got {:?}", expr.kind);
        };
        assert_eq!(*op, ArithOp::Div);
        assert_eq!(left.literal_number(), Some(1.0));
        assert_eq!(right.unparen().literal_number(), Some(-0.0));
    }

    #[test]
    fn decode_variable_reference() {
        let expr: Expr = serde_json::from_value(json!({
            "$type": "Variable", "name": "d", "declared": "mm"
        }))
        .unwrap();
        assert_eq!(
            expr.kind,
            ExprKind::Variable(VarRef {
                name: "d".into(),
                declared: Some(TypeName::Mm),
            })
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let result: Result<Stmt, _> = serde_json::from_value(json!({
            "$type": "Teleport", "value": { "$type": "NumberLiteral", "value": 1 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let result: Result<Expr, _> = serde_json::from_value(json!({
            "$type": "BinaryOperation",
            "op": "**",
            "left": { "$type": "NumberLiteral", "value": 2 },
            "right": { "$type": "NumberLiteral", "value": 3 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn literal_number_applies_sign() {
        let neg = Expr::new(
            ExprKind::NumberLiteral {
                value: 5.0,
                sign: Some(Sign::Minus),
            },
            Span::default(),
        );
        assert_eq!(neg.literal_number(), Some(-5.0));
        let t = Expr::new(ExprKind::BooleanLiteral { value: true }, Span::default());
        assert_eq!(t.literal_number(), None);
    }

    #[test]
    fn statements_decode_by_tag() {
        let speed: Stmt = serde_json::from_value(json!({
            "$type": "Speed", "value": { "$type": "NumberLiteral", "value": 3 }
        }))
        .unwrap();
        let comment: Stmt = serde_json::from_value(json!({ "$type": "Comment" })).unwrap();
        assert!(matches!(speed, Stmt::Speed(_)));
        assert!(matches!(comment, Stmt::Comment(_)));
    }

    #[test]
    fn type_name_display_and_units() {
        assert_eq!(TypeName::Boolean.to_string(), "boolean");
        assert_eq!(TypeName::Cm.as_unit(), Some(Unit::Cm));
        assert_eq!(TypeName::Number.as_unit(), None);
        assert_eq!(Unit::Mm.to_string(), "mm");
        assert!(Comparator::LessEq.is_ordering());
        assert!(!Comparator::NotEq.is_ordering());
    }
}
