use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity. None of them abort checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Diagnostic category, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Scope,
    Type,
    Value,
    Structure,
    Command,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scope => write!(f, "scope"),
            Self::Type => write!(f, "type"),
            Self::Value => write!(f, "value"),
            Self::Structure => write!(f, "structure"),
            Self::Command => write!(f, "command"),
        }
    }
}

/// Numeric diagnostic code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagnosticCode(pub u16);

impl DiagnosticCode {
    // ── Scope (E100–E199) ──
    pub const DUPLICATE_DECLARATION: Self = Self(100);
    pub const UNDEFINED_VARIABLE: Self = Self(101);
    pub const OUT_OF_SCOPE_VARIABLE: Self = Self(102);
    pub const UNDEFINED_FUNCTION: Self = Self(103);
    pub const DUPLICATE_FUNCTION: Self = Self(104);
    pub const DUPLICATE_PARAMETER: Self = Self(105);

    // ── Type (E200–E299) ──
    pub const TYPE_MISMATCH: Self = Self(200);
    pub const WRONG_ARG_COUNT: Self = Self(201);
    pub const INVALID_CAST: Self = Self(202);
    pub const NON_BOOLEAN_CONDITION: Self = Self(203);
    pub const NON_NUMERIC_OPERAND: Self = Self(204);
    pub const IMPLICIT_UNIT_CAST: Self = Self(205);

    // ── Value (E300–E399) ──
    pub const DIVISION_BY_ZERO: Self = Self(300);
    pub const NEGATIVE_SPEED: Self = Self(301);

    // ── Structure (E400–E499) ──
    pub const MISSING_RETURN: Self = Self(400);
    pub const VOID_RETURNS_VALUE: Self = Self(401);
    pub const MISSING_RETURN_VALUE: Self = Self(402);
    pub const EMPTY_PROGRAM: Self = Self(403);
    pub const MISSING_ENTRY_POINT: Self = Self(404);
    /// The AST document itself could not be decoded.
    pub const MALFORMED_PROGRAM: Self = Self(405);

    // ── Command (E500–E599) ──
    pub const MISSING_UNIT: Self = Self(500);
    pub const INVALID_MOVEMENT_UNIT: Self = Self(501);
    pub const CAST_CLOCK_ANGLE: Self = Self(502);
    pub const INVALID_SPEED_UNIT: Self = Self(503);

    /// Get the category for this code.
    pub fn category(self) -> DiagnosticCategory {
        match self.0 {
            100..=199 => DiagnosticCategory::Scope,
            200..=299 => DiagnosticCategory::Type,
            300..=399 => DiagnosticCategory::Value,
            400..=499 => DiagnosticCategory::Structure,
            _ => DiagnosticCategory::Command,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A checker-produced advisory record.
///
/// The host renders these as inline markers; it must not parse `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// Category (derived from code).
    pub category: DiagnosticCategory,
    pub message: String,
    /// Location of the offending node.
    #[serde(flatten)]
    pub span: Span,
    /// Name of the node property the diagnostic points at (`value`, `args`, ...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub property: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity,
            code,
            category: code.category(),
            message: message.into(),
            span,
            property: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Info, code, message, span)
    }

    /// Point the diagnostic at a named property of its node.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} [{}] {}",
            self.span, self.severity, self.code, self.category, self.message
        )
    }
}

/// Every diagnostic from one checking pass, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_infos: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.total_errors += 1,
            Severity::Warning => self.total_warnings += 1,
            Severity::Info => self.total_infos += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics of one severity, in emission order.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
