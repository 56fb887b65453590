//! Internal type representation for the RobotML type checker.
//!
//! [`Type`] is the semantic type used during checking. It is distinct from
//! [`robotml_types::ast::TypeName`], the syntactic form produced by the parser,
//! in that it has an [`Type::Unknown`] member for unresolved references.

use std::fmt;

use robotml_types::ast::TypeName;

// ══════════════════════════════════════════════════════════════════════════════
// Type
// ══════════════════════════════════════════════════════════════════════════════

/// A semantic type in RobotML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Number,
    Boolean,
    /// Centimetres.
    Cm,
    /// Millimetres.
    Mm,
    /// Functions and statements that produce no value.
    Void,
    /// Type could not be determined (error recovery).
    Unknown,
}

/// A function signature, as seen from call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<(String, Type)>,
    pub ret: Type,
}

impl Type {
    /// Convert a syntactic [`TypeName`] into a semantic `Type`.
    pub fn from_annotation(name: TypeName) -> Self {
        match name {
            TypeName::Void => Type::Void,
            TypeName::Number => Type::Number,
            TypeName::Boolean => Type::Boolean,
            TypeName::Cm => Type::Cm,
            TypeName::Mm => Type::Mm,
        }
    }

    pub fn is_unit(self) -> bool {
        matches!(self, Type::Cm | Type::Mm)
    }

    /// `number`, `cm` or `mm`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Number | Type::Cm | Type::Mm)
    }

    /// Check if a value of this type may flow into a `target` slot.
    ///
    /// Rules:
    /// - Same type → yes
    /// - `number` ↔ `cm` / `mm` → yes
    /// - `cm` ↔ `mm` → yes
    /// - `Unknown` is compatible with anything (error recovery)
    /// - everything else (notably `boolean` with any numeric type) → no
    pub fn is_assignable_to(self, target: Type) -> bool {
        if self == target {
            return true;
        }
        if self == Type::Unknown || target == Type::Unknown {
            return true;
        }
        self.is_numeric() && target.is_numeric()
    }
}

impl From<TypeName> for Type {
    fn from(name: TypeName) -> Self {
        Type::from_annotation(name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Number => "number",
            Type::Boolean => "boolean",
            Type::Cm => "cm",
            Type::Mm => "mm",
            Type::Void => "void",
            Type::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
