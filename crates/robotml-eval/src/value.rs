//! Runtime values.

use std::fmt;

use robotml_types::ast::{TypeName, Unit};

use crate::error::{EvalError, EvalResult};

/// A value produced by evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    /// A magnitude tagged with a length unit.
    Length { value: f64, unit: Unit },
    /// Result of a call to a function that returns nothing.
    Void,
}

impl Value {
    /// The value an uninitialized declaration of type `ty` starts with.
    ///
    /// Unit slots start as a bare `0`; only a cast produces a length.
    pub fn zero(ty: TypeName) -> Self {
        match ty {
            TypeName::Number | TypeName::Cm | TypeName::Mm => Value::Number(0.0),
            TypeName::Boolean => Value::Bool(false),
            TypeName::Void => Value::Void,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Length { unit: Unit::Cm, .. } => "cm",
            Value::Length { unit: Unit::Mm, .. } => "mm",
            Value::Void => "void",
        }
    }

    /// Booleans as-is; numbers and lengths when non-zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Length { value, .. } => *value != 0.0,
            Value::Void => false,
        }
    }

    /// Numeric magnitude; a length is unwrapped without conversion.
    pub fn magnitude(&self) -> EvalResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Length { value, .. } => Ok(*value),
            other => Err(EvalError::TypeMismatch(format!(
                "expected a numeric value, got {}",
                other.type_name()
            ))),
        }
    }

    /// Explicit conversion, as written with a cast expression.
    pub fn cast(self, target: TypeName) -> EvalResult<Value> {
        match target {
            TypeName::Number => Ok(Value::Number(self.magnitude()?)),
            TypeName::Boolean => Ok(Value::Bool(self.is_truthy())),
            TypeName::Cm | TypeName::Mm => {
                let to = if target == TypeName::Cm { Unit::Cm } else { Unit::Mm };
                let value = match self {
                    Value::Length { value, unit } => convert(value, unit, to),
                    other => other.magnitude()?,
                };
                Ok(Value::Length { value, unit: to })
            }
            TypeName::Void => Err(EvalError::TypeMismatch(format!(
                "cannot cast {} to void",
                self.type_name()
            ))),
        }
    }

    /// Distance and unit of a movement operand.
    ///
    /// An explicit unit wins, converting a length of the other unit. Without
    /// one the operand's own unit is used, falling back to millimetres.
    pub fn as_distance(self, explicit: Option<Unit>) -> EvalResult<(f64, Unit)> {
        match (self, explicit) {
            (Value::Length { value, unit }, Some(to)) => Ok((convert(value, unit, to), to)),
            (Value::Length { value, unit }, None) => Ok((value, unit)),
            (other, Some(to)) => Ok((other.magnitude()?, to)),
            (other, None) => Ok((other.magnitude()?, Unit::Mm)),
        }
    }
}

/// Convert a magnitude between length units: ×10 for cm→mm, ÷10 for mm→cm.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    match (from, to) {
        (Unit::Cm, Unit::Mm) => value * 10.0,
        (Unit::Mm, Unit::Cm) => value / 10.0,
        _ => value,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Length { value, unit } => write!(f, "{value} {unit}"),
            Value::Void => write!(f, "void"),
        }
    }
}
