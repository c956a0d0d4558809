//! Primitive types and the operator typing table.
//!
//! There is no implicit coercion: every rule below requires both operands to
//! have the same type, and any combination not listed is rejected.
//!
//! | operators              | operands                  | result     |
//! |------------------------|---------------------------|------------|
//! | `+ - * /`              | int × int, float × float  | same type  |
//! | `< <= > >= = !=`       | int, float or char pairs  | bool       |
//! | `&& \|\| = !=`         | bool × bool               | bool       |
//! | unary `+ -`            | int, float                | same type  |
//! | unary `!`              | bool                      | bool       |

use std::fmt::Display;

use crate::ast::expressions::{BinaryOperator, UnaryOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int32,
    Float64,
    Byte,
    Bool,
}

impl Type {
    /// Source-level names, which are also illegal as variable names.
    pub const NAMES: [&'static str; 4] = ["int", "float", "char", "bool"];

    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int32),
            "float" => Some(Type::Float64),
            "char" => Some(Type::Byte),
            "bool" => Some(Type::Bool),
            _ => None,
        }
    }

    pub fn is_type_name(name: &str) -> bool {
        Type::NAMES.contains(&name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Int32 => "int",
            Type::Float64 => "float",
            Type::Byte => "char",
            Type::Bool => "bool",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Type::Int32 | Type::Float64)
    }

    /// Result type of `left operator right`, or `None` when unsupported.
    pub fn binary_result(operator: BinaryOperator, left: Type, right: Type) -> Option<Type> {
        if left != right {
            return None;
        }

        match left {
            Type::Int32 | Type::Float64 if operator.is_arithmetic() => Some(left),
            Type::Int32 | Type::Float64 | Type::Byte if operator.is_relational() => {
                Some(Type::Bool)
            }
            Type::Bool if operator.is_logical() || operator.is_equality() => Some(Type::Bool),
            _ => None,
        }
    }

    /// Result type of `operator operand`, or `None` when unsupported.
    pub fn unary_result(operator: UnaryOperator, operand: Type) -> Option<Type> {
        match operator {
            UnaryOperator::Plus | UnaryOperator::Minus if operand.is_numeric() => Some(operand),
            UnaryOperator::Not if operand == Type::Bool => Some(Type::Bool),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
