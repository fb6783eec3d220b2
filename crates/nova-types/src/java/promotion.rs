//! Boxing, unboxing and numeric promotion (JLS 5.1.7, 5.1.8, 5.6).

use serde::{Deserialize, Serialize};

use crate::{PrimitiveType, Type, TypeEnv};

use super::subtyping::is_assignable;

/// Operators whose result type depends on both operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    BinaryAnd,
    BinaryOr,
    Xor,
}

impl BinaryOperator {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::BinaryAnd => "&",
            BinaryOperator::BinaryOr => "|",
            BinaryOperator::Xor => "^",
        }
    }

    /// `&`, `|` and `^` also apply to boolean operands (JLS 15.22.2).
    #[must_use]
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOperator::BinaryAnd | BinaryOperator::BinaryOr | BinaryOperator::Xor
        )
    }
}

/// Boxing conversion of `prim`.
#[must_use]
pub fn box_type(env: &dyn TypeEnv, prim: PrimitiveType) -> Type {
    Type::class(env.well_known().boxed(prim), vec![])
}

/// The primitive a value of type `ty` carries: `ty` itself when primitive, the unboxed type for
/// the eight wrapper classes, `None` otherwise.
#[must_use]
pub fn unbox_type(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Primitive(p) => Some(*p),
        Type::Class(ct) => env.well_known().unboxed(ct.def),
        _ => None,
    }
}

/// A numeric primitive (`char` included) or one of its wrappers.
#[must_use]
pub fn is_numeric_type(env: &dyn TypeEnv, ty: &Type) -> bool {
    unbox_type(env, ty).is_some_and(PrimitiveType::is_numeric)
}

/// `boolean` or `java.lang.Boolean`.
#[must_use]
pub fn is_boolean_like(env: &dyn TypeEnv, ty: &Type) -> bool {
    unbox_type(env, ty) == Some(PrimitiveType::Boolean)
}

/// `ty` is `prim` or unboxes to it.
#[must_use]
pub fn is_compatible(env: &dyn TypeEnv, ty: &Type, prim: PrimitiveType) -> bool {
    unbox_type(env, ty) == Some(prim)
}

/// Unary numeric promotion (JLS 5.6.1): unbox, then widen `byte`, `short` and `char` to `int`.
/// Non-numeric types are returned unchanged.
#[must_use]
pub fn unary_numeric_promotion(env: &dyn TypeEnv, ty: &Type) -> Type {
    match unbox_type(env, ty) {
        Some(p) if p.is_numeric() => Type::Primitive(p.unary_promotion()),
        _ => ty.clone(),
    }
}

/// Result type of an arithmetic or bitwise binary operator.
///
/// String concatenation wins for `+`; numeric operands go through binary numeric promotion
/// (JLS 5.6.2) after unboxing; boolean-like operands of `&`, `|` and `^` yield `boolean`.
/// Anything else falls back to the operand the other one is assignable to.
#[must_use]
pub fn binary_operation_type(env: &dyn TypeEnv, lhs: &Type, rhs: &Type, op: BinaryOperator) -> Type {
    let string = env.well_known().string;
    let is_string = |ty: &Type| matches!(ty, Type::Class(ct) if ct.def == string);
    if op == BinaryOperator::Plus && (is_string(lhs) || is_string(rhs)) {
        return Type::class(string, vec![]);
    }

    match (unbox_type(env, lhs), unbox_type(env, rhs)) {
        (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
            return Type::Primitive(l.binary_promotion(r));
        }
        (Some(PrimitiveType::Boolean), Some(PrimitiveType::Boolean)) if op.is_bitwise() => {
            return Type::boolean();
        }
        _ => {}
    }

    if is_assignable(env, rhs, lhs) {
        rhs.clone()
    } else {
        lhs.clone()
    }
}
