//! Typing of `c ? a : b` (JLS 15.25).
//!
//! Branches are classified as boolean, numeric or reference conditionals in that order. Constant
//! representability (whether an `int` constant fits the narrower branch) is assumed rather than
//! checked, and reference conditionals do not compute a least upper bound.

use nova_hir::{Node, NodeId};
use nova_types::{
    box_type, format_type, is_boolean_like, is_compatible, is_numeric_type, unbox_type,
    PrimitiveType, Type, TypeEnv,
};

use crate::error::{Result, TypeckError};
use crate::resolver::TypeResolver;

impl TypeResolver<'_> {
    pub(crate) fn conditional_type(&self, node: NodeId, solve_lambdas: bool) -> Result<Type> {
        let Node::Conditional {
            then_expr,
            else_expr,
            ..
        } = self.node(node)?
        else {
            return Err(TypeckError::InvariantViolation(format!(
                "{node:?} is not a conditional expression"
            )));
        };
        let env = self.env();
        let then_ty = self.resolve(*then_expr, solve_lambdas)?;
        let else_ty = self.resolve(*else_expr, solve_lambdas)?;

        if then_ty.is_null() {
            return Ok(else_ty);
        }
        if else_ty.is_null() {
            return Ok(then_ty);
        }

        if is_boolean_like(env, &then_ty) && is_boolean_like(env, &else_ty) {
            tracing::trace!(target: "nova.typeck", ?node, "boolean conditional");
            return Ok(if then_ty.is_reference() && else_ty.is_reference() {
                then_ty
            } else if then_ty.is_primitive() {
                then_ty
            } else {
                else_ty
            });
        }

        if is_numeric_type(env, &then_ty) && is_numeric_type(env, &else_ty) {
            tracing::trace!(target: "nova.typeck", ?node, "numeric conditional");
            return Ok(numeric_conditional(env, then_ty, else_ty));
        }

        self.reference_conditional(node, then_ty, else_ty)
    }

    fn reference_conditional(&self, node: NodeId, then_ty: Type, else_ty: Type) -> Result<Type> {
        let tree = self.tree();
        if let Some(parent) = tree.parent(node) {
            match &tree[parent] {
                // Poly expression: the assignment context supplies the type.
                Node::Assign { value, .. } if *value == node => {
                    tracing::trace!(target: "nova.typeck", ?node, "conditional in assignment context");
                    return self.get_type(parent);
                }
                // Invocation context. Target typing from the chosen overload is not modelled.
                Node::MethodCall { args, .. } if args.contains(&node) => {
                    tracing::trace!(target: "nova.typeck", ?node, "conditional in invocation context");
                    return Ok(then_ty);
                }
                _ => {}
            }
        }

        // Standalone. Stands in for lub(box(then), box(else)).
        if then_ty == else_ty {
            return Ok(then_ty);
        }
        Ok(match then_ty {
            Type::Primitive(prim) => box_type(self.env(), prim),
            other => other,
        })
    }
}

fn numeric_conditional(env: &dyn TypeEnv, then_ty: Type, else_ty: Type) -> Type {
    use PrimitiveType::{Byte, Char, Int, Short};

    if format_type(env, &then_ty) == format_type(env, &else_ty) {
        return then_ty;
    }

    // `T` against its own wrapper.
    if let Type::Primitive(prim) = then_ty {
        if else_ty.is_reference() && is_compatible(env, &else_ty, prim) {
            return then_ty;
        }
    }
    if let Type::Primitive(prim) = else_ty {
        if then_ty.is_reference() && is_compatible(env, &then_ty, prim) {
            return else_ty;
        }
    }

    let (Some(then_prim), Some(else_prim)) = (unbox_type(env, &then_ty), unbox_type(env, &else_ty))
    else {
        return then_ty;
    };

    if matches!((then_prim, else_prim), (Byte, Short) | (Short, Byte)) {
        return Type::Primitive(Short);
    }

    let narrow = [Byte, Short, Char];
    match (then_ty.as_primitive(), else_ty.as_primitive()) {
        (Some(t), Some(Int)) if t.in_set(&narrow) => return then_ty,
        (Some(Int), Some(e)) if e.in_set(&narrow) => return else_ty,
        (None, Some(Int)) if then_prim.in_set(&narrow) => return Type::Primitive(then_prim),
        (Some(Int), None) if else_prim.in_set(&narrow) => return Type::Primitive(else_prim),
        _ => {}
    }

    Type::Primitive(then_prim.binary_promotion(else_prim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeStore;
    use nova_types::PrimitiveType::*;

    fn prim(p: PrimitiveType) -> Type {
        Type::Primitive(p)
    }

    #[test]
    fn narrow_primitive_wins_against_int() {
        let store = TypeStore::with_minimal_jdk();
        assert_eq!(numeric_conditional(&store, prim(Byte), prim(Int)), prim(Byte));
        assert_eq!(numeric_conditional(&store, prim(Int), prim(Char)), prim(Char));
        assert_eq!(numeric_conditional(&store, prim(Long), prim(Int)), prim(Long));
    }

    #[test]
    fn byte_and_short_meet_at_short() {
        let store = TypeStore::with_minimal_jdk();
        let boxed_byte = box_type(&store, Byte);
        assert_eq!(numeric_conditional(&store, boxed_byte, prim(Short)), prim(Short));
        let boxed_short = box_type(&store, Short);
        assert_eq!(numeric_conditional(&store, prim(Byte), boxed_short), prim(Short));
    }

    #[test]
    fn wrapper_against_its_primitive_unboxes() {
        let store = TypeStore::with_minimal_jdk();
        let boxed_int = box_type(&store, Int);
        assert_eq!(numeric_conditional(&store, boxed_int.clone(), prim(Int)), prim(Int));
        assert_eq!(numeric_conditional(&store, prim(Int), boxed_int), prim(Int));
    }

    #[test]
    fn narrow_wrapper_against_int_unboxes() {
        let store = TypeStore::with_minimal_jdk();
        let boxed_char = box_type(&store, Char);
        assert_eq!(numeric_conditional(&store, boxed_char, prim(Int)), prim(Char));
    }

    #[test]
    fn mixed_wrappers_fall_back_to_promotion() {
        let store = TypeStore::with_minimal_jdk();
        let boxed_long = box_type(&store, Long);
        let boxed_float = box_type(&store, Float);
        assert_eq!(numeric_conditional(&store, boxed_long, boxed_float), prim(Float));
        assert_eq!(numeric_conditional(&store, prim(Char), prim(Short)), prim(Int));
    }
}
