//! Services expression typing calls into.
//!
//! None of these are implemented here. Methods that need to type sub-expressions receive the
//! calling [`TypeResolver`] so that mutual recursion goes through one explicit value instead of
//! shared state.

use nova_hir::{NodeId, SyntaxTree, TypeRef};
use nova_types::{
    binary_operation_type, BinaryOperator, ClassId, MethodId, MethodUsage, SymbolReference, Type,
    TypeEnv,
};

use crate::error::Result;
use crate::resolver::TypeResolver;

/// A value symbol (local, parameter, field) as seen from some point in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub name: String,
    pub ty: Type,
}

impl Value {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Conversion of syntax into semantic types, plus overload resolution.
pub trait TypeConversion {
    /// Resolve the type reference `ty` as written at `context`.
    fn convert_to_usage(&self, r: &TypeResolver<'_>, ty: &TypeRef, context: NodeId) -> Result<Type>;

    /// Declared type of a variable declarator, honoring `extra_dims` and `var`.
    fn convert_to_usage_variable_type(&self, r: &TypeResolver<'_>, declarator: NodeId) -> Result<Type>;

    /// The method a call binds to, with call-site substitution applied.
    ///
    /// Fails with an unresolved symbol when no method is applicable.
    fn solve_method_as_usage(&self, r: &TypeResolver<'_>, call: NodeId) -> Result<MethodUsage>;

    /// The method declaration a call binds to. With `solve_lambdas` unset, lambda and method
    /// reference arguments must not be typed deeply while choosing the overload.
    fn solve_method(
        &self,
        r: &TypeResolver<'_>,
        call: NodeId,
        solve_lambdas: bool,
    ) -> Result<SymbolReference<MethodId>>;

    /// The method a method reference denotes when invoked with `param_types`.
    fn solve_method_reference(
        &self,
        r: &TypeResolver<'_>,
        method_ref: NodeId,
        param_types: &[Type],
    ) -> Result<MethodUsage>;

    /// The class declared by a `TypeDecl` node or by an anonymous class body.
    fn type_declaration(&self, type_node: NodeId) -> Result<ClassId>;

    /// Result type of an arithmetic or bitwise binary expression.
    fn binary_type_concrete(
        &self,
        r: &TypeResolver<'_>,
        lhs: NodeId,
        rhs: NodeId,
        solve_lambdas: bool,
        op: BinaryOperator,
    ) -> Result<Type> {
        let lhs = r.resolve(lhs, solve_lambdas)?;
        let rhs = r.resolve(rhs, solve_lambdas)?;
        Ok(binary_operation_type(r.env(), &lhs, &rhs, op))
    }
}

pub trait SymbolSolver {
    /// Resolve `name` as a value visible at `context`.
    fn solve_symbol_as_value(
        &self,
        r: &TypeResolver<'_>,
        name: &str,
        context: NodeId,
    ) -> Result<Option<Value>>;
}

/// Lexically scoped type lookup.
pub trait ScopeContext {
    /// Resolve a simple or dotted type name as seen from `context`.
    fn solve_type(&self, name: &str, context: NodeId) -> SymbolReference<ClassId>;

    /// The type an enclosing generic context assigns to the type variable `name`, if any.
    fn solve_generic_type(&self, name: &str, context: NodeId) -> Option<Type> {
        let _ = (name, context);
        None
    }
}

/// Scope-insensitive lookup over every known type.
pub trait GlobalTypeSolver {
    fn try_to_solve_type(&self, name: &str) -> SymbolReference<ClassId>;
}

/// Everything one resolution session reads from. All of it is read-only.
#[derive(Clone, Copy)]
pub struct TypeckContext<'a> {
    pub env: &'a dyn TypeEnv,
    pub tree: &'a SyntaxTree,
    pub facade: &'a dyn TypeConversion,
    pub symbols: &'a dyn SymbolSolver,
    pub scopes: &'a dyn ScopeContext,
    pub types: &'a dyn GlobalTypeSolver,
}

impl std::fmt::Debug for TypeckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeckContext")
            .field("nodes", &self.tree.len())
            .finish_non_exhaustive()
    }
}
