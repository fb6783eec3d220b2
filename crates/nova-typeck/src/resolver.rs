use nova_hir::{BinaryOpKind, LiteralKind, Node, NodeId, SyntaxTree, TypeRef, UnaryOp};
use nova_types::{
    declared_type, unary_numeric_promotion, ClassKind, PrimitiveType, SymbolReference, Type,
    TypeEnv,
};

use crate::cache::{CacheKey, TypeCache};
use crate::collaborators::TypeckContext;
use crate::error::{Result, TypeckError};

/// Knobs that change how [`TypeResolver::get_type`] resolves nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Type lambda and method reference bodies when re-entering through `get_type`.
    pub solve_lambdas: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            solve_lambdas: true,
        }
    }
}

impl ResolverOptions {
    #[must_use]
    pub fn from_config(config: &nova_config::TypeckConfig) -> Self {
        Self {
            solve_lambdas: config.solve_lambdas,
        }
    }
}

/// Computes the static type of expression and declarator nodes.
///
/// The resolver itself holds no mutable state. Attach a [`TypeCache`] to memoize results across
/// calls; without one every call recomputes from scratch.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    cx: TypeckContext<'a>,
    options: ResolverOptions,
    cache: Option<&'a TypeCache>,
}

impl<'a> TypeResolver<'a> {
    #[must_use]
    pub fn new(cx: TypeckContext<'a>) -> Self {
        Self::with_options(cx, ResolverOptions::default())
    }

    #[must_use]
    pub fn with_options(cx: TypeckContext<'a>, options: ResolverOptions) -> Self {
        Self {
            cx,
            options,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a TypeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn context(&self) -> &TypeckContext<'a> {
        &self.cx
    }

    #[must_use]
    pub fn env(&self) -> &'a dyn TypeEnv {
        self.cx.env
    }

    #[must_use]
    pub fn tree(&self) -> &'a SyntaxTree {
        self.cx.tree
    }

    #[must_use]
    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// General entry point, using the configured `solve_lambdas` flag.
    pub fn get_type(&self, node: NodeId) -> Result<Type> {
        self.resolve(node, self.options.solve_lambdas)
    }

    /// The static type of `node`.
    ///
    /// `solve_lambdas` only matters for lambdas and method references (and conditional or
    /// parenthesized expressions wrapping them): unset, they take the declared parameter type of
    /// the method they are passed to without looking at their bodies.
    pub fn resolve(&self, node: NodeId, solve_lambdas: bool) -> Result<Type> {
        let key = CacheKey {
            node,
            solve_lambdas: self.is_flag_sensitive(node)?.then_some(solve_lambdas),
        };
        if let Some(ty) = self.cache.and_then(|cache| cache.get(key)) {
            return Ok(ty);
        }
        let ty = self.resolve_uncached(node, solve_lambdas)?;
        if let Some(cache) = self.cache {
            cache.insert(key, ty.clone());
        }
        Ok(ty)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&'a Node> {
        self.cx
            .tree
            .get(id)
            .ok_or_else(|| TypeckError::InvariantViolation(format!("{id:?} is not in the tree")))
    }

    pub(crate) fn convert(&self, ty: &TypeRef, context: NodeId) -> Result<Type> {
        self.cx.facade.convert_to_usage(self, ty, context)
    }

    fn is_flag_sensitive(&self, node: NodeId) -> Result<bool> {
        Ok(matches!(
            self.node(node)?,
            Node::Lambda { .. } | Node::MethodRef { .. }
        ))
    }

    fn resolve_uncached(&self, node: NodeId, solve_lambdas: bool) -> Result<Type> {
        let tree = self.cx.tree;
        let env = self.cx.env;
        let current = self.node(node)?;
        tracing::trace!(
            target: "nova.typeck",
            ?node,
            kind = current.kind_name(),
            solve_lambdas,
            "resolving"
        );

        match current {
            Node::VariableDeclarator { .. } => self.declarator_type(node),
            Node::Parameter { ty, is_varargs, .. } => {
                if matches!(ty, TypeRef::Unknown) {
                    return Err(TypeckError::InvariantViolation(format!(
                        "parameter `{}` has no declared type",
                        tree.text(node)
                    )));
                }
                let ty = self.convert(ty, node)?;
                Ok(if *is_varargs { Type::array(ty) } else { ty })
            }
            Node::FieldDecl { variables } => match variables.as_slice() {
                [single] => self.get_type(*single),
                _ => Err(TypeckError::InvariantViolation(format!(
                    "cannot resolve a field declaring {} variables at once",
                    variables.len()
                ))),
            },
            Node::VarDeclExpr { variables } => match variables.as_slice() {
                [single] => self.get_type(*single),
                _ => Err(TypeckError::UnsupportedShape(format!(
                    "variable declaration expression with {} variables",
                    variables.len()
                ))),
            },

            Node::ArrayAccess { array, .. } => {
                let array_ty = self.get_type(*array)?;
                Ok(match array_ty.component_type() {
                    Some(component) => component.clone(),
                    None => array_ty,
                })
            }
            Node::ArrayCreation { element, dims, .. } => {
                let element = self.convert(element, node)?;
                Ok(dims.iter().fold(element, |ty, _| Type::array(ty)))
            }
            Node::Assign { target, .. } => self.get_type(*target),
            Node::Binary { op, lhs, rhs } => match op.kind() {
                BinaryOpKind::Arithmetic(arith) => self
                    .cx
                    .facade
                    .binary_type_concrete(self, *lhs, *rhs, solve_lambdas, arith),
                BinaryOpKind::Boolean => Ok(Type::boolean()),
                BinaryOpKind::Shift => {
                    let lhs = self.get_type(*lhs)?;
                    Ok(unary_numeric_promotion(env, &lhs))
                }
            },
            Node::Cast { ty, .. } => self.convert(ty, node),
            Node::ClassLit { ty } => {
                let arg = self.convert(ty, node)?;
                Ok(Type::class(env.well_known().class, vec![arg]))
            }
            Node::Conditional { .. } => self.conditional_type(node, solve_lambdas),
            Node::Enclosed { inner } => self.resolve(*inner, solve_lambdas),
            Node::FieldAccess { .. } => self.field_access_type(node),
            Node::InstanceOf { .. } => Ok(Type::boolean()),
            Node::Literal { kind, text } => Ok(literal_type(env, *kind, text)),
            Node::MethodCall { .. } => {
                let usage = self.cx.facade.solve_method_as_usage(self, node)?;
                Ok(usage.return_type().clone())
            }
            Node::Name { name } => match self.cx.symbols.solve_symbol_as_value(self, name, node)? {
                Some(value) => Ok(value.ty),
                None => Err(TypeckError::unresolved_in(name.clone(), tree.text(node))),
            },
            Node::TypeExpr { ty } => self.type_expr_type(ty, node),
            Node::ObjectCreation { ty, .. } => self.convert(ty, node),
            Node::This { qualifier } => self.this_type(node, qualifier.as_deref()),
            Node::Super { qualifier } => self.super_type(node, qualifier.as_deref()),
            Node::Unary { op, expr } => match op {
                UnaryOp::LogicalComplement => Ok(Type::boolean()),
                UnaryOp::Plus
                | UnaryOp::Minus
                | UnaryOp::PrefixIncrement
                | UnaryOp::PrefixDecrement
                | UnaryOp::PostfixIncrement
                | UnaryOp::PostfixDecrement
                | UnaryOp::BitwiseComplement => self.get_type(*expr),
            },
            Node::Lambda { .. } => self.lambda_type(node, solve_lambdas),
            Node::MethodRef { .. } => self.method_ref_type(node, solve_lambdas),

            other @ (Node::ArrayInit { .. }
            | Node::TypeDecl { .. }
            | Node::MethodDecl { .. }
            | Node::Block { .. }
            | Node::ExprStmt { .. }
            | Node::Return { .. }
            | Node::LocalVarStmt { .. }) => Err(TypeckError::UnsupportedShape(format!(
                "a standalone {} has no type",
                other.kind_name()
            ))),
        }
    }

    fn declarator_type(&self, node: NodeId) -> Result<Type> {
        let parent = self.cx.tree.parent(node);
        match parent.map(|p| &self.cx.tree[p]) {
            Some(Node::FieldDecl { .. } | Node::VarDeclExpr { .. }) => {
                self.cx.facade.convert_to_usage_variable_type(self, node)
            }
            Some(other) => Err(TypeckError::UnsupportedShape(format!(
                "variable declarator inside a {}",
                other.kind_name()
            ))),
            None => Err(TypeckError::UnsupportedShape(
                "variable declarator without a declaration".to_string(),
            )),
        }
    }

    fn type_expr_type(&self, ty: &TypeRef, node: NodeId) -> Result<Type> {
        let (TypeRef::Class { args, .. }, Some(name)) = (ty, ty.qualified_name()) else {
            return Err(TypeckError::UnsupportedShape(format!(
                "type expression `{ty}`"
            )));
        };
        if !args.is_empty() {
            return Err(TypeckError::UnsupportedShape(format!(
                "parameterized type expression `{ty}`"
            )));
        }
        match self.cx.scopes.solve_type(&name, node) {
            SymbolReference::Solved(id) => Ok(declared_type(self.cx.env, id)),
            SymbolReference::Unsolved => Err(TypeckError::unresolved_in(name, self.cx.tree.text(node))),
        }
    }

    pub(crate) fn this_type(&self, node: NodeId, qualifier: Option<&str>) -> Result<Type> {
        let tree = self.cx.tree;
        let Some(qualifier) = qualifier else {
            let Some(decl) = tree.enclosing_type(node, None) else {
                return Err(TypeckError::InvariantViolation(format!(
                    "`{}` outside of any type",
                    tree.text(node)
                )));
            };
            let id = self.cx.facade.type_declaration(decl)?;
            return Ok(declared_type(self.cx.env, id));
        };

        // `C.this`: enclosing declarations first, then the global type universe.
        if let Some(decl) = tree.enclosing_type(node, Some(qualifier)) {
            match self.cx.facade.type_declaration(decl) {
                Ok(id) => return Ok(declared_type(self.cx.env, id)),
                Err(err) if err.is_unresolved() => {
                    tracing::trace!(target: "nova.typeck", qualifier, "local qualifier unresolved");
                }
                Err(err) => return Err(err),
            }
        }
        match self.cx.types.try_to_solve_type(qualifier) {
            SymbolReference::Solved(id) => Ok(declared_type(self.cx.env, id)),
            SymbolReference::Unsolved => Err(TypeckError::unresolved_in(qualifier, tree.text(node))),
        }
    }

    fn super_type(&self, node: NodeId, qualifier: Option<&str>) -> Result<Type> {
        let tree = self.cx.tree;
        let env = self.cx.env;
        let Some(qualifier) = qualifier else {
            let Some(decl) = tree.enclosing_type(node, None) else {
                return Err(TypeckError::InvariantViolation(format!(
                    "`{}` outside of any type",
                    tree.text(node)
                )));
            };
            let id = self.cx.facade.type_declaration(decl)?;
            let class = env.class(id).ok_or_else(|| unknown_class(id))?;
            if class.kind != ClassKind::Class {
                return Err(TypeckError::UnsupportedShape(format!(
                    "`super` inside a {:?} declaration",
                    class.kind
                )));
            }
            return class.super_class.clone().ok_or_else(|| {
                TypeckError::InvariantViolation(format!("`{}` has no superclass", class.name))
            });
        };

        let id = match self.cx.scopes.solve_type(qualifier, node) {
            SymbolReference::Solved(id) => id,
            SymbolReference::Unsolved => {
                return Err(TypeckError::unresolved_in(qualifier, tree.text(node)));
            }
        };
        let class = env.class(id).ok_or_else(|| unknown_class(id))?;
        match class.kind {
            ClassKind::Interface => Ok(declared_type(env, id)),
            ClassKind::Class => class.super_class.clone().ok_or_else(|| {
                TypeckError::InvariantViolation(format!("`{}` has no superclass", class.name))
            }),
            kind => Err(TypeckError::UnsupportedShape(format!(
                "`{qualifier}.super` where `{qualifier}` is a {kind:?}"
            ))),
        }
    }
}

pub(crate) fn unknown_class(id: nova_types::ClassId) -> TypeckError {
    TypeckError::InvariantViolation(format!("{id:?} is not in the declaration model"))
}

fn literal_type(env: &dyn TypeEnv, kind: LiteralKind, text: &str) -> Type {
    match kind {
        LiteralKind::String | LiteralKind::TextBlock => {
            Type::class(env.well_known().string, vec![])
        }
        LiteralKind::Int => Type::int(),
        LiteralKind::Long => Type::Primitive(PrimitiveType::Long),
        LiteralKind::Char => Type::Primitive(PrimitiveType::Char),
        LiteralKind::Double if text.ends_with(['f', 'F']) => Type::Primitive(PrimitiveType::Float),
        LiteralKind::Double => Type::Primitive(PrimitiveType::Double),
        LiteralKind::Boolean => Type::boolean(),
        LiteralKind::Null => Type::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeStore;

    #[test]
    fn options_follow_the_typeck_config() {
        let defaults = ResolverOptions::from_config(&nova_config::TypeckConfig::default());
        assert!(defaults.solve_lambdas);

        let config = nova_config::TypeckConfig {
            solve_lambdas: false,
        };
        assert!(!ResolverOptions::from_config(&config).solve_lambdas);
    }

    #[test]
    fn float_literals_follow_their_suffix() {
        let store = TypeStore::with_minimal_jdk();
        assert_eq!(
            literal_type(&store, LiteralKind::Double, "1.5f"),
            Type::Primitive(PrimitiveType::Float)
        );
        assert_eq!(
            literal_type(&store, LiteralKind::Double, "1.5F"),
            Type::Primitive(PrimitiveType::Float)
        );
        assert_eq!(
            literal_type(&store, LiteralKind::Double, "1.5"),
            Type::Primitive(PrimitiveType::Double)
        );
        assert_eq!(
            literal_type(&store, LiteralKind::Double, "2d"),
            Type::Primitive(PrimitiveType::Double)
        );
    }

    #[test]
    fn text_blocks_are_strings() {
        let store = TypeStore::with_minimal_jdk();
        assert_eq!(
            literal_type(&store, LiteralKind::TextBlock, "\"\"\"\nhi\"\"\""),
            Type::class(store.well_known().string, vec![])
        );
        assert_eq!(literal_type(&store, LiteralKind::Null, "null"), Type::Null);
    }
}
