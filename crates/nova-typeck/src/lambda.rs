//! Lambdas and method references take their type from the call they are passed to.
//!
//! Shallow resolution returns the declared parameter type of the chosen method. Deep resolution
//! additionally inspects the body (or the referenced method) and refines the functional
//! interface's type arguments through an [`InferenceContext`].

use std::collections::HashMap;

use nova_hir::{Node, NodeId};
use nova_types::{
    declared_type, functional_method, param_for_argument, substitute, type_parameters_map,
    use_type_parameters_on, InferenceContext, MethodDef, SymbolReference, Type, WildcardBound,
};

use crate::error::{Result, TypeckError};
use crate::resolver::TypeResolver;

impl TypeResolver<'_> {
    pub(crate) fn lambda_type(&self, node: NodeId, solve_lambdas: bool) -> Result<Type> {
        let Node::Lambda { body, .. } = self.node(node)? else {
            return Err(TypeckError::InvariantViolation(format!("{node:?} is not a lambda")));
        };
        let (call, pos) = self.call_position(node)?;
        let declared = self.declared_param_type(call, pos, true)?;
        if !solve_lambdas {
            return Ok(declared);
        }

        let env = self.env();
        let result = self.with_receiver_type_args(call, declared)?;
        let result = self.with_generic_context(result, node);
        let Some(functional) = functional_method(env, &result) else {
            return Ok(result);
        };
        let Type::Class(ct) = &result else {
            return Ok(result);
        };
        let interface = declared_type(env, ct.def);

        let formal_return = functional.return_type().clone();
        if formal_return.is_void() {
            tracing::trace!(target: "nova.typeck", ?node, "void functional method, no refinement");
            return Ok(result);
        }

        // `Function<? super A, ? extends B>` is refined through the undetermined `Function<T, R>`.
        let mut lambda_cx = InferenceContext::new(env);
        let mut functional_cx = InferenceContext::new(env);
        lambda_cx.add_pair(result.clone(), interface.clone());

        let actual = self.lambda_body_type(*body)?;
        functional_cx.add_pair(formal_return, actual);
        let interface = functional_cx.add_single(interface);
        let with_return = functional_cx.resolve(interface);

        lambda_cx.add_pair(result.clone(), with_return);
        let result = lambda_cx.add_single(result);
        let refined = lambda_cx.resolve(result);
        tracing::trace!(target: "nova.typeck", ?node, ?lambda_cx, "lambda refined");
        Ok(refined)
    }

    pub(crate) fn method_ref_type(&self, node: NodeId, solve_lambdas: bool) -> Result<Type> {
        let (call, pos) = self.call_position(node)?;
        if !solve_lambdas {
            return self.declared_param_type(call, pos, false);
        }

        let env = self.env();
        let facade = self.context().facade;
        let usage = facade.solve_method_as_usage(self, call)?;
        let is_varargs = env.method(usage.method).is_some_and(|m| m.is_varargs);
        let result = param_for_argument(usage.params(), is_varargs, pos).ok_or_else(|| {
            TypeckError::InvariantViolation(format!(
                "`{}` has no parameter at position {pos}",
                usage.name
            ))
        })?;
        let result = self.with_generic_context(result, node);
        let Some(mut functional) = functional_method(env, &result) else {
            return Ok(result);
        };

        for (tv, ty) in type_parameters_map(env, &result) {
            functional = functional.replace_type_parameter(tv, &ty);
        }
        for idx in 0..functional.param_count() {
            let bounded = match functional.param_type(idx) {
                Some(Type::Wildcard(bound)) => wildcard_bound(env, bound),
                _ => continue,
            };
            functional = functional.replace_param_type(idx, bounded);
        }

        let referenced = facade.solve_method_reference(self, node, functional.params())?;
        let mut cx = InferenceContext::new(env);
        cx.add_pair(functional.return_type().clone(), referenced.return_type().clone());
        let result = cx.add_single(result);
        let refined = cx.resolve(result);
        tracing::trace!(target: "nova.typeck", ?node, ?cx, "method reference refined");
        Ok(refined)
    }

    /// The call `node` is an argument of, and its position there.
    fn call_position(&self, node: NodeId) -> Result<(NodeId, usize)> {
        let tree = self.tree();
        let kind = tree[node].kind_name();
        let parent = tree.parent(node).ok_or_else(|| {
            TypeckError::InvariantViolation(format!("{kind} `{}` has no parent", tree.text(node)))
        })?;
        if !matches!(tree[parent], Node::MethodCall { .. }) {
            return Err(TypeckError::UnsupportedShape(format!(
                "{kind} inside a {}",
                tree[parent].kind_name()
            )));
        }
        let pos = tree.arg_position(node).ok_or_else(|| {
            TypeckError::UnsupportedShape(format!("{kind} used as the receiver of a call"))
        })?;
        Ok((parent, pos))
    }

    fn declared_param_type(&self, call: NodeId, pos: usize, solve_lambdas: bool) -> Result<Type> {
        let tree = self.tree();
        let method = match self.context().facade.solve_method(self, call, solve_lambdas)? {
            SymbolReference::Solved(id) => id,
            SymbolReference::Unsolved => {
                let name = match &tree[call] {
                    Node::MethodCall { name, .. } => name.clone(),
                    other => other.kind_name().to_string(),
                };
                return Err(TypeckError::unresolved_in(name, tree.text(call)));
            }
        };
        let def: &MethodDef = self.env().method(method).ok_or_else(|| {
            TypeckError::InvariantViolation(format!("{method:?} is not in the declaration model"))
        })?;
        param_for_argument(&def.params, def.is_varargs, pos).ok_or_else(|| {
            TypeckError::InvariantViolation(format!(
                "`{}` has no parameter at position {pos}",
                def.name
            ))
        })
    }

    /// Apply the receiver's type arguments unless the receiver is a static type reference.
    fn with_receiver_type_args(&self, call: NodeId, ty: Type) -> Result<Type> {
        let tree = self.tree();
        let Node::MethodCall {
            scope: Some(scope), ..
        } = &tree[call]
        else {
            return Ok(ty);
        };
        match &tree[*scope] {
            Node::TypeExpr { .. } => return Ok(ty),
            Node::Name { name } if self.context().scopes.solve_type(name, *scope).is_solved() => {
                return Ok(ty);
            }
            _ => {}
        }
        let receiver = self.get_type(*scope)?;
        Ok(if receiver.is_class() {
            use_type_parameters_on(self.env(), &receiver, &ty)
        } else {
            ty
        })
    }

    /// Substitute the type variables an enclosing generic context knows about.
    fn with_generic_context(&self, ty: Type, context: NodeId) -> Type {
        let env = self.env();
        let scopes = self.context().scopes;
        let mut subst = HashMap::new();
        ty.for_each_type_var(&mut |tv| {
            if let Some(param) = env.type_param(tv) {
                if let Some(solved) = scopes.solve_generic_type(&param.name, context) {
                    subst.insert(tv, solved);
                }
            }
        });
        substitute(&ty, &subst)
    }

    /// Type of an expression body, or of the first `return` in a block whose value is neither
    /// void nor null.
    fn lambda_body_type(&self, body: NodeId) -> Result<Type> {
        let tree = self.tree();
        if !matches!(tree[body], Node::Block { .. }) {
            return self.get_type(body);
        }
        for ret in tree.return_statements(body) {
            let Node::Return { expr: Some(expr) } = &tree[ret] else {
                continue;
            };
            let ty = self.get_type(*expr)?;
            if !ty.is_void() && !ty.is_null() {
                return Ok(ty);
            }
        }
        Ok(Type::Void)
    }
}

fn wildcard_bound(env: &dyn nova_types::TypeEnv, bound: &WildcardBound) -> Type {
    match bound.bound() {
        Some(ty) => ty.clone(),
        None => Type::class(env.well_known().object, vec![]),
    }
}
