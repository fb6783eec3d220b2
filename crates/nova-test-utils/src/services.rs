//! Resolution services over a [`TypeckFixture`].
//!
//! These are deliberately simple: scoping follows the tree, overload resolution checks arity and
//! assignability in two phases (fixed arity, then varargs) and method type parameters are
//! inferred from argument types only.

use std::collections::{HashSet, VecDeque};

use nova_hir::{Node, NodeId, TypeRef, WildcardRef};
use nova_typeck::{
    GlobalTypeSolver, Result, ScopeContext, SymbolSolver, TypeConversion, TypeResolver,
    TypeckError, Value,
};
use nova_types::{
    declared_type, find_field, is_assignable, param_for_argument, sam_signature,
    use_type_parameters_on, ClassId, InferenceContext, MethodDef, MethodId, MethodUsage,
    SymbolReference, Type, TypeEnv, TypeVarId, WildcardBound,
};

use crate::fixture::{Local, TypeckFixture};

/// The overload chosen for a call, and what was learned while choosing it.
struct Selection {
    method: MethodId,
    receiver: Type,
    /// `None` for lambda and method reference arguments.
    arg_types: Vec<Option<Type>>,
}

impl TypeckFixture {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.tree
            .get(id)
            .ok_or_else(|| TypeckError::InvariantViolation(format!("{id:?} is not in the tree")))
    }

    fn method_def(&self, id: MethodId) -> Result<&MethodDef> {
        self.store.method(id).ok_or_else(|| {
            TypeckError::InvariantViolation(format!("{id:?} is not in the declaration model"))
        })
    }

    fn nested_type(&self, outer: ClassId, name: &str) -> Option<ClassId> {
        self.store.class(outer)?.nested_types.iter().copied().find(|id| {
            self.store
                .class(*id)
                .is_some_and(|def| def.simple_name() == name)
        })
    }

    fn solve_simple_type(&self, name: &str, context: NodeId) -> Option<ClassId> {
        for class in self.enclosing_classes(context) {
            if self.store.class(class).is_some_and(|def| def.simple_name() == name) {
                return Some(class);
            }
            if let Some(nested) = self.nested_type(class, name) {
                return Some(nested);
            }
        }
        self.imports
            .get(name)
            .copied()
            .or_else(|| self.store.lookup_class(name))
    }

    /// A class type parameter of an enclosing declaration named `name`.
    fn type_var_in_scope(&self, name: &str, context: NodeId) -> Option<TypeVarId> {
        self.enclosing_classes(context).into_iter().find_map(|class| {
            self.store.class(class)?.type_params.iter().copied().find(|tv| {
                self.store
                    .type_param(*tv)
                    .is_some_and(|param| param.name == name)
            })
        })
    }

    /// Every method named `name` that `receiver` has, nearest declaration first.
    fn methods_named(&self, receiver: &Type, name: &str) -> Vec<MethodId> {
        let object = self.store.well_known().object;
        let mut queue: VecDeque<ClassId> = match receiver {
            Type::Class(ct) => VecDeque::from([ct.def]),
            Type::TypeVar(tv) => self
                .store
                .type_param(*tv)
                .map(|param| {
                    param
                        .upper_bounds
                        .iter()
                        .filter_map(|bound| bound.as_class().map(|ct| ct.def))
                        .collect()
                })
                .unwrap_or_default(),
            _ => VecDeque::new(),
        };
        queue.push_back(object);

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(def) = self.store.class(current) else {
                continue;
            };
            for (idx, method) in def.methods.iter().enumerate() {
                if method.name == name {
                    out.push(MethodId::new(current, idx));
                }
            }
            for parent in def.super_class.iter().chain(def.interfaces.iter()) {
                if let Some(ct) = parent.as_class() {
                    queue.push_back(ct.def);
                }
            }
        }
        out
    }

    /// Declared parameter types as seen through `receiver`'s type arguments.
    fn params_seen_from(&self, receiver: &Type, def: &MethodDef) -> Vec<Type> {
        def.params
            .iter()
            .map(|param| use_type_parameters_on(&self.store, receiver, param))
            .collect()
    }

    fn call_receiver(&self, r: &TypeResolver<'_>, call: NodeId, solve_lambdas: bool) -> Result<Type> {
        let Node::MethodCall { scope, name, .. } = self.node(call)? else {
            return Err(TypeckError::InvariantViolation(format!("{call:?} is not a method call")));
        };
        let Some(scope) = *scope else {
            let enclosing = self.enclosing_classes(call);
            let owner = enclosing
                .iter()
                .copied()
                .find(|class| !self.methods_named(&declared_type(&self.store, *class), name).is_empty())
                .or_else(|| enclosing.first().copied())
                .ok_or_else(|| TypeckError::unresolved_in(name.clone(), self.tree.text(call)))?;
            return Ok(declared_type(&self.store, owner));
        };
        self.scope_type(r, scope, solve_lambdas)
    }

    /// Type of a call or method reference qualifier, and whether it names a type.
    fn qualifier(&self, r: &TypeResolver<'_>, scope: NodeId, solve_lambdas: bool) -> Result<(Type, bool)> {
        match self.node(scope)? {
            Node::TypeExpr { ty } => Ok((self.convert_to_usage(r, ty, scope)?, true)),
            Node::Name { name } => match self.solve_type(name, scope) {
                SymbolReference::Solved(id) => Ok((declared_type(&self.store, id), true)),
                SymbolReference::Unsolved => Ok((r.resolve(scope, solve_lambdas)?, false)),
            },
            Node::FieldAccess { .. } => match r.resolve(scope, solve_lambdas) {
                Ok(ty) => Ok((ty, false)),
                Err(err) if err.is_unresolved() => {
                    let text = self.tree.text(scope);
                    match self.try_to_solve_type(&text) {
                        SymbolReference::Solved(id) => Ok((declared_type(&self.store, id), true)),
                        SymbolReference::Unsolved => Err(err),
                    }
                }
                Err(err) => Err(err),
            },
            _ => Ok((r.resolve(scope, solve_lambdas)?, false)),
        }
    }

    fn scope_type(&self, r: &TypeResolver<'_>, scope: NodeId, solve_lambdas: bool) -> Result<Type> {
        self.qualifier(r, scope, solve_lambdas).map(|(ty, _)| ty)
    }

    fn accepts(&self, param: &Type, arg: NodeId, arg_type: Option<&Type>) -> bool {
        let Some(arg_type) = arg_type else {
            // Lambdas and method references need a functional interface (or a free variable).
            if matches!(param, Type::TypeVar(_)) {
                return true;
            }
            let Some(sig) = sam_signature(&self.store, param) else {
                return false;
            };
            return match &self.tree[arg] {
                Node::Lambda { params, .. } => params.len() == sig.params.len(),
                _ => true,
            };
        };
        if arg_type.is_null() {
            return !param.is_primitive();
        }
        if !param.mentions_type_vars() {
            return is_assignable(&self.store, param, arg_type);
        }
        match param {
            Type::TypeVar(_) | Type::Wildcard(_) => true,
            Type::Class(ct) => is_assignable(&self.store, &Type::class(ct.def, vec![]), arg_type),
            Type::Array(_) => arg_type.is_array(),
            _ => true,
        }
    }

    fn is_applicable(
        &self,
        params: &[Type],
        def: &MethodDef,
        args: &[NodeId],
        arg_types: &[Option<Type>],
        varargs_phase: bool,
    ) -> bool {
        let check = |param: &Type, idx: usize| self.accepts(param, args[idx], arg_types[idx].as_ref());
        if !varargs_phase {
            return params.len() == args.len()
                && params.iter().enumerate().all(|(idx, param)| check(param, idx));
        }
        let Some((vararg, fixed)) = params.split_last() else {
            return false;
        };
        if !def.is_varargs || args.len() < fixed.len() {
            return false;
        }
        let component = vararg.component_type().unwrap_or(vararg);
        fixed.iter().enumerate().all(|(idx, param)| check(param, idx))
            && (fixed.len()..args.len()).all(|idx| check(component, idx))
    }

    /// The first candidate whose parameters all fit every other candidate's, else the first.
    fn most_specific(&self, applicable: &[(MethodId, Vec<Type>)]) -> Option<MethodId> {
        let fits = |a: &[Type], b: &[Type]| {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| is_assignable(&self.store, b, a))
        };
        applicable
            .iter()
            .find(|(_, params)| applicable.iter().all(|(_, other)| fits(params.as_slice(), other.as_slice())))
            .or_else(|| applicable.first())
            .map(|(id, _)| *id)
    }

    fn select(&self, r: &TypeResolver<'_>, call: NodeId, solve_lambdas: bool) -> Result<Option<Selection>> {
        let Node::MethodCall { name, args, .. } = self.node(call)? else {
            return Err(TypeckError::InvariantViolation(format!("{call:?} is not a method call")));
        };
        let receiver = self.call_receiver(r, call, solve_lambdas)?;
        let arg_types = args
            .iter()
            .map(|arg| match &self.tree[*arg] {
                Node::Lambda { .. } | Node::MethodRef { .. } => Ok(None),
                _ => r.resolve(*arg, solve_lambdas).map(Some),
            })
            .collect::<Result<Vec<_>>>()?;

        let candidates = self.methods_named(&receiver, name);
        for varargs_phase in [false, true] {
            let mut applicable = Vec::new();
            for id in &candidates {
                let def = self.method_def(*id)?;
                let params = self.params_seen_from(&receiver, def);
                if self.is_applicable(&params, def, args, &arg_types, varargs_phase) {
                    applicable.push((*id, params));
                }
            }
            if let Some(method) = self.most_specific(&applicable) {
                tracing::trace!(
                    target: "nova.test_utils",
                    call = %self.tree.text(call),
                    ?method,
                    varargs_phase,
                    "overload selected"
                );
                return Ok(Some(Selection {
                    method,
                    receiver,
                    arg_types,
                }));
            }
        }
        tracing::debug!(
            target: "nova.test_utils",
            call = %self.tree.text(call),
            candidates = candidates.len(),
            "no applicable overload"
        );
        Ok(None)
    }

    fn selected(&self, r: &TypeResolver<'_>, call: NodeId, solve_lambdas: bool) -> Result<Selection> {
        self.select(r, call, solve_lambdas)?.ok_or_else(|| {
            let name = match &self.tree[call] {
                Node::MethodCall { name, .. } => name.clone(),
                other => other.kind_name().to_string(),
            };
            TypeckError::unresolved_in(name, self.tree.text(call))
        })
    }

    /// Signature of the selected method at `call`, with receiver and inferred method type
    /// arguments applied. Without `deep`, lambda and method reference arguments contribute
    /// nothing to the inference.
    fn usage_at(&self, r: &TypeResolver<'_>, call: NodeId, selection: &Selection, deep: bool) -> Result<MethodUsage> {
        let Node::MethodCall { args, .. } = self.node(call)? else {
            return Err(TypeckError::InvariantViolation(format!("{call:?} is not a method call")));
        };
        let def = self.method_def(selection.method)?;
        let usage = MethodUsage::new(
            selection.method,
            def.name.clone(),
            self.params_seen_from(&selection.receiver, def),
            use_type_parameters_on(&self.store, &selection.receiver, &def.return_type),
        );
        if def.type_params.is_empty() {
            return Ok(usage);
        }

        let mut cx = InferenceContext::new(&self.store);
        for (pos, arg) in args.iter().enumerate() {
            let Some(formal) = param_for_argument(usage.params(), def.is_varargs, pos) else {
                continue;
            };
            match &self.tree[*arg] {
                Node::Lambda { .. } if deep => {
                    let actual = r.resolve(*arg, true)?;
                    cx.add_pair(formal, actual);
                }
                Node::MethodRef { .. } if deep => {
                    let Some(sig) = sam_signature(&self.store, &formal) else {
                        continue;
                    };
                    let params: Vec<Type> = sig.params.iter().map(|p| self.wildcard_bound(p)).collect();
                    let referenced = self.solve_method_reference(r, *arg, &params)?;
                    cx.add_pair(sig.return_type, referenced.return_type().clone());
                }
                Node::Lambda { .. } | Node::MethodRef { .. } => {}
                _ => {
                    if let Some(Some(actual)) = selection.arg_types.get(pos) {
                        cx.add_pair(formal, actual.clone());
                    }
                }
            }
        }

        let params = usage
            .params()
            .iter()
            .map(|p| {
                let p = cx.add_single(p.clone());
                cx.resolve(p)
            })
            .collect();
        let ret = cx.add_single(usage.return_type().clone());
        let ret = cx.resolve(ret);
        Ok(MethodUsage::new(usage.method, usage.name, params, ret))
    }

    fn wildcard_bound(&self, ty: &Type) -> Type {
        match ty {
            Type::Wildcard(WildcardBound::Unbounded) => {
                Type::class(self.store.well_known().object, vec![])
            }
            Type::Wildcard(bound) => bound.bound().cloned().unwrap_or_else(|| ty.clone()),
            other => other.clone(),
        }
    }

    /// Type of the `idx`th parameter of an implicitly typed lambda.
    fn inferred_lambda_param(&self, r: &TypeResolver<'_>, lambda: NodeId, idx: usize, name: &str) -> Result<Type> {
        let not_inferable = || TypeckError::unresolved_in(name, self.tree.text(lambda));
        let call = self.tree.parent(lambda).ok_or_else(not_inferable)?;
        if !matches!(self.tree[call], Node::MethodCall { .. }) {
            return Err(not_inferable());
        }
        let pos = self.tree.arg_position(lambda).ok_or_else(not_inferable)?;
        let selection = self.selected(r, call, false)?;
        let usage = self.usage_at(r, call, &selection, false)?;
        let is_varargs = self.method_def(usage.method)?.is_varargs;
        let formal = param_for_argument(usage.params(), is_varargs, pos).ok_or_else(not_inferable)?;
        let sig = sam_signature(&self.store, &formal).ok_or_else(not_inferable)?;
        let ty = sig.params.get(idx).ok_or_else(not_inferable)?;
        Ok(self.wildcard_bound(ty))
    }

    /// `scope.name` where `scope` is an expression.
    fn member_value(&self, r: &TypeResolver<'_>, scope: NodeId, name: &str) -> Result<Option<Value>> {
        let scope_ty = r.get_type(scope)?;
        Ok(match &scope_ty {
            Type::Array(_) if name == "length" => Some(Value::new(name, Type::int())),
            Type::Class(ct) => find_field(&self.store, ct.def, name).map(|field| {
                Value::new(name, use_type_parameters_on(&self.store, &scope_ty, &field.ty))
            }),
            _ => None,
        })
    }

    /// A declarator named `name` in the statements of `block` that precede `child`.
    fn block_local(&self, block: NodeId, child: NodeId, name: &str) -> Option<NodeId> {
        let Node::Block { stmts } = &self.tree[block] else {
            return None;
        };
        stmts
            .iter()
            .take_while(|stmt| **stmt != child)
            .filter_map(|stmt| match &self.tree[*stmt] {
                Node::LocalVarStmt { decl } => match &self.tree[*decl] {
                    Node::VarDeclExpr { variables } => Some(variables),
                    _ => None,
                },
                _ => None,
            })
            .flatten()
            .copied()
            .filter(|declarator| {
                matches!(&self.tree[*declarator], Node::VariableDeclarator { name: n, .. } if n == name)
            })
            .last()
    }
}

impl TypeConversion for TypeckFixture {
    fn convert_to_usage(&self, r: &TypeResolver<'_>, ty: &TypeRef, context: NodeId) -> Result<Type> {
        Ok(match ty {
            TypeRef::Primitive(prim) => Type::Primitive(*prim),
            TypeRef::Void => Type::Void,
            TypeRef::Array(component) => Type::array(self.convert_to_usage(r, component, context)?),
            TypeRef::Wildcard(WildcardRef::Unbounded) => Type::Wildcard(WildcardBound::Unbounded),
            TypeRef::Wildcard(WildcardRef::Extends(bound)) => Type::Wildcard(WildcardBound::Extends(
                Box::new(self.convert_to_usage(r, bound, context)?),
            )),
            TypeRef::Wildcard(WildcardRef::Super(bound)) => Type::Wildcard(WildcardBound::Super(
                Box::new(self.convert_to_usage(r, bound, context)?),
            )),
            TypeRef::Class { args, .. } => {
                let name = ty.qualified_name().unwrap_or_default();
                if ty.is_simple_name() {
                    if let Some(tv) = self.type_var_in_scope(&name, context) {
                        return Ok(Type::TypeVar(tv));
                    }
                }
                let id = self
                    .solve_type(&name, context)
                    .solved()
                    .ok_or_else(|| TypeckError::unresolved_in(name.clone(), ty.to_string()))?;
                let args = args
                    .iter()
                    .map(|arg| self.convert_to_usage(r, arg, context))
                    .collect::<Result<Vec<_>>>()?;
                Type::class(id, args)
            }
            TypeRef::Var => {
                return Err(TypeckError::UnsupportedShape(
                    "`var` outside of a local variable declaration".to_string(),
                ))
            }
            TypeRef::Unknown => {
                return Err(TypeckError::InvariantViolation(
                    "type reference without a type".to_string(),
                ))
            }
        })
    }

    fn convert_to_usage_variable_type(&self, r: &TypeResolver<'_>, declarator: NodeId) -> Result<Type> {
        let Node::VariableDeclarator {
            ty,
            extra_dims,
            init,
            ..
        } = self.node(declarator)?
        else {
            return Err(TypeckError::InvariantViolation(format!(
                "{declarator:?} is not a variable declarator"
            )));
        };
        let base = match ty {
            TypeRef::Var => {
                let init = init.ok_or_else(|| {
                    TypeckError::UnsupportedShape("`var` without an initializer".to_string())
                })?;
                r.get_type(init)?
            }
            _ => self.convert_to_usage(r, ty, declarator)?,
        };
        Ok((0..*extra_dims).fold(base, |ty, _| Type::array(ty)))
    }

    fn solve_method_as_usage(&self, r: &TypeResolver<'_>, call: NodeId) -> Result<MethodUsage> {
        let selection = self.selected(r, call, true)?;
        self.usage_at(r, call, &selection, true)
    }

    fn solve_method(
        &self,
        r: &TypeResolver<'_>,
        call: NodeId,
        solve_lambdas: bool,
    ) -> Result<SymbolReference<MethodId>> {
        Ok(self
            .select(r, call, solve_lambdas)?
            .map(|selection| selection.method)
            .into())
    }

    fn solve_method_reference(
        &self,
        r: &TypeResolver<'_>,
        method_ref: NodeId,
        param_types: &[Type],
    ) -> Result<MethodUsage> {
        let Node::MethodRef { scope, name } = self.node(method_ref)? else {
            return Err(TypeckError::InvariantViolation(format!(
                "{method_ref:?} is not a method reference"
            )));
        };
        if name == "new" {
            return Err(TypeckError::UnsupportedShape(
                "constructor references".to_string(),
            ));
        }
        let (qualifier, names_type) = self.qualifier(r, *scope, true)?;

        for id in self.methods_named(&qualifier, name) {
            let def = self.method_def(id)?;
            // `Type::instanceMethod` takes the receiver as its first functional parameter.
            let (receiver, args) = if names_type && !def.is_static {
                match param_types.split_first() {
                    Some((first, rest)) if rest.len() == def.params.len() => (first.clone(), rest),
                    _ => continue,
                }
            } else if names_type == def.is_static && param_types.len() == def.params.len() {
                (qualifier.clone(), param_types)
            } else {
                continue;
            };
            let params = self.params_seen_from(&receiver, def);
            let fits = params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.mentions_type_vars() || is_assignable(&self.store, param, arg));
            if !fits {
                continue;
            }

            let mut cx = InferenceContext::new(&self.store);
            for (param, arg) in params.iter().zip(args) {
                cx.add_pair(param.clone(), arg.clone());
            }
            let ret = use_type_parameters_on(&self.store, &receiver, &def.return_type);
            let ret = cx.add_single(ret);
            let ret = cx.resolve(ret);
            let params = params
                .into_iter()
                .map(|p| {
                    let p = cx.add_single(p);
                    cx.resolve(p)
                })
                .collect();
            return Ok(MethodUsage::new(id, def.name.clone(), params, ret));
        }
        Err(TypeckError::unresolved_in(name.clone(), self.tree.text(method_ref)))
    }

    fn type_declaration(&self, type_node: NodeId) -> Result<ClassId> {
        self.declarations.get(&type_node).copied().ok_or_else(|| {
            let name = match &self.tree[type_node] {
                Node::TypeDecl { name, .. } => name.clone(),
                other => other.kind_name().to_string(),
            };
            TypeckError::unresolved(name)
        })
    }
}

impl SymbolSolver for TypeckFixture {
    fn solve_symbol_as_value(
        &self,
        r: &TypeResolver<'_>,
        name: &str,
        context: NodeId,
    ) -> Result<Option<Value>> {
        if let Node::FieldAccess { scope, name: field } = self.node(context)? {
            if field == name {
                return self.member_value(r, *scope, name);
            }
        }

        let mut classes = Vec::new();
        let mut child = context;
        for ancestor in self.tree.ancestors(context) {
            match &self.tree[ancestor] {
                Node::Lambda { params, .. } => {
                    for (idx, param) in params.iter().enumerate() {
                        let Node::Parameter { name: declared, ty, .. } = &self.tree[*param] else {
                            continue;
                        };
                        if declared != name {
                            continue;
                        }
                        let ty = match ty {
                            TypeRef::Unknown => self.inferred_lambda_param(r, ancestor, idx, name)?,
                            _ => r.get_type(*param)?,
                        };
                        return Ok(Some(Value::new(name, ty)));
                    }
                }
                Node::MethodDecl { params, .. } => {
                    for param in params {
                        if matches!(&self.tree[*param], Node::Parameter { name: declared, .. } if declared == name) {
                            return Ok(Some(Value::new(name, r.get_type(*param)?)));
                        }
                    }
                }
                Node::Block { .. } => {
                    if let Some(declarator) = self.block_local(ancestor, child, name) {
                        return Ok(Some(Value::new(name, r.get_type(declarator)?)));
                    }
                }
                _ => {}
            }
            if let Some(class) = self.declarations.get(&ancestor) {
                classes.push(*class);
            }
            child = ancestor;
        }

        let visible = |local: &&Local| match local.scope {
            None => true,
            Some(scope) => scope == context || self.tree.ancestors(context).any(|a| a == scope),
        };
        if let Some(local) = self.locals.iter().rev().filter(visible).find(|l| l.name == name) {
            return Ok(Some(Value::new(name, local.ty.clone())));
        }

        Ok(classes.into_iter().find_map(|class| {
            find_field(&self.store, class, name).map(|field| Value::new(name, field.ty.clone()))
        }))
    }
}

impl ScopeContext for TypeckFixture {
    fn solve_type(&self, name: &str, context: NodeId) -> SymbolReference<ClassId> {
        let mut segments = name.split('.');
        let Some(first) = segments.next() else {
            return SymbolReference::Unsolved;
        };
        let nested = self.solve_simple_type(first, context).and_then(|head| {
            segments.try_fold(head, |outer, segment| self.nested_type(outer, segment))
        });
        nested.or_else(|| self.store.lookup_class(name)).into()
    }

    fn solve_generic_type(&self, name: &str, _context: NodeId) -> Option<Type> {
        self.generics.get(name).cloned()
    }
}

impl GlobalTypeSolver for TypeckFixture {
    fn try_to_solve_type(&self, name: &str) -> SymbolReference<ClassId> {
        if let Some(id) = self.store.lookup_class(name) {
            return SymbolReference::Solved(id);
        }
        // `pkg.Outer.Inner`: the longest prefix that names a class, then member types.
        let segments: Vec<&str> = name.split('.').collect();
        for split in (1..segments.len()).rev() {
            let Some(outer) = self.store.lookup_class(&segments[..split].join(".")) else {
                continue;
            };
            let found = segments[split..]
                .iter()
                .try_fold(outer, |outer, segment| self.nested_type(outer, segment));
            if found.is_some() {
                return found.into();
            }
        }
        self.imports.get(name).copied().into()
    }
}
