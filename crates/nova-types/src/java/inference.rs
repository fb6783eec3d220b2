//! Unification over (formal, actual) type pairs.
//!
//! An [`InferenceContext`] lives for exactly one lambda or method reference resolution. It is
//! created, fed constraint pairs, asked to [`InferenceContext::resolve`] a type and dropped.

use std::collections::{HashMap, HashSet};

use crate::{ClassType, Type, TypeEnv, TypeVarId};

use super::format::format_type;
use super::helpers::instantiate_as_supertype;

pub struct InferenceContext<'env> {
    env: &'env dyn TypeEnv,
    pairs: Vec<(Type, Type)>,
    /// Union-find parent links. Variables missing from the map are their own root.
    parent: HashMap<TypeVarId, TypeVarId>,
    /// Concrete binding of each equivalence class, keyed by root.
    bindings: HashMap<TypeVarId, Type>,
    registered: HashSet<TypeVarId>,
}

impl std::fmt::Debug for InferenceContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext")
            .field("pairs", &self.pairs)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl<'env> InferenceContext<'env> {
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        Self {
            env,
            pairs: Vec::new(),
            parent: HashMap::new(),
            bindings: HashMap::new(),
            registered: HashSet::new(),
        }
    }

    /// Constraint pairs in insertion order.
    pub fn pairs(&self) -> &[(Type, Type)] {
        &self.pairs
    }

    /// Record that `actual` must fit where `formal` is expected and unify the two.
    pub fn add_pair(&mut self, formal: Type, actual: Type) {
        self.register(&formal);
        self.register(&actual);
        self.unify(&formal, &actual);
        self.pairs.push((formal, actual));
    }

    /// Register the type variables of `ty` so that [`InferenceContext::resolve`] considers them.
    pub fn add_single(&mut self, ty: Type) -> Type {
        self.register(&ty);
        ty
    }

    /// Replace every registered type variable by the binding of its equivalence class.
    ///
    /// Unbound variables are kept as themselves.
    #[must_use]
    pub fn resolve(&self, ty: Type) -> Type {
        let mut visiting = Vec::new();
        self.resolve_with(&ty, &mut visiting)
    }

    /// Whether `tv` has been given a concrete binding (directly or through its class).
    #[must_use]
    pub fn is_bound(&self, tv: TypeVarId) -> bool {
        self.bindings.contains_key(&self.find(tv))
    }

    fn register(&mut self, ty: &Type) {
        let registered = &mut self.registered;
        ty.for_each_type_var(&mut |tv| {
            registered.insert(tv);
        });
    }

    fn find(&self, mut tv: TypeVarId) -> TypeVarId {
        while let Some(next) = self.parent.get(&tv) {
            if *next == tv {
                break;
            }
            tv = *next;
        }
        tv
    }

    fn union(&mut self, a: TypeVarId, b: TypeVarId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        self.parent.insert(rb, ra);
        if let Some(moved) = self.bindings.remove(&rb) {
            self.bind_root(ra, moved);
        }
    }

    fn bind(&mut self, tv: TypeVarId, ty: &Type) {
        let ty = match ty {
            // Type variables are inferred as reference types.
            Type::Primitive(p) => Type::class(self.env.well_known().boxed(*p), vec![]),
            Type::Null | Type::Void => return,
            other => other.clone(),
        };
        let root = self.find(tv);
        self.bind_root(root, ty);
    }

    fn bind_root(&mut self, root: TypeVarId, ty: Type) {
        match self.bindings.get(&root).cloned() {
            None => {
                self.bindings.insert(root, ty);
            }
            Some(existing) if existing == ty => {}
            Some(existing) => {
                tracing::debug!(
                    target: "nova.types",
                    kept = %format_type(self.env, &existing),
                    ignored = %format_type(self.env, &ty),
                    "conflicting inference binding"
                );
                // The first binding wins, but its nested variables may still learn from the second.
                self.unify(&existing, &ty);
            }
        }
    }

    fn unify(&mut self, formal: &Type, actual: &Type) {
        match (formal, actual) {
            (Type::Wildcard(f), Type::Wildcard(a)) => {
                if let (Some(f), Some(a)) = (f.bound(), a.bound()) {
                    self.unify(f, a);
                }
            }
            (Type::Wildcard(f), _) => {
                if let Some(bound) = f.bound() {
                    self.unify(bound, actual);
                }
            }
            (_, Type::Wildcard(a)) => {
                if let Some(bound) = a.bound() {
                    self.unify(formal, bound);
                }
            }
            (Type::TypeVar(f), Type::TypeVar(a)) => self.union(*f, *a),
            (Type::TypeVar(f), _) => self.bind(*f, actual),
            (_, Type::TypeVar(a)) => self.bind(*a, formal),
            (Type::Class(f), Type::Class(a)) => self.unify_classes(f, a, actual, formal),
            (Type::Array(f), Type::Array(a)) => self.unify(f, a),
            _ => {}
        }
    }

    fn unify_classes(&mut self, f: &ClassType, a: &ClassType, actual: &Type, formal: &Type) {
        if f.def == a.def {
            self.unify_args(&f.args, &a.args);
            return;
        }
        if let Some(Type::Class(viewed)) = instantiate_as_supertype(self.env, actual, f.def) {
            self.unify_args(&f.args, &viewed.args);
        } else if let Some(Type::Class(viewed)) = instantiate_as_supertype(self.env, formal, a.def) {
            self.unify_args(&viewed.args, &a.args);
        }
    }

    fn unify_args(&mut self, formal: &[Type], actual: &[Type]) {
        if formal.len() != actual.len() {
            return;
        }
        for (f, a) in formal.iter().zip(actual) {
            self.unify(f, a);
        }
    }

    fn resolve_with(&self, ty: &Type, visiting: &mut Vec<TypeVarId>) -> Type {
        match ty {
            Type::TypeVar(tv) => {
                if !self.registered.contains(tv) {
                    return ty.clone();
                }
                let root = self.find(*tv);
                if visiting.contains(&root) {
                    return ty.clone();
                }
                let Some(binding) = self.bindings.get(&root) else {
                    return ty.clone();
                };
                visiting.push(root);
                let resolved = self.resolve_with(binding, visiting);
                visiting.pop();
                resolved
            }
            Type::Class(ClassType { def, args }) => Type::class(
                *def,
                args.iter().map(|a| self.resolve_with(a, visiting)).collect(),
            ),
            Type::Array(component) => Type::array(self.resolve_with(component, visiting)),
            Type::Wildcard(crate::WildcardBound::Extends(b)) => Type::Wildcard(
                crate::WildcardBound::Extends(Box::new(self.resolve_with(b, visiting))),
            ),
            Type::Wildcard(crate::WildcardBound::Super(b)) => Type::Wildcard(
                crate::WildcardBound::Super(Box::new(self.resolve_with(b, visiting))),
            ),
            Type::Wildcard(crate::WildcardBound::Unbounded)
            | Type::Primitive(_)
            | Type::Void
            | Type::Null => ty.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimitiveType, TypeStore, WildcardBound};

    #[test]
    fn var_concrete_pairs_bind_boxed_types() {
        let mut store = TypeStore::with_minimal_jdk();
        let t = store.add_type_param("T", vec![]);
        let integer = Type::class(store.well_known().integer, vec![]);

        let mut cx = InferenceContext::new(&store);
        cx.add_pair(Type::TypeVar(t), Type::int());
        assert!(cx.is_bound(t));
        let ty = cx.add_single(Type::TypeVar(t));
        assert_eq!(cx.resolve(ty), integer);
    }

    #[test]
    fn joined_variables_share_a_binding() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.add_type_param("A", vec![]);
        let b = store.add_type_param("B", vec![]);
        let long = Type::class(store.well_known().long, vec![]);

        let mut cx = InferenceContext::new(&store);
        cx.add_pair(Type::TypeVar(a), Type::TypeVar(b));
        cx.add_pair(Type::TypeVar(b), Type::Primitive(PrimitiveType::Long));
        assert_eq!(cx.resolve(Type::TypeVar(a)), long);
        assert_eq!(cx.pairs().len(), 2);
    }

    #[test]
    fn wildcards_unify_through_their_bound() {
        let mut store = TypeStore::with_minimal_jdk();
        let r = store.add_type_param("R", vec![]);
        let function = store.class_id("java.util.function.Function").unwrap();
        let string = Type::class(store.well_known().string, vec![]);

        let formal = Type::class(
            function,
            vec![
                Type::Wildcard(WildcardBound::Super(Box::new(string.clone()))),
                Type::Wildcard(WildcardBound::Extends(Box::new(Type::TypeVar(r)))),
            ],
        );
        let mut cx = InferenceContext::new(&store);
        cx.add_pair(Type::TypeVar(r), string.clone());
        let formal = cx.add_single(formal);
        let resolved = cx.resolve(formal);
        assert_eq!(
            resolved,
            Type::class(
                function,
                vec![
                    Type::Wildcard(WildcardBound::Super(Box::new(string.clone()))),
                    Type::Wildcard(WildcardBound::Extends(Box::new(string))),
                ],
            )
        );
    }

    #[test]
    fn different_declarations_unify_through_supertypes() {
        let mut store = TypeStore::with_minimal_jdk();
        let e = store.add_type_param("E", vec![]);
        let list = store.class_id("java.util.List").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let string = Type::class(store.well_known().string, vec![]);

        let mut cx = InferenceContext::new(&store);
        cx.add_pair(
            Type::class(collection, vec![Type::TypeVar(e)]),
            Type::class(list, vec![string.clone()]),
        );
        assert_eq!(cx.resolve(Type::TypeVar(e)), string);
    }

    #[test]
    fn first_binding_wins_on_conflict() {
        let mut store = TypeStore::with_minimal_jdk();
        let t = store.add_type_param("T", vec![]);
        let string = Type::class(store.well_known().string, vec![]);

        let mut cx = InferenceContext::new(&store);
        cx.add_pair(Type::TypeVar(t), string.clone());
        cx.add_pair(Type::TypeVar(t), Type::int());
        assert_eq!(cx.resolve(Type::TypeVar(t)), string);
    }

    #[test]
    fn unbound_and_unregistered_variables_are_kept() {
        let mut store = TypeStore::with_minimal_jdk();
        let t = store.add_type_param("T", vec![]);
        let u = store.add_type_param("U", vec![]);

        let mut cx = InferenceContext::new(&store);
        cx.add_pair(Type::TypeVar(t), Type::TypeVar(u));
        assert_eq!(cx.resolve(Type::TypeVar(t)), Type::TypeVar(t));
        assert_eq!(cx.resolve(Type::array(Type::TypeVar(u))), Type::array(Type::TypeVar(u)));
    }

    #[test]
    fn self_referential_bindings_terminate() {
        let mut store = TypeStore::with_minimal_jdk();
        let t = store.add_type_param("T", vec![]);
        let list = store.class_id("java.util.List").unwrap();

        let mut cx = InferenceContext::new(&store);
        let recursive = Type::class(list, vec![Type::TypeVar(t)]);
        cx.add_pair(Type::TypeVar(t), recursive.clone());
        assert_eq!(cx.resolve(Type::TypeVar(t)), recursive);
    }
}
