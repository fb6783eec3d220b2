use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    ClassId, ClassType, FieldDef, MethodId, MethodUsage, PrimitiveType, Type, TypeEnv, TypeVarId,
};

use super::subtyping::is_assignable;

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Missing class metadata simply returns `None`.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Array(_) => {
                let wk = env.well_known();
                if target == wk.object || target == wk.cloneable || target == wk.serializable {
                    return Some(Type::class(target, vec![]));
                }
                return None;
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let out = env.type_param(*id).and_then(|tp| {
                    tp.upper_bounds
                        .iter()
                        .find_map(|bound| inner(env, bound, target, seen_type_vars))
                });
                seen_type_vars.remove(id);
                return out;
            }
            Type::Class(_) => {}
            _ => return None,
        }

        supertype_closure(env, ty)
            .into_iter()
            .find(|candidate| matches!(candidate, Type::Class(ct) if ct.def == target))
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

/// Breadth-first walk of the supertype graph starting at the class type `ty` (inclusive).
///
/// Each visited supertype carries the type arguments implied by `ty`. Raw instantiations stay raw.
fn supertype_closure(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let mut out = Vec::new();
    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(ty.clone());

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = &current else {
            continue;
        };
        if !seen.insert((*def, args.clone())) {
            continue;
        }
        let Some(class_def) = env.class(*def) else {
            out.push(current);
            continue;
        };

        // A raw instantiation (`List` rather than `List<String>`) has no arguments to propagate.
        let raw = args.is_empty() && !class_def.type_params.is_empty();
        let subst: HashMap<TypeVarId, Type> = if raw {
            HashMap::new()
        } else {
            class_def
                .type_params
                .iter()
                .copied()
                .zip(args.iter().cloned())
                .collect()
        };

        let parents = class_def
            .super_class
            .iter()
            .chain(class_def.interfaces.iter());
        for parent in parents {
            let parent = if raw {
                match parent {
                    Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
                    _ => continue,
                }
            } else {
                crate::substitute(parent, &subst)
            };
            queue.push_back(parent);
        }

        // In Java, every interface implicitly has `Object` as a supertype (JLS 4.10.2).
        if class_def.is_interface() {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
        out.push(current);
    }

    out
}

/// The type a declaration denotes inside its own body: `Box<T>` for `class Box<T>`.
#[must_use]
pub fn declared_type(env: &dyn TypeEnv, id: ClassId) -> Type {
    let args = env
        .class(id)
        .map(|def| def.type_params.iter().map(|tv| Type::TypeVar(*tv)).collect())
        .unwrap_or_default();
    Type::class(id, args)
}

/// Pair each type parameter of `ty`'s declaration with the argument supplied for it.
///
/// Non-class types and raw types yield an empty list.
#[must_use]
pub fn type_parameters_map(env: &dyn TypeEnv, ty: &Type) -> Vec<(TypeVarId, Type)> {
    let Type::Class(ClassType { def, args }) = ty else {
        return Vec::new();
    };
    let Some(class_def) = env.class(*def) else {
        return Vec::new();
    };
    class_def
        .type_params
        .iter()
        .copied()
        .zip(args.iter().cloned())
        .collect()
}

/// Substitute the type arguments of `receiver` (and of every supertype it implies) into `ty`.
///
/// This is how a method declared on `Stream<T>` sees `T` when invoked on a `Stream<String>`.
#[must_use]
pub fn use_type_parameters_on(env: &dyn TypeEnv, receiver: &Type, ty: &Type) -> Type {
    if !receiver.is_class() || !ty.mentions_type_vars() {
        return ty.clone();
    }
    let mut subst: HashMap<TypeVarId, Type> = HashMap::new();
    for supertype in supertype_closure(env, receiver) {
        for (tv, arg) in type_parameters_map(env, &supertype) {
            subst.entry(tv).or_insert(arg);
        }
    }
    crate::substitute(ty, &subst)
}

/// Look up a field by name on `class`, then on its supertypes in breadth-first order.
pub fn find_field<'env>(env: &'env dyn TypeEnv, class: ClassId, name: &str) -> Option<&'env FieldDef> {
    let mut queue = VecDeque::from([class]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        if let Some(field) = def.fields.iter().find(|f| f.name == name) {
            return Some(field);
        }
        for parent in def.super_class.iter().chain(def.interfaces.iter()) {
            if let Type::Class(ct) = parent {
                queue.push_back(ct.def);
            }
        }
    }
    None
}

/// Locate the single abstract method of the functional interface denoted by `ty`.
///
/// The interface graph is walked from the declaration of `ty` with supertype substitution
/// relative to the declaration's own type variables, so the returned usage for
/// `UnaryOperator<String>` is `apply(T) -> T` in terms of `UnaryOperator`'s `T`. Call-site
/// arguments are applied by the caller (see [`sam_signature`]).
///
/// Abstract methods that redeclare public `Object` methods do not count (JLS 9.8).
pub fn functional_method(env: &dyn TypeEnv, ty: &Type) -> Option<MethodUsage> {
    let Type::Class(ClassType { def, .. }) = ty else {
        return None;
    };
    if !env.class(*def)?.is_interface() {
        return None;
    }

    // Map (name, parameter types) to the declaring method and the most specific return type.
    let mut candidates: Vec<(MethodId, String, Vec<Type>, Type)> = Vec::new();

    for current in supertype_closure(env, &declared_type(env, *def)) {
        let Type::Class(ClassType { def, args }) = &current else {
            continue;
        };
        let Some(class_def) = env.class(*def) else {
            continue;
        };
        if !class_def.is_interface() {
            continue;
        }
        let subst: HashMap<TypeVarId, Type> = class_def
            .type_params
            .iter()
            .copied()
            .zip(args.iter().cloned())
            .collect();

        for (idx, m) in class_def.methods.iter().enumerate() {
            if m.is_static || !m.is_abstract {
                continue;
            }
            let params: Vec<Type> = m
                .params
                .iter()
                .map(|p| crate::substitute(p, &subst))
                .collect();
            let return_type = crate::substitute(&m.return_type, &subst);
            if is_object_method(env, &m.name, &params, &return_type) {
                continue;
            }

            match candidates
                .iter_mut()
                .find(|(_, name, existing, _)| *name == m.name && *existing == params)
            {
                Some(slot) => {
                    slot.3 = merge_return_types(env, slot.3.clone(), return_type)?;
                }
                None => candidates.push((MethodId::new(*def, idx), m.name.clone(), params, return_type)),
            }
        }
    }

    if candidates.len() != 1 {
        return None;
    }
    let (method, name, params, return_type) = candidates.pop()?;
    Some(MethodUsage::new(method, name, params, return_type))
}

fn merge_return_types(env: &dyn TypeEnv, a: Type, b: Type) -> Option<Type> {
    if a == b {
        return Some(a);
    }
    match (is_assignable(env, &b, &a), is_assignable(env, &a, &b)) {
        (true, _) => Some(a),
        (false, true) => Some(b),
        (false, false) => None,
    }
}

fn is_object_method(env: &dyn TypeEnv, name: &str, params: &[Type], return_type: &Type) -> bool {
    match name {
        "equals" => {
            let object = Type::class(env.well_known().object, vec![]);
            params.len() == 1
                && params[0] == object
                && *return_type == Type::Primitive(PrimitiveType::Boolean)
        }
        "hashCode" => params.is_empty() && *return_type == Type::Primitive(PrimitiveType::Int),
        "toString" => {
            let string = Type::class(env.well_known().string, vec![]);
            params.is_empty() && *return_type == string
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamSignature {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Functional signature of `ty` with the use-site type arguments applied.
///
/// `Function<String, Integer>` yields `(String) -> Integer`. A type variable is functional when
/// exactly one of its bounds is.
pub fn sam_signature(env: &dyn TypeEnv, ty: &Type) -> Option<SamSignature> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<SamSignature> {
        if let Type::TypeVar(id) = ty {
            if !seen_type_vars.insert(*id) {
                return None;
            }
            let mut sig: Option<SamSignature> = None;
            let mut ambiguous = false;
            if let Some(tp) = env.type_param(*id) {
                for bound in &tp.upper_bounds {
                    let Some(bound_sig) = inner(env, bound, seen_type_vars) else {
                        continue;
                    };
                    match &sig {
                        None => sig = Some(bound_sig),
                        Some(existing) if *existing == bound_sig => {}
                        Some(_) => ambiguous = true,
                    }
                }
            }
            seen_type_vars.remove(id);
            return if ambiguous { None } else { sig };
        }

        let usage = functional_method(env, ty)?;
        let subst: HashMap<TypeVarId, Type> = type_parameters_map(env, ty).into_iter().collect();
        let usage = usage.substituted(&subst);
        Some(SamSignature {
            params: usage.params().to_vec(),
            return_type: usage.return_type().clone(),
        })
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, &mut seen_type_vars)
}

/// Declared type at argument position `pos`. Arguments at or past the varargs slot take its
/// component type.
#[must_use]
pub fn param_for_argument(params: &[Type], is_varargs: bool, pos: usize) -> Option<Type> {
    let last = params.len().checked_sub(1)?;
    if is_varargs && pos >= last {
        let vararg = &params[last];
        return Some(vararg.component_type().unwrap_or(vararg).clone());
    }
    params.get(pos).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, ClassKind, MethodDef, TypeStore};

    fn abstract_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
        MethodDef {
            name: name.to_string(),
            type_params: vec![],
            params,
            return_type,
            is_static: false,
            is_varargs: false,
            is_abstract: true,
        }
    }

    fn interface(name: &str, type_params: Vec<TypeVarId>, interfaces: Vec<Type>, methods: Vec<MethodDef>) -> ClassDef {
        ClassDef {
            name: name.to_string(),
            kind: ClassKind::Interface,
            type_params,
            super_class: None,
            interfaces,
            fields: vec![],
            methods,
            enum_constants: vec![],
            nested_types: vec![],
        }
    }

    #[test]
    fn instantiate_as_supertype_recovers_type_arguments() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;
        let list = store
            .class_id("java.util.List")
            .expect("minimal JDK should define java.util.List");
        let array_list = store
            .class_id("java.util.ArrayList")
            .expect("minimal JDK should define java.util.ArrayList");

        // ArrayList<E> extends AbstractList<E>; AbstractList<E> implements List<E>.
        let abstract_list_e = store.add_type_param("E", vec![Type::class(object, vec![])]);
        let abstract_list = store.add_class(ClassDef {
            name: "java.util.AbstractList".to_string(),
            kind: ClassKind::Class,
            type_params: vec![abstract_list_e],
            super_class: Some(Type::class(object, vec![])),
            interfaces: vec![Type::class(list, vec![Type::TypeVar(abstract_list_e)])],
            fields: vec![],
            methods: vec![],
            enum_constants: vec![],
            nested_types: vec![],
        });
        {
            let def = store.class_mut(array_list).expect("ArrayList should exist");
            let e = def.type_params[0];
            def.super_class = Some(Type::class(abstract_list, vec![Type::TypeVar(e)]));
            def.interfaces.clear();
        }

        let string = Type::class(store.well_known().string, vec![]);
        let array_list_string = Type::class(array_list, vec![string.clone()]);
        let instantiated = instantiate_as_supertype(&store, &array_list_string, list)
            .expect("should be able to view ArrayList<String> as List");
        assert_eq!(instantiated, Type::class(list, vec![string]));
    }

    #[test]
    fn raw_instantiation_stays_raw() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let viewed = instantiate_as_supertype(&store, &Type::class(list, vec![]), collection);
        assert_eq!(viewed, Some(Type::class(collection, vec![])));
    }

    #[test]
    fn functional_method_is_expressed_in_declaration_type_variables() {
        let store = TypeStore::with_minimal_jdk();
        let unary = store.class_id("java.util.function.UnaryOperator").unwrap();
        let t = Type::TypeVar(store.class(unary).unwrap().type_params[0]);
        let string = Type::class(store.well_known().string, vec![]);

        let usage = functional_method(&store, &Type::class(unary, vec![string])).unwrap();
        assert_eq!(usage.name, "apply");
        assert_eq!(usage.params(), &[t.clone()]);
        assert_eq!(usage.return_type(), &t);
        assert_eq!(
            usage.declaring_class(),
            store.class_id("java.util.function.Function").unwrap()
        );
    }

    #[test]
    fn predicate_default_methods_are_not_functional() {
        let store = TypeStore::with_minimal_jdk();
        let predicate = store.class_id("java.util.function.Predicate").unwrap();
        let usage = functional_method(&store, &declared_type(&store, predicate)).unwrap();
        assert_eq!(usage.name, "test");
    }

    #[test]
    fn classes_and_multi_method_interfaces_are_not_functional() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        assert_eq!(functional_method(&store, &string), None);

        let two = store.add_class(interface(
            "com.example.Two",
            vec![],
            vec![],
            vec![
                abstract_method("a", vec![], Type::Void),
                abstract_method("b", vec![], Type::Void),
            ],
        ));
        assert_eq!(functional_method(&store, &Type::class(two, vec![])), None);
    }

    #[test]
    fn object_methods_do_not_count() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);
        let string = Type::class(store.well_known().string, vec![]);
        let cmp = store.add_class(interface(
            "com.example.Cmp",
            vec![],
            vec![],
            vec![
                abstract_method("equals", vec![object], Type::boolean()),
                abstract_method("toString", vec![], string.clone()),
                abstract_method("compare", vec![string.clone(), string], Type::int()),
            ],
        ));
        let usage = functional_method(&store, &Type::class(cmp, vec![])).unwrap();
        assert_eq!(usage.name, "compare");
    }

    #[test]
    fn sam_signature_applies_type_arguments() {
        let store = TypeStore::with_minimal_jdk();
        let function = store
            .class_id("java.util.function.Function")
            .expect("minimal JDK should define java.util.function.Function");
        let string = Type::class(store.well_known().string, vec![]);
        let integer = Type::class(store.well_known().integer, vec![]);
        let function_ty = Type::class(function, vec![string.clone(), integer.clone()]);

        let sig = sam_signature(&store, &function_ty).expect("Function should be functional");
        assert_eq!(sig.params, vec![string]);
        assert_eq!(sig.return_type, integer);
    }

    #[test]
    fn use_type_parameters_on_sees_through_supertypes() {
        let store = TypeStore::with_minimal_jdk();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let stream = store.class_id("java.util.stream.Stream").unwrap();
        let e = store.class(collection).unwrap().type_params[0];
        let string = Type::class(store.well_known().string, vec![]);

        let receiver = Type::class(array_list, vec![string.clone()]);
        let stream_of_e = Type::class(stream, vec![Type::TypeVar(e)]);
        assert_eq!(
            use_type_parameters_on(&store, &receiver, &stream_of_e),
            Type::class(stream, vec![string])
        );
    }

    #[test]
    fn find_field_walks_superclasses() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);
        let base = store.add_class(ClassDef {
            name: "com.example.Base".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: Some(object),
            interfaces: vec![],
            fields: vec![FieldDef {
                name: "count".to_string(),
                ty: Type::int(),
                is_static: false,
            }],
            methods: vec![],
            enum_constants: vec![],
            nested_types: vec![],
        });
        let derived = store.add_class(ClassDef {
            name: "com.example.Derived".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: Some(Type::class(base, vec![])),
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            enum_constants: vec![],
            nested_types: vec![],
        });
        assert_eq!(find_field(&store, derived, "count").map(|f| &f.ty), Some(&Type::int()));
        assert!(find_field(&store, derived, "missing").is_none());
    }

    #[test]
    fn varargs_positions_use_the_component_type() {
        let int = Type::Primitive(PrimitiveType::Int);
        let params = vec![int.clone(), Type::array(Type::boolean())];
        assert_eq!(param_for_argument(&params, true, 0), Some(int));
        assert_eq!(param_for_argument(&params, true, 1), Some(Type::boolean()));
        assert_eq!(param_for_argument(&params, true, 3), Some(Type::boolean()));
        assert_eq!(
            param_for_argument(&params, false, 1),
            Some(Type::array(Type::boolean()))
        );
        assert_eq!(param_for_argument(&params, false, 2), None);
        assert_eq!(param_for_argument(&[], true, 0), None);
    }
}
