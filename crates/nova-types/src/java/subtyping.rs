use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassType, Type, TypeEnv, WildcardBound};

use super::helpers::instantiate_as_supertype;

/// Whether `sub` is `sup` or inherits from it through `extends`/`implements` edges.
///
/// Interfaces are treated as subclasses of `java.lang.Object` (JLS 4.10.2).
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }

    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if current == sup {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        for parent in def.super_class.iter().chain(def.interfaces.iter()) {
            if let Type::Class(ClassType { def, .. }) = parent {
                queue.push_back(*def);
            }
        }
    }
    false
}

/// Assignment compatibility of a value of type `source` to a variable of type `target`.
///
/// Covers identity, widening primitive conversion, boxing/unboxing (followed by widening),
/// the null type, reference widening through the declared supertype graph (with type argument
/// containment for wildcards) and array covariance. Unchecked conversion from raw types is
/// accepted.
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if target == source {
        return true;
    }

    let wk = env.well_known();
    match (target, source) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => s.widens_to(*t),
        (Type::Primitive(t), Type::Class(ClassType { def, .. })) => {
            wk.unboxed(*def).is_some_and(|s| s.widens_to(*t))
        }
        (Type::Primitive(_), _) => false,
        (_, Type::Null) => target.is_reference() || target.is_wildcard(),
        (Type::Null, _) => false,
        (Type::Class(_), Type::Primitive(s)) => {
            let boxed = Type::class(wk.boxed(*s), vec![]);
            is_assignable(env, target, &boxed)
        }
        (Type::Wildcard(bound), _) => match bound {
            WildcardBound::Unbounded => source.is_reference(),
            WildcardBound::Extends(upper) => is_assignable(env, upper, source),
            WildcardBound::Super(lower) => is_assignable(env, source, lower),
        },
        (Type::Class(t), Type::Class(_)) => class_assignable(env, t, source),
        (Type::Class(t), Type::Array(_)) => {
            t.def == wk.object || t.def == wk.cloneable || t.def == wk.serializable
        }
        (Type::Class(_), Type::TypeVar(id)) => {
            let Some(param) = env.type_param(*id) else {
                return false;
            };
            if param.upper_bounds.is_empty() {
                return matches!(target, Type::Class(t) if t.def == wk.object);
            }
            param
                .upper_bounds
                .iter()
                .any(|bound| is_assignable(env, target, bound))
        }
        (Type::Array(t), Type::Array(s)) => match (&**t, &**s) {
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => t == s,
            _ => is_assignable(env, t, s),
        },
        (Type::Array(_), _) | (Type::TypeVar(_), _) | (Type::Class(_), Type::Wildcard(_)) => false,
    }
}

fn class_assignable(env: &dyn TypeEnv, target: &ClassType, source: &Type) -> bool {
    let Some(Type::Class(viewed)) = instantiate_as_supertype(env, source, target.def) else {
        return false;
    };
    if target.args.is_empty() || viewed.args.is_empty() {
        return true;
    }
    if target.args.len() != viewed.args.len() {
        return false;
    }
    target
        .args
        .iter()
        .zip(viewed.args.iter())
        .all(|(t, s)| type_arg_contains(env, t, s))
}

/// Type argument containment (JLS 4.5.1), restricted to the cases that show up in practice.
fn type_arg_contains(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    match (target, source) {
        (Type::Wildcard(WildcardBound::Unbounded), _) => true,
        (Type::Wildcard(WildcardBound::Extends(t)), Type::Wildcard(WildcardBound::Extends(s))) => {
            is_assignable(env, t, s)
        }
        (Type::Wildcard(WildcardBound::Super(t)), Type::Wildcard(WildcardBound::Super(s))) => {
            is_assignable(env, s, t)
        }
        (Type::Wildcard(_), Type::Wildcard(_)) => false,
        (Type::Wildcard(WildcardBound::Extends(t)), s) => is_assignable(env, t, s),
        (Type::Wildcard(WildcardBound::Super(t)), s) => is_assignable(env, s, t),
        (t, s) => t == s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimitiveType, TypeStore};

    #[test]
    fn widening_and_boxing() {
        let store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let int = Type::int();
        let long = Type::Primitive(PrimitiveType::Long);
        let integer = Type::class(wk.integer, vec![]);
        let object = Type::class(wk.object, vec![]);

        assert!(is_assignable(&store, &long, &int));
        assert!(!is_assignable(&store, &int, &long));
        assert!(is_assignable(&store, &long, &integer));
        assert!(is_assignable(&store, &integer, &int));
        assert!(is_assignable(&store, &object, &int));
        assert!(is_assignable(&store, &object, &Type::Null));
        assert!(!is_assignable(&store, &int, &Type::Null));
    }

    #[test]
    fn generic_containment() {
        let store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let list = store.class_id("java.util.List").unwrap();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let string = Type::class(wk.string, vec![]);
        let object = Type::class(wk.object, vec![]);

        let source = Type::class(array_list, vec![string.clone()]);
        assert!(is_assignable(&store, &Type::class(list, vec![string.clone()]), &source));
        assert!(!is_assignable(&store, &Type::class(list, vec![object.clone()]), &source));
        let list_extends_object = Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(object)))],
        );
        assert!(is_assignable(&store, &list_extends_object, &source));
    }

    #[test]
    fn arrays_are_covariant_for_references_only() {
        let store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let strings = Type::array(Type::class(wk.string, vec![]));
        let objects = Type::array(Type::class(wk.object, vec![]));
        assert!(is_assignable(&store, &objects, &strings));
        assert!(!is_assignable(
            &store,
            &Type::array(Type::Primitive(PrimitiveType::Long)),
            &Type::array(Type::int())
        ));
        assert!(is_assignable(&store, &Type::class(wk.cloneable, vec![]), &strings));
    }
}
