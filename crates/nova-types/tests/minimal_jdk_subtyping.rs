use nova_types::{is_assignable, is_subclass, Type, TypeEnv, TypeStore};

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = TypeStore::with_minimal_jdk();

    let object = Type::class(env.well_known().object, vec![]);

    let list = env.class_id("java.util.List").expect("List must exist in minimal JDK");
    let string = env.well_known().string;
    let list_string = Type::class(list, vec![Type::class(string, vec![])]);
    assert!(is_assignable(&env, &object, &list_string));

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    assert!(is_assignable(&env, &object, &cloneable));
}

#[test]
fn boxes_extend_number_and_implement_comparable() {
    let env = TypeStore::with_minimal_jdk();
    let wk = *env.well_known();
    let number = env.class_id("java.lang.Number").unwrap();
    let comparable = env.class_id("java.lang.Comparable").unwrap();

    assert!(is_subclass(&env, wk.integer, number));
    assert!(is_subclass(&env, wk.double, comparable));
    assert!(!is_subclass(&env, wk.boolean, number));

    let comparable_integer = Type::class(comparable, vec![Type::class(wk.integer, vec![])]);
    assert!(is_assignable(&env, &comparable_integer, &Type::int()));
}
