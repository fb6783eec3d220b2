use nova_types::{
    declared_type, format_type, functional_method, sam_signature, type_parameters_map,
    ClassDef, ClassKind, MethodDef, Type, TypeEnv, TypeStore, WildcardBound,
};
use pretty_assertions::assert_eq;

#[test]
fn supplier_signature_with_wildcard_argument() {
    let store = TypeStore::with_minimal_jdk();
    let supplier = store.class_id("java.util.function.Supplier").unwrap();
    let string = Type::class(store.well_known().string, vec![]);
    let extends_string = Type::Wildcard(WildcardBound::Extends(Box::new(string)));

    let sig = sam_signature(&store, &Type::class(supplier, vec![extends_string.clone()])).unwrap();
    assert!(sig.params.is_empty());
    assert_eq!(sig.return_type, extends_string);
}

#[test]
fn inherited_functional_method_is_found_through_generic_superinterface() {
    let mut store = TypeStore::with_minimal_jdk();
    let object = Type::class(store.well_known().object, vec![]);
    let function = store.class_id("java.util.function.Function").unwrap();
    let integer = Type::class(store.well_known().integer, vec![]);

    // interface ToInt<T> extends Function<T, Integer> {}
    let t = store.add_type_param("T", vec![object]);
    let to_int = store.add_class(ClassDef {
        name: "com.example.ToInt".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![t],
        super_class: None,
        interfaces: vec![Type::class(function, vec![Type::TypeVar(t), integer.clone()])],
        fields: vec![],
        methods: vec![],
        enum_constants: vec![],
        nested_types: vec![],
    });

    let usage = functional_method(&store, &declared_type(&store, to_int)).unwrap();
    assert_eq!(usage.params(), &[Type::TypeVar(t)]);
    assert_eq!(usage.return_type(), &integer);

    let string = Type::class(store.well_known().string, vec![]);
    let sig = sam_signature(&store, &Type::class(to_int, vec![string.clone()])).unwrap();
    assert_eq!(sig.params, vec![string]);
}

#[test]
fn override_equivalent_redeclaration_keeps_one_candidate() {
    let mut store = TypeStore::with_minimal_jdk();
    let runnable = store.class_id("java.lang.Runnable").unwrap();
    let task = store.add_class(ClassDef {
        name: "com.example.Task".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![],
        super_class: None,
        interfaces: vec![Type::class(runnable, vec![])],
        fields: vec![],
        methods: vec![MethodDef {
            name: "run".to_string(),
            type_params: vec![],
            params: vec![],
            return_type: Type::Void,
            is_static: false,
            is_varargs: false,
            is_abstract: true,
        }],
        enum_constants: vec![],
        nested_types: vec![],
    });

    let usage = functional_method(&store, &Type::class(task, vec![])).unwrap();
    assert_eq!(usage.name, "run");
    assert_eq!(usage.declaring_class(), task);
}

#[test]
fn type_parameters_map_pairs_declaration_variables_with_arguments() {
    let store = TypeStore::with_minimal_jdk();
    let function = store.class_id("java.util.function.Function").unwrap();
    let string = Type::class(store.well_known().string, vec![]);
    let ty = Type::class(function, vec![string.clone(), Type::int()]);

    let rendered: Vec<(String, String)> = type_parameters_map(&store, &ty)
        .into_iter()
        .map(|(tv, arg)| (format_type(&store, &Type::TypeVar(tv)), format_type(&store, &arg)))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("T".to_string(), "java.lang.String".to_string()),
            ("R".to_string(), "int".to_string()),
        ]
    );
}
