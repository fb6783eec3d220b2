use nova_hir::{SyntaxTree, TypeRef};
use nova_test_utils::TypeckFixture;
use nova_typeck::TypeckError;
use pretty_assertions::assert_eq;

#[track_caller]
fn assert_unsupported(result: Result<nova_types::Type, TypeckError>) {
    match result {
        Err(TypeckError::UnsupportedShape(_)) => {}
        other => panic!("expected an unsupported shape, got {other:?}"),
    }
}

#[track_caller]
fn assert_invariant(result: Result<nova_types::Type, TypeckError>) {
    match result {
        Err(TypeckError::InvariantViolation(_)) => {}
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

#[test]
fn array_initializers_have_no_standalone_type() {
    let mut fx = TypeckFixture::new();
    let one = fx.tree.int_lit(1);
    let init = fx.tree.array_init(vec![one]);
    assert_unsupported(fx.type_of(init));
}

#[test]
fn lambdas_outside_a_call_argument() {
    let mut fx = TypeckFixture::new();

    let body = fx.tree.int_lit(1);
    let orphan = fx.tree.lambda(vec![], body);
    assert_invariant(fx.type_of(orphan));

    let body = fx.tree.int_lit(2);
    let assigned = fx.tree.lambda(vec![], body);
    let declarator = fx
        .tree
        .declarator("f", TypeRef::named("Runnable"), Some(assigned));
    fx.tree.var_decl(vec![declarator]);
    assert_unsupported(fx.type_of(assigned));
    assert_unsupported(fx.shallow_type_of(assigned));

    let body = fx.tree.int_lit(3);
    let receiver = fx.tree.lambda(vec![], body);
    fx.tree.call(Some(receiver), "run", vec![]);
    assert_unsupported(fx.type_of(receiver));
}

#[test]
fn var_needs_an_initializer() {
    let mut fx = TypeckFixture::new();
    let declarator = fx.tree.declarator("x", TypeRef::Var, None);
    fx.tree.var_decl(vec![declarator]);
    assert_unsupported(fx.type_of(declarator));
}

#[test]
fn declarators_must_sit_in_a_declaration() {
    let mut fx = TypeckFixture::new();
    let declarator = fx.tree.declarator("x", TypeRef::named("String"), None);
    assert_unsupported(fx.type_of(declarator));
}

#[test]
fn multi_variable_declarations() {
    let mut fx = TypeckFixture::new();
    let a = fx.tree.declarator("a", TypeRef::named("String"), None);
    let b = fx.tree.declarator("b", TypeRef::named("String"), None);
    let field = fx.tree.field_decl(vec![a, b]);
    assert_invariant(fx.type_of(field));

    let c = fx.tree.declarator("c", TypeRef::named("String"), None);
    let d = fx.tree.declarator("d", TypeRef::named("String"), None);
    let local = fx.tree.var_decl(vec![c, d]);
    assert_unsupported(fx.type_of(local));

    // The individual declarators still resolve.
    assert_eq!(fx.describe(a), "java.lang.String");
    assert_eq!(fx.describe(d), "java.lang.String");
}

#[test]
fn unknown_names_and_methods_are_unresolved() {
    let mut fx = TypeckFixture::new();
    let ghost = fx.tree.name("ghost");
    let err = fx.type_of(ghost).expect_err("nothing named ghost");
    assert_eq!(err, TypeckError::unresolved_in("ghost", "ghost"));

    let string = fx.string();
    fx.add_local("s", string);
    let s = fx.tree.name("s");
    let call = fx.tree.call(Some(s), "frobnicate", vec![]);
    let err = fx.type_of(call).expect_err("String has no frobnicate");
    assert!(err.is_unresolved(), "{err}");

    let missing_type = fx
        .tree
        .declarator("m", TypeRef::named("com.acme.Missing"), None);
    fx.tree.field_decl(vec![missing_type]);
    let err = fx.type_of(missing_type).expect_err("no such class");
    assert!(err.is_unresolved(), "{err}");
}

#[test]
fn node_ids_from_another_tree() {
    let fx = TypeckFixture::new();
    let mut other = SyntaxTree::new();
    let foreign = other.int_lit(7);
    assert_invariant(fx.type_of(foreign));
}

#[test]
fn this_outside_of_any_type() {
    let mut fx = TypeckFixture::new();
    let this = fx.tree.this(None);
    assert_invariant(fx.type_of(this));

    let sup = fx.tree.super_expr(None);
    assert_invariant(fx.type_of(sup));
}

#[test]
fn implicit_parameter_types_only_exist_inside_lambdas() {
    let mut fx = TypeckFixture::new();
    let param = fx.tree.lambda_param("x");
    assert_invariant(fx.type_of(param));
}

#[test]
fn parameterized_type_expressions() {
    let mut fx = TypeckFixture::new();
    let expr = fx.tree.type_expr(TypeRef::generic(
        "java.util.List",
        vec![TypeRef::named("String")],
    ));
    assert_unsupported(fx.type_of(expr));

    let primitive = fx
        .tree
        .type_expr(TypeRef::Primitive(nova_types::PrimitiveType::Int));
    assert_unsupported(fx.type_of(primitive));
}

#[test]
fn constructor_references() {
    let mut fx = TypeckFixture::new();
    let string = fx.string();
    let optional = fx.class_type("java.util.Optional", vec![string]);
    fx.add_local("opt", optional);

    let opt = fx.tree.name("opt");
    let string_type = fx.tree.type_expr(TypeRef::named("String"));
    let ctor = fx.tree.method_ref(string_type, "new");
    fx.tree.call(Some(opt), "map", vec![ctor]);
    assert_unsupported(fx.type_of(ctor));
}

#[test]
fn super_inside_an_interface() {
    let mut fx = TypeckFixture::new();
    let shape = fx.declare_class("Shape", nova_types::ClassKind::Interface, |_, _| {});

    let sup = fx.tree.super_expr(None);
    let stmt = fx.tree.expr_stmt(sup);
    let body = fx.tree.block(vec![stmt]);
    let area = fx.tree.method_decl("area", vec![], Some(body));
    let decl = fx
        .tree
        .type_decl("Shape", nova_types::ClassKind::Interface, vec![area]);
    fx.bind_declaration(decl, shape);

    assert_unsupported(fx.type_of(sup));
}
