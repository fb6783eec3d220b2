use nova_hir::{BinaryOp, TypeRef, UnaryOp};
use nova_test_utils::TypeckFixture;
use nova_typeck::TypeCache;
use nova_types::{ClassKind, MethodDef, PrimitiveType, Type};
use pretty_assertions::assert_eq;

fn prim(p: PrimitiveType) -> TypeRef {
    TypeRef::Primitive(p)
}

#[test]
fn int_literals_add_to_int() {
    let mut fx = TypeckFixture::new();
    let one = fx.tree.int_lit(1);
    let two = fx.tree.int_lit(2);
    let sum = fx.tree.binary(BinaryOp::Plus, one, two);
    assert_eq!(fx.describe(sum), "int");
}

#[test]
fn long_operand_widens_the_sum() {
    let mut fx = TypeckFixture::new();
    let one = fx.tree.long_lit(1);
    let two = fx.tree.int_lit(1);
    let sum = fx.tree.binary(BinaryOp::Plus, one, two);
    assert_eq!(fx.describe(sum), "long");

    let f = fx.tree.double_lit("1.5f");
    let l = fx.tree.long_lit(2);
    let product = fx.tree.binary(BinaryOp::Multiply, f, l);
    assert_eq!(fx.describe(product), "float");
}

#[test]
fn plus_with_a_string_is_concatenation() {
    let mut fx = TypeckFixture::new();
    let s = fx.tree.string_lit("a");
    let one = fx.tree.int_lit(1);
    let concat = fx.tree.binary(BinaryOp::Plus, one, s);
    assert_eq!(fx.describe(concat), "java.lang.String");
}

#[test]
fn boxed_operands_are_unboxed() {
    let mut fx = TypeckFixture::new();
    let integer = fx.class_type("Integer", vec![]);
    fx.add_local("boxed", integer);
    let lhs = fx.tree.name("boxed");
    let rhs = fx.tree.double_lit("2.0");
    let sum = fx.tree.binary(BinaryOp::Minus, lhs, rhs);
    assert_eq!(fx.describe(sum), "double");
}

#[test]
fn relational_and_logical_operators_are_boolean() {
    let ops = [
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::LessEquals,
        BinaryOp::GreaterEquals,
        BinaryOp::Equals,
        BinaryOp::NotEquals,
        BinaryOp::And,
        BinaryOp::Or,
    ];
    for op in ops {
        let mut fx = TypeckFixture::new();
        let lhs = fx.tree.double_lit("1.5");
        let rhs = fx.tree.char_lit('c');
        let cmp = fx.tree.binary(op, lhs, rhs);
        assert_eq!(fx.type_of(cmp), Ok(Type::boolean()), "{}", op.symbol());
    }
}

#[test]
fn shift_takes_the_promoted_left_operand() {
    let mut fx = TypeckFixture::new();
    fx.add_local("b", Type::Primitive(PrimitiveType::Byte));
    fx.add_local("c", Type::Primitive(PrimitiveType::Char));

    let b = fx.tree.name("b");
    let amount = fx.tree.long_lit(2);
    let shifted = fx.tree.binary(BinaryOp::LeftShift, b, amount);
    assert_eq!(fx.describe(shifted), "int");

    let l = fx.tree.long_lit(8);
    let amount = fx.tree.int_lit(1);
    let shifted = fx.tree.binary(BinaryOp::SignedRightShift, l, amount);
    assert_eq!(fx.describe(shifted), "long");

    let c = fx.tree.name("c");
    let amount = fx.tree.int_lit(3);
    let shifted = fx.tree.binary(BinaryOp::UnsignedRightShift, c, amount);
    assert_eq!(fx.describe(shifted), "int");
}

#[test]
fn unary_operators_keep_the_operand_type() {
    let mut fx = TypeckFixture::new();
    fx.add_local("b", Type::Primitive(PrimitiveType::Byte));
    for op in [
        UnaryOp::Minus,
        UnaryOp::Plus,
        UnaryOp::PrefixIncrement,
        UnaryOp::PostfixDecrement,
        UnaryOp::BitwiseComplement,
    ] {
        let b = fx.tree.name("b");
        let expr = fx.tree.unary(op, b);
        assert_eq!(fx.describe(expr), "byte", "{}", op.symbol());
    }

    let flag = fx.tree.bool_lit(false);
    let not = fx.tree.unary(UnaryOp::LogicalComplement, flag);
    assert_eq!(fx.describe(not), "boolean");
}

#[test]
fn conditionals_classify_their_branches() {
    let mut fx = TypeckFixture::new();
    fx.add_local("c", Type::boolean());

    let cond = fx.tree.bool_lit(true);
    let one = fx.tree.int_lit(1);
    let two = fx.tree.int_lit(2);
    let ints = fx.tree.conditional(cond, one, two);
    assert_eq!(fx.describe(ints), "int");

    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let byte = fx.tree.cast(prim(PrimitiveType::Byte), one);
    let ten = fx.tree.int_lit(10);
    let narrowed = fx.tree.conditional(cond, byte, ten);
    assert_eq!(fx.describe(narrowed), "byte");

    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let short = fx.tree.cast(prim(PrimitiveType::Short), one);
    let two = fx.tree.int_lit(2);
    let byte = fx.tree.cast(prim(PrimitiveType::Byte), two);
    let mixed = fx.tree.conditional(cond, short, byte);
    assert_eq!(fx.describe(mixed), "short");

    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let wide = fx.tree.double_lit("2.0");
    let promoted = fx.tree.conditional(cond, one, wide);
    assert_eq!(fx.describe(promoted), "double");

    let cond = fx.tree.name("c");
    let yes = fx.tree.bool_lit(true);
    let no = fx.tree.name("c");
    let booleans = fx.tree.conditional(cond, yes, no);
    assert_eq!(fx.describe(booleans), "boolean");
}

#[test]
fn null_branch_takes_the_other_branch_type() {
    let mut fx = TypeckFixture::new();
    fx.add_local("c", Type::boolean());

    let cond = fx.tree.name("c");
    let null = fx.tree.null_lit();
    let s = fx.tree.string_lit("x");
    let expr = fx.tree.conditional(cond, null, s);
    assert_eq!(fx.describe(expr), "java.lang.String");

    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let null = fx.tree.null_lit();
    let expr = fx.tree.conditional(cond, one, null);
    assert_eq!(fx.describe(expr), "int");
}

#[test]
fn standalone_reference_conditional_boxes_a_primitive_then_branch() {
    let mut fx = TypeckFixture::new();
    fx.add_local("c", Type::boolean());

    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let s = fx.tree.string_lit("x");
    let expr = fx.tree.conditional(cond, one, s);
    assert_eq!(fx.describe(expr), "java.lang.Integer");

    let cond = fx.tree.name("c");
    let s = fx.tree.string_lit("x");
    let one = fx.tree.int_lit(1);
    let expr = fx.tree.conditional(cond, s, one);
    assert_eq!(fx.describe(expr), "java.lang.String");
}

#[test]
fn reference_conditional_in_assignment_takes_the_target_type() {
    let mut fx = TypeckFixture::new();
    let object = fx.class_type("Object", vec![]);
    fx.add_local("target", object);
    fx.add_local("c", Type::boolean());

    let target = fx.tree.name("target");
    let cond = fx.tree.name("c");
    let s = fx.tree.string_lit("x");
    let one = fx.tree.int_lit(1);
    let expr = fx.tree.conditional(cond, s, one);
    fx.tree.assign(target, expr);
    assert_eq!(fx.describe(expr), "java.lang.Object");
}

#[test]
fn reference_conditional_as_a_call_argument_takes_the_then_branch() {
    let mut fx = TypeckFixture::new();
    let object = fx.class_type("Object", vec![]);
    fx.declare_class("com.acme.Util", ClassKind::Class, |_, def| {
        def.methods.push(MethodDef {
            name: "take".to_string(),
            type_params: vec![],
            params: vec![object],
            return_type: Type::Void,
            is_static: true,
            is_varargs: false,
            is_abstract: false,
        });
    });
    fx.import("com.acme.Util");
    fx.add_local("c", Type::boolean());

    let util = fx.tree.name("Util");
    let cond = fx.tree.name("c");
    let one = fx.tree.int_lit(1);
    let s = fx.tree.string_lit("x");
    let expr = fx.tree.conditional(cond, one, s);
    let call = fx.tree.call(Some(util), "take", vec![expr]);

    assert_eq!(fx.describe(expr), "int");
    assert_eq!(fx.describe(call), "void");
}

#[test]
fn boolean_conditionals_with_boxed_branches() {
    let mut fx = TypeckFixture::new();
    let boxed = fx.class_type("Boolean", vec![]);
    fx.add_local("c", Type::boolean());
    fx.add_local("a", boxed.clone());
    fx.add_local("b", boxed);
    fx.add_local("flag", Type::boolean());

    let cond = fx.tree.name("c");
    let a = fx.tree.name("a");
    let b = fx.tree.name("b");
    let both_boxed = fx.tree.conditional(cond, a, b);
    assert_eq!(fx.describe(both_boxed), "java.lang.Boolean");

    let cond = fx.tree.name("c");
    let a = fx.tree.name("a");
    let flag = fx.tree.name("flag");
    let mixed = fx.tree.conditional(cond, a, flag);
    assert_eq!(fx.describe(mixed), "boolean");
}

#[test]
fn array_creation_counts_every_dimension() {
    let mut fx = TypeckFixture::new();
    let three = fx.tree.int_lit(3);
    let four = fx.tree.int_lit(4);
    let ints = fx.tree.new_array(prim(PrimitiveType::Int), vec![Some(three), Some(four)]);
    assert_eq!(fx.describe(ints), "int[][]");

    let two = fx.tree.int_lit(2);
    let strings = fx.tree.new_array(TypeRef::named("String"), vec![Some(two), None]);
    assert_eq!(fx.describe(strings), "java.lang.String[][]");
}

#[test]
fn array_access_strips_one_dimension() {
    let mut fx = TypeckFixture::new();
    fx.add_local("grid", Type::array(Type::array(Type::int())));
    let grid = fx.tree.name("grid");
    let zero = fx.tree.int_lit(0);
    let row = fx.tree.array_access(grid, zero);
    assert_eq!(fx.describe(row), "int[]");
    let one = fx.tree.int_lit(1);
    let cell = fx.tree.array_access(row, one);
    assert_eq!(fx.describe(cell), "int");
}

#[test]
fn casts_take_the_target_type() {
    let mut fx = TypeckFixture::new();
    let object = fx.class_type("Object", vec![]);
    fx.add_local("o", object);

    let one = fx.tree.int_lit(1);
    let widened = fx.tree.cast(prim(PrimitiveType::Long), one);
    assert_eq!(fx.describe(widened), "long");

    let o = fx.tree.name("o");
    let narrowed = fx.tree.cast(TypeRef::named("String"), o);
    assert_eq!(fx.describe(narrowed), "java.lang.String");

    // Casting back to the original type is the identity.
    let inner = fx.tree.cast(TypeRef::named("String"), narrowed);
    let again = fx.tree.cast(TypeRef::named("Object"), inner);
    assert_eq!(fx.type_of(again), fx.type_of(o));
}

#[test]
fn class_literals_keep_the_operand_type() {
    let mut fx = TypeckFixture::new();
    let int_class = fx.tree.class_lit(prim(PrimitiveType::Int));
    assert_eq!(fx.describe(int_class), "java.lang.Class<int>");

    let void_class = fx.tree.class_lit(TypeRef::Void);
    assert_eq!(fx.describe(void_class), "java.lang.Class<void>");

    let string_class = fx.tree.class_lit(TypeRef::named("String"));
    assert_eq!(fx.describe(string_class), "java.lang.Class<java.lang.String>");
}

#[test]
fn instanceof_and_parentheses() {
    let mut fx = TypeckFixture::new();
    let s = fx.tree.string_lit("x");
    let check = fx.tree.instance_of(s, TypeRef::named("CharSequence"));
    assert_eq!(fx.describe(check), "boolean");

    let l = fx.tree.long_lit(3);
    let wrapped = fx.tree.enclosed(l);
    let twice = fx.tree.enclosed(wrapped);
    assert_eq!(fx.describe(twice), "long");
}

#[test]
fn literals() {
    let mut fx = TypeckFixture::new();
    let cases = [
        (fx.tree.char_lit('x'), "char"),
        (fx.tree.double_lit("2.5"), "double"),
        (fx.tree.double_lit("2.5F"), "float"),
        (fx.tree.bool_lit(false), "boolean"),
        (fx.tree.null_lit(), "null"),
        (fx.tree.string_lit("s"), "java.lang.String"),
    ];
    for (node, expected) in cases {
        assert_eq!(fx.describe(node), expected);
    }
}

#[test]
fn assignment_takes_the_target_type() {
    let mut fx = TypeckFixture::new();
    fx.add_local("x", Type::int());
    let x = fx.tree.name("x");
    let value = fx.tree.long_lit(5);
    let assign = fx.tree.assign(x, value);
    assert_eq!(fx.describe(assign), "int");
}

#[test]
fn method_calls_see_receiver_type_arguments() {
    let mut fx = TypeckFixture::new();
    let string = fx.string();
    let list = fx.class_type("java.util.List", vec![string]);
    fx.add_local("names", list);

    let receiver = fx.tree.string_lit("abc");
    let length = fx.tree.call(Some(receiver), "length", vec![]);
    assert_eq!(fx.describe(length), "int");

    let names = fx.tree.name("names");
    let zero = fx.tree.int_lit(0);
    let first = fx.tree.call(Some(names), "get", vec![zero]);
    assert_eq!(fx.describe(first), "java.lang.String");

    let upper = fx.tree.call(Some(first), "toUpperCase", vec![]);
    let size = fx.tree.call(Some(upper), "hashCode", vec![]);
    assert_eq!(fx.describe(size), "int");
}

#[test]
fn object_creation_is_the_instantiated_type() {
    let mut fx = TypeckFixture::new();
    fx.import("java.util.ArrayList");
    let created = fx
        .tree
        .new_object(TypeRef::generic("ArrayList", vec![TypeRef::named("String")]), vec![]);
    assert_eq!(fx.describe(created), "java.util.ArrayList<java.lang.String>");
}

#[test]
fn resolution_is_idempotent_with_and_without_a_cache() {
    let mut fx = TypeckFixture::new();
    fx.add_local("b", Type::Primitive(PrimitiveType::Byte));
    fx.add_local("c", Type::boolean());
    let b = fx.tree.name("b");
    let one = fx.tree.int_lit(1);
    let sum = fx.tree.binary(BinaryOp::Plus, b, one);
    let cond = fx.tree.name("c");
    let s = fx.tree.string_lit("s");
    let expr = fx.tree.conditional(cond, sum, s);

    let first = fx.type_of(expr);
    assert_eq!(fx.type_of(expr), first);

    let cache = TypeCache::with_capacity(16);
    let cached = fx.cached_resolver(&cache);
    assert_eq!(cached.get_type(expr), first);
    assert!(!cache.is_empty());
    assert_eq!(cached.get_type(expr), first);
    assert_eq!(cached.get_type(sum), Ok(Type::int()));
}

#[test]
fn full_cache_still_resolves() {
    let mut fx = TypeckFixture::new();
    let one = fx.tree.int_lit(1);
    let two = fx.tree.long_lit(2);
    let sum = fx.tree.binary(BinaryOp::Plus, one, two);

    let cache = TypeCache::with_capacity(1);
    let cached = fx.cached_resolver(&cache);
    assert_eq!(fx.render(&cached.get_type(sum).expect("resolves")), "long");
    assert_eq!(cache.len(), 1);
}
