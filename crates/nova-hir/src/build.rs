//! Shorthand constructors used by tests and by embedders that lower their own ASTs.

use nova_types::ClassKind;

use crate::hir::{AssignOp, BinaryOp, LiteralKind, Node, NodeId, SyntaxTree, TypeRef, UnaryOp};

impl SyntaxTree {
    pub fn literal(&mut self, kind: LiteralKind, text: impl Into<String>) -> NodeId {
        self.alloc(Node::Literal {
            kind,
            text: text.into(),
        })
    }

    pub fn int_lit(&mut self, value: i32) -> NodeId {
        self.literal(LiteralKind::Int, value.to_string())
    }

    pub fn long_lit(&mut self, value: i64) -> NodeId {
        self.literal(LiteralKind::Long, format!("{value}L"))
    }

    pub fn char_lit(&mut self, value: char) -> NodeId {
        self.literal(LiteralKind::Char, format!("'{value}'"))
    }

    /// `text` is the literal as written, suffix included (`1.5f`, `2.0`).
    pub fn double_lit(&mut self, text: &str) -> NodeId {
        self.literal(LiteralKind::Double, text)
    }

    pub fn string_lit(&mut self, value: &str) -> NodeId {
        self.literal(LiteralKind::String, format!("{value:?}"))
    }

    pub fn bool_lit(&mut self, value: bool) -> NodeId {
        self.literal(LiteralKind::Boolean, value.to_string())
    }

    pub fn null_lit(&mut self) -> NodeId {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn name(&mut self, name: &str) -> NodeId {
        self.alloc(Node::Name {
            name: name.to_string(),
        })
    }

    /// `a.b.c` as nested field accesses over a leading name.
    pub fn dotted(&mut self, path: &str) -> NodeId {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut node = self.name(first);
        for segment in segments {
            node = self.field_access(node, segment);
        }
        node
    }

    pub fn field_access(&mut self, scope: NodeId, name: &str) -> NodeId {
        self.alloc(Node::FieldAccess {
            scope,
            name: name.to_string(),
        })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(Node::Binary { op, lhs, rhs })
    }

    pub fn unary(&mut self, op: UnaryOp, expr: NodeId) -> NodeId {
        self.alloc(Node::Unary { op, expr })
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.alloc(Node::Assign {
            op: AssignOp::Assign,
            target,
            value,
        })
    }

    pub fn cast(&mut self, ty: TypeRef, expr: NodeId) -> NodeId {
        self.alloc(Node::Cast { ty, expr })
    }

    pub fn class_lit(&mut self, ty: TypeRef) -> NodeId {
        self.alloc(Node::ClassLit { ty })
    }

    pub fn conditional(&mut self, condition: NodeId, then_expr: NodeId, else_expr: NodeId) -> NodeId {
        self.alloc(Node::Conditional {
            condition,
            then_expr,
            else_expr,
        })
    }

    pub fn enclosed(&mut self, inner: NodeId) -> NodeId {
        self.alloc(Node::Enclosed { inner })
    }

    pub fn instance_of(&mut self, expr: NodeId, ty: TypeRef) -> NodeId {
        self.alloc(Node::InstanceOf { expr, ty })
    }

    pub fn call(&mut self, scope: Option<NodeId>, name: &str, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::MethodCall {
            scope,
            name: name.to_string(),
            args,
        })
    }

    pub fn type_expr(&mut self, ty: TypeRef) -> NodeId {
        self.alloc(Node::TypeExpr { ty })
    }

    pub fn new_object(&mut self, ty: TypeRef, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::ObjectCreation {
            ty,
            args,
            body: None,
        })
    }

    pub fn anonymous_class(&mut self, ty: TypeRef, args: Vec<NodeId>, members: Vec<NodeId>) -> NodeId {
        self.alloc(Node::ObjectCreation {
            ty,
            args,
            body: Some(members),
        })
    }

    pub fn this(&mut self, qualifier: Option<&str>) -> NodeId {
        self.alloc(Node::This {
            qualifier: qualifier.map(str::to_string),
        })
    }

    pub fn super_expr(&mut self, qualifier: Option<&str>) -> NodeId {
        self.alloc(Node::Super {
            qualifier: qualifier.map(str::to_string),
        })
    }

    pub fn array_access(&mut self, array: NodeId, index: NodeId) -> NodeId {
        self.alloc(Node::ArrayAccess { array, index })
    }

    pub fn new_array(&mut self, element: TypeRef, dims: Vec<Option<NodeId>>) -> NodeId {
        self.alloc(Node::ArrayCreation {
            element,
            dims,
            init: None,
        })
    }

    pub fn array_init(&mut self, values: Vec<NodeId>) -> NodeId {
        self.alloc(Node::ArrayInit { values })
    }

    pub fn param(&mut self, name: &str, ty: TypeRef) -> NodeId {
        self.alloc(Node::Parameter {
            name: name.to_string(),
            ty,
            is_varargs: false,
        })
    }

    /// Parameter of an implicitly typed lambda.
    pub fn lambda_param(&mut self, name: &str) -> NodeId {
        self.param(name, TypeRef::Unknown)
    }

    pub fn lambda(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(Node::Lambda { params, body })
    }

    pub fn method_ref(&mut self, scope: NodeId, name: &str) -> NodeId {
        self.alloc(Node::MethodRef {
            scope,
            name: name.to_string(),
        })
    }

    pub fn declarator(&mut self, name: &str, ty: TypeRef, init: Option<NodeId>) -> NodeId {
        self.alloc(Node::VariableDeclarator {
            name: name.to_string(),
            ty,
            extra_dims: 0,
            init,
        })
    }

    pub fn var_decl(&mut self, variables: Vec<NodeId>) -> NodeId {
        self.alloc(Node::VarDeclExpr { variables })
    }

    pub fn field_decl(&mut self, variables: Vec<NodeId>) -> NodeId {
        self.alloc(Node::FieldDecl { variables })
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Block { stmts })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Node::ExprStmt { expr })
    }

    pub fn local_var_stmt(&mut self, decl: NodeId) -> NodeId {
        self.alloc(Node::LocalVarStmt { decl })
    }

    pub fn return_stmt(&mut self, expr: Option<NodeId>) -> NodeId {
        self.alloc(Node::Return { expr })
    }

    pub fn method_decl(&mut self, name: &str, params: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        self.alloc(Node::MethodDecl {
            name: name.to_string(),
            params,
            body,
        })
    }

    pub fn type_decl(&mut self, name: &str, kind: ClassKind, members: Vec<NodeId>) -> NodeId {
        self.alloc(Node::TypeDecl {
            name: name.to_string(),
            kind,
            members,
        })
    }
}
