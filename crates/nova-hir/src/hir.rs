use std::fmt;

use nova_types::{BinaryOperator, ClassKind, PrimitiveType};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A syntactic type reference, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    /// `name` is a single identifier; qualification lives in `scope` (`java.util.List` is
    /// `List` scoped by `util` scoped by `java`).
    Class {
        scope: Option<Box<TypeRef>>,
        name: String,
        args: Vec<TypeRef>,
    },
    Array(Box<TypeRef>),
    Wildcard(WildcardRef),
    Void,
    /// `var` in a local variable declaration.
    Var,
    /// The missing type of an implicitly typed lambda parameter.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardRef {
    Unbounded,
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

impl TypeRef {
    /// Simple or dotted class reference without type arguments.
    #[must_use]
    pub fn named(path: &str) -> Self {
        let mut out: Option<TypeRef> = None;
        for segment in path.split('.') {
            out = Some(TypeRef::Class {
                scope: out.map(Box::new),
                name: segment.to_string(),
                args: Vec::new(),
            });
        }
        out.unwrap_or(TypeRef::Unknown)
    }

    #[must_use]
    pub fn generic(path: &str, args: Vec<TypeRef>) -> Self {
        match TypeRef::named(path) {
            TypeRef::Class { scope, name, .. } => TypeRef::Class { scope, name, args },
            other => other,
        }
    }

    #[must_use]
    pub fn array_of(component: TypeRef, dims: usize) -> Self {
        (0..dims).fold(component, |ty, _| TypeRef::Array(Box::new(ty)))
    }

    /// Dotted name of a class reference (`java.util.List`), ignoring type arguments.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            TypeRef::Class { scope, name, .. } => match scope {
                Some(scope) => Some(format!("{}.{name}", scope.qualified_name()?)),
                None => Some(name.clone()),
            },
            _ => None,
        }
    }

    /// A single identifier, without scope or type arguments.
    #[must_use]
    pub fn is_simple_name(&self) -> bool {
        matches!(self, TypeRef::Class { scope: None, args, .. } if args.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BinOr,
    BinAnd,
    Xor,
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 19] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::BinOr,
        BinaryOp::BinAnd,
        BinaryOp::Xor,
        BinaryOp::Equals,
        BinaryOp::NotEquals,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::LessEquals,
        BinaryOp::GreaterEquals,
        BinaryOp::LeftShift,
        BinaryOp::SignedRightShift,
        BinaryOp::UnsignedRightShift,
        BinaryOp::Plus,
        BinaryOp::Minus,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Remainder,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BinOr => "|",
            BinaryOp::BinAnd => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEquals => "<=",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::LeftShift => "<<",
            BinaryOp::SignedRightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        }
    }

    /// How the result type of the operator is determined.
    #[must_use]
    pub fn kind(self) -> BinaryOpKind {
        match self {
            BinaryOp::Plus => BinaryOpKind::Arithmetic(BinaryOperator::Plus),
            BinaryOp::Minus => BinaryOpKind::Arithmetic(BinaryOperator::Minus),
            BinaryOp::Multiply => BinaryOpKind::Arithmetic(BinaryOperator::Multiply),
            BinaryOp::Divide => BinaryOpKind::Arithmetic(BinaryOperator::Divide),
            BinaryOp::Remainder => BinaryOpKind::Arithmetic(BinaryOperator::Remainder),
            BinaryOp::BinAnd => BinaryOpKind::Arithmetic(BinaryOperator::BinaryAnd),
            BinaryOp::BinOr => BinaryOpKind::Arithmetic(BinaryOperator::BinaryOr),
            BinaryOp::Xor => BinaryOpKind::Arithmetic(BinaryOperator::Xor),
            BinaryOp::Or
            | BinaryOp::And
            | BinaryOp::Equals
            | BinaryOp::NotEquals
            | BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEquals
            | BinaryOp::GreaterEquals => BinaryOpKind::Boolean,
            BinaryOp::LeftShift | BinaryOp::SignedRightShift | BinaryOp::UnsignedRightShift => {
                BinaryOpKind::Shift
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOpKind {
    /// Operand-dependent, as understood by `nova_types::binary_operation_type`.
    Arithmetic(BinaryOperator),
    /// Relational, equality and conditional-logical operators.
    Boolean,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
    BitwiseComplement,
    LogicalComplement,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::PrefixIncrement | UnaryOp::PostfixIncrement => "++",
            UnaryOp::PrefixDecrement | UnaryOp::PostfixDecrement => "--",
            UnaryOp::BitwiseComplement => "~",
            UnaryOp::LogicalComplement => "!",
        }
    }

    #[must_use]
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostfixIncrement | UnaryOp::PostfixDecrement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    BinAnd,
    BinOr,
    Xor,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
}

impl AssignOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Plus => "+=",
            AssignOp::Minus => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
            AssignOp::Remainder => "%=",
            AssignOp::BinAnd => "&=",
            AssignOp::BinOr => "|=",
            AssignOp::Xor => "^=",
            AssignOp::LeftShift => "<<=",
            AssignOp::SignedRightShift => ">>=",
            AssignOp::UnsignedRightShift => ">>>=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Char,
    /// Floating point; the source text keeps its `f`/`d` suffix.
    Double,
    String,
    TextBlock,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    // Declarations.
    TypeDecl {
        name: String,
        kind: ClassKind,
        members: Vec<NodeId>,
    },
    MethodDecl {
        name: String,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    FieldDecl {
        variables: Vec<NodeId>,
    },
    VariableDeclarator {
        name: String,
        ty: TypeRef,
        /// `int x[]` style dimensions written after the name.
        extra_dims: usize,
        init: Option<NodeId>,
    },
    Parameter {
        name: String,
        ty: TypeRef,
        is_varargs: bool,
    },

    // Statements.
    Block {
        stmts: Vec<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    Return {
        expr: Option<NodeId>,
    },
    LocalVarStmt {
        decl: NodeId,
    },

    // Expressions.
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    ArrayCreation {
        element: TypeRef,
        /// One entry per `[]`; `None` for dimensions without a size expression.
        dims: Vec<Option<NodeId>>,
        init: Option<NodeId>,
    },
    ArrayInit {
        values: Vec<NodeId>,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Cast {
        ty: TypeRef,
        expr: NodeId,
    },
    ClassLit {
        ty: TypeRef,
    },
    Conditional {
        condition: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Enclosed {
        inner: NodeId,
    },
    FieldAccess {
        scope: NodeId,
        name: String,
    },
    InstanceOf {
        expr: NodeId,
        ty: TypeRef,
    },
    Literal {
        kind: LiteralKind,
        text: String,
    },
    MethodCall {
        scope: Option<NodeId>,
        name: String,
        args: Vec<NodeId>,
    },
    Name {
        name: String,
    },
    TypeExpr {
        ty: TypeRef,
    },
    ObjectCreation {
        ty: TypeRef,
        args: Vec<NodeId>,
        /// Members of an anonymous class body.
        body: Option<Vec<NodeId>>,
    },
    This {
        qualifier: Option<String>,
    },
    Super {
        qualifier: Option<String>,
    },
    Unary {
        op: UnaryOp,
        expr: NodeId,
    },
    Lambda {
        params: Vec<NodeId>,
        /// Either an expression or a `Block`.
        body: NodeId,
    },
    MethodRef {
        scope: NodeId,
        name: String,
    },
    VarDeclExpr {
        variables: Vec<NodeId>,
    },
}

impl Node {
    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::TypeDecl { members, .. } => members.clone(),
            Node::MethodDecl { params, body, .. } => {
                params.iter().copied().chain(body.iter().copied()).collect()
            }
            Node::FieldDecl { variables } | Node::VarDeclExpr { variables } => variables.clone(),
            Node::VariableDeclarator { init, .. } => init.iter().copied().collect(),
            Node::Block { stmts } => stmts.clone(),
            Node::ExprStmt { expr } | Node::Cast { expr, .. } | Node::InstanceOf { expr, .. } => {
                vec![*expr]
            }
            Node::Return { expr } => expr.iter().copied().collect(),
            Node::LocalVarStmt { decl } => vec![*decl],
            Node::ArrayAccess { array, index } => vec![*array, *index],
            Node::ArrayCreation { dims, init, .. } => dims
                .iter()
                .flatten()
                .copied()
                .chain(init.iter().copied())
                .collect(),
            Node::ArrayInit { values } => values.clone(),
            Node::Assign { target, value, .. } => vec![*target, *value],
            Node::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Node::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![*condition, *then_expr, *else_expr],
            Node::Enclosed { inner } => vec![*inner],
            Node::FieldAccess { scope, .. } | Node::MethodRef { scope, .. } => vec![*scope],
            Node::MethodCall { scope, args, .. } => {
                scope.iter().copied().chain(args.iter().copied()).collect()
            }
            Node::ObjectCreation { args, body, .. } => args
                .iter()
                .copied()
                .chain(body.iter().flatten().copied())
                .collect(),
            Node::Unary { expr, .. } => vec![*expr],
            Node::Lambda { params, body } => {
                params.iter().copied().chain(std::iter::once(*body)).collect()
            }
            Node::Parameter { .. }
            | Node::ClassLit { .. }
            | Node::Literal { .. }
            | Node::Name { .. }
            | Node::TypeExpr { .. }
            | Node::This { .. }
            | Node::Super { .. } => Vec::new(),
        }
    }

    /// Java-ish name of the node kind, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::TypeDecl { .. } => "type declaration",
            Node::MethodDecl { .. } => "method declaration",
            Node::FieldDecl { .. } => "field declaration",
            Node::VariableDeclarator { .. } => "variable declarator",
            Node::Parameter { .. } => "parameter",
            Node::Block { .. } => "block",
            Node::ExprStmt { .. } => "expression statement",
            Node::Return { .. } => "return statement",
            Node::LocalVarStmt { .. } => "local variable statement",
            Node::ArrayAccess { .. } => "array access",
            Node::ArrayCreation { .. } => "array creation",
            Node::ArrayInit { .. } => "array initializer",
            Node::Assign { .. } => "assignment",
            Node::Binary { .. } => "binary expression",
            Node::Cast { .. } => "cast",
            Node::ClassLit { .. } => "class literal",
            Node::Conditional { .. } => "conditional expression",
            Node::Enclosed { .. } => "parenthesized expression",
            Node::FieldAccess { .. } => "field access",
            Node::InstanceOf { .. } => "instanceof",
            Node::Literal { .. } => "literal",
            Node::MethodCall { .. } => "method call",
            Node::Name { .. } => "name",
            Node::TypeExpr { .. } => "type expression",
            Node::ObjectCreation { .. } => "object creation",
            Node::This { .. } => "this",
            Node::Super { .. } => "super",
            Node::Unary { .. } => "unary expression",
            Node::Lambda { .. } => "lambda",
            Node::MethodRef { .. } => "method reference",
            Node::VarDeclExpr { .. } => "variable declaration expression",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    node: Node,
    parent: Option<NodeId>,
}

/// Arena-backed syntax tree with parent links.
///
/// Nodes are allocated bottom-up: a node's children must exist before it does, and allocating a
/// node makes it the parent of each of its children. The tree is read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        for child in node.children() {
            let slot = &mut self.nodes[child.idx()].parent;
            debug_assert!(slot.is_none(), "{child:?} already has a parent");
            *slot = Some(id);
        }
        self.nodes.push(NodeData { node, parent: None });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx()).map(|data| &data.node)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.idx())?.parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(Node::children).unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Position of `node` among the arguments of its parent call or object creation.
    #[must_use]
    pub fn arg_position(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        match &self[parent] {
            Node::MethodCall { args, .. } | Node::ObjectCreation { args, .. } => {
                args.iter().position(|arg| *arg == node)
            }
            _ => None,
        }
    }

    /// Innermost type declaration or anonymous class body around `node`.
    ///
    /// With `name`, only type declarations with that simple name match. A node inside the
    /// arguments of an object creation is not inside its anonymous body.
    #[must_use]
    pub fn enclosing_type(&self, node: NodeId, name: Option<&str>) -> Option<NodeId> {
        let mut child = node;
        for ancestor in self.ancestors(node) {
            match &self[ancestor] {
                Node::TypeDecl { name: decl, .. } if name.map_or(true, |n| decl.as_str() == n) => {
                    return Some(ancestor);
                }
                Node::ObjectCreation {
                    body: Some(members),
                    ..
                } if name.is_none() && members.contains(&child) => return Some(ancestor),
                _ => {}
            }
            child = ancestor;
        }
        None
    }

    /// `return` statements of a block in source order, not descending into nested lambdas or
    /// class bodies.
    #[must_use]
    pub fn return_statements(&self, block: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![block];
        while let Some(current) = stack.pop() {
            match &self[current] {
                Node::Return { .. } => out.push(current),
                Node::Lambda { .. } | Node::TypeDecl { .. } => continue,
                Node::ObjectCreation { args, .. } => stack.extend(args.iter().rev().copied()),
                node => stack.extend(node.children().into_iter().rev()),
            }
        }
        out
    }
}

impl std::ops::Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.idx()].node
    }
}
