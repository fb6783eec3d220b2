//! Expression-level intermediate representation (HIR) for Java.
//!
//! A [`SyntaxTree`] is an arena of [`Node`]s with parent links. It carries just enough structure
//! to type expressions: declarators, the handful of statements that lambda bodies need and every
//! expression kind. Type references stay syntactic ([`TypeRef`]) until a resolver converts them.

mod build;
mod hir;
mod text;

pub use hir::{
    AssignOp, BinaryOp, BinaryOpKind, LiteralKind, Node, NodeId, SyntaxTree, TypeRef, UnaryOp,
    WildcardRef,
};
