//! Utilities shared by Nova tests.
//!
//! The main entry point is [`TypeckFixture`]: an in-memory declaration store plus a syntax tree,
//! with simple implementations of every service expression typing calls into. Tests build a
//! tree with the [`nova_hir::SyntaxTree`] constructors, register locals and class bindings on the
//! fixture and then ask it for the type of a node.
//!
//! ```ignore
//! let mut fx = TypeckFixture::new();
//! let one = fx.tree.int_lit(1);
//! let two = fx.tree.long_lit(2);
//! let sum = fx.tree.binary(BinaryOp::Plus, one, two);
//! assert_eq!(fx.describe(sum), "long");
//! ```

mod fixture;
mod services;

pub use fixture::TypeckFixture;
