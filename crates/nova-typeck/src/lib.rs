//! Static typing of Java expressions.
//!
//! [`TypeResolver::resolve`] computes the type of a single [`nova_hir`] node under the JLS
//! expression typing rules: numeric promotion, conditional classification, field access
//! disambiguation and lambda / method reference inference. Name lookup, overload resolution and
//! the conversion of syntactic type references are delegated to the services in
//! [`collaborators`], which the caller provides through a [`TypeckContext`].
//!
//! Resolution is synchronous and stateless; callers that resolve the same nodes repeatedly can
//! attach a [`TypeCache`].

mod cache;
pub mod collaborators;
mod conditional;
mod error;
mod field_access;
mod lambda;
mod resolver;

pub use cache::{CacheKey, TypeCache};
pub use collaborators::{
    GlobalTypeSolver, ScopeContext, SymbolSolver, TypeConversion, TypeckContext, Value,
};
pub use error::{Result, TypeckError};
pub use resolver::{ResolverOptions, TypeResolver};
