//! Java-specific helpers for Nova's semantic/type system.
//!
//! The module avoids pulling in higher-level IDE context (imports, scopes, syntax).
//! Everything here works purely on [`crate::Type`] values and a read-only [`crate::TypeEnv`].

pub mod format;
pub mod helpers;
pub mod inference;
pub mod promotion;
pub mod subtyping;
