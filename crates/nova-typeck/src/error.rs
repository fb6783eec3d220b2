use thiserror::Error;

pub type Result<T, E = TypeckError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeckError {
    /// A name, field or type could not be located. Fallback chains retry on this variant only.
    #[error("unresolved symbol `{name}`{}", in_context(.context))]
    UnresolvedSymbol {
        name: String,
        context: Option<String>,
    },
    /// The node, or the context it sits in, is not something expression typing models.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),
    /// The tree or declaration model breaks a structural assumption.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

fn in_context(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|c| format!(" in `{c}`"))
        .unwrap_or_default()
}

impl TypeckError {
    pub fn unresolved(name: impl Into<String>) -> Self {
        TypeckError::UnresolvedSymbol {
            name: name.into(),
            context: None,
        }
    }

    pub fn unresolved_in(name: impl Into<String>, context: impl Into<String>) -> Self {
        TypeckError::UnresolvedSymbol {
            name: name.into(),
            context: Some(context.into()),
        }
    }

    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, TypeckError::UnresolvedSymbol { .. })
    }
}
