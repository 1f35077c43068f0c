//! Domain error types.

use thiserror::Error;

/// Message carried by a generic lookup that matched nothing.
pub const NOT_FOUND: &str = "Not Found";

/// Message carried by an existence check that found a match.
pub const EXISTS: &str = "Exists";

/// Top-level domain error type.
///
/// `Display` yields the bare message so it can travel verbatim through every
/// layer up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A lookup by predicate or identity matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// An existence check or uniqueness constraint found a match.
    #[error("{0}")]
    Conflict(String),

    /// The storage engine rejected a read or write.
    #[error("{0}")]
    Persistence(String),

    /// A caller-supplied value failed shape constraints.
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    /// Generic not-found failure.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound(NOT_FOUND.to_owned())
    }

    /// Returns the human-readable message without the variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::Conflict(m) | Self::Persistence(m) | Self::Validation(m) => m,
        }
    }

    /// Returns `true` for `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
