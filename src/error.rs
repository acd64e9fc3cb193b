use thiserror::Error;

/// Errors surfaced by [`Registry`](crate::Registry) operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Identifier '{id}' is not defined")]
    NotFound { id: String },

    /// Only factory, service, and computed definitions can be extended.
    #[error("Identifier '{id}' does not contain an object definition")]
    Container { id: String },

    #[error("Identifier '{id}' does not resolve to a value of type '{expected}'")]
    TypeMismatch { id: String, expected: &'static str },

    /// Failure raised by a resolver, passed through untouched.
    #[error(transparent)]
    Resolution(anyhow::Error),
}

impl Error {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Unwrap registry errors that travelled through a resolver's
    /// `anyhow::Error` so nested lookups keep their original kind.
    pub(crate) fn from_resolver(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(inner) => inner,
            Err(err) => Self::Resolution(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
