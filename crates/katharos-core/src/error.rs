//! Error types for Katharos core operations.
//!
//! This module defines the error types used throughout the `katharos-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Katharos core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A custom retention pattern failed to compile.
    #[error("Invalid retention pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern string as supplied.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A repository reference could not be parsed.
    #[error("Invalid repository format: {spec}. Use 'repository' or 'namespace/repository'")]
    InvalidRepository {
        /// The repository specification as supplied.
        spec: String,
    },

    /// An unqualified repository name was given without a default namespace.
    #[error("No namespace specified for repository '{repository}'")]
    MissingNamespace {
        /// The unqualified repository name.
        repository: String,
    },

    /// A last-modified value was present but could not be parsed.
    #[error("Unparsable last-modified value '{value}'")]
    MalformedTimestamp {
        /// The raw timestamp string.
        value: String,
    },

    /// A registry collaborator (listing or deletion backend) reported a failure.
    #[error("Registry operation failed: {message}")]
    Registry {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Creates a registry collaborator error from any displayable source.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_repository() {
        let err = Error::InvalidRepository {
            spec: "a/b/c".to_string(),
        };
        assert!(err.to_string().contains("a/b/c"));
    }

    #[test]
    fn test_error_display_malformed_timestamp() {
        let err = Error::MalformedTimestamp {
            value: "not-a-date".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unparsable last-modified value 'not-a-date'"
        );
    }

    #[test]
    fn test_registry_constructor() {
        let err = Error::registry("listing failed");
        assert!(matches!(err, Error::Registry { message } if message == "listing failed"));
    }
}
