//! Repository references.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A fully qualified repository reference: namespace plus repository name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryName {
    namespace: String,
    repository: String,
}

impl RepositoryName {
    /// Creates a repository reference from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            repository: repository.into(),
        }
    }

    /// Parses a repository specification.
    ///
    /// Accepts `namespace/repository` or a bare `repository` name, which
    /// takes the default namespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use katharos_core::RepositoryName;
    ///
    /// let repo = RepositoryName::parse("acme/web", None).unwrap();
    /// assert_eq!(repo.to_string(), "acme/web");
    ///
    /// let repo = RepositoryName::parse("web", Some("acme")).unwrap();
    /// assert_eq!(repo.to_string(), "acme/web");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepository`] for specs with more than one
    /// slash, and [`Error::MissingNamespace`] for a bare name with no
    /// default namespace.
    pub fn parse(spec: &str, default_namespace: Option<&str>) -> Result<Self> {
        let parts: Vec<&str> = spec.split('/').collect();
        match parts.as_slice() {
            [namespace, repository] if !namespace.is_empty() && !repository.is_empty() => {
                Ok(Self::new(*namespace, *repository))
            }
            [repository] if !repository.is_empty() => default_namespace.map_or_else(
                || {
                    Err(Error::MissingNamespace {
                        repository: (*repository).to_string(),
                    })
                },
                |namespace| Ok(Self::new(namespace, *repository)),
            ),
            _ => Err(Error::InvalidRepository {
                spec: spec.to_string(),
            }),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the repository name without its namespace.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified() {
        let repo = RepositoryName::parse("acme/web", None).unwrap();
        assert_eq!(repo.namespace(), "acme");
        assert_eq!(repo.repository(), "web");
    }

    #[test]
    fn test_parse_bare_with_default_namespace() {
        let repo = RepositoryName::parse("web", Some("acme")).unwrap();
        assert_eq!(repo.to_string(), "acme/web");
    }

    #[test]
    fn test_parse_bare_without_namespace_fails() {
        let result = RepositoryName::parse("web", None);
        assert!(matches!(result, Err(Error::MissingNamespace { repository }) if repository == "web"));
    }

    #[test]
    fn test_parse_too_many_parts_fails() {
        let result = RepositoryName::parse("a/b/c", Some("acme"));
        assert!(matches!(result, Err(Error::InvalidRepository { .. })));
    }

    #[test]
    fn test_parse_empty_parts_fail() {
        assert!(RepositoryName::parse("", Some("acme")).is_err());
        assert!(RepositoryName::parse("/web", Some("acme")).is_err());
        assert!(RepositoryName::parse("acme/", Some("acme")).is_err());
    }
}
