//! Retention policy configuration.
//!
//! A [`RetentionPolicy`] is constructed once per run and read-only
//! thereafter. Custom patterns are kept as an explicitly ordered list so
//! that first-match-wins classification is structural rather than an
//! accident of map iteration order.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};

/// Default number of days pull-request tags are retained.
pub const DEFAULT_PR_RETENTION_DAYS: i64 = 30;

/// Default number of days commit-SHA tags are retained.
pub const DEFAULT_SHA_RETENTION_DAYS: i64 = 14;

/// A user-supplied tag family: a compiled pattern plus its retention window.
#[derive(Debug, Clone)]
pub struct CustomPattern {
    raw: String,
    regex: Regex,
    retention_days: i64,
}

impl CustomPattern {
    /// Compiles a custom pattern.
    ///
    /// Patterns are anchored at the start of the tag name; callers supply
    /// their own `$` if they want a full match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: impl Into<String>, retention_days: i64) -> Result<Self> {
        let raw = pattern.into();
        let regex =
            Regex::new(&format!(r"\A(?:{raw})")).map_err(|source| Error::InvalidPattern {
                pattern: raw.clone(),
                source,
            })?;
        Ok(Self {
            raw,
            regex,
            retention_days,
        })
    }

    /// Returns the pattern string as supplied.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Returns the retention window in days.
    #[must_use]
    pub const fn retention_days(&self) -> i64 {
        self.retention_days
    }

    /// Returns true if the tag name matches this family.
    #[must_use]
    pub fn is_match(&self, tag_name: &str) -> bool {
        self.regex.is_match(tag_name)
    }
}

/// Retention configuration for one cleanup run.
///
/// # Examples
///
/// ```
/// use katharos_core::RetentionPolicy;
///
/// let policy = RetentionPolicy::new()
///     .with_pr_retention_days(7)
///     .with_protected_names(["stable"])
///     .with_custom_pattern(r"^nightly-\d+$", 3)
///     .unwrap();
/// assert_eq!(policy.pr_retention_days, 7);
/// ```
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Tag names protected by exact match, beyond the built-in pattern.
    pub protected_names: HashSet<String>,

    /// Days to keep pull-request tags.
    pub pr_retention_days: i64,

    /// Days to keep commit-SHA tags.
    pub sha_retention_days: i64,

    custom_patterns: Vec<CustomPattern>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetentionPolicy {
    /// Creates a policy with default retention windows and no custom rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            protected_names: HashSet::new(),
            pr_retention_days: DEFAULT_PR_RETENTION_DAYS,
            sha_retention_days: DEFAULT_SHA_RETENTION_DAYS,
            custom_patterns: Vec::new(),
        }
    }

    /// Adds explicitly protected tag names.
    #[must_use]
    pub fn with_protected_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the pull-request retention window.
    #[must_use]
    pub const fn with_pr_retention_days(mut self, days: i64) -> Self {
        self.pr_retention_days = days;
        self
    }

    /// Sets the commit-SHA retention window.
    #[must_use]
    pub const fn with_sha_retention_days(mut self, days: i64) -> Self {
        self.sha_retention_days = days;
        self
    }

    /// Appends a custom pattern. Patterns match in the order added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn with_custom_pattern(mut self, pattern: impl Into<String>, retention_days: i64) -> Result<Self> {
        self.custom_patterns
            .push(CustomPattern::new(pattern, retention_days)?);
        Ok(self)
    }

    /// Appends custom patterns in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] on the first pattern that does not
    /// compile; no repository is touched in that case.
    pub fn with_custom_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        for (pattern, days) in patterns {
            self = self.with_custom_pattern(pattern, days)?;
        }
        Ok(self)
    }

    /// Returns the custom patterns in priority order.
    #[must_use]
    pub fn custom_patterns(&self) -> &[CustomPattern] {
        &self.custom_patterns
    }

    /// Returns the retention window for a custom family, if it exists.
    #[must_use]
    pub fn custom_retention_days(&self, pattern: &str) -> Option<i64> {
        self.custom_patterns
            .iter()
            .find(|p| p.pattern() == pattern)
            .map(CustomPattern::retention_days)
    }
}
