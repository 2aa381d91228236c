//! Tag name classification.
//!
//! Classifies a tag name into a retention family. Evaluation order is
//! first-match-wins: built-in protected pattern, explicit protected names,
//! custom families in the order supplied, pull-request builds, commit-SHA
//! builds, and finally [`Classification::Unknown`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::policy::RetentionPolicy;

/// Release-like names that are never deleted: branch heads, `latest`, and
/// semantic-version tokens (`1.2.3`, `v1.2.3`, `1.2`, `1`).
static PROTECTED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(latest|main|master|develop|\d+\.\d+\.\d+|v\d+\.\d+\.\d+|\d+\.\d+|\d+)$")
        .expect("built-in protected pattern is valid")
});

/// Pull-request build tags: `pr-<digits>`.
static PR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pr-\d+$").expect("built-in pr pattern is valid"));

/// Commit-SHA build tags: `<branch>-<hex, 7+ chars>`.
static SHA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(main|master|develop)-[a-f0-9]{7,}$").expect("built-in sha pattern is valid")
});

/// The retention family a tag name belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Release-like tag, never deleted.
    Protected,

    /// Pull-request build tag.
    PullRequest,

    /// Commit-SHA build tag.
    CommitSha,

    /// Matched a user-supplied family; carries the pattern string.
    Custom(String),

    /// Unrecognized naming convention.
    Unknown,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protected => write!(f, "protected"),
            Self::PullRequest => write!(f, "pr"),
            Self::CommitSha => write!(f, "sha"),
            Self::Custom(pattern) => write!(f, "custom:{pattern}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifies a tag name against a retention policy.
///
/// Pure function over compiled patterns: no side effects, deterministic
/// for a given (name, policy) pair.
///
/// # Examples
///
/// ```
/// use katharos_core::{classify, Classification, RetentionPolicy};
///
/// let policy = RetentionPolicy::new();
/// assert_eq!(classify("latest", &policy), Classification::Protected);
/// assert_eq!(classify("pr-42", &policy), Classification::PullRequest);
/// assert_eq!(classify("mystery-tag", &policy), Classification::Unknown);
/// ```
#[must_use]
pub fn classify(tag_name: &str, policy: &RetentionPolicy) -> Classification {
    if PROTECTED_PATTERN.is_match(tag_name) {
        return Classification::Protected;
    }

    if policy.protected_names.contains(tag_name) {
        return Classification::Protected;
    }

    for pattern in policy.custom_patterns() {
        if pattern.is_match(tag_name) {
            return Classification::Custom(pattern.pattern().to_string());
        }
    }

    if PR_PATTERN.is_match(tag_name) {
        return Classification::PullRequest;
    }

    if SHA_PATTERN.is_match(tag_name) {
        return Classification::CommitSha;
    }

    Classification::Unknown
}
