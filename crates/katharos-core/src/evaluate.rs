//! Retention evaluation.
//!
//! Turns a classification plus a last-modified instant into a keep/delete
//! [`Decision`]. Evaluation is pure: the same (tag, timestamp, policy, now)
//! inputs always yield the same decision.

use chrono::{DateTime, Duration, Utc};

use crate::classify::Classification;
use crate::policy::RetentionPolicy;

/// What the processor should do with a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    /// Leave the tag in place.
    Keep,

    /// Delete the tag from the repository.
    Delete,
}

/// Why a decision was made; one reason per retention family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Release-like tag, exempt from retention.
    Protected,

    /// Matched a user-supplied family.
    Custom,

    /// Pull-request retention window applied.
    PullRequest,

    /// Commit-SHA retention window applied.
    CommitSha,

    /// Naming convention not recognized; kept as a fail-safe.
    Unknown,
}

impl DecisionReason {
    /// Short reason token used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Custom => "custom",
            Self::PullRequest => "pr",
            Self::CommitSha => "sha",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of evaluating one tag against the retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Name of the evaluated tag.
    pub tag_name: String,

    /// The family the tag was classified into.
    pub classification: Classification,

    /// Keep or delete.
    pub action: TagAction,

    /// Why.
    pub reason: DecisionReason,
}

impl Decision {
    /// Returns true if the tag is due for deletion.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self.action, TagAction::Delete)
    }
}

/// Evaluates a classified tag against the policy's retention windows.
///
/// Protected and unknown tags are always kept. Ephemeral families are
/// deleted once their last-modified instant falls before `now` minus the
/// family's retention window. A custom family whose pattern is no longer
/// present in the policy is kept; classification and evaluation always run
/// against the same policy, so that case cannot arise in normal operation.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use katharos_core::{classify, evaluate, RetentionPolicy, TagAction};
///
/// let policy = RetentionPolicy::new();
/// let now = Utc::now();
/// let classification = classify("pr-42", &policy);
/// let decision = evaluate("pr-42", classification, now - Duration::days(40), now, &policy);
/// assert_eq!(decision.action, TagAction::Delete);
/// ```
#[must_use]
pub fn evaluate(
    tag_name: &str,
    classification: Classification,
    last_modified: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> Decision {
    let (action, reason) = match &classification {
        Classification::Protected => (TagAction::Keep, DecisionReason::Protected),
        Classification::Custom(pattern) => policy.custom_retention_days(pattern).map_or(
            (TagAction::Keep, DecisionReason::Custom),
            |days| (age_action(last_modified, now, days), DecisionReason::Custom),
        ),
        Classification::PullRequest => (
            age_action(last_modified, now, policy.pr_retention_days),
            DecisionReason::PullRequest,
        ),
        Classification::CommitSha => (
            age_action(last_modified, now, policy.sha_retention_days),
            DecisionReason::CommitSha,
        ),
        Classification::Unknown => (TagAction::Keep, DecisionReason::Unknown),
    };

    Decision {
        tag_name: tag_name.to_string(),
        classification,
        action,
        reason,
    }
}

/// Delete iff the tag is strictly older than the retention window.
fn age_action(last_modified: DateTime<Utc>, now: DateTime<Utc>, retention_days: i64) -> TagAction {
    if last_modified < now - Duration::days(retention_days) {
        TagAction::Delete
    } else {
        TagAction::Keep
    }
}
