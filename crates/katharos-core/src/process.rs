//! Repository processing.
//!
//! Drives classification and evaluation over a repository's tag list,
//! invokes the deletion collaborator for tags whose retention window has
//! lapsed, and tallies the outcome. Repositories are processed one at a
//! time; a failure in one never aborts the rest of the run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::classify::{classify, Classification};
use crate::error::Result;
use crate::evaluate::evaluate;
use crate::policy::RetentionPolicy;
use crate::repository::RepositoryName;
use crate::stats::{RepositoryStats, RunSummary};
use crate::tag::Tag;

/// Result of a delete call, from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The tag was removed.
    Deleted,

    /// The tag was already gone. Deletion is idempotent, so this counts
    /// as success.
    NotFound,

    /// Dry-run mode: nothing was removed.
    DryRun,
}

/// The listing and deletion backend the processor drives.
///
/// Implementations own all network concerns (authentication, pagination,
/// retries, timeouts) and surface only final results. The processor holds
/// no I/O state of its own, which keeps it testable against an in-memory
/// implementation.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Lists all tags for a repository, with best-effort last-modified
    /// values. An empty list is a valid result, not an error.
    async fn list_tags(&self, repository: &RepositoryName) -> Result<Vec<Tag>>;

    /// Deletes one tag from a repository.
    async fn delete_tag(&self, repository: &RepositoryName, tag_name: &str)
        -> Result<DeleteOutcome>;
}

/// Classifies, evaluates, and routes an already-listed tag set.
///
/// Tags with a malformed (present but unparsable) last-modified value are
/// kept and counted, never identified or failed.
pub async fn process_tags(
    registry: &dyn TagRegistry,
    repository: &RepositoryName,
    tags: Vec<Tag>,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RepositoryStats {
    let mut stats = RepositoryStats::new(repository.to_string());
    stats.total_tags = tags.len() as u64;

    for tag in tags {
        let last_modified = match tag.last_modified(now) {
            Ok(instant) => instant,
            Err(error) => {
                tracing::warn!(
                    repository = %repository,
                    tag = %tag.name,
                    error = %error,
                    "Keeping tag with unparsable last-modified value"
                );
                stats.kept += 1;
                continue;
            }
        };

        let classification = classify(&tag.name, policy);
        let decision = evaluate(&tag.name, classification, last_modified, now, policy);

        if decision.is_delete() {
            stats.identified += 1;
            match registry.delete_tag(repository, &tag.name).await {
                Ok(outcome) => {
                    stats.deleted += 1;
                    tracing::info!(
                        repository = %repository,
                        tag = %tag.name,
                        reason = %decision.reason,
                        outcome = ?outcome,
                        "Deleted tag"
                    );
                }
                Err(error) => {
                    stats.failed += 1;
                    tracing::warn!(
                        repository = %repository,
                        tag = %tag.name,
                        error = %error,
                        "Failed to delete tag"
                    );
                }
            }
        } else if matches!(decision.classification, Classification::Protected) {
            stats.protected += 1;
            tracing::debug!(repository = %repository, tag = %tag.name, "Protected tag");
        } else {
            stats.kept += 1;
            tracing::debug!(
                repository = %repository,
                tag = %tag.name,
                reason = %decision.reason,
                "Keeping tag"
            );
        }
    }

    tracing::info!(
        repository = %repository,
        total = stats.total_tags,
        protected = stats.protected,
        identified = stats.identified,
        deleted = stats.deleted,
        kept = stats.kept,
        failed = stats.failed,
        "Repository processed"
    );

    stats
}

/// Processes one repository end to end: list, classify, evaluate, delete.
///
/// A listing failure produces the whole-repository failure record instead
/// of an error, so callers can continue with the next repository.
pub async fn process(
    registry: &dyn TagRegistry,
    repository: &RepositoryName,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RepositoryStats {
    tracing::info!(repository = %repository, "Processing repository");

    match registry.list_tags(repository).await {
        Ok(tags) => {
            if tags.is_empty() {
                tracing::info!(repository = %repository, "No tags found");
            }
            process_tags(registry, repository, tags, policy, now).await
        }
        Err(error) => {
            tracing::error!(
                repository = %repository,
                error = %error,
                "Failed to list tags, recording repository as failed"
            );
            RepositoryStats::failure(repository.to_string())
        }
    }
}

/// Processes every repository sequentially and aggregates the results.
pub async fn run(
    registry: &dyn TagRegistry,
    repositories: &[RepositoryName],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RunSummary {
    let mut summary = RunSummary::new();
    for repository in repositories {
        summary.push(process(registry, repository, policy, now).await);
    }
    summary
}
