//! Per-repository statistics and the run-wide summary.
//!
//! Every processed tag lands in exactly one of the protected, deleted,
//! kept, or failed buckets; the four buckets partition the repository's
//! tag set. A repository whose tags could not be listed at all is recorded
//! with the sentinel `failed = -1`.

use serde::{Deserialize, Serialize};

/// Sentinel `failed` value marking a repository that could not be
/// processed at all (listing failed before any tag was seen).
pub const REPOSITORY_FAILED: i64 = -1;

/// Counters for one processed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    /// Fully qualified repository name.
    pub repository: String,

    /// Number of tags the listing returned.
    pub total_tags: u64,

    /// Tags exempt from retention.
    pub protected: u64,

    /// Tags whose retention window had lapsed (deletion was attempted).
    pub identified: u64,

    /// Tags successfully deleted.
    pub deleted: u64,

    /// Tags kept (recent, unrecognized, or unparsable timestamp).
    pub kept: u64,

    /// Tags whose deletion failed, or [`REPOSITORY_FAILED`] when the
    /// repository could not be processed at all.
    pub failed: i64,
}

impl RepositoryStats {
    /// Creates zeroed counters for a repository.
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            total_tags: 0,
            protected: 0,
            identified: 0,
            deleted: 0,
            kept: 0,
            failed: 0,
        }
    }

    /// Creates the whole-repository failure record.
    #[must_use]
    pub fn failure(repository: impl Into<String>) -> Self {
        Self {
            failed: REPOSITORY_FAILED,
            ..Self::new(repository)
        }
    }

    /// Returns true if the repository could not be processed at all.
    #[must_use]
    pub const fn is_complete_failure(&self) -> bool {
        self.failed == REPOSITORY_FAILED
    }

    /// Returns true if anything went wrong in this repository: failed
    /// deletions or a whole-repository failure.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed != 0
    }

    /// Failed-deletion count, treating the sentinel as zero.
    #[must_use]
    pub const fn failed_deletions(&self) -> u64 {
        if self.failed > 0 {
            #[allow(clippy::cast_sign_loss)]
            {
                self.failed as u64
            }
        } else {
            0
        }
    }
}

/// Aggregate of all repositories processed in one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tags identified for deletion across all repositories.
    pub identified_count: u64,

    /// Tags deleted across all repositories.
    pub deleted_count: u64,

    /// Tags protected across all repositories.
    pub protected_count: u64,

    /// Per-repository results in processing order.
    pub repositories: Vec<RepositoryStats>,
}

impl RunSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one repository's counters into the summary.
    pub fn push(&mut self, stats: RepositoryStats) {
        self.identified_count += stats.identified;
        self.deleted_count += stats.deleted;
        self.protected_count += stats.protected;
        self.repositories.push(stats);
    }

    /// Builds a summary from per-repository results.
    ///
    /// The fold is a field-wise sum, so any processing order yields the
    /// same totals.
    ///
    /// # Examples
    ///
    /// ```
    /// use katharos_core::{RepositoryStats, RunSummary};
    ///
    /// let mut a = RepositoryStats::new("acme/web");
    /// a.deleted = 2;
    /// let mut b = RepositoryStats::new("acme/api");
    /// b.deleted = 3;
    ///
    /// let summary = RunSummary::aggregate([a, b]);
    /// assert_eq!(summary.deleted_count, 5);
    /// ```
    #[must_use]
    pub fn aggregate<I>(results: I) -> Self
    where
        I: IntoIterator<Item = RepositoryStats>,
    {
        let mut summary = Self::new();
        for stats in results {
            summary.push(stats);
        }
        summary
    }

    /// Total tags kept across all repositories.
    #[must_use]
    pub fn total_kept(&self) -> u64 {
        self.repositories.iter().map(|r| r.kept).sum()
    }

    /// Total failed deletions across all repositories, excluding the
    /// whole-repository failure sentinel.
    #[must_use]
    pub fn total_failed(&self) -> u64 {
        self.repositories
            .iter()
            .map(RepositoryStats::failed_deletions)
            .sum()
    }

    /// Names of repositories with failed deletions or a whole-repository
    /// failure.
    #[must_use]
    pub fn failed_repositories(&self) -> Vec<&str> {
        self.repositories
            .iter()
            .filter(|r| r.has_failures())
            .map(|r| r.repository.as_str())
            .collect()
    }

    /// Returns true if any repository had failures.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.repositories.iter().any(RepositoryStats::has_failures)
    }
}
