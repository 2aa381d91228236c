//! # Katharos Core
//!
//! Tag classification and retention engine for the Katharos cleanup
//! platform.
//!
//! This crate holds the decision logic: which image tags are protected,
//! which belong to an ephemeral family (pull-request builds, commit-SHA
//! builds, user-supplied custom families), and which have outlived their
//! retention window. The processing loop drives that logic over tag lists
//! supplied by a [`TagRegistry`] collaborator; all network concerns live
//! behind that trait.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use katharos_core::{classify, evaluate, Classification, RetentionPolicy, TagAction};
//!
//! let policy = RetentionPolicy::new().with_protected_names(["stable"]);
//! let now = Utc::now();
//!
//! assert_eq!(classify("v1.2.3", &policy), Classification::Protected);
//!
//! let classification = classify("mystery-tag", &policy);
//! let decision = evaluate("mystery-tag", classification, now, now, &policy);
//! assert_eq!(decision.action, TagAction::Keep);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod error;
pub mod evaluate;
pub mod policy;
pub mod process;
pub mod repository;
pub mod stats;
pub mod tag;

#[cfg(test)]
mod proptest_tests;

pub use classify::{classify, Classification};
pub use error::{Error, Result};
pub use evaluate::{evaluate, Decision, DecisionReason, TagAction};
pub use policy::{CustomPattern, RetentionPolicy, DEFAULT_PR_RETENTION_DAYS, DEFAULT_SHA_RETENTION_DAYS};
pub use process::{process, process_tags, run, DeleteOutcome, TagRegistry};
pub use repository::RepositoryName;
pub use stats::{RepositoryStats, RunSummary, REPOSITORY_FAILED};
pub use tag::Tag;
