//! Clean command implementation.
//!
//! Builds the retention policy from arguments and environment, validates
//! credentials, drives the processing loop over every repository, and
//! reports the outcome.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use katharos_core::{
    RepositoryName, RetentionPolicy, RunSummary, DEFAULT_PR_RETENTION_DAYS,
    DEFAULT_SHA_RETENTION_DAYS,
};
use katharos_registry::{HubClient, HubConfig};

/// Full success.
pub const EXIT_SUCCESS: i32 = 0;

/// One or more repositories had failed deletions or failed outright.
pub const EXIT_PARTIAL_FAILURE: i32 = 1;

/// Configuration or authentication error; no repository was touched.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Repositories to clean ('repository' or 'namespace/repository')
    #[arg(short, long, num_args = 1.., required = true)]
    pub repositories: Vec<String>,

    /// Docker Hub username
    #[arg(long, env = "DOCKERHUB_USERNAME")]
    pub username: String,

    /// Docker Hub password or personal access token
    #[arg(long, env = "DOCKERHUB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Default namespace for unqualified repository names
    #[arg(long, env = "DOCKER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Days to keep pull-request tags
    #[arg(long, default_value_t = DEFAULT_PR_RETENTION_DAYS)]
    pub pr_retention: i64,

    /// Days to keep commit-SHA tags
    #[arg(long, default_value_t = DEFAULT_SHA_RETENTION_DAYS)]
    pub sha_retention: i64,

    /// Additional tags to protect from deletion
    #[arg(long, num_args = 0..)]
    pub protected_tags: Vec<String>,

    /// JSON object mapping custom patterns to retention days
    #[arg(long)]
    pub custom_patterns: Option<String>,

    /// Preview deletions without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON on stdout
    #[arg(long)]
    pub output_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs the clean command, returning the process exit code.
///
/// # Errors
///
/// Returns an error only for configuration and authentication problems,
/// which the caller maps to [`EXIT_CONFIG_ERROR`]. Per-repository and
/// per-tag failures are recorded in the summary instead.
pub async fn run(args: CleanArgs) -> Result<i32> {
    let policy = build_policy(&args)?;

    let default_namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| args.username.clone());
    let repositories = resolve_repositories(&args.repositories, &default_namespace)?;

    let config = HubConfig::new(&args.username, &args.password).with_dry_run(args.dry_run);
    let client = HubClient::new(config).context("Failed to create registry client")?;

    client
        .authenticate()
        .await
        .context("Authentication failed - check DOCKERHUB_USERNAME and DOCKERHUB_PASSWORD")?;

    let summary = katharos_core::run(&client, &repositories, &policy, Utc::now()).await;

    if args.output_json {
        // Clean JSON on stdout for the surrounding automation to parse.
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary, args.dry_run);
    }

    Ok(exit_code(&summary))
}

/// Builds the retention policy from arguments and the environment.
fn build_policy(args: &CleanArgs) -> Result<RetentionPolicy> {
    let protected = merge_protected_tags(
        &args.protected_tags,
        std::env::var("PROTECTED_TAGS").ok().as_deref(),
    );

    let mut policy = RetentionPolicy::new()
        .with_pr_retention_days(args.pr_retention)
        .with_sha_retention_days(args.sha_retention)
        .with_protected_names(protected);

    if let Some(ref raw) = args.custom_patterns {
        let patterns = parse_custom_patterns(raw)?;
        policy = policy
            .with_custom_patterns(patterns)
            .context("Invalid custom pattern")?;
    }

    Ok(policy)
}

/// Combines protected tags from flags with the comma-separated
/// `PROTECTED_TAGS` environment variable.
fn merge_protected_tags(flags: &[String], env_value: Option<&str>) -> Vec<String> {
    let mut tags: Vec<String> = flags.to_vec();
    if let Some(raw) = env_value {
        tags.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        );
    }
    tags
}

/// Parses the custom-pattern JSON object, preserving key order so that
/// first-match-wins classification follows the order supplied.
fn parse_custom_patterns(raw: &str) -> Result<Vec<(String, i64)>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(raw).context("Invalid JSON for custom patterns")?;

    map.into_iter()
        .map(|(pattern, value)| {
            let days = value.as_i64().with_context(|| {
                format!("Retention for pattern '{pattern}' must be a whole number of days")
            })?;
            Ok((pattern, days))
        })
        .collect()
}

/// Resolves repository specifications against the default namespace.
fn resolve_repositories(specs: &[String], default_namespace: &str) -> Result<Vec<RepositoryName>> {
    specs
        .iter()
        .map(|spec| {
            RepositoryName::parse(spec, Some(default_namespace))
                .with_context(|| format!("Invalid repository '{spec}'"))
        })
        .collect()
}

/// Derives the process exit code from the aggregated counters.
fn exit_code(summary: &RunSummary) -> i32 {
    if summary.has_failures() {
        EXIT_PARTIAL_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

/// Prints the human-readable summary to stderr.
fn print_summary(summary: &RunSummary, dry_run: bool) {
    eprintln!();
    eprintln!("============================================================");
    eprintln!("CLEANUP COMPLETE");
    eprintln!("============================================================");

    if dry_run {
        eprintln!("This was a dry run - no tags were deleted");
    }

    eprintln!();
    eprintln!("Overall statistics:");
    eprintln!("  Repositories processed: {}", summary.repositories.len());
    eprintln!("  Tags identified: {}", summary.identified_count);
    eprintln!("  Tags deleted: {}", summary.deleted_count);
    eprintln!("  Tags kept: {}", summary.total_kept());
    eprintln!("  Tags protected: {}", summary.protected_count);

    let failed = summary.total_failed();
    if failed > 0 {
        eprintln!("  Tags failed to delete: {failed}");
    }

    let failed_repositories = summary.failed_repositories();
    if !failed_repositories.is_empty() {
        eprintln!();
        eprintln!("Failed repositories:");
        for repository in failed_repositories {
            eprintln!("  - {repository}");
        }
    }

    if dry_run && summary.identified_count > 0 {
        eprintln!();
        eprintln!(
            "To delete these {} tags, run again without --dry-run",
            summary.identified_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katharos_core::RepositoryStats;

    #[test]
    fn test_parse_custom_patterns_preserves_order() {
        let raw = r#"{"^zz-\\d+$": 7, "^aa-\\d+$": 14}"#;
        let patterns = parse_custom_patterns(raw).unwrap();
        assert_eq!(
            patterns,
            vec![
                (r"^zz-\d+$".to_string(), 7),
                (r"^aa-\d+$".to_string(), 14),
            ]
        );
    }

    #[test]
    fn test_parse_custom_patterns_rejects_bad_json() {
        assert!(parse_custom_patterns("not json").is_err());
        assert!(parse_custom_patterns(r#"{"^x$": "seven"}"#).is_err());
    }

    #[test]
    fn test_merge_protected_tags() {
        let flags = vec!["stable".to_string()];
        let merged = merge_protected_tags(&flags, Some("golden, canary,,"));
        assert_eq!(merged, vec!["stable", "golden", "canary"]);
    }

    #[test]
    fn test_merge_protected_tags_without_env() {
        let merged = merge_protected_tags(&[], None);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_resolve_repositories() {
        let specs = vec!["web".to_string(), "other/api".to_string()];
        let repositories = resolve_repositories(&specs, "acme").unwrap();
        assert_eq!(repositories[0].to_string(), "acme/web");
        assert_eq!(repositories[1].to_string(), "other/api");
    }

    #[test]
    fn test_resolve_repositories_rejects_bad_spec() {
        let specs = vec!["a/b/c".to_string()];
        assert!(resolve_repositories(&specs, "acme").is_err());
    }

    #[test]
    fn test_exit_code_success() {
        let summary = RunSummary::aggregate([RepositoryStats::new("acme/web")]);
        assert_eq!(exit_code(&summary), EXIT_SUCCESS);
    }

    #[test]
    fn test_exit_code_failed_deletions() {
        let mut stats = RepositoryStats::new("acme/web");
        stats.failed = 2;
        let summary = RunSummary::aggregate([stats]);
        assert_eq!(exit_code(&summary), EXIT_PARTIAL_FAILURE);
    }

    #[test]
    fn test_exit_code_listing_failure() {
        let summary = RunSummary::aggregate([RepositoryStats::failure("acme/web")]);
        assert_eq!(exit_code(&summary), EXIT_PARTIAL_FAILURE);
    }

    #[test]
    fn test_build_policy_with_custom_patterns() {
        let args = CleanArgs {
            repositories: vec!["web".to_string()],
            username: "acme".to_string(),
            password: "hunter2".to_string(),
            namespace: None,
            pr_retention: 10,
            sha_retention: 5,
            protected_tags: vec!["stable".to_string()],
            custom_patterns: Some(r#"{"^nightly-\\d+$": 7}"#.to_string()),
            dry_run: true,
            output_json: false,
            verbose: false,
        };

        let policy = build_policy(&args).unwrap();
        assert_eq!(policy.pr_retention_days, 10);
        assert_eq!(policy.sha_retention_days, 5);
        assert!(policy.protected_names.contains("stable"));
        assert_eq!(policy.custom_retention_days(r"^nightly-\d+$"), Some(7));
    }

    #[test]
    fn test_build_policy_rejects_invalid_pattern() {
        let args = CleanArgs {
            repositories: vec!["web".to_string()],
            username: "acme".to_string(),
            password: "hunter2".to_string(),
            namespace: None,
            pr_retention: DEFAULT_PR_RETENTION_DAYS,
            sha_retention: DEFAULT_SHA_RETENTION_DAYS,
            protected_tags: Vec::new(),
            custom_patterns: Some(r#"{"broken(": 7}"#.to_string()),
            dry_run: false,
            output_json: false,
            verbose: false,
        };

        assert!(build_policy(&args).is_err());
    }
}
