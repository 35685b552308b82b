//! Dashboard records carried by channel-tagged broadcasts.
//!
//! These mirror the shapes the surrounding CRUD/aggregation layer produces:
//! a single finished test run, and the periodically recomputed metrics
//! summary. Both serialize camelCase to match the dashboard wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RepositoryId;

/// Outcome of a single test run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The test completed and its assertions held.
    Passed,
    /// The test completed with failing assertions.
    Failed,
    /// The test was not executed.
    Skipped,
    /// The test aborted before producing a verdict.
    Error,
}

/// A finished test run, as reported by the test-execution layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Repository the test belongs to.
    pub repository_id: RepositoryId,
    /// Fully qualified test name.
    pub test_name: String,
    /// Run outcome.
    pub status: TestStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Failure detail, present for failed/errored runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Commit the run executed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    /// Branch the run executed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// CI job or user that triggered the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_by: Option<String>,
    /// When the run finished.
    pub executed_at: DateTime<Utc>,
}

/// Aggregated dashboard metrics, recomputed periodically by the
/// (out-of-scope) aggregation service and broadcast on the `metrics` channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// When the snapshot was computed.
    pub timestamp: DateTime<Utc>,
    /// Number of tracked repositories.
    pub total_repositories: u64,
    /// Total recorded test runs.
    pub total_tests: u64,
    /// Runs with status `passed`.
    pub tests_passed: u64,
    /// Runs with status `failed`.
    pub tests_failed: u64,
    /// Percentage of passed runs over all runs, 0–100.
    pub pass_rate: f64,
    /// Mean run duration in milliseconds.
    pub average_duration_ms: f64,
}
