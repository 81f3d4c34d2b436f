use serde::{Deserialize, Serialize};

use crate::checks::{CheckKind, CheckResult};
use crate::model::DatasetExpectations;

/// Metrics contract version for dataset validation.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable metrics for a dataset validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics_version: String,
    pub run_id: String,
    pub validated_at: String,
    pub dataset_dir: String,
    pub expectations: DatasetExpectations,
    pub files: Vec<FileMetrics>,
    pub checks: Vec<CheckMetrics>,
    pub summary: CheckSummary,
    pub performance: PerformanceMetrics,
}

/// Presence and size of one dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetrics {
    pub subject: String,
    pub file: String,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_found: Option<u64>,
    pub rows_expected: u64,
}

/// Outcome of one check without its violation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckMetrics {
    pub subject: String,
    pub check: CheckKind,
    pub passed: bool,
    pub violations: u64,
    pub detail: String,
}

impl From<&CheckResult> for CheckMetrics {
    fn from(result: &CheckResult) -> Self {
        Self {
            subject: result.subject.clone(),
            check: result.check,
            passed: result.passed,
            violations: result.violations.len() as u64,
            detail: result.detail.clone(),
        }
    }
}

/// Totals across all checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub checks: u64,
    pub passed: u64,
    pub failed: u64,
    pub violations: u64,
}

impl CheckSummary {
    pub fn from_checks(checks: &[CheckResult]) -> Self {
        let passed = checks.iter().filter(|check| check.passed).count() as u64;
        Self {
            checks: checks.len() as u64,
            passed,
            failed: checks.len() as u64 - passed,
            violations: checks.iter().map(|check| check.violations.len() as u64).sum(),
        }
    }
}

/// Performance timings for the validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub load_ms: u128,
    pub validate_ms: u128,
    pub total_ms: u128,
}
