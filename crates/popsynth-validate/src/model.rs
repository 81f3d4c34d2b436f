use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use popsynth_config::PopulationConfig;
use popsynth_core::SpatialBounds;

use crate::checks::CheckResult;
use crate::metrics::MetricsReport;

/// Options for dataset validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Fail when any check fails.
    pub strict: bool,
    /// Limit the number of violations listed in the report.
    pub max_examples: usize,
    /// Emit violations.json with the full list of violations.
    pub write_violations: bool,
    /// Optional output directory override; defaults to the dataset dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_examples: 20,
            write_violations: false,
            out_dir: None,
        }
    }
}

/// Structured violation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub path: String,
    pub message: String,
    /// 1-based line of the offending record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Violation {
    /// Violation tied to the record at zero-based `idx`.
    pub fn row(
        code: &str,
        path: &str,
        idx: usize,
        message: impl Into<String>,
        example: &str,
    ) -> Self {
        Self {
            code: code.to_string(),
            path: path.to_string(),
            message: message.into(),
            row_index: Some(idx as u64 + 1),
            example: Some(example.to_string()),
        }
    }

    /// Violation about the file as a whole.
    pub fn dataset(
        code: &str,
        path: &str,
        message: impl Into<String>,
        example: Option<String>,
    ) -> Self {
        Self {
            code: code.to_string(),
            path: path.to_string(),
            message: message.into(),
            row_index: None,
            example,
        }
    }

    pub fn describe(&self) -> String {
        match self.row_index {
            Some(row) => format!("row {row} {}: {}", self.path, self.message),
            None => format!("{}: {}", self.path, self.message),
        }
    }
}

/// What a dataset is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetExpectations {
    pub n_agents: u64,
    pub n_infected: u64,
    pub n_students: u64,
    pub n_workers: u64,
    pub n_households: u64,
    pub n_schools: u64,
    pub n_workplaces: u64,
    pub bounds: SpatialBounds,
}

impl From<&PopulationConfig> for DatasetExpectations {
    fn from(config: &PopulationConfig) -> Self {
        Self {
            n_agents: config.n_agents.into(),
            n_infected: config.n_infected.into(),
            n_students: config.n_students.into(),
            n_workers: config.n_workers.into(),
            n_households: config.n_households.into(),
            n_schools: config.n_schools.into(),
            n_workplaces: config.n_workplaces.into(),
            bounds: config.bounds,
        }
    }
}

/// Result of a dataset validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub out_dir: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub checks: Vec<CheckResult>,
    pub metrics: MetricsReport,
    pub report: String,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| !check.passed)
    }
}
