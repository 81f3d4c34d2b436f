//! Structural and semantic validation of serialized population datasets.
//!
//! The checks in [`checks`] are pure functions over parsed rows; the
//! [`ValidationEngine`] loads the four dataset files, runs every check, and
//! writes `validation_metrics.json` plus `validation_report.md`.

pub mod checks;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use checks::{
    CheckKind, CheckResult, check_agent_properties, check_aggregate_counts, check_count,
    check_entry_count, check_place_ids, check_place_properties,
};
pub use engine::{METRICS_FILE, REPORT_FILE, VIOLATIONS_FILE, ValidationEngine};
pub use errors::ValidateError;
pub use metrics::{CheckSummary, MetricsReport};
pub use model::{DatasetExpectations, ValidateOptions, ValidationResult, Violation};
pub use report::render_report;
