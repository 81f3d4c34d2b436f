use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use popsynth_core::{
    AGENT_FIELDS, DatasetFiles, PLACE_FIELDS, PlaceKind, Row, read_rows_file, write_bytes_atomic,
};

use crate::checks::{
    CheckKind, CheckResult, check_agent_properties, check_aggregate_counts, check_count,
    check_entry_count, check_place_ids, check_place_properties,
};
use crate::errors::ValidateError;
use crate::metrics::{
    CheckMetrics, CheckSummary, FileMetrics, METRICS_VERSION, MetricsReport, PerformanceMetrics,
};
use crate::model::{DatasetExpectations, ValidateOptions, ValidationResult, Violation};
use crate::report::render_report;

pub const METRICS_FILE: &str = "validation_metrics.json";
pub const REPORT_FILE: &str = "validation_report.md";
pub const VIOLATIONS_FILE: &str = "violations.json";

/// Validate a serialized dataset against expected counts and bounds.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    options: ValidateOptions,
}

struct LoadedFile {
    subject: &'static str,
    file: String,
    expected: u64,
    rows: Option<Vec<Row>>,
    check: CheckResult,
}

impl ValidationEngine {
    pub fn new(options: ValidateOptions) -> Self {
        Self { options }
    }

    pub fn run(
        &self,
        dataset_dir: &Path,
        expectations: &DatasetExpectations,
    ) -> Result<ValidationResult, ValidateError> {
        if dataset_dir.exists() && !dataset_dir.is_dir() {
            return Err(ValidateError::InvalidDataset(format!(
                "{} is not a directory",
                dataset_dir.display()
            )));
        }

        let total_start = Instant::now();
        let run_id = detect_run_id(dataset_dir).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let files = DatasetFiles::in_dir(dataset_dir);

        let houses = load(
            "houses",
            files.place_path(PlaceKind::Household),
            expectations.n_households,
        );
        let schools = load(
            "schools",
            files.place_path(PlaceKind::School),
            expectations.n_schools,
        );
        let workplaces = load(
            "workplaces",
            files.place_path(PlaceKind::Workplace),
            expectations.n_workplaces,
        );
        let agents = load("agents", &files.agents, expectations.n_agents);
        let load_ms = total_start.elapsed().as_millis();

        let validate_start = Instant::now();
        let checks = run_checks([&houses, &schools, &workplaces], &agents, expectations);
        let validate_ms = validate_start.elapsed().as_millis();

        let summary = CheckSummary::from_checks(&checks);
        let metrics = MetricsReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id: run_id.clone(),
            validated_at: chrono::Utc::now().to_rfc3339(),
            dataset_dir: dataset_dir.display().to_string(),
            expectations: *expectations,
            files: [&houses, &schools, &workplaces, &agents]
                .into_iter()
                .map(|loaded| FileMetrics {
                    subject: loaded.subject.to_string(),
                    file: loaded.file.clone(),
                    present: loaded.rows.is_some(),
                    rows_found: loaded.rows.as_ref().map(|rows| rows.len() as u64),
                    rows_expected: loaded.expected,
                })
                .collect(),
            checks: checks.iter().map(CheckMetrics::from).collect(),
            summary: summary.clone(),
            performance: PerformanceMetrics {
                load_ms,
                validate_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };

        let report = render_report(&metrics, &checks, self.options.max_examples);
        let out_dir = self
            .options
            .out_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.to_path_buf());
        std::fs::create_dir_all(&out_dir)?;

        let metrics_path = out_dir.join(METRICS_FILE);
        write_bytes_atomic(&metrics_path, &serde_json::to_vec_pretty(&metrics)?)?;

        let report_path = out_dir.join(REPORT_FILE);
        write_bytes_atomic(&report_path, report.as_bytes())?;

        let violations_path = if self.options.write_violations {
            let mut violations = checks
                .iter()
                .flat_map(|check| check.violations.iter().cloned())
                .collect::<Vec<_>>();
            sort_violations(&mut violations);
            let path = out_dir.join(VIOLATIONS_FILE);
            write_bytes_atomic(&path, &serde_json::to_vec_pretty(&violations)?)?;
            Some(path)
        } else {
            None
        };

        for check in checks.iter().filter(|check| !check.passed) {
            warn!(
                run_id = %run_id,
                subject = %check.subject,
                check = %check.check,
                violations = check.violations.len(),
                "{}",
                check.detail
            );
        }
        info!(
            run_id = %run_id,
            dataset_dir = %dataset_dir.display(),
            checks = summary.checks,
            failed = summary.failed,
            violations = summary.violations,
            "validation completed"
        );

        if self.options.strict && summary.failed > 0 {
            return Err(ValidateError::Failed(summary.failed));
        }

        Ok(ValidationResult {
            out_dir,
            metrics_path,
            report_path,
            violations_path,
            checks,
            metrics,
            report,
        })
    }
}

fn load(subject: &'static str, path: &Path, expected: u64) -> LoadedFile {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (rows, check) = match read_rows_file(path) {
        Ok(rows) => (
            Some(rows),
            CheckResult::passed(CheckKind::FilePresent, format!("{file} loaded")),
        ),
        Err(err) => (
            None,
            CheckResult::failed(CheckKind::FilePresent, format!("{file} unreadable: {err}")),
        ),
    };

    LoadedFile {
        subject,
        file,
        expected,
        rows,
        check: check.with_subject(subject),
    }
}

fn run_checks(
    places: [&LoadedFile; 3],
    agents: &LoadedFile,
    expectations: &DatasetExpectations,
) -> Vec<CheckResult> {
    let bounds = expectations.bounds;
    let mut checks = Vec::new();

    for loaded in places {
        checks.push(loaded.check.clone());
        let Some(rows) = &loaded.rows else {
            continue;
        };
        checks.extend(
            [
                check_place_ids(rows),
                check_count(rows, loaded.expected as usize),
                check_entry_count(rows, PLACE_FIELDS.len()),
                check_place_properties(rows, &bounds.x, &bounds.y),
            ]
            .into_iter()
            .map(|check| check.with_subject(loaded.subject)),
        );
    }

    checks.push(agents.check.clone());
    if let Some(rows) = &agents.rows {
        checks.extend(
            [
                check_count(rows, agents.expected as usize),
                check_entry_count(rows, AGENT_FIELDS.len()),
                check_aggregate_counts(
                    rows,
                    expectations.n_infected,
                    expectations.n_students,
                    expectations.n_workers,
                ),
            ]
            .into_iter()
            .map(|check| check.with_subject(agents.subject)),
        );
    }

    let agent_check = match (&agents.rows, &places[0].rows, &places[1].rows, &places[2].rows) {
        (Some(agent_rows), Some(house_rows), Some(school_rows), Some(work_rows)) => {
            check_agent_properties(agent_rows, house_rows, school_rows, work_rows)
        }
        _ => CheckResult::failed(
            CheckKind::AgentProperties,
            "not evaluated: agents or place files missing",
        ),
    };
    checks.push(agent_check.with_subject(agents.subject));

    checks
}

fn detect_run_id(dataset_dir: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(dataset_dir.join("generation_report.json")).ok()?;
    let report = serde_json::from_str::<serde_json::Value>(&contents).ok()?;
    report
        .get("run_id")
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (&a.path, &a.code, a.row_index.unwrap_or_default()).cmp(&(
            &b.path,
            &b.code,
            b.row_index.unwrap_or_default(),
        ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_comes_from_generation_report() {
        let dir = std::env::temp_dir().join(format!("popsynth_run_id_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(dir.join("generation_report.json"), r#"{"run_id":"abc-123"}"#)
            .expect("write report");

        assert_eq!(detect_run_id(&dir).as_deref(), Some("abc-123"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn violations_sort_by_path_then_row() {
        let mut violations = vec![
            Violation::row("b", "agents.age", 4, "m", "x"),
            Violation::row("a", "agents.age", 1, "m", "x"),
            Violation::dataset("c", "agents.age", "m", None),
        ];
        sort_violations(&mut violations);
        let rows = violations
            .iter()
            .map(|violation| (violation.code.as_str(), violation.row_index))
            .collect::<Vec<_>>();
        assert_eq!(rows, vec![("a", Some(2)), ("b", Some(5)), ("c", None)]);
    }
}
