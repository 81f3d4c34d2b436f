use crate::checks::CheckResult;
use crate::metrics::MetricsReport;

/// Render a deterministic markdown report from metrics and check results.
pub fn render_report(metrics: &MetricsReport, checks: &[CheckResult], max_examples: usize) -> String {
    let mut lines = Vec::new();

    lines.push("# Population Dataset Validation Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!("- validated_at: {}", metrics.validated_at));
    lines.push(format!("- dataset: {}", metrics.dataset_dir));
    let verdict = if metrics.summary.failed == 0 {
        "PASS"
    } else {
        "FAIL"
    };
    lines.push(format!(
        "- result: {verdict} ({} of {} checks passed)",
        metrics.summary.passed, metrics.summary.checks
    ));
    lines.push(String::new());

    lines.push("## Files".to_string());
    lines.push("| file | present | rows_expected | rows_found |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for file in &metrics.files {
        let found = file
            .rows_found
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "| {} | {} | {} | {} |",
            file.file,
            if file.present { "yes" } else { "no" },
            file.rows_expected,
            found
        ));
    }
    lines.push(String::new());

    lines.push("## Checks".to_string());
    lines.push("| subject | check | result | violations | detail |".to_string());
    lines.push("| --- | --- | --- | --- | --- |".to_string());
    for check in &metrics.checks {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            check.subject,
            check.check,
            if check.passed { "pass" } else { "fail" },
            check.violations,
            check.detail.replace('|', "\\|")
        ));
    }
    lines.push(String::new());

    let violations = checks
        .iter()
        .flat_map(|check| check.violations.iter())
        .collect::<Vec<_>>();
    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            let row = violation
                .row_index
                .map(|row| format!(" row {row}"))
                .unwrap_or_default();
            let example = violation
                .example
                .as_ref()
                .map(|value| format!(" example={value}"))
                .unwrap_or_default();
            lines.push(format!(
                "- {}{}: {}{}",
                violation.path, row, violation.message, example
            ));
        }
        if violations.len() > max_examples {
            lines.push(format!("- ... {} more", violations.len() - max_examples));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics, checks));
    lines.join("\n")
}

fn recommendations(metrics: &MetricsReport, checks: &[CheckResult]) -> Vec<String> {
    let mut lines = Vec::new();
    if metrics.files.iter().any(|file| !file.present) {
        lines.push("- regenerate the dataset; at least one file is missing.".to_string());
    }
    let has_code = |code: &str| {
        checks
            .iter()
            .flat_map(|check| check.violations.iter())
            .any(|violation| violation.code == code)
    };
    if has_code("count_mismatch") || has_code("aggregate_mismatch") {
        lines.push("- confirm the dataset was generated from the same config.".to_string());
    }
    if has_code("coordinate_out_of_bounds") {
        lines.push("- compare [bounds] in the config with the generating run.".to_string());
    }
    if has_code("unknown_household") || has_code("unknown_place") {
        lines.push("- place files and agents file come from different runs.".to_string());
    }
    if metrics.summary.failed == 0 {
        lines.push("- no violations detected; dataset is ready for the simulator.".to_string());
    }
    lines
}
