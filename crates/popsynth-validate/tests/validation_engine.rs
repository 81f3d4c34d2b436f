use std::fs;
use std::path::{Path, PathBuf};

use popsynth_config::PopulationConfig;
use popsynth_core::{AGENTS_FILE, Bounds, HOUSES_FILE, SCHOOLS_FILE, SpatialBounds, WORKPLACES_FILE};
use popsynth_generate::{GenerateOptions, GenerationEngine};
use popsynth_validate::{
    CheckKind, DatasetExpectations, METRICS_FILE, MetricsReport, REPORT_FILE, ValidateError,
    ValidateOptions, ValidationEngine, Violation,
};

fn scenario_config() -> PopulationConfig {
    PopulationConfig {
        seed: 7,
        n_agents: 10,
        n_infected: 3,
        n_students: 3,
        n_workers: 6,
        n_households: 5,
        n_schools: 2,
        n_workplaces: 6,
        bounds: SpatialBounds::new(Bounds::new(10.0, 150.0), Bounds::new(100.0, 120.0)),
        ..PopulationConfig::default()
    }
}

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "popsynth_validate_{label}_{}",
        uuid::Uuid::new_v4()
    ))
}

fn copy_scenario(label: &str) -> PathBuf {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scenario");
    let dir = temp_dir(label);
    fs::create_dir_all(&dir).expect("create dataset dir");
    for name in [AGENTS_FILE, HOUSES_FILE, SCHOOLS_FILE, WORKPLACES_FILE] {
        fs::copy(source.join(name), dir.join(name)).expect("copy fixture");
    }
    dir
}

fn non_strict() -> ValidationEngine {
    ValidationEngine::new(ValidateOptions {
        strict: false,
        write_violations: true,
        ..ValidateOptions::default()
    })
}

#[test]
fn scenario_fixture_passes_and_writes_artifacts() {
    let dir = copy_scenario("pass");
    let expectations = DatasetExpectations::from(&scenario_config());

    let result = ValidationEngine::new(ValidateOptions::default())
        .run(&dir, &expectations)
        .expect("scenario validates");

    assert!(result.passed());
    assert_eq!(result.out_dir, dir);
    assert!(result.report.contains("- result: PASS"));

    let metrics: MetricsReport =
        serde_json::from_slice(&fs::read(dir.join(METRICS_FILE)).expect("read metrics"))
            .expect("parse metrics");
    assert_eq!(metrics.summary.failed, 0);
    assert_eq!(metrics.files.len(), 4);
    assert!(metrics.files.iter().all(|file| file.present));
    assert!(dir.join(REPORT_FILE).exists());
    assert!(result.violations_path.is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_agents_file_is_a_failed_check() {
    let dir = copy_scenario("missing");
    fs::remove_file(dir.join(AGENTS_FILE)).expect("remove agents");
    let expectations = DatasetExpectations::from(&scenario_config());

    let result = non_strict().run(&dir, &expectations).expect("non-strict run");
    let missing = result
        .failed_checks()
        .map(|check| (check.subject.as_str(), check.check))
        .collect::<Vec<_>>();
    assert_eq!(
        missing,
        vec![
            ("agents", CheckKind::FilePresent),
            ("agents", CheckKind::AgentProperties)
        ]
    );
    assert!(result.report.contains("at least one file is missing"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn strict_mode_fails_after_writing_artifacts() {
    let dir = copy_scenario("strict");
    let out_dir = temp_dir("strict_out");
    let expectations = DatasetExpectations {
        n_workplaces: 5,
        ..DatasetExpectations::from(&scenario_config())
    };

    let err = ValidationEngine::new(ValidateOptions {
        out_dir: Some(out_dir.clone()),
        write_violations: true,
        ..ValidateOptions::default()
    })
    .run(&dir, &expectations)
    .expect_err("count mismatch must fail");

    assert!(matches!(err, ValidateError::Failed(1)));
    assert!(out_dir.join(METRICS_FILE).exists());
    let violations: Vec<Violation> =
        serde_json::from_slice(&fs::read(out_dir.join("violations.json")).expect("read"))
            .expect("parse violations");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "workplaces.rows");

    let _ = fs::remove_dir_all(&dir);
    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn mutated_agent_fails_only_agent_properties() {
    let dir = copy_scenario("mutated");
    let agents_path = dir.join(AGENTS_FILE);
    let text = fs::read_to_string(&agents_path).expect("read agents");
    let mutated = text.replacen("0 1 34 12.5 101.25 1 0 2 1", "0 1 34 12.5 101.25 1 120 2 1", 1);
    assert_ne!(text, mutated);
    fs::write(&agents_path, mutated).expect("write agents");

    let result = non_strict()
        .run(&dir, &DatasetExpectations::from(&scenario_config()))
        .expect("non-strict run");
    let failed = result.failed_checks().collect::<Vec<_>>();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].check, CheckKind::AgentProperties);
    assert_eq!(failed[0].offending_rows(), vec![2]);
    assert!(result.violations_path.is_some());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn generated_dataset_passes_every_check() {
    let dir = temp_dir("generated");
    let config = PopulationConfig {
        n_agents: 2_000,
        n_infected: 40,
        n_students: 600,
        n_workers: 1_400,
        n_households: 500,
        n_schools: 20,
        n_workplaces: 200,
        ..PopulationConfig::default()
    };
    GenerationEngine::new(GenerateOptions {
        out_dir: dir.clone(),
        write_report: true,
    })
    .run(&config)
    .expect("generate dataset");

    let result = ValidationEngine::new(ValidateOptions::default())
        .run(&dir, &DatasetExpectations::from(&config))
        .expect("generated dataset validates");
    assert!(result.passed());

    let report: serde_json::Value = serde_json::from_slice(
        &fs::read(dir.join("generation_report.json")).expect("read generation report"),
    )
    .expect("parse generation report");
    assert_eq!(report["run_id"].as_str(), Some(result.metrics.run_id.as_str()));

    let _ = fs::remove_dir_all(&dir);
}
