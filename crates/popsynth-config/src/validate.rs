use jsonschema::JSONSchema;
use serde_json::Value;

use popsynth_core::{Bounds, FORMAT_VERSION};

use crate::errors::{ConfigError, IssueSeverity, ValidationIssue, ValidationReport};
use crate::model::{AgePolicy, PopulationConfig};
use crate::schema::config_json_schema_value;

/// Validated config with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: PopulationConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a config JSON document against a config JSON Schema.
pub fn validate_config_json(
    config_json: &Value,
    config_schema: &Value,
) -> Result<ValidationReport, ConfigError> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Check that the requested counts can be honoured exactly.
///
/// Errors here are the generator's configuration errors: the run must abort
/// before any file is written.
pub fn validate_config(config: &PopulationConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_version(config, &mut report);
    validate_selection_counts(config, &mut report);
    validate_place_sets(config, &mut report);
    validate_bounds("/bounds/x", &config.bounds.x, &mut report);
    validate_bounds("/bounds/y", &config.bounds.y, &mut report);
    validate_age_policy(&config.age, &mut report);

    report
}

/// Validate the config end-to-end, returning structured issues on failure.
pub fn validate_config_value(config_json: &Value) -> Result<ValidatedConfig, ValidationReport> {
    let structural = match config_json_schema_value()
        .and_then(|schema| validate_config_json(config_json, &schema))
    {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let config: PopulationConfig = match serde_json::from_value(config_json.clone()) {
        Ok(config) => config,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_config_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let feasibility = validate_config(&config);
    if !feasibility.is_ok() {
        return Err(feasibility);
    }

    Ok(ValidatedConfig {
        config,
        warnings: feasibility.warnings,
    })
}

fn validate_version(config: &PopulationConfig, report: &mut ValidationReport) {
    if config.config_version != FORMAT_VERSION {
        report.push(ValidationIssue::warning(
            "config_version_mismatch",
            "/config_version",
            format!(
                "config_version '{}' differs from supported '{FORMAT_VERSION}'",
                config.config_version
            ),
            Some("regenerate the config with `popsynth config init`"),
        ));
    }
}

fn validate_selection_counts(config: &PopulationConfig, report: &mut ValidationReport) {
    let selections = [
        ("infected_exceeds_agents", "/n_infected", "infected", config.n_infected),
        ("students_exceed_agents", "/n_students", "students", config.n_students),
        ("workers_exceed_agents", "/n_workers", "workers", config.n_workers),
    ];

    for (code, path, label, requested) in selections {
        if requested > config.n_agents {
            report.push(ValidationIssue::error(
                code,
                path,
                format!(
                    "{requested} {label} requested but only {} agents exist",
                    config.n_agents
                ),
                Some("lower the count or raise n_agents"),
            ));
        }
    }

    if config.n_agents > 0 && config.n_infected == 0 {
        report.push(ValidationIssue::warning(
            "no_infected",
            "/n_infected",
            "no agent starts infected",
            None,
        ));
    }
}

fn validate_place_sets(config: &PopulationConfig, report: &mut ValidationReport) {
    if config.n_agents > 0 && config.n_households == 0 {
        report.push(ValidationIssue::error(
            "missing_households",
            "/n_households",
            "every agent needs a household but none are requested",
            Some("set n_households to at least 1"),
        ));
    }
    if config.n_students > 0 && config.n_schools == 0 {
        report.push(ValidationIssue::error(
            "missing_schools",
            "/n_schools",
            format!("{} students requested but no schools", config.n_students),
            Some("set n_schools to at least 1 or n_students to 0"),
        ));
    }
    if config.n_workers > 0 && config.n_workplaces == 0 {
        report.push(ValidationIssue::error(
            "missing_workplaces",
            "/n_workplaces",
            format!("{} workers requested but no workplaces", config.n_workers),
            Some("set n_workplaces to at least 1 or n_workers to 0"),
        ));
    }
    if config.n_agents > 0 && config.n_households > config.n_agents {
        report.push(ValidationIssue::warning(
            "empty_households_guaranteed",
            "/n_households",
            format!(
                "{} households for {} agents leaves at least {} empty",
                config.n_households,
                config.n_agents,
                config.n_households - config.n_agents
            ),
            None,
        ));
    }
}

fn validate_bounds(path: &str, bounds: &Bounds, report: &mut ValidationReport) {
    if !bounds.is_valid() {
        report.push(ValidationIssue::error(
            "invalid_bounds",
            path,
            format!("bounds {bounds} must be finite with min < max and a finite width"),
            None,
        ));
    }
}

fn validate_age_policy(policy: &AgePolicy, report: &mut ValidationReport) {
    match policy {
        AgePolicy::Uniform { min, max } if min > max => {
            report.push(ValidationIssue::error(
                "invalid_age_range",
                "/age",
                format!("uniform age range [{min}, {max}] is inverted"),
                None,
            ));
        }
        AgePolicy::Normal { mean, std_dev, .. } => {
            if !mean.is_finite() {
                report.push(ValidationIssue::error(
                    "invalid_age_mean",
                    "/age/mean",
                    format!("mean {mean} is not finite"),
                    None,
                ));
            }
            if !std_dev.is_finite() || *std_dev < 0.0 {
                report.push(ValidationIssue::error(
                    "invalid_age_std_dev",
                    "/age/std_dev",
                    format!("std_dev {std_dev} must be finite and non-negative"),
                    None,
                ));
            }
        }
        _ => {}
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
