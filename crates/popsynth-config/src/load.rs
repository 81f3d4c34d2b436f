use std::path::Path;

use serde_json::Value;

use crate::errors::{ConfigError, Result};
use crate::model::PopulationConfig;
use crate::validate::{ValidatedConfig, validate_config_value};

/// Read a `.toml` or `.json` config file into a JSON value without
/// interpreting it.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => Ok(toml::from_str::<Value>(&contents)?),
        "json" => Ok(serde_json::from_str::<Value>(&contents)?),
        other => Err(ConfigError::UnsupportedFormat(format!(
            "{} (extension '{other}')",
            path.display()
        ))),
    }
}

/// Load a config file and run structural and feasibility validation.
pub fn load_config(path: &Path) -> Result<ValidatedConfig> {
    let value = load_config_value(path)?;
    validate_config_value(&value).map_err(ConfigError::Invalid)
}

/// Render a config as pretty TOML.
pub fn render_config_toml(config: &PopulationConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("popsynth_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn default_config_survives_toml_round_trip() {
        let config = PopulationConfig::default();
        let rendered = render_config_toml(&config).expect("render toml");
        let path = temp_file("default.toml", &rendered);

        let loaded = load_config(&path).expect("load config");
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = temp_file("population.yaml", "n_agents: 1");
        let err = load_config_value(&path).expect_err("yaml is unsupported");
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn infeasible_config_is_reported_as_invalid() {
        let contents = r#"
n_agents = 10
n_infected = 11
n_students = 3
n_workers = 6
n_households = 5
n_schools = 2
n_workplaces = 6

[bounds.x]
min = 10.0
max = 150.0

[bounds.y]
min = 100.0
max = 120.0
"#;
        let path = temp_file("infeasible.toml", contents);
        match load_config(&path) {
            Err(ConfigError::Invalid(report)) => {
                assert!(report.has_code("infected_exceeds_agents"));
            }
            other => panic!("expected invalid config, got {other:?}"),
        }
    }
}
