use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use popsynth_config::PopulationConfig;
use popsynth_core::write_bytes_atomic;

use super::RegistryResult;

/// Command-line inputs recorded for reproducibility.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_override: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub command: String,
    pub run_dir: PathBuf,
    pub inputs: RunInputs,
    pub population: PopulationConfig,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig<'a> {
    pub run_id: &'a str,
    pub started_at: String,
    pub command: &'a str,
    pub inputs: &'a RunInputs,
    pub population: &'a PopulationConfig,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        command: &ctx.command,
        inputs: &ctx.inputs,
        population: &ctx.population,
        git: collect_git_info(),
    };
    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        config_path,
        logs_path,
    })
}

/// Copy a JSON artifact (generation report, validation metrics) into the run dir.
pub fn write_artifact<T: Serialize>(
    paths: &RunPaths,
    name: &str,
    value: &T,
) -> RegistryResult<PathBuf> {
    let path = paths.root.join(name);
    write_json(&path, value)?;
    Ok(path)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_run_writes_config_and_log_file() {
        let run_dir = std::env::temp_dir().join(format!("popsynth_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "1234".to_string(),
            started_at: Utc::now(),
            command: "generate".to_string(),
            run_dir: run_dir.clone(),
            inputs: RunInputs {
                seed_override: Some(9),
                ..RunInputs::default()
            },
            population: PopulationConfig::default(),
        };

        let paths = start_run(&ctx).expect("start run");
        let name = paths
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(name.ends_with("__run_1234"));
        assert!(paths.logs_path.exists());

        let config: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.config_path).expect("read config"))
                .expect("parse config");
        assert_eq!(config["command"], "generate");
        assert_eq!(config["inputs"]["seed_override"], 9);
        assert!(config["inputs"].get("dataset_dir").is_none());
        assert_eq!(config["population"]["n_agents"], 10_000);

        let artifact = write_artifact(&paths, "extra.json", &serde_json::json!({"ok": true}))
            .expect("write artifact");
        assert!(artifact.starts_with(&paths.root));

        let _ = std::fs::remove_dir_all(&run_dir);
    }
}
