mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use popsynth_config::{
    ConfigError, PopulationConfig, config_json_schema_value, load_config, render_config_toml,
};
use popsynth_core::write_bytes_atomic;
use popsynth_generate::{GenerateOptions, GenerationEngine, GenerationError};
use popsynth_validate::{
    DatasetExpectations, METRICS_FILE, ValidateError, ValidateOptions, ValidationEngine,
};
use registry::{RunContext, RunInputs, RunPaths, init_run_logging, start_run, write_artifact};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("generation failed: {0}")]
    Generate(#[from] GenerationError),
    #[error(transparent)]
    Validate(#[from] ValidateError),
    #[error(transparent)]
    Core(#[from] popsynth_core::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

#[derive(Parser, Debug)]
#[command(name = "popsynth", version, about = "Synthetic population generator and validator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate households, schools, workplaces, and agents.
    Generate(GenerateArgs),
    /// Validate a dataset directory against a population config.
    Validate(ValidateArgs),
    /// Create, print, and check population configs.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Population config (.toml or .json).
    #[arg(long)]
    config: PathBuf,
    /// Directory for the four dataset files.
    #[arg(long, default_value = "input_data")]
    out: PathBuf,
    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Skip generation_report.json next to the dataset.
    #[arg(long, default_value_t = false)]
    no_report: bool,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Dataset directory holding the four text files.
    #[arg(long, default_value = "input_data")]
    dataset: PathBuf,
    /// Population config the dataset was generated from.
    #[arg(long)]
    config: PathBuf,
    /// Directory for validation artifacts (defaults to the dataset dir).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Report failures without a non-zero exit.
    #[arg(long, default_value_t = false)]
    no_strict: bool,
    /// Emit violations.json with every violation.
    #[arg(long, default_value_t = false)]
    write_violations: bool,
    /// Violations listed in the markdown report.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config as TOML.
    Init(ConfigInitArgs),
    /// Print the config JSON Schema.
    Schema,
    /// Run structural and feasibility checks on a config.
    Check(ConfigCheckArgs),
}

#[derive(Args, Debug)]
struct ConfigInitArgs {
    #[arg(long, default_value = "popsynth.toml")]
    out: PathBuf,
    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Args, Debug)]
struct ConfigCheckArgs {
    /// Config file (.toml or .json).
    path: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Config(ConfigCommand::Init(args)) => run_config_init(args),
        Command::Config(ConfigCommand::Schema) => run_config_schema(),
        Command::Config(ConfigCommand::Check(args)) => run_config_check(args),
    }
}

fn open_run(
    command: &str,
    run_dir: PathBuf,
    inputs: RunInputs,
    population: &PopulationConfig,
) -> Result<(String, RunPaths), CliError> {
    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        command: command.to_string(),
        run_dir,
        inputs,
        population: population.clone(),
    };

    let paths = start_run(&ctx)?;
    init_run_logging(&paths.logs_path)?;
    tracing::info!(event = "run_started", run_id = %run_id, command = command);
    Ok((run_id, paths))
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config,
        out,
        seed,
        no_report,
        run_dir,
    } = args;

    let mut population = load_config(&config)?.config;
    if let Some(seed) = seed {
        population.seed = seed;
    }

    let inputs = RunInputs {
        config_path: Some(config),
        out_dir: Some(out.clone()),
        seed_override: seed,
        ..RunInputs::default()
    };
    let (run_id, paths) = open_run("generate", run_dir, inputs, &population)?;
    let timer = Instant::now();

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out,
        write_report: !no_report,
    });
    let result = engine.run(&population).inspect_err(|err| {
        tracing::error!(event = "run_finished", status = "failed", error = %err);
    })?;

    let report_path = write_artifact(&paths, "generation_report.json", &result.report)?;
    tracing::info!(event = "report_written", path = %report_path.display());

    println!("run_id={run_id}");
    println!("out_dir={}", result.out_dir.display());
    for file in &result.report.files {
        println!("{} rows={} sha256={}", file.name, file.rows, file.sha256);
    }

    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let ValidateArgs {
        dataset,
        config,
        out,
        no_strict,
        write_violations,
        max_examples,
        run_dir,
    } = args;

    if !dataset.is_dir() {
        return Err(CliError::InvalidArgs(format!(
            "dataset directory {} does not exist",
            dataset.display()
        )));
    }

    let population = load_config(&config)?.config;
    let inputs = RunInputs {
        config_path: Some(config),
        dataset_dir: Some(dataset.clone()),
        out_dir: out.clone(),
        strict: Some(!no_strict),
        ..RunInputs::default()
    };
    let (run_id, paths) = open_run("validate", run_dir, inputs, &population)?;
    let timer = Instant::now();

    // Always collect the full result; strictness is applied after reporting.
    let engine = ValidationEngine::new(ValidateOptions {
        strict: false,
        max_examples,
        write_violations,
        out_dir: out,
    });
    let result = engine.run(&dataset, &DatasetExpectations::from(&population))?;
    write_artifact(&paths, METRICS_FILE, &result.metrics)?;

    println!("run_id={run_id}");
    for check in &result.checks {
        let status = if check.passed { "PASS" } else { "FAIL" };
        println!("{status} {} {}: {}", check.subject, check.check, check.detail);
    }
    println!("metrics_path={}", result.metrics_path.display());
    println!("report_path={}", result.report_path.display());
    if let Some(path) = &result.violations_path {
        println!("violations_path={}", path.display());
    }

    let failed = result.metrics.summary.failed;
    tracing::info!(
        event = "run_finished",
        status = if failed == 0 { "success" } else { "failed" },
        failed_checks = failed,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    if !no_strict && failed > 0 {
        return Err(ValidateError::Failed(failed).into());
    }
    Ok(())
}

fn run_config_init(args: ConfigInitArgs) -> Result<(), CliError> {
    if args.out.exists() && !args.force {
        return Err(CliError::InvalidArgs(format!(
            "{} already exists; pass --force to overwrite",
            args.out.display()
        )));
    }
    ensure_parent(&args.out)?;
    let toml = render_config_toml(&PopulationConfig::default())?;
    write_bytes_atomic(&args.out, toml.as_bytes())?;
    println!("config_path={}", args.out.display());
    Ok(())
}

fn run_config_schema() -> Result<(), CliError> {
    let schema = config_json_schema_value()?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_config_check(args: ConfigCheckArgs) -> Result<(), CliError> {
    let validated = load_config(&args.path)?;
    for issue in &validated.warnings {
        println!("warning {} at {}: {}", issue.code, issue.path, issue.message);
    }
    let config = &validated.config;
    println!(
        "config ok: agents={} households={} schools={} workplaces={} seed={}",
        config.n_agents, config.n_households, config.n_schools, config.n_workplaces, config.seed
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(popsynth_core::Error::from)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validate_defaults_to_strict() {
        let cli = Cli::try_parse_from(["popsynth", "validate", "--config", "pop.toml"])
            .expect("parse validate");
        match cli.command {
            Command::Validate(args) => {
                assert!(!args.no_strict);
                assert_eq!(args.dataset, PathBuf::from("input_data"));
                assert_eq!(args.max_examples, 20);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn generate_accepts_seed_override() {
        let cli = Cli::try_parse_from([
            "popsynth", "generate", "--config", "pop.toml", "--seed", "7", "--out", "data",
        ])
        .expect("parse generate");
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.out, PathBuf::from("data"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_check_takes_positional_path() {
        let cli = Cli::try_parse_from(["popsynth", "config", "check", "pop.json"])
            .expect("parse config check");
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Check(ConfigCheckArgs { path })) if path == Path::new("pop.json")
        ));
    }
}
