use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use popsynth_config::{PopulationConfig, validate_config};
use popsynth_core::{PlaceKind, write_bytes_atomic};

use crate::age::AgeSampler;
use crate::assign::{AssignmentRequest, assign_population};
use crate::errors::GenerationError;
use crate::model::{
    AgeSummary, AgentSummary, Dataset, GenerateOptions, GenerationReport, OccupancySummary,
    PlaceReport,
};
use crate::output::write_dataset;
use crate::places::generate_places;

/// Name of the JSON report written next to the dataset.
pub const REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Entry point for generating a dataset from a population config.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, config: &PopulationConfig) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        let validation = validate_config(config);
        if !validation.is_ok() {
            warn!(
                run_id = %run_id,
                errors = validation.errors.len(),
                details = %validation,
                "configuration rejected; no dataset written"
            );
            return Err(GenerationError::Configuration(validation));
        }
        for issue in &validation.warnings {
            warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
        }

        info!(
            run_id = %run_id,
            seed = config.seed,
            agents = config.n_agents,
            households = config.n_households,
            schools = config.n_schools,
            workplaces = config.n_workplaces,
            "generation started"
        );

        let dataset = synthesize_checked(config)?;
        let files = write_dataset(&self.options.out_dir, &dataset)?;
        let bytes_written = files.iter().map(|file| file.bytes).sum();

        let places = PlaceKind::ALL
            .iter()
            .map(|kind| PlaceReport {
                kind: *kind,
                requested: requested_places(config, *kind),
                generated: dataset.places(*kind).len() as u64,
            })
            .collect();

        let report = GenerationReport {
            run_id: run_id.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            config_version: config.config_version.clone(),
            seed: config.seed,
            places,
            agents: AgentSummary::from_agents(&dataset.agents),
            households: OccupancySummary::from_dataset(&dataset),
            ages: AgeSummary::from_agents(&dataset.agents),
            files,
            bytes_written,
            duration_ms: start.elapsed().as_millis() as u64,
            warnings: validation.warnings,
        };

        if self.options.write_report {
            let report_path = self.options.out_dir.join(REPORT_FILE);
            write_bytes_atomic(&report_path, &serde_json::to_vec_pretty(&report)?)?;
        }

        info!(
            run_id = %run_id,
            out_dir = %self.options.out_dir.display(),
            agents = report.agents.total,
            infected = report.agents.infected,
            empty_households = report.households.empty_households,
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            out_dir: self.options.out_dir.clone(),
            dataset,
            report,
        })
    }
}

/// Build a dataset in memory without touching the filesystem.
///
/// Fails with [`GenerationError::Configuration`] when the config is
/// infeasible.
pub fn synthesize(config: &PopulationConfig) -> Result<Dataset, GenerationError> {
    let validation = validate_config(config);
    if !validation.is_ok() {
        return Err(GenerationError::Configuration(validation));
    }
    synthesize_checked(config)
}

fn synthesize_checked(config: &PopulationConfig) -> Result<Dataset, GenerationError> {
    let households = generate_places(
        PlaceKind::Household,
        config.n_households,
        &config.bounds,
        &mut stage_rng(config.seed, "households"),
    )?;
    let schools = generate_places(
        PlaceKind::School,
        config.n_schools,
        &config.bounds,
        &mut stage_rng(config.seed, "schools"),
    )?;
    let workplaces = generate_places(
        PlaceKind::Workplace,
        config.n_workplaces,
        &config.bounds,
        &mut stage_rng(config.seed, "workplaces"),
    )?;

    let request = AssignmentRequest {
        n_agents: config.n_agents,
        n_students: config.n_students,
        n_workers: config.n_workers,
        n_infected: config.n_infected,
    };
    let ages = AgeSampler::from_policy(&config.age)?;
    let agents = assign_population(
        &request,
        &households,
        &schools,
        &workplaces,
        &ages,
        &mut stage_rng(config.seed, "agents"),
    )?;

    Ok(Dataset {
        households,
        schools,
        workplaces,
        agents,
    })
}

fn requested_places(config: &PopulationConfig, kind: PlaceKind) -> u32 {
    match kind {
        PlaceKind::Household => config.n_households,
        PlaceKind::School => config.n_schools,
        PlaceKind::Workplace => config.n_workplaces,
    }
}

/// Independent stream per stage, so resizing one place set leaves the
/// others unchanged for a given seed.
fn stage_rng(seed: u64, stage: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, stage))
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
