use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use popsynth_core::{Bounds, FORMAT_VERSION, SpatialBounds};

/// Requested shape of one synthetic population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PopulationConfig {
    /// Contract version for this config format.
    #[serde(default = "default_config_version")]
    pub config_version: String,
    /// Seed for every random draw of the run.
    #[serde(default)]
    pub seed: u64,
    /// Total number of agents.
    pub n_agents: u32,
    /// Agents initially infected.
    pub n_infected: u32,
    /// Agents assigned to a school.
    pub n_students: u32,
    /// Agents assigned to a workplace.
    pub n_workers: u32,
    /// Number of households.
    pub n_households: u32,
    /// Number of schools.
    pub n_schools: u32,
    /// Number of workplaces.
    pub n_workplaces: u32,
    /// Rectangle every place is drawn from.
    pub bounds: SpatialBounds,
    /// Age distribution for agents.
    #[serde(default)]
    pub age: AgePolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            seed: 42,
            n_agents: 10_000,
            n_infected: 100,
            n_students: 3_000,
            n_workers: 7_000,
            n_households: 2_500,
            n_schools: 200,
            n_workplaces: 2_000,
            bounds: SpatialBounds::new(Bounds::new(0.0, 1.4804), Bounds::new(100.0, 102.11491)),
            age: AgePolicy::default(),
        }
    }
}

fn default_config_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Policy used to draw agent ages. Every variant yields non-negative ages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AgePolicy {
    /// Integer ages drawn uniformly from `[min, max]`.
    Uniform { min: u32, max: u32 },
    /// Normal draw rounded and clamped to `[0, max]`.
    Normal { mean: f64, std_dev: f64, max: u32 },
    /// Same age for every agent.
    Fixed { age: u32 },
}

impl Default for AgePolicy {
    fn default() -> Self {
        AgePolicy::Uniform { min: 0, max: 90 }
    }
}
