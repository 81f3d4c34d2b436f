use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use popsynth_config::ValidationIssue;
use popsynth_core::{Agent, Place, PlaceKind};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where the four dataset files are written.
    pub out_dir: PathBuf,
    /// Also write `generation_report.json` next to the dataset.
    pub write_report: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("input_data"),
            write_report: true,
        }
    }
}

/// In-memory result of one synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub households: Vec<Place>,
    pub schools: Vec<Place>,
    pub workplaces: Vec<Place>,
    pub agents: Vec<Agent>,
}

impl Dataset {
    pub fn places(&self, kind: PlaceKind) -> &[Place] {
        match kind {
            PlaceKind::Household => &self.households,
            PlaceKind::School => &self.schools,
            PlaceKind::Workplace => &self.workplaces,
        }
    }
}

/// Requested vs generated count for one place kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceReport {
    pub kind: PlaceKind,
    pub requested: u32,
    pub generated: u64,
}

/// Aggregate flags across all agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub total: u64,
    pub students: u64,
    pub workers: u64,
    pub students_and_workers: u64,
    pub infected: u64,
}

/// Household occupancy statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub empty_households: u64,
    pub max_occupancy: u64,
    pub mean_occupancy: f64,
}

/// Age statistics. All fields are `None` for an empty population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeSummary {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub mean: Option<f64>,
}

/// One written dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub name: String,
    pub rows: u64,
    pub bytes: u64,
    pub sha256: String,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub generated_at: String,
    pub config_version: String,
    pub seed: u64,
    pub places: Vec<PlaceReport>,
    pub agents: AgentSummary,
    pub households: OccupancySummary,
    pub ages: AgeSummary,
    pub files: Vec<FileReport>,
    pub bytes_written: u64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty", skip_deserializing)]
    pub warnings: Vec<ValidationIssue>,
}

impl AgentSummary {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut summary = AgentSummary {
            total: agents.len() as u64,
            ..AgentSummary::default()
        };
        for agent in agents {
            summary.students += u64::from(agent.is_student);
            summary.workers += u64::from(agent.is_worker);
            summary.students_and_workers += u64::from(agent.is_student && agent.is_worker);
            summary.infected += u64::from(agent.infected);
        }
        summary
    }
}

impl OccupancySummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut occupancy = vec![0_u64; dataset.households.len()];
        for agent in &dataset.agents {
            if let Some(slot) = (agent.household_id as usize)
                .checked_sub(1)
                .and_then(|idx| occupancy.get_mut(idx))
            {
                *slot += 1;
            }
        }

        let mean_occupancy = if occupancy.is_empty() {
            0.0
        } else {
            dataset.agents.len() as f64 / occupancy.len() as f64
        };

        OccupancySummary {
            empty_households: occupancy.iter().filter(|count| **count == 0).count() as u64,
            max_occupancy: occupancy.iter().copied().max().unwrap_or(0),
            mean_occupancy,
        }
    }
}

impl AgeSummary {
    pub fn from_agents(agents: &[Agent]) -> Self {
        if agents.is_empty() {
            return AgeSummary::default();
        }
        let total: u64 = agents.iter().map(|agent| u64::from(agent.age)).sum();
        AgeSummary {
            min: agents.iter().map(|agent| agent.age).min(),
            max: agents.iter().map(|agent| agent.age).max(),
            mean: Some(total as f64 / agents.len() as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(household_id: u32, age: u32, is_student: bool, is_worker: bool) -> Agent {
        Agent {
            is_student,
            is_worker,
            age,
            x: 0.0,
            y: 0.0,
            household_id,
            school_id: u32::from(is_student),
            workplace_id: u32::from(is_worker),
            infected: false,
        }
    }

    fn house(id: u32) -> Place {
        Place {
            kind: PlaceKind::Household,
            id,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn occupancy_counts_empty_households() {
        let dataset = Dataset {
            households: (1..=4).map(house).collect(),
            schools: Vec::new(),
            workplaces: Vec::new(),
            agents: vec![
                agent(1, 10, true, false),
                agent(1, 40, false, true),
                agent(3, 20, true, true),
            ],
        };
        let occupancy = OccupancySummary::from_dataset(&dataset);
        assert_eq!(occupancy.empty_households, 2);
        assert_eq!(occupancy.max_occupancy, 2);
        assert_eq!(occupancy.mean_occupancy, 0.75);

        let summary = AgentSummary::from_agents(&dataset.agents);
        assert_eq!(summary.students, 2);
        assert_eq!(summary.workers, 2);
        assert_eq!(summary.students_and_workers, 1);

        let ages = AgeSummary::from_agents(&dataset.agents);
        assert_eq!(ages.min, Some(10));
        assert_eq!(ages.max, Some(40));
        assert_eq!(ages.mean, Some(70.0 / 3.0));
    }

    #[test]
    fn empty_population_has_no_age_stats() {
        assert_eq!(AgeSummary::from_agents(&[]), AgeSummary::default());
    }
}
