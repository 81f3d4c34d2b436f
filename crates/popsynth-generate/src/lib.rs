//! Seeded population synthesizer for popsynth.
//!
//! This crate consumes a `PopulationConfig` to produce a deterministic
//! dataset of households, schools, workplaces, and agents, and writes it in
//! the four-file text format the simulator loads.

pub mod age;
pub mod assign;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod places;

pub use age::AgeSampler;
pub use assign::{AssignmentRequest, assign_population};
pub use engine::{GenerationEngine, GenerationResult, synthesize};
pub use errors::GenerationError;
pub use model::{Dataset, GenerateOptions, GenerationReport};
pub use places::generate_places;
