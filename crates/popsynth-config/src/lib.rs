//! Population config contract and feasibility validation.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use load::{load_config, load_config_value, render_config_toml};
pub use model::{AgePolicy, PopulationConfig};
pub use schema::{config_json_schema, config_json_schema_value};
pub use validate::{ValidatedConfig, validate_config, validate_config_json, validate_config_value};
