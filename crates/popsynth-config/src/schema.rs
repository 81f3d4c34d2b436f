use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::Value;

use crate::errors::ConfigError;
use crate::model::PopulationConfig;

/// Emit the JSON Schema for population config files.
pub fn config_json_schema() -> RootSchema {
    schema_for!(PopulationConfig)
}

/// JSON Schema as a `serde_json::Value`, ready for compilation.
pub fn config_json_schema_value() -> Result<Value, ConfigError> {
    Ok(serde_json::to_value(config_json_schema())?)
}
