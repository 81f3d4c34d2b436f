//! Record schema for the four dataset files.
//!
//! Typed entities (`Place`, `Agent`) render to fixed-order string fields.
//! Loose records (`PlaceRecord`, `AgentRecord`) are parsed from untrusted
//! rows and keep out-of-range values so the validator can report them.

use std::str::FromStr;

use thiserror::Error;

use crate::model::{Agent, Place};

/// Field order for household, school, and workplace rows.
pub const PLACE_FIELDS: [&str; 3] = ["id", "x", "y"];

/// Field order for agent rows.
pub const AGENT_FIELDS: [&str; 9] = [
    "is_student",
    "is_worker",
    "age",
    "x",
    "y",
    "household_id",
    "school_id",
    "workplace_id",
    "infection_status",
];

/// Failure to interpret a row of string fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("expected {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("field '{field}' has unparseable value '{value}'")]
    Invalid { field: &'static str, value: String },
}

impl Place {
    pub fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.x.to_string(), self.y.to_string()]
    }
}

impl Agent {
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            flag(self.is_student),
            flag(self.is_worker),
            self.age.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.household_id.to_string(),
            self.school_id.to_string(),
            self.workplace_id.to_string(),
            flag(self.infected),
        ]
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Place row parsed without semantic checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceRecord {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl PlaceRecord {
    pub fn from_fields(fields: &[String]) -> Result<Self, FieldError> {
        expect_arity(fields, PLACE_FIELDS.len())?;
        Ok(Self {
            id: parse_field(fields, 0, PLACE_FIELDS[0])?,
            x: parse_field(fields, 1, PLACE_FIELDS[1])?,
            y: parse_field(fields, 2, PLACE_FIELDS[2])?,
        })
    }
}

/// Agent row parsed without semantic checks.
///
/// Flags and IDs stay signed so values such as `-1` or `1000` survive parsing
/// and surface as violations instead of parse failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentRecord {
    pub is_student: i64,
    pub is_worker: i64,
    pub age: i64,
    pub x: f64,
    pub y: f64,
    pub household_id: i64,
    pub school_id: i64,
    pub workplace_id: i64,
    pub infection_status: i64,
}

impl AgentRecord {
    pub fn from_fields(fields: &[String]) -> Result<Self, FieldError> {
        expect_arity(fields, AGENT_FIELDS.len())?;
        Ok(Self {
            is_student: parse_field(fields, 0, AGENT_FIELDS[0])?,
            is_worker: parse_field(fields, 1, AGENT_FIELDS[1])?,
            age: parse_field(fields, 2, AGENT_FIELDS[2])?,
            x: parse_field(fields, 3, AGENT_FIELDS[3])?,
            y: parse_field(fields, 4, AGENT_FIELDS[4])?,
            household_id: parse_field(fields, 5, AGENT_FIELDS[5])?,
            school_id: parse_field(fields, 6, AGENT_FIELDS[6])?,
            workplace_id: parse_field(fields, 7, AGENT_FIELDS[7])?,
            infection_status: parse_field(fields, 8, AGENT_FIELDS[8])?,
        })
    }
}

fn expect_arity(fields: &[String], expected: usize) -> Result<(), FieldError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(FieldError::Arity {
            expected,
            found: fields.len(),
        })
    }
}

fn parse_field<T: FromStr>(
    fields: &[String],
    idx: usize,
    field: &'static str,
) -> Result<T, FieldError> {
    let raw = fields.get(idx).map(String::as_str).unwrap_or_default();
    raw.parse::<T>().map_err(|_| FieldError::Invalid {
        field,
        value: raw.to_string(),
    })
}
