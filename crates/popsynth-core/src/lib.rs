//! Core contracts and helpers for popsynth.
//!
//! This crate defines the population data model (places and agents), the
//! loose record types used when reading untrusted datasets, and the single
//! text serializer/parser pair shared by generation and validation.

pub mod atomic;
pub mod error;
pub mod format;
pub mod model;
pub mod record;

pub use atomic::write_bytes_atomic;
pub use error::{Error, Result};
pub use format::{
    AGENTS_FILE, DatasetFiles, HOUSES_FILE, Row, SCHOOLS_FILE, WORKPLACES_FILE, parse_rows,
    read_rows_file, render_agents, render_places, write_text_file,
};
pub use model::{Agent, Bounds, Place, PlaceKind, SpatialBounds};
pub use record::{AGENT_FIELDS, AgentRecord, FieldError, PLACE_FIELDS, PlaceRecord};

/// Current contract version for population config and report artifacts.
pub const FORMAT_VERSION: &str = "0.1";
