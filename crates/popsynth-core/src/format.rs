//! Space-separated text format shared by the generator and the validator.
//!
//! One entity per line, fields separated by a single space, no header row.
//! Field order is fixed by [`crate::record::PLACE_FIELDS`] and
//! [`crate::record::AGENT_FIELDS`].

use std::path::{Path, PathBuf};

use crate::atomic::write_bytes_atomic;
use crate::error::Result;
use crate::model::{Agent, Place, PlaceKind};

/// Agents file name expected by the simulator.
pub const AGENTS_FILE: &str = "agents_data.txt";
/// Households file name expected by the simulator.
pub const HOUSES_FILE: &str = "houses_data.txt";
/// Schools file name expected by the simulator.
pub const SCHOOLS_FILE: &str = "schools_data.txt";
/// Workplaces file name expected by the simulator.
pub const WORKPLACES_FILE: &str = "workplaces_data.txt";

/// One parsed line: the raw string fields in file order.
pub type Row = Vec<String>;

/// Paths of the four coupled files that make up one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    pub agents: PathBuf,
    pub houses: PathBuf,
    pub schools: PathBuf,
    pub workplaces: PathBuf,
}

impl DatasetFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            agents: dir.join(AGENTS_FILE),
            houses: dir.join(HOUSES_FILE),
            schools: dir.join(SCHOOLS_FILE),
            workplaces: dir.join(WORKPLACES_FILE),
        }
    }

    pub fn place_path(&self, kind: PlaceKind) -> &Path {
        match kind {
            PlaceKind::Household => &self.houses,
            PlaceKind::School => &self.schools,
            PlaceKind::Workplace => &self.workplaces,
        }
    }
}

/// Render places as text, one `id x y` line each.
pub fn render_places(places: &[Place]) -> Result<String> {
    render_rows(places.iter().map(Place::to_fields))
}

/// Render agents as text, nine fields per line.
pub fn render_agents(agents: &[Agent]) -> Result<String> {
    render_rows(agents.iter().map(Agent::to_fields))
}

fn render_rows<I>(rows: I) -> Result<String>
where
    I: IntoIterator<Item = Row>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Split text into rows of string fields.
///
/// Trailing whitespace (including `\r`) is dropped and blank lines are
/// skipped. No other validation is performed.
pub fn parse_rows(text: &str) -> Vec<Row> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(' ').map(str::to_string).collect())
        .collect()
}

/// Read and split a dataset file.
pub fn read_rows_file(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rows(&text))
}

/// Atomically write rendered text, returning the number of bytes written.
pub fn write_text_file(path: &Path, text: &str) -> Result<u64> {
    write_bytes_atomic(path, text.as_bytes())?;
    Ok(text.len() as u64)
}
