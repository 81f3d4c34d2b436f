use std::path::Path;

use sha2::{Digest, Sha256};

use popsynth_core::{
    AGENTS_FILE, HOUSES_FILE, SCHOOLS_FILE, WORKPLACES_FILE, render_agents, render_places,
    write_text_file,
};

use crate::errors::GenerationError;
use crate::model::{Dataset, FileReport};

/// Write the four dataset files into `dir`.
///
/// Every file is rendered before the first one is written, so a rendering
/// failure leaves the directory untouched.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<Vec<FileReport>, GenerationError> {
    let rendered = [
        (AGENTS_FILE, dataset.agents.len(), render_agents(&dataset.agents)?),
        (HOUSES_FILE, dataset.households.len(), render_places(&dataset.households)?),
        (SCHOOLS_FILE, dataset.schools.len(), render_places(&dataset.schools)?),
        (WORKPLACES_FILE, dataset.workplaces.len(), render_places(&dataset.workplaces)?),
    ];

    std::fs::create_dir_all(dir)?;

    let mut files = Vec::with_capacity(rendered.len());
    for (name, rows, text) in rendered {
        let bytes = write_text_file(&dir.join(name), &text)?;
        files.push(FileReport {
            name: name.to_string(),
            rows: rows as u64,
            bytes,
            sha256: hex::encode(Sha256::digest(text.as_bytes())),
        });
    }

    Ok(files)
}
