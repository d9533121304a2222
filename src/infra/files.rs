//! File-system collaborators of a build: the entries document, the template,
//! and the output file.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use super::error::InfraError;

/// Top-level shape of the entries document: `{"errors": [...]}`.
#[derive(Debug, Deserialize)]
struct EntriesDocument {
    errors: Vec<Value>,
}

/// Read the raw entry records; decoding each one is left to the caller so
/// failures can name the offending position.
pub fn read_entry_records(path: &Path) -> Result<Vec<Value>, InfraError> {
    let raw = fs::read_to_string(path).map_err(|err| InfraError::io(path, err))?;
    let document: EntriesDocument =
        serde_json::from_str(&raw).map_err(|err| InfraError::parse(path, err.to_string()))?;
    Ok(document.errors)
}

pub fn read_template(path: &Path) -> Result<String, InfraError> {
    fs::read_to_string(path).map_err(|err| InfraError::io(path, err))
}

/// The directory that will receive `output` must already exist.
pub fn ensure_output_directory(output: &Path) -> Result<PathBuf, InfraError> {
    let directory = output_directory(output);
    if directory.is_dir() {
        Ok(directory)
    } else {
        Err(InfraError::MissingDirectory { path: directory })
    }
}

/// Replace `output` in one step so readers never see a half-written document.
pub fn write_output(output: &Path, contents: &str) -> Result<(), InfraError> {
    let directory = output_directory(output);
    let mut staged =
        NamedTempFile::new_in(&directory).map_err(|err| InfraError::io(&directory, err))?;
    staged
        .write_all(contents.as_bytes())
        .map_err(|err| InfraError::io(output, err))?;
    staged.flush().map_err(|err| InfraError::io(output, err))?;
    staged
        .persist(output)
        .map_err(|err| InfraError::io(output, err.error))?;
    Ok(())
}

fn output_directory(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
