use super::StoreError;
use common::model::guide::{Guide, GuideConfigFile};
use log::{error, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads the guide record at `path`.
///
/// Absent file: `Guide::Unset`, logged as a warning. Malformed JSON or a half-set
/// record: `Guide::Unset`, logged as an error so an operator can fix the file.
pub fn load(path: &Path) -> Guide {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Guide config file not found: {}. No guide is set.", path.display());
            return Guide::Unset;
        }
        Err(e) => {
            error!("Could not read guide config {}: {}", path.display(), e);
            return Guide::Unset;
        }
    };

    let record: GuideConfigFile = match serde_json::from_slice(&bytes) {
        Ok(record) => record,
        Err(e) => {
            error!("Error decoding JSON from {}: {}. Check file contents.", path.display(), e);
            return Guide::Unset;
        }
    };

    match Guide::try_from(record) {
        Ok(guide) => guide,
        Err(e) => {
            error!("Ignoring guide config {}: {}", path.display(), e);
            Guide::Unset
        }
    }
}

/// Replaces the record at `path` with `guide`.
///
/// The new content goes to a temporary file in the same directory which is then
/// renamed over the old one, so readers see either the old or the new record.
pub fn save(path: &Path, guide: &Guide) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    let body = serde_json::to_vec(&GuideConfigFile::from(guide))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&body).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
