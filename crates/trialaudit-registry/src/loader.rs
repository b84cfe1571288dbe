//! Loading registry records from disk.

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ctgov::{from_ctgov_v2, is_raw_study};
use crate::model::RegistryRecord;
use crate::RegistryError;

/// Parse one record from JSON text, accepting either the structured or the raw API form.
pub fn parse_record(json: &str, path: &Path) -> Result<RegistryRecord, RegistryError> {
    let value: Value = serde_json::from_str(json).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    record_from_value(value, path)
}

fn record_from_value(value: Value, path: &Path) -> Result<RegistryRecord, RegistryError> {
    let record = if is_raw_study(&value) {
        from_ctgov_v2(&value)
    } else {
        serde_json::from_value(value).map_err(|source| RegistryError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    if record.nct_id().trim().is_empty() {
        return Err(RegistryError::MissingIdentifier {
            path: path.to_path_buf(),
        });
    }
    Ok(record)
}

/// Load a single record file.
pub fn load_record(path: &Path) -> Result<RegistryRecord, RegistryError> {
    let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_record(&json, path)
}

/// `*.json` files directly inside `dir`, sorted by file name.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| RegistryError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every record in `dir`.
///
/// Files are read in file-name order. Files that parse as JSON but carry no trial identifier
/// are skipped; when two files describe the same trial the first one wins.
pub fn load_directory(dir: &Path) -> Result<Vec<RegistryRecord>, RegistryError> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for path in json_files(dir)? {
        let record = match load_record(&path) {
            Ok(record) => record,
            Err(RegistryError::MissingIdentifier { path }) => {
                tracing::warn!(path = %path.display(), "skipping file without a trial identifier");
                continue;
            }
            Err(RegistryError::Json { path, source }) if source.is_data() => {
                tracing::warn!(path = %path.display(), error = %source, "skipping non-record JSON");
                continue;
            }
            Err(err) => return Err(err),
        };

        if !seen.insert(record.nct_id().to_string()) {
            tracing::debug!(
                nct_id = record.nct_id(),
                path = %path.display(),
                "duplicate registry record ignored"
            );
            continue;
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(RegistryError::NoRecords {
            dir: dir.to_path_buf(),
        });
    }

    tracing::info!(dir = %dir.display(), records = records.len(), "loaded registry records");
    Ok(records)
}
