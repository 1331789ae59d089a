//! JSON record exports.

use std::path::{Path, PathBuf};

use fare_control_inspection_models::{EmbarkmentMission, InspectionRecord};
use serde::de::DeserializeOwned;

/// Errors that can occur while reading an input file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let items: Vec<T> = serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("load: {} entries from {}", items.len(), path.display());
    Ok(items)
}

/// Reads a JSON array of inspection records.
///
/// # Errors
///
/// * If the file cannot be read or is not an array of records
pub fn load_records(path: &Path) -> Result<Vec<InspectionRecord>, InputError> {
    load(path)
}

/// Reads a JSON array of embarkment missions.
///
/// # Errors
///
/// * If the file cannot be read or is not an array of missions
pub fn load_missions(path: &Path) -> Result<Vec<EmbarkmentMission>, InputError> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counters_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "a",
                "control_date": "2025-03-10",
                "control_time": "08:30",
                "location_type": "train",
                "location": "Lyon",
                "nb_passagers": 12
            }]"#,
        )
        .unwrap();

        let records = load_records(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nb_passagers, 12);
        assert_eq!(records[0].fraud_count(), 0);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions.json");
        std::fs::write(&path, "{").unwrap();

        let err = load_missions(&path).unwrap_err();

        assert!(matches!(err, InputError::Json { .. }));
        assert!(err.to_string().contains("missions.json"));
    }
}
