//! Admin settings file.
//!
//! ```toml
//! [thresholds]
//! low = 5.0
//! medium = 10.0
//! ```

use std::path::{Path, PathBuf};

use fare_control_thresholds::{ThresholdConfig, ThresholdError, set_thresholds};

/// Errors that can occur while loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("Failed to read settings file {}: {source}", path.display())]
    Read {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was read but its content is invalid.
    #[error(transparent)]
    Thresholds(#[from] ThresholdError),
}

/// Reads the thresholds from a settings file.
///
/// # Errors
///
/// * [`SettingsError::Read`] if the file cannot be read
/// * [`SettingsError::Thresholds`] if it does not hold valid thresholds
pub fn load_settings(path: &Path) -> Result<ThresholdConfig, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ThresholdConfig::from_toml_str(&content)?)
}

/// Loads a settings file and installs its thresholds process-wide.
///
/// # Errors
///
/// * If [`load_settings`] fails; the active thresholds are left untouched
pub fn apply_settings(path: &Path) -> Result<ThresholdConfig, SettingsError> {
    let config = load_settings(path)?;
    log::info!(
        "Thresholds from {}: low={} medium={}",
        path.display(),
        config.low,
        config.medium
    );
    set_thresholds(config);
    Ok(config)
}
