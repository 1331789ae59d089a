//! Destinations for saved artifacts.

use std::path::{Path, PathBuf};

use crate::ExportError;
use crate::artifact::Artifact;

/// Somewhere an artifact can be saved under its file name.
pub trait ArtifactSink {
    /// Saves `artifact` and returns where it landed.
    ///
    /// # Errors
    ///
    /// * If the artifact could not be written
    fn save(&self, artifact: &Artifact) -> Result<PathBuf, ExportError>;
}

/// Writes artifacts into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    dir: PathBuf,
}

impl FileSystemSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for FileSystemSink {
    fn save(&self, artifact: &Artifact) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(artifact.file_name());
        std::fs::write(&path, artifact.bytes()).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        log::info!(
            "Saved {} ({} bytes) to {}",
            artifact.kind(),
            artifact.bytes().len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn writes_under_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemSink::new(dir.path().join("exports"));
        let at = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(17, 45, 0)
            .unwrap();
        let artifact = Artifact::pdf("rapport-fraude", at, b"%PDF-1.5".to_vec());

        let path = sink.save(&artifact).unwrap();

        assert_eq!(
            path,
            dir.path().join("exports").join("rapport-fraude-2025-03-14-1745.pdf")
        );
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.5");
    }
}
