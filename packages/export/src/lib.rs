#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Download and preview dispatch of rendered artifacts.
//!
//! A download saves the artifact through an [`ArtifactSink`]. If saving
//! fails the same bytes are opened as a preview handle instead, so a
//! failed save never costs a second render.

pub mod artifact;
pub mod mail;
pub mod preview;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;

pub use artifact::{Artifact, ArtifactKind};
pub use mail::{MailLauncher, OutboxLauncher};
pub use preview::{DOWNLOAD_RELEASE, PREVIEW_RELEASE, PreviewHandle, PreviewRegistry};
pub use sink::{ArtifactSink, FileSystemSink};

/// Errors that can occur while handing an artifact over.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing to disk failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The mail client refused the draft.
    #[error("Mail launch failed: {0}")]
    Mail(String),
}

/// How the caller wants the artifact delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    #[default]
    Download,
    Preview,
}

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Saved to `path`; `handle` stays readable for [`DOWNLOAD_RELEASE`].
    Saved {
        path: PathBuf,
        handle: PreviewHandle,
    },
    /// Opened in memory for [`PREVIEW_RELEASE`].
    Preview(PreviewHandle),
}

/// Delivers `artifact`, falling back to a preview when saving fails.
pub fn dispatch(
    artifact: Artifact,
    mode: DispatchMode,
    sink: &dyn ArtifactSink,
    previews: &PreviewRegistry,
) -> Dispatched {
    let artifact = Arc::new(artifact);

    if mode == DispatchMode::Preview {
        return Dispatched::Preview(previews.open(artifact, PREVIEW_RELEASE));
    }

    match sink.save(&artifact) {
        Ok(path) => {
            let handle = previews.open(artifact, DOWNLOAD_RELEASE);
            Dispatched::Saved { path, handle }
        }
        Err(e) => {
            log::warn!(
                "Could not save {}, opening it as a preview instead: {e}",
                artifact.file_name()
            );
            Dispatched::Preview(previews.open(artifact, PREVIEW_RELEASE))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn save(&self, artifact: &Artifact) -> Result<PathBuf, ExportError> {
            Err(ExportError::Io {
                path: PathBuf::from(artifact.file_name()),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn artifact() -> Artifact {
        let at = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Artifact::pdf("rapport-fraude", at, b"%PDF-1.5 body".to_vec())
    }

    #[test]
    fn save_failure_falls_back_to_preview() {
        let previews = PreviewRegistry::new();

        let Dispatched::Preview(handle) =
            dispatch(artifact(), DispatchMode::Download, &FailingSink, &previews)
        else {
            panic!("expected a preview");
        };

        assert_eq!(handle.file_name, "rapport-fraude-2025-03-14-0900.pdf");
        assert_eq!(handle.mime, "application/pdf");
        assert_eq!(
            previews.get(handle.id).unwrap().bytes(),
            b"%PDF-1.5 body"
        );
    }

    #[test]
    fn download_saves_and_keeps_short_handle() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemSink::new(dir.path());
        let previews = PreviewRegistry::new();

        let Dispatched::Saved { path, handle } =
            dispatch(artifact(), DispatchMode::Download, &sink, &previews)
        else {
            panic!("expected a saved artifact");
        };

        assert!(path.exists());
        assert!(previews.release(handle.id));
        assert!(!previews.release(handle.id));
    }

    #[test]
    fn preview_mode_skips_sink() {
        let previews = PreviewRegistry::new();
        let dispatched = dispatch(artifact(), DispatchMode::Preview, &FailingSink, &previews);

        assert!(matches!(dispatched, Dispatched::Preview(_)));
        assert_eq!(previews.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_preview_expires() {
        let previews = PreviewRegistry::new();
        let Dispatched::Preview(handle) =
            dispatch(artifact(), DispatchMode::Download, &FailingSink, &previews)
        else {
            panic!("expected a preview");
        };

        tokio::time::sleep(PREVIEW_RELEASE + std::time::Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(previews.get(handle.id).is_none());
    }
}
