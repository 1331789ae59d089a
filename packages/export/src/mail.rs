//! Hand-off of plain-text reports to a mail client.

use std::path::{Path, PathBuf};

use fare_control_text::MailDraft;

use crate::ExportError;
use crate::artifact::slugify;

/// Opens a mail composition window pre-filled with a draft.
pub trait MailLauncher {
    /// # Errors
    ///
    /// * [`ExportError::Mail`] if the draft cannot be handed over
    /// * [`ExportError::Io`] if the launcher failed to write it
    fn launch(&self, draft: &MailDraft) -> Result<(), ExportError>;
}

/// Drops drafts as RFC 822 style `.eml` files into an outbox directory,
/// for a mail client to pick up.
#[derive(Debug, Clone)]
pub struct OutboxLauncher {
    dir: PathBuf,
}

impl OutboxLauncher {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn draft_path(&self, draft: &MailDraft) -> PathBuf {
        self.dir.join(format!("{}.eml", slugify(&draft.subject)))
    }
}

impl MailLauncher for OutboxLauncher {
    fn launch(&self, draft: &MailDraft) -> Result<(), ExportError> {
        if draft.subject.contains(['\r', '\n']) {
            return Err(ExportError::Mail(format!(
                "subject spans several lines: {:?}",
                draft.subject
            )));
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.draft_path(draft);
        let message = format!(
            "Subject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
            draft.subject,
            draft.body.replace('\n', "\r\n")
        );
        std::fs::write(&path, message).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        log::info!("Mail draft '{}' written to {}", draft.subject, path.display());
        Ok(())
    }
}
