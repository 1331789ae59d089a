//! Rendered artifacts and their file names.

use chrono::NaiveDateTime;
use strum_macros::{AsRefStr, Display, EnumString};

/// Output format of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    Pdf,
    Html,
    Text,
}

impl ArtifactKind {
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Html => "text/html; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }

    /// Whether the file name carries the generation time as well as the date.
    #[must_use]
    pub const fn is_timestamped(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// A finished render waiting to be saved or previewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    kind: ArtifactKind,
    subject: String,
    generated_at: NaiveDateTime,
    bytes: Vec<u8>,
}

impl Artifact {
    #[must_use]
    pub fn new(
        kind: ArtifactKind,
        subject: impl Into<String>,
        generated_at: NaiveDateTime,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            generated_at,
            bytes,
        }
    }

    #[must_use]
    pub fn pdf(subject: impl Into<String>, generated_at: NaiveDateTime, bytes: Vec<u8>) -> Self {
        Self::new(ArtifactKind::Pdf, subject, generated_at, bytes)
    }

    #[must_use]
    pub fn html(subject: impl Into<String>, generated_at: NaiveDateTime, html: String) -> Self {
        Self::new(ArtifactKind::Html, subject, generated_at, html.into_bytes())
    }

    #[must_use]
    pub fn text(subject: impl Into<String>, generated_at: NaiveDateTime, text: String) -> Self {
        Self::new(ArtifactKind::Text, subject, generated_at, text.into_bytes())
    }

    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `<subject>-<YYYY-MM-DD>[-HHmm].<ext>`, the time part only for PDFs.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stamp = if self.kind.is_timestamped() {
            self.generated_at.format("%Y-%m-%d-%H%M")
        } else {
            self.generated_at.format("%Y-%m-%d")
        };
        format!(
            "{}-{stamp}.{}",
            slugify(&self.subject),
            self.kind.extension()
        )
    }
}

/// Lowercases `subject` and collapses anything that is not alphanumeric into
/// single dashes.
#[must_use]
pub fn slugify(subject: &str) -> String {
    let mut slug = String::with_capacity(subject.len());
    for c in subject.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "rapport".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    #[test]
    fn pdf_name_carries_time() {
        let artifact = Artifact::pdf("rapport-fraude", at(), vec![]);
        assert_eq!(artifact.file_name(), "rapport-fraude-2025-03-14-0905.pdf");
    }

    #[test]
    fn html_name_is_date_only() {
        let artifact = Artifact::html("rapport-fraude", at(), String::new());
        assert_eq!(artifact.file_name(), "rapport-fraude-2025-03-14.html");
        assert_eq!(artifact.kind().mime(), "text/html; charset=utf-8");
    }

    #[test]
    fn subject_is_slugified() {
        assert_eq!(slugify("Mission  Nice / Gare"), "mission-nice-gare");
        assert_eq!(slugify("Contrôle été"), "contrôle-été");
        assert_eq!(slugify(" -- "), "rapport");
    }
}
