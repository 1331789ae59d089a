#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Drives the report engine from the command line.
//!
//! Records come from JSON exports, thresholds from an optional TOML
//! settings file. Every render takes a single threshold snapshot and the
//! resulting artifact goes through the export dispatch.

pub mod input;
pub mod settings;

use chrono::{NaiveDate, NaiveDateTime};
use fare_control_export::Artifact;
use fare_control_html::{HtmlError, render_embarkment_html, render_inspection_html};
use fare_control_inspection_models::{EmbarkmentMission, InspectionRecord};
use fare_control_pdf::{
    PdfError, PdfOptions, render_embarkment, render_grouped_embarkment, render_inspection,
};
use fare_control_report::{
    EmbarkmentPayload, GroupedEmbarkmentPayload, ReportError, ReportPayload,
};
use fare_control_text::{MailDraft, mail_draft};
use fare_control_thresholds::ThresholdConfig;
use strum_macros::{AsRefStr, Display, EnumString};

pub use input::{InputError, load_missions, load_records};
pub use settings::{SettingsError, apply_settings, load_settings};

/// Errors surfaced by the command-line driver.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Export(#[from] fare_control_export::ExportError),

    #[error("The {format} format is not available for {what}")]
    UnsupportedFormat {
        format: OutputFormat,
        what: &'static str,
    },
}

impl CliError {
    /// Whether the error only means there was nothing to export.
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        matches!(
            self,
            Self::Report(ReportError::EmptyInput { .. })
                | Self::Pdf(PdfError::EmptyInput(_))
                | Self::Html(HtmlError::EmptyInput(_))
        )
    }
}

/// Report renderer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
    Text,
}

/// Metadata attached to a payload.
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub generated_at: Option<NaiveDateTime>,
}

/// What an inspection render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A file to save or preview.
    Artifact(Artifact),
    /// A message for the mail launcher.
    Mail(MailDraft),
}

/// Builds the inspection payload with `meta` applied.
///
/// # Errors
///
/// * [`ReportError::EmptyInput`] if `records` is empty
pub fn inspection_payload(
    records: &[InspectionRecord],
    meta: &ReportMeta,
) -> Result<ReportPayload, ReportError> {
    let mut builder = ReportPayload::builder(records).with_weekly_trend(true);
    if let Some(title) = &meta.title {
        builder = builder.title(title.as_str());
    }
    if let Some(subject) = &meta.subject {
        builder = builder.subject(subject.as_str());
    }
    if let Some(location) = &meta.location {
        builder = builder.location(location.as_str());
    }
    if meta.from.is_some() || meta.to.is_some() {
        builder = builder.date_range(meta.from, meta.to);
    }
    if let Some(at) = meta.generated_at {
        builder = builder.generated_at(at);
    }
    builder.build()
}

/// Renders an inspection report in `format`.
///
/// # Errors
///
/// * If the payload cannot be built or the renderer fails
pub fn render_inspection_output(
    records: &[InspectionRecord],
    format: OutputFormat,
    meta: &ReportMeta,
    pdf: &PdfOptions,
    thresholds: &ThresholdConfig,
) -> Result<Output, CliError> {
    let payload = inspection_payload(records, meta)?;
    let subject = payload.subject().to_string();
    let at = payload.generated_at();

    Ok(match format {
        OutputFormat::Pdf => Output::Artifact(Artifact::pdf(
            subject,
            at,
            render_inspection(&payload, thresholds, pdf)?,
        )),
        OutputFormat::Html => Output::Artifact(Artifact::html(
            subject,
            at,
            render_inspection_html(&payload, thresholds)?,
        )),
        OutputFormat::Text => Output::Mail(mail_draft(&payload, thresholds)?),
    })
}

/// Renders embarkment missions.
///
/// `grouped` yields one PDF covering every mission in the given order;
/// otherwise each mission becomes its own artifact.
///
/// # Errors
///
/// * [`CliError::UnsupportedFormat`] for text, or grouped HTML
/// * If a payload cannot be built or a renderer fails
pub fn render_embarkment_artifacts(
    missions: &[EmbarkmentMission],
    format: OutputFormat,
    grouped: bool,
    meta: &ReportMeta,
    pdf: &PdfOptions,
    thresholds: &ThresholdConfig,
) -> Result<Vec<Artifact>, CliError> {
    match (format, grouped) {
        (OutputFormat::Text, _) => {
            return Err(CliError::UnsupportedFormat {
                format,
                what: "embarkment missions",
            });
        }
        (OutputFormat::Html, true) => {
            return Err(CliError::UnsupportedFormat {
                format,
                what: "grouped embarkment missions",
            });
        }
        (OutputFormat::Pdf, true) => {
            let mut builder = GroupedEmbarkmentPayload::builder(missions);
            if let Some(title) = &meta.title {
                builder = builder.title(title.as_str());
            }
            if let Some(subject) = &meta.subject {
                builder = builder.subject(subject.as_str());
            }
            if let Some(at) = meta.generated_at {
                builder = builder.generated_at(at);
            }
            let payload = builder.build_grouped()?;
            let bytes = render_grouped_embarkment(&payload, thresholds, pdf)?;
            return Ok(vec![Artifact::pdf(
                payload.subject(),
                payload.generated_at(),
                bytes,
            )]);
        }
        _ => {}
    }

    if missions.is_empty() {
        return Err(ReportError::EmptyInput {
            what: "aucune mission sélectionnée",
        }
        .into());
    }

    missions
        .iter()
        .map(|mission| {
            let mut builder = EmbarkmentPayload::builder(mission);
            if let Some(title) = &meta.title {
                builder = builder.title(title.as_str());
            }
            if let Some(at) = meta.generated_at {
                builder = builder.generated_at(at);
            }
            let base = meta.subject.as_deref().unwrap_or("mission-embarquement");
            let payload = builder
                .subject(format!("{base}-{}-{}", mission.station, mission.id))
                .build()?;

            Ok(if format == OutputFormat::Html {
                Artifact::html(
                    payload.subject(),
                    payload.generated_at(),
                    render_embarkment_html(&payload, thresholds)?,
                )
            } else {
                Artifact::pdf(
                    payload.subject(),
                    payload.generated_at(),
                    render_embarkment(&payload, thresholds, pdf)?,
                )
            })
        })
        .collect()
}
