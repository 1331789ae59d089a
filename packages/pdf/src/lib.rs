#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Paginated PDF rendering of report payloads.
//!
//! Documents are laid out on an in-memory [`canvas::Canvas`] by the
//! [`layout`] state machine, then serialised by [`writer::to_pdf_bytes`].
//! Every figure comes from the payload; nothing is re-aggregated here.

pub mod canvas;
pub mod embarkment;
pub mod inspection;
pub mod layout;
pub mod table;
pub mod writer;

use canvas::PageSize;
use chrono::NaiveDateTime;
use fare_control_report::format::format_timestamp;
use strum_macros::{AsRefStr, Display, EnumString};

pub use embarkment::{render_embarkment, render_grouped_embarkment};
pub use inspection::render_inspection;
pub use writer::to_pdf_bytes;

/// Errors that can occur while producing a PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Nothing to draw.
    #[error("Aucune donnée à exporter : {0}")]
    EmptyInput(&'static str),

    /// The page model could not be turned into PDF bytes.
    #[error("PDF serialisation error: {0}")]
    Serialize(String),
}

/// Page orientation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Orientation {
    /// Landscape for more than ten rows or when the statistics sections
    /// are included, portrait otherwise.
    #[default]
    Auto,
    /// A4, 210mm wide.
    Portrait,
    /// A4, 297mm wide.
    Landscape,
}

/// Row count above which [`Orientation::Auto`] turns landscape.
pub const AUTO_LANDSCAPE_ROWS: u64 = 10;

impl Orientation {
    #[must_use]
    pub const fn page_size(self, rows: u64, include_stats: bool) -> PageSize {
        match self {
            Self::Portrait => PageSize::PORTRAIT,
            Self::Landscape => PageSize::LANDSCAPE,
            Self::Auto => {
                if rows > AUTO_LANDSCAPE_ROWS || include_stats {
                    PageSize::LANDSCAPE
                } else {
                    PageSize::PORTRAIT
                }
            }
        }
    }
}

/// Rendering options for inspection and mission documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdfOptions {
    /// Requested orientation, resolved per document.
    pub orientation: Orientation,
    /// Adds the location, category, amount and trend sections.
    pub include_stats: bool,
}

pub(crate) fn footer_stamp(generated_at: NaiveDateTime) -> String {
    format!("Généré le {}", format_timestamp(generated_at))
}
