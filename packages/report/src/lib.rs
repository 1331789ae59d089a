#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report payload assembly.
//!
//! A [`ReportPayload`] (or [`EmbarkmentPayload`]) bundles the aggregated
//! statistics with their presentation metadata. It is built once, from the
//! raw records, and is the only input any renderer accepts: renderers never
//! see raw records and never re-aggregate, so the paginated document, the
//! hypertext report and the plain-text report cannot disagree on a number.
//!
//! The [`format`] module holds the numeric and date formatting contracts
//! and the shared [`format::is_category_empty`] predicate.

pub mod embarkment;
pub mod format;
pub mod payload;

pub use embarkment::{
    EmbarkmentPayload, EmbarkmentPayloadBuilder, GroupedEmbarkmentPayload, MissionSection, TrainRow,
};
pub use payload::{RecordRow, ReportPayload, ReportPayloadBuilder, UNCLASSIFIED_LABEL};

use thiserror::Error;

/// Errors that can occur while assembling a payload.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The selection holds nothing to report on.
    ///
    /// Callers surface this as a notification, not as a failure.
    #[error("Aucune donnée à exporter : {what}")]
    EmptyInput {
        /// What was missing, phrased for the end user.
        what: &'static str,
    },
}

impl ReportError {
    /// Whether this is the user-facing "nothing to export" condition.
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput { .. })
    }
}
