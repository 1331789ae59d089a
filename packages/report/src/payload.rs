//! Inspection report payload.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use fare_control_inspection_models::{CategoryGroup, InspectionRecord, LocationType};
use fare_control_stats::{aggregate_extended, weekly_trend};
use fare_control_stats_models::{CategoryLine, ExtendedStats, TrendPoint, rate_percent};
use serde::Serialize;

use crate::{ReportError, format::date_range_label, format::is_category_empty};

const DEFAULT_TITLE: &str = "Rapport de lutte anti-fraude";
const DEFAULT_SUBJECT: &str = "rapport-fraude";

/// Label of the line holding a group's count not attributed to any
/// sub-category.
pub const UNCLASSIFIED_LABEL: &str = "Non ventilé";

/// Per-record projection used by detail tables.
///
/// The fraud count here includes identity-check failures, which the
/// aggregate figures do not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    /// Source record id.
    pub id: String,
    /// Control date.
    pub date: NaiveDate,
    /// Control time.
    pub time: NaiveTime,
    /// Where the control took place.
    pub location_type: LocationType,
    /// Raw location name.
    pub location: String,
    /// Display label: the route for trains, the location otherwise.
    pub place_label: String,
    pub train_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Controlling agent, if recorded.
    pub agent_name: Option<String>,
    /// Passengers checked.
    pub passengers: u64,
    /// Passengers found in order.
    pub en_regle: u64,
    /// Fares collected on the spot.
    pub tarifs_controle: u64,
    /// Penalty notices issued.
    pub pv: u64,
    /// Failed identity checks.
    pub ri_negative: u64,
    /// Fraud count including identity-check failures.
    pub fraud_count: u64,
    /// `fraud_count` over `passengers`, in percent.
    pub fraud_rate: f64,
}

impl From<&InspectionRecord> for RecordRow {
    fn from(record: &InspectionRecord) -> Self {
        let passengers = u64::from(record.nb_passagers);
        let fraud_count = record.fraud_count_with_identity_failures();

        Self {
            id: record.id.clone(),
            date: record.control_date,
            time: record.control_time,
            location_type: record.location_type,
            location: record.location.clone(),
            place_label: record.place_label(),
            train_number: record.train_number.clone(),
            origin: record.origin.clone(),
            destination: record.destination.clone(),
            agent_name: record.agent_name.clone(),
            passengers,
            en_regle: u64::from(record.nb_en_regle),
            tarifs_controle: u64::from(record.tarifs_controle),
            pv: u64::from(record.pv),
            ri_negative: u64::from(record.ri_negative),
            fraud_count,
            fraud_rate: rate_percent(fraud_count, passengers),
        }
    }
}

/// Immutable input of every inspection renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    title: String,
    subject: String,
    date_range_label: String,
    location_label: Option<String>,
    generated_at: NaiveDateTime,
    stats: ExtendedStats,
    trend: Option<Vec<TrendPoint>>,
    rows: Vec<RecordRow>,
}

impl ReportPayload {
    /// Starts a payload over the given records.
    #[must_use]
    pub fn builder(records: &[InspectionRecord]) -> ReportPayloadBuilder<'_> {
        ReportPayloadBuilder::new(records)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Short slug used for artifact file names and the mail subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn date_range_label(&self) -> &str {
        &self.date_range_label
    }

    #[must_use]
    pub fn location_label(&self) -> Option<&str> {
        self.location_label.as_deref()
    }

    #[must_use]
    pub const fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    #[must_use]
    pub const fn stats(&self) -> &ExtendedStats {
        &self.stats
    }

    /// Weekly trend, when requested at build time.
    #[must_use]
    pub fn trend(&self) -> Option<&[TrendPoint]> {
        self.trend.as_deref()
    }

    /// Detail rows, in input order.
    #[must_use]
    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    #[must_use]
    pub const fn record_count(&self) -> u64 {
        self.stats.summary.record_count
    }

    /// Lines of a category group that survive the empty-category filter.
    #[must_use]
    pub fn visible_lines(&self, group: CategoryGroup) -> Vec<&CategoryLine> {
        self.stats
            .breakdown(group)
            .map(|breakdown| {
                breakdown
                    .lines
                    .iter()
                    .filter(|line| !is_category_empty(line.count, line.amount))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count declared for a group, the same figure the summary shows.
    ///
    /// Tarifs contrôle and procès-verbaux use the records' own totals,
    /// which may exceed the sum of their sub-categories. Tarifs bord has no
    /// declared total and sums its lines.
    #[must_use]
    pub fn group_total(&self, group: CategoryGroup) -> u64 {
        let summary = &self.stats.summary;
        let classified = self.classified_count(group);
        match group {
            CategoryGroup::TarifsControle => summary.tarifs_controle.max(classified),
            CategoryGroup::ProcesVerbaux => summary.pv.max(classified),
            CategoryGroup::TarifsBord => classified,
        }
    }

    fn classified_count(&self, group: CategoryGroup) -> u64 {
        self.stats
            .breakdown(group)
            .map_or(0, |breakdown| breakdown.total_count)
    }

    /// Part of [`Self::group_total`] not attributed to any sub-category.
    #[must_use]
    pub fn unclassified_count(&self, group: CategoryGroup) -> u64 {
        self.group_total(group) - self.classified_count(group)
    }

    /// Rows whose fraud count is non-zero, highest rate first, each paired
    /// with its position in [`Self::rows`].
    ///
    /// Ties keep input order.
    #[must_use]
    pub fn most_sensitive(&self, limit: usize) -> Vec<(usize, &RecordRow)> {
        let mut rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.fraud_count > 0)
            .collect::<Vec<_>>();
        rows.sort_by(|(_, a), (_, b)| b.fraud_rate.total_cmp(&a.fraud_rate));
        rows.truncate(limit);
        rows
    }
}

/// Builder for [`ReportPayload`].
#[derive(Debug, Clone)]
pub struct ReportPayloadBuilder<'a> {
    records: &'a [InspectionRecord],
    title: Option<String>,
    subject: Option<String>,
    date_range: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    date_range_label: Option<String>,
    location: Option<String>,
    with_weekly_trend: bool,
    generated_at: Option<NaiveDateTime>,
}

impl<'a> ReportPayloadBuilder<'a> {
    const fn new(records: &'a [InspectionRecord]) -> Self {
        Self {
            records,
            title: None,
            subject: None,
            date_range: None,
            date_range_label: None,
            location: None,
            with_weekly_trend: false,
            generated_at: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Selected period; the label is derived from it.
    #[must_use]
    pub const fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_range = Some((from, to));
        self
    }

    /// Overrides the period label verbatim.
    #[must_use]
    pub fn date_range_label(mut self, label: impl Into<String>) -> Self {
        self.date_range_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub const fn with_weekly_trend(mut self, enabled: bool) -> Self {
        self.with_weekly_trend = enabled;
        self
    }

    #[must_use]
    pub const fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    fn observed_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let dates = self.records.iter().map(|r| r.control_date);
        (dates.clone().min(), dates.max())
    }

    /// Aggregates the records and freezes the payload.
    ///
    /// # Errors
    ///
    /// * [`ReportError::EmptyInput`] if there are no records
    pub fn build(self) -> Result<ReportPayload, ReportError> {
        if self.records.is_empty() {
            return Err(ReportError::EmptyInput {
                what: "aucun contrôle dans la sélection",
            });
        }

        let date_range_label = match (&self.date_range_label, self.date_range) {
            (Some(label), _) => label.clone(),
            (None, Some((from, to))) => date_range_label(from, to),
            (None, None) => {
                let (from, to) = self.observed_range();
                date_range_label(from, to)
            }
        };

        let stats = aggregate_extended(self.records);
        let trend = self.with_weekly_trend.then(|| weekly_trend(self.records));
        let rows = self.records.iter().map(RecordRow::from).collect();

        log::debug!(
            "build: {} records, fraud rate {:.2}%",
            stats.summary.record_count,
            stats.summary.fraud_rate
        );

        Ok(ReportPayload {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            subject: self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            date_range_label,
            location_label: self.location,
            generated_at: self
                .generated_at
                .unwrap_or_else(|| Local::now().naive_local()),
            stats,
            trend,
            rows,
        })
    }
}
