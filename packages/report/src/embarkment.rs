//! Embarkment mission payloads.
//!
//! A single-mission payload feeds the per-mission document and hypertext
//! report; a grouped payload feeds the multi-mission document, whose
//! missions stay in the order the caller supplied them.

use chrono::{Local, NaiveDate, NaiveDateTime};
use fare_control_inspection_models::{EmbarkmentMission, EmbarkmentTrain};
use fare_control_stats::{aggregate_embarkment, aggregate_mission};
use fare_control_stats_models::{EmbarkmentStats, rate_percent};
use serde::Serialize;

use crate::ReportError;

const DEFAULT_TITLE: &str = "Rapport de mission embarquement";
const DEFAULT_SUBJECT: &str = "mission-embarquement";

/// One train of a mission, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRow {
    pub train_number: String,
    pub destination: Option<String>,
    pub controlled: u64,
    pub refused: u64,
    pub fraud_rate: f64,
    pub police_presence: bool,
    pub track_crossing: bool,
    pub control_line_crossing: bool,
    pub comment: Option<String>,
}

impl From<&EmbarkmentTrain> for TrainRow {
    fn from(train: &EmbarkmentTrain) -> Self {
        let controlled = u64::from(train.controlled);
        let refused = u64::from(train.refused);
        Self {
            train_number: train.train_number.clone(),
            destination: train.destination.clone(),
            controlled,
            refused,
            fraud_rate: rate_percent(refused, controlled),
            police_presence: train.police_presence,
            track_crossing: train.track_crossing,
            control_line_crossing: train.control_line_crossing,
            comment: train.comment.clone(),
        }
    }
}

impl TrainRow {
    /// Incident labels raised on this train.
    #[must_use]
    pub fn incidents(&self) -> Vec<&'static str> {
        [
            (self.police_presence, "Présence police"),
            (self.track_crossing, "Traversée de voies"),
            (self.control_line_crossing, "Franchissement ligne de contrôle"),
        ]
        .into_iter()
        .filter_map(|(raised, label)| raised.then_some(label))
        .collect()
    }
}

/// A mission with its own statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSection {
    pub id: String,
    pub date: NaiveDate,
    pub station: String,
    pub stats: EmbarkmentStats,
    pub trains: Vec<TrainRow>,
    pub comment: Option<String>,
}

impl From<&EmbarkmentMission> for MissionSection {
    fn from(mission: &EmbarkmentMission) -> Self {
        Self {
            id: mission.id.clone(),
            date: mission.mission_date,
            station: mission.station.clone(),
            stats: aggregate_mission(mission),
            trains: mission.trains.iter().map(TrainRow::from).collect(),
            comment: mission.comment.clone(),
        }
    }
}

/// Input of the single-mission renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbarkmentPayload {
    title: String,
    subject: String,
    generated_at: NaiveDateTime,
    mission: MissionSection,
}

impl EmbarkmentPayload {
    #[must_use]
    pub fn builder(mission: &EmbarkmentMission) -> EmbarkmentPayloadBuilder<'_> {
        EmbarkmentPayloadBuilder::new(std::slice::from_ref(mission))
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub const fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    #[must_use]
    pub const fn mission(&self) -> &MissionSection {
        &self.mission
    }

    #[must_use]
    pub const fn stats(&self) -> &EmbarkmentStats {
        &self.mission.stats
    }
}

/// Input of the grouped mission document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedEmbarkmentPayload {
    title: String,
    subject: String,
    generated_at: NaiveDateTime,
    totals: EmbarkmentStats,
    missions: Vec<MissionSection>,
}

impl GroupedEmbarkmentPayload {
    #[must_use]
    pub fn builder(missions: &[EmbarkmentMission]) -> EmbarkmentPayloadBuilder<'_> {
        EmbarkmentPayloadBuilder::new(missions)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub const fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    /// Statistics across every mission.
    #[must_use]
    pub const fn totals(&self) -> &EmbarkmentStats {
        &self.totals
    }

    /// Missions in caller order.
    #[must_use]
    pub fn missions(&self) -> &[MissionSection] {
        &self.missions
    }
}

/// Builder shared by [`EmbarkmentPayload`] and [`GroupedEmbarkmentPayload`].
#[derive(Debug, Clone)]
pub struct EmbarkmentPayloadBuilder<'a> {
    missions: &'a [EmbarkmentMission],
    title: Option<String>,
    subject: Option<String>,
    generated_at: Option<NaiveDateTime>,
}

impl<'a> EmbarkmentPayloadBuilder<'a> {
    const fn new(missions: &'a [EmbarkmentMission]) -> Self {
        Self {
            missions,
            title: None,
            subject: None,
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

    #[must_use]
    pub const fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    fn metadata(&mut self) -> (String, String, NaiveDateTime) {
        (
            self.title
                .take()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            self.subject
                .take()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            self.generated_at
                .unwrap_or_else(|| Local::now().naive_local()),
        )
    }

    /// Freezes a single-mission payload.
    ///
    /// # Errors
    ///
    /// * [`ReportError::EmptyInput`] if the mission has no train
    pub fn build(mut self) -> Result<EmbarkmentPayload, ReportError> {
        let missions = self.missions;
        let Some(mission) = missions.first().filter(|m| !m.trains.is_empty()) else {
            return Err(ReportError::EmptyInput {
                what: "aucun train dans la mission",
            });
        };

        let (title, subject, generated_at) = self.metadata();

        Ok(EmbarkmentPayload {
            title,
            subject,
            generated_at,
            mission: MissionSection::from(mission),
        })
    }

    /// Freezes a grouped payload, keeping the missions in the given order.
    ///
    /// # Errors
    ///
    /// * [`ReportError::EmptyInput`] if there is no mission
    pub fn build_grouped(mut self) -> Result<GroupedEmbarkmentPayload, ReportError> {
        if self.missions.is_empty() {
            return Err(ReportError::EmptyInput {
                what: "aucune mission sélectionnée",
            });
        }

        let totals = aggregate_embarkment(self.missions);
        let missions = self.missions.iter().map(MissionSection::from).collect();
        let (title, subject, generated_at) = self.metadata();

        log::debug!(
            "build_grouped: {} missions, {} trains",
            totals.mission_count,
            totals.train_count
        );

        Ok(GroupedEmbarkmentPayload {
            title,
            subject,
            generated_at,
            totals,
            missions,
        })
    }
}
