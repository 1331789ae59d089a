//! Platform-embarkment mission records.
//!
//! A mission is a session at one station where agents gate boarding for a
//! series of trains. Its fraud rate is `refused / controlled`, which is a
//! different report family from [`crate::InspectionRecord`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One train gated during an embarkment mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbarkmentTrain {
    /// Train number.
    pub train_number: String,
    /// Destination, when known.
    #[serde(default)]
    pub destination: Option<String>,
    /// Passengers controlled at the gate.
    #[serde(default)]
    pub controlled: u32,
    /// Passengers refused boarding.
    #[serde(default)]
    pub refused: u32,
    /// Police were present.
    #[serde(default)]
    pub police_presence: bool,
    /// Someone crossed the tracks.
    #[serde(default)]
    pub track_crossing: bool,
    /// Someone forced the control line.
    #[serde(default)]
    pub control_line_crossing: bool,
    /// Free-text comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl EmbarkmentTrain {
    /// Whether any incident flag is set on this train.
    #[must_use]
    pub const fn has_incident(&self) -> bool {
        self.police_presence || self.track_crossing || self.control_line_crossing
    }
}

/// One embarkment mission: a date, a station and the trains gated there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbarkmentMission {
    /// Backend identifier.
    pub id: String,
    /// Mission date.
    pub mission_date: NaiveDate,
    /// Station where the mission took place.
    pub station: String,
    /// Trains gated, in the order they were logged.
    #[serde(default)]
    pub trains: Vec<EmbarkmentTrain>,
    /// Mission-level comment.
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_flags() {
        let mission: EmbarkmentMission = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "missionDate": "2025-03-10",
            "station": "Marseille",
            "trains": [
                { "trainNumber": "6101", "controlled": 40, "refused": 4, "policePresence": true }
            ]
        }))
        .unwrap();
        assert_eq!(mission.trains.len(), 1);
        assert!(mission.trains[0].police_presence);
        assert!(!mission.trains[0].track_crossing);
        assert!(mission.trains[0].has_incident());
        assert_eq!(mission.comment, None);
    }
}
