//! Reduction of embarkment missions.
//!
//! The fraud rate of this report family is `refused / controlled`.

use fare_control_inspection_models::{EmbarkmentMission, EmbarkmentTrain};
use fare_control_stats_models::{EmbarkmentStats, rate_percent};

fn accumulate_train(stats: &mut EmbarkmentStats, train: &EmbarkmentTrain) {
    stats.train_count += 1;
    stats.controlled += u64::from(train.controlled);
    stats.refused += u64::from(train.refused);
    stats.police_presence_count += u64::from(train.police_presence);
    stats.track_crossing_count += u64::from(train.track_crossing);
    stats.control_line_crossing_count += u64::from(train.control_line_crossing);
    stats.trains_with_incident += u64::from(train.has_incident());
}

/// Statistics of a single mission.
#[must_use]
pub fn aggregate_mission(mission: &EmbarkmentMission) -> EmbarkmentStats {
    aggregate_embarkment(std::slice::from_ref(mission))
}

/// Statistics across missions.
///
/// An empty slice yields the all-zero value with a `0.0` fraud rate.
#[must_use]
pub fn aggregate_embarkment(missions: &[EmbarkmentMission]) -> EmbarkmentStats {
    let mut stats = EmbarkmentStats::default();
    for mission in missions {
        stats.mission_count += 1;
        for train in &mission.trains {
            accumulate_train(&mut stats, train);
        }
    }
    stats.fraud_rate = rate_percent(stats.refused, stats.controlled);
    stats
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fare_control_thresholds::{SeverityTier, ThresholdConfig};

    use super::*;

    fn train(number: &str, controlled: u32, refused: u32) -> EmbarkmentTrain {
        EmbarkmentTrain {
            train_number: number.to_string(),
            destination: None,
            controlled,
            refused,
            police_presence: false,
            track_crossing: false,
            control_line_crossing: false,
            comment: None,
        }
    }

    fn mission(trains: Vec<EmbarkmentTrain>) -> EmbarkmentMission {
        EmbarkmentMission {
            id: "m".to_string(),
            mission_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            station: "Marseille".to_string(),
            trains,
            comment: None,
        }
    }

    #[test]
    fn empty_is_all_zero() {
        let stats = aggregate_embarkment(&[]);
        assert_eq!(stats, EmbarkmentStats::default());
        assert!(!stats.fraud_rate.is_nan());

        let stats = aggregate_mission(&mission(vec![]));
        assert_eq!(stats.mission_count, 1);
        assert!(stats.fraud_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn ten_percent_is_high() {
        let stats = aggregate_mission(&mission(vec![train("6101", 40, 4)]));
        assert!((stats.fraud_rate - 10.0).abs() < 1e-12);
        assert_eq!(
            ThresholdConfig::default().classify(stats.fraud_rate),
            SeverityTier::High
        );
    }

    #[test]
    fn counts_incident_flags() {
        let mut a = train("1", 10, 1);
        a.police_presence = true;
        a.track_crossing = true;
        let mut b = train("2", 10, 0);
        b.control_line_crossing = true;
        let c = train("3", 0, 0);

        let stats = aggregate_embarkment(&[mission(vec![a, b]), mission(vec![c])]);
        assert_eq!(stats.mission_count, 2);
        assert_eq!(stats.train_count, 3);
        assert_eq!(stats.police_presence_count, 1);
        assert_eq!(stats.track_crossing_count, 1);
        assert_eq!(stats.control_line_crossing_count, 1);
        assert_eq!(stats.trains_with_incident, 2);
        assert!((stats.fraud_rate - 5.0).abs() < 1e-12);
    }
}
