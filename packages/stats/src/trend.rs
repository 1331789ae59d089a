//! Weekly fraud-rate trend.

use std::collections::BTreeMap;

use chrono::{Datelike as _, Duration, NaiveDate};
use fare_control_inspection_models::InspectionRecord;
use fare_control_stats_models::{TrendPoint, rate_percent};

/// Monday of the ISO week containing `date`.
#[must_use]
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Buckets records by ISO week start, ascending.
///
/// Weeks with no record are not emitted.
#[must_use]
pub fn weekly_trend(records: &[InspectionRecord]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (u64, u64, u64)> = BTreeMap::new();

    for record in records {
        let bucket = buckets
            .entry(iso_week_start(record.control_date))
            .or_insert((0, 0, 0));
        bucket.0 += 1;
        bucket.1 += u64::from(record.nb_passagers);
        bucket.2 += record.fraud_count();
    }

    buckets
        .into_iter()
        .map(
            |(week_start, (record_count, passengers, fraud_count))| TrendPoint {
                week_start,
                record_count,
                passengers,
                fraud_count,
                fraud_rate: rate_percent(fraud_count, passengers),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, Weekday};
    use fare_control_inspection_models::LocationType;

    use super::*;
    use crate::inspection::tests::record;

    fn on(date: (i32, u32, u32), passengers: u32, pv: u32) -> InspectionRecord {
        let mut r = record("t", LocationType::Train);
        r.control_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        r.nb_passagers = passengers;
        r.pv = pv;
        r
    }

    #[test]
    fn week_start_is_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        let monday = iso_week_start(sunday);
        assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(iso_week_start(monday), monday);
    }

    #[test]
    fn buckets_by_week_in_order() {
        let records = vec![
            on((2025, 3, 19), 10, 1),
            on((2025, 3, 11), 20, 2),
            on((2025, 3, 16), 30, 0),
        ];
        let trend = weekly_trend(&records);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].week_start, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(trend[0].record_count, 2);
        assert_eq!(trend[0].passengers, 50);
        assert!((trend[0].fraud_rate - 4.0).abs() < 1e-12);
        assert_eq!(trend[1].week_start, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        assert!((trend[1].fraud_rate - 10.0).abs() < 1e-12);
    }

    #[test]
    fn year_boundary_week_groups_together() {
        let records = vec![on((2024, 12, 31), 10, 0), on((2025, 1, 2), 10, 1)];
        let trend = weekly_trend(&records);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].week_start, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
    }

    #[test]
    fn empty_trend() {
        assert!(weekly_trend(&[]).is_empty());
    }
}
