//! Reduction of [`InspectionRecord`]s into [`AggregatedStats`] and
//! [`ExtendedStats`].

use std::collections::BTreeMap;

use fare_control_inspection_models::{Category, CategoryGroup, InspectionRecord, LocationType};
use fare_control_stats_models::{
    AggregatedStats, AmountTotals, CategoryBreakdown, CategoryLine, ExtendedStats, LocationStats,
    rate_percent,
};

/// Records split by [`LocationType`].
///
/// The three lists are disjoint and their lengths sum to the input length.
#[derive(Debug, Default)]
pub struct LocationGroups<'a> {
    /// Onboard inspections.
    pub train: Vec<&'a InspectionRecord>,
    /// Station inspections.
    pub station: Vec<&'a InspectionRecord>,
    /// Platform inspections.
    pub platform: Vec<&'a InspectionRecord>,
}

impl<'a> LocationGroups<'a> {
    /// Records of the given location type.
    #[must_use]
    pub fn get(&self, location_type: LocationType) -> &[&'a InspectionRecord] {
        match location_type {
            LocationType::Train => &self.train,
            LocationType::Station => &self.station,
            LocationType::Platform => &self.platform,
        }
    }

    /// Total number of grouped records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.station.len() + self.platform.len()
    }

    /// Whether no record was grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits records by location type, preserving input order within a group.
#[must_use]
pub fn group_by_location(records: &[InspectionRecord]) -> LocationGroups<'_> {
    let mut groups = LocationGroups::default();
    for record in records {
        match record.location_type {
            LocationType::Train => groups.train.push(record),
            LocationType::Station => groups.station.push(record),
            LocationType::Platform => groups.platform.push(record),
        }
    }
    groups
}

/// Adds one record's counters into `stats`. Does not compute the rate.
fn accumulate(stats: &mut AggregatedStats, record: &InspectionRecord) {
    stats.record_count += 1;
    stats.total_passengers += u64::from(record.nb_passagers);
    stats.total_en_regle += u64::from(record.nb_en_regle);
    stats.tarifs_controle += u64::from(record.tarifs_controle);
    stats.pv += u64::from(record.pv);
    stats.fraud_count += record.fraud_count();
    stats.ri_positive += u64::from(record.ri_positive);
    stats.ri_negative += u64::from(record.ri_negative);

    for category in Category::all() {
        *stats.category_count_mut(*category) += u64::from(record.count(*category));
    }
}

/// Reduces records into flat summary statistics.
///
/// An empty slice yields the all-zero value with a `0.0` fraud rate.
#[must_use]
pub fn aggregate(records: &[InspectionRecord]) -> AggregatedStats {
    let mut stats = AggregatedStats::default();
    for record in records {
        accumulate(&mut stats, record);
    }
    stats.fraud_rate = rate_percent(stats.fraud_count, stats.total_passengers);
    stats
}

#[derive(Default)]
struct LocationAccum {
    record_count: u64,
    passengers: u64,
    fraud_count: u64,
}

/// Applies the fixed-price fallback to an accumulated amount.
///
/// When nothing was stored for the category but infractions were counted,
/// the amount is imputed as `count × unit price`.
fn priced_amount(category: Category, stored_total: f64, count: u64) -> f64 {
    match category.fallback_unit_price() {
        #[allow(clippy::cast_precision_loss)]
        Some(unit_price) if stored_total == 0.0 && count > 0 => count as f64 * unit_price,
        _ => stored_total,
    }
}

/// Reduces records into summary statistics, location grouping, category
/// breakdowns and monetary totals, in a single pass over the input.
///
/// Missing or non-finite amounts count as 0. Fixed-price categories whose
/// accumulated amount is 0 while their count is not get the fallback price
/// applied to the total (the records themselves are left untouched).
#[must_use]
pub fn aggregate_extended(records: &[InspectionRecord]) -> ExtendedStats {
    let mut summary = AggregatedStats::default();
    let mut locations: BTreeMap<LocationType, LocationAccum> = LocationType::all()
        .iter()
        .map(|lt| (*lt, LocationAccum::default()))
        .collect();
    let mut stored_amounts: BTreeMap<Category, f64> = BTreeMap::new();

    for record in records {
        accumulate(&mut summary, record);

        let entry = locations.entry(record.location_type).or_default();
        entry.record_count += 1;
        entry.passengers += u64::from(record.nb_passagers);
        entry.fraud_count += record.fraud_count();

        for category in Category::all().iter().filter(|c| c.tracks_amount()) {
            *stored_amounts.entry(*category).or_insert(0.0) +=
                record.amount(*category).unwrap_or(0.0);
        }
    }

    summary.fraud_rate = rate_percent(summary.fraud_count, summary.total_passengers);

    let by_location = LocationType::all()
        .iter()
        .map(|lt| {
            let accum = locations.remove(lt).unwrap_or_default();
            LocationStats {
                location_type: *lt,
                record_count: accum.record_count,
                passengers: accum.passengers,
                fraud_count: accum.fraud_count,
                fraud_rate: rate_percent(accum.fraud_count, accum.passengers),
            }
        })
        .collect();

    let breakdowns: Vec<CategoryBreakdown> = CategoryGroup::all()
        .iter()
        .map(|group| {
            let lines: Vec<CategoryLine> = Category::for_group(*group)
                .into_iter()
                .map(|category| {
                    let count = summary.category_count(category);
                    let amount = category.tracks_amount().then(|| {
                        let stored = stored_amounts.get(&category).copied().unwrap_or(0.0);
                        priced_amount(category, stored, count)
                    });
                    CategoryLine {
                        category,
                        count,
                        amount,
                    }
                })
                .collect();

            CategoryBreakdown {
                group: *group,
                total_count: lines.iter().map(|l| l.count).sum(),
                total_amount: lines.iter().filter_map(|l| l.amount).sum(),
                lines,
            }
        })
        .collect();

    let group_amount = |group: CategoryGroup| {
        breakdowns
            .iter()
            .find(|b| b.group == group)
            .map_or(0.0, |b| b.total_amount)
    };
    let tarifs_controle = group_amount(CategoryGroup::TarifsControle);
    let proces_verbaux = group_amount(CategoryGroup::ProcesVerbaux);

    log::debug!(
        "Aggregated {} records: {} passengers, {} frauds ({:.3}%)",
        summary.record_count,
        summary.total_passengers,
        summary.fraud_count,
        summary.fraud_rate
    );

    ExtendedStats {
        summary,
        by_location,
        breakdowns,
        amounts: AmountTotals {
            tarifs_controle,
            proces_verbaux,
            total: tarifs_controle + proces_verbaux,
        },
    }
}
