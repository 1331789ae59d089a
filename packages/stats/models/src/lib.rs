#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics types produced by the aggregation engine.
//!
//! These values are ephemeral: they are recomputed from records on every
//! call and never persisted. All rates are percentages and are `0.0` (never
//! `NaN`) when their denominator is zero.

use chrono::NaiveDate;
use fare_control_inspection_models::{Category, CategoryGroup, LocationType};
use serde::{Deserialize, Serialize};

/// `numerator / denominator * 100`, or `0.0` when the denominator is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Flat summary statistics over a set of inspection records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStats {
    /// Number of records reduced.
    pub record_count: u64,
    /// Passengers checked.
    pub total_passengers: u64,
    /// Passengers found compliant.
    pub total_en_regle: u64,
    /// Canonical fraud count (`tarifs_controle + pv`).
    pub fraud_count: u64,
    /// `fraud_count / total_passengers * 100`, `0.0` without passengers.
    pub fraud_rate: f64,

    /// Total on-the-spot regularizations.
    pub tarifs_controle: u64,
    pub stt_50: u64,
    pub rnv: u64,
    pub titre_tiers: u64,
    pub doc_naissance: u64,
    pub autre_tarif: u64,

    /// Total citations.
    pub pv: u64,
    pub pv_stt_100: u64,
    pub pv_absence_titre: u64,
    pub pv_titre_invalide: u64,
    pub pv_refus_controle: u64,
    pub pv_autre: u64,

    pub tarif_bord_stt_50: u64,
    pub tarif_bord_stt_100: u64,
    pub tarif_bord_rnv: u64,
    pub tarif_bord_titre_tiers: u64,
    pub tarif_bord_doc_naissance: u64,
    pub tarif_bord_autre: u64,

    /// Clean identity checks.
    pub ri_positive: u64,
    /// Failed identity checks.
    pub ri_negative: u64,
}

impl AggregatedStats {
    /// Count of the given category.
    #[must_use]
    pub const fn category_count(&self, category: Category) -> u64 {
        match category {
            Category::Stt50 => self.stt_50,
            Category::Rnv => self.rnv,
            Category::TitreTiers => self.titre_tiers,
            Category::DocNaissance => self.doc_naissance,
            Category::AutreTarif => self.autre_tarif,
            Category::Stt100 => self.pv_stt_100,
            Category::PvAbsenceTitre => self.pv_absence_titre,
            Category::PvTitreInvalide => self.pv_titre_invalide,
            Category::PvRefusControle => self.pv_refus_controle,
            Category::PvAutre => self.pv_autre,
            Category::BordStt50 => self.tarif_bord_stt_50,
            Category::BordStt100 => self.tarif_bord_stt_100,
            Category::BordRnv => self.tarif_bord_rnv,
            Category::BordTitreTiers => self.tarif_bord_titre_tiers,
            Category::BordDocNaissance => self.tarif_bord_doc_naissance,
            Category::BordAutre => self.tarif_bord_autre,
        }
    }

    /// Mutable access to the counter of the given category.
    pub const fn category_count_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Stt50 => &mut self.stt_50,
            Category::Rnv => &mut self.rnv,
            Category::TitreTiers => &mut self.titre_tiers,
            Category::DocNaissance => &mut self.doc_naissance,
            Category::AutreTarif => &mut self.autre_tarif,
            Category::Stt100 => &mut self.pv_stt_100,
            Category::PvAbsenceTitre => &mut self.pv_absence_titre,
            Category::PvTitreInvalide => &mut self.pv_titre_invalide,
            Category::PvRefusControle => &mut self.pv_refus_controle,
            Category::PvAutre => &mut self.pv_autre,
            Category::BordStt50 => &mut self.tarif_bord_stt_50,
            Category::BordStt100 => &mut self.tarif_bord_stt_100,
            Category::BordRnv => &mut self.tarif_bord_rnv,
            Category::BordTitreTiers => &mut self.tarif_bord_titre_tiers,
            Category::BordDocNaissance => &mut self.tarif_bord_doc_naissance,
            Category::BordAutre => &mut self.tarif_bord_autre,
        }
    }
}

/// Totals for the records of one [`LocationType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    /// Which location type these totals cover.
    pub location_type: LocationType,
    /// Records in this group.
    pub record_count: u64,
    /// Passengers checked in this group.
    pub passengers: u64,
    /// Canonical fraud count in this group.
    pub fraud_count: u64,
    /// Fraud rate of this group.
    pub fraud_rate: f64,
}

/// One category line of a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLine {
    /// The category.
    pub category: Category,
    /// Summed count.
    pub count: u64,
    /// Summed amount after fallback pricing; `None` for count-only
    /// categories.
    pub amount: Option<f64>,
}

/// All category lines of one [`CategoryGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// The group.
    pub group: CategoryGroup,
    /// Sum of the line counts.
    pub total_count: u64,
    /// Sum of the tracked line amounts.
    pub total_amount: f64,
    /// One line per category of the group, in report order.
    pub lines: Vec<CategoryLine>,
}

impl CategoryBreakdown {
    /// The line for `category`, if it belongs to this group.
    #[must_use]
    pub fn line(&self, category: Category) -> Option<&CategoryLine> {
        self.lines.iter().find(|line| line.category == category)
    }
}

/// Monetary totals across groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountTotals {
    /// Regularization amounts.
    pub tarifs_controle: f64,
    /// Citation amounts.
    pub proces_verbaux: f64,
    /// Sum of both.
    pub total: f64,
}

/// Summary statistics plus location grouping, breakdowns and amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedStats {
    /// Flat summary.
    pub summary: AggregatedStats,
    /// One entry per [`LocationType`], in report order.
    pub by_location: Vec<LocationStats>,
    /// One entry per [`CategoryGroup`], in report order.
    pub breakdowns: Vec<CategoryBreakdown>,
    /// Monetary totals.
    pub amounts: AmountTotals,
}

impl ExtendedStats {
    /// Breakdown of the given group.
    #[must_use]
    pub fn breakdown(&self, group: CategoryGroup) -> Option<&CategoryBreakdown> {
        self.breakdowns.iter().find(|b| b.group == group)
    }

    /// Totals of the given location type.
    #[must_use]
    pub fn location(&self, location_type: LocationType) -> Option<&LocationStats> {
        self.by_location
            .iter()
            .find(|l| l.location_type == location_type)
    }
}

/// One ISO-week bucket of the fraud-rate trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    /// Records in the bucket.
    pub record_count: u64,
    /// Passengers checked in the bucket.
    pub passengers: u64,
    /// Canonical fraud count in the bucket.
    pub fraud_count: u64,
    /// Fraud rate of the bucket.
    pub fraud_rate: f64,
}

/// Statistics over embarkment missions (or one mission).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbarkmentStats {
    /// Missions reduced.
    pub mission_count: u64,
    /// Trains gated.
    pub train_count: u64,
    /// Passengers controlled.
    pub controlled: u64,
    /// Passengers refused.
    pub refused: u64,
    /// `refused / controlled * 100`, `0.0` when nobody was controlled.
    pub fraud_rate: f64,
    /// Trains with police present.
    pub police_presence_count: u64,
    /// Trains with a track crossing.
    pub track_crossing_count: u64,
    /// Trains with a forced control line.
    pub control_line_crossing_count: u64,
    /// Trains with at least one incident flag.
    pub trains_with_incident: u64,
}
