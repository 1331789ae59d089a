#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Inspection record types and the fare-infraction taxonomy.
//!
//! This crate defines the records supplied by the data-access layer (one
//! [`InspectionRecord`] per logged fare-control event, one
//! [`EmbarkmentMission`] per platform-embarkment mission) together with the
//! canonical infraction [`Category`] taxonomy used by every aggregation and
//! report in the workspace.
//!
//! Records are immutable once persisted: nothing downstream mutates them.

pub mod embarkment;

pub use embarkment::{EmbarkmentMission, EmbarkmentTrain};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Where an inspection took place.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationType {
    /// On board a train.
    Train,
    /// In a station concourse.
    Station,
    /// On a platform.
    Platform,
}

impl LocationType {
    /// Human-readable (French) label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Train => "Train",
            Self::Station => "Gare",
            Self::Platform => "Quai",
        }
    }

    /// Returns all variants of this enum, in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Train, Self::Station, Self::Platform]
    }
}

/// Top-level infraction groups.
///
/// Each variant maps to a set of [`Category`] entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoryGroup {
    /// On-the-spot fare regularizations (not a formal citation).
    TarifsControle,
    /// Formal citations (procès-verbaux).
    ProcesVerbaux,
    /// Onboard ticket sales.
    TarifsBord,
}

impl CategoryGroup {
    /// Human-readable (French) label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TarifsControle => "Tarifs contrôle",
            Self::ProcesVerbaux => "Procès-verbaux",
            Self::TarifsBord => "Tarifs bord",
        }
    }

    /// Returns all variants of this enum, in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::TarifsControle, Self::ProcesVerbaux, Self::TarifsBord]
    }
}

/// Specific infraction categories within each [`CategoryGroup`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    // ── Tarifs contrôle ─────────────────────────────────
    /// Fixed-price regularization, 50 tier
    Stt50,
    /// Regularization without a valid fare ("RNV")
    Rnv,
    /// Ticket belonging to a third party
    TitreTiers,
    /// Missing birth document for a reduced fare
    DocNaissance,
    /// Any other regularization
    AutreTarif,

    // ── Procès-verbaux ──────────────────────────────────
    /// Fixed-price citation, 100 tier
    Stt100,
    /// Citation for travelling without a ticket
    PvAbsenceTitre,
    /// Citation for an invalid ticket
    PvTitreInvalide,
    /// Citation for refusing the inspection
    PvRefusControle,
    /// Any other citation
    PvAutre,

    // ── Tarifs bord ─────────────────────────────────────
    /// Onboard sale at the 50 tier
    BordStt50,
    /// Onboard sale at the 100 tier
    BordStt100,
    /// Onboard sale without a valid fare
    BordRnv,
    /// Onboard sale for a third-party ticket
    BordTitreTiers,
    /// Onboard sale for a missing birth document
    BordDocNaissance,
    /// Any other onboard sale
    BordAutre,
}

impl Category {
    /// Returns the parent [`CategoryGroup`] for this category.
    #[must_use]
    pub const fn group(self) -> CategoryGroup {
        match self {
            Self::Stt50 | Self::Rnv | Self::TitreTiers | Self::DocNaissance | Self::AutreTarif => {
                CategoryGroup::TarifsControle
            }

            Self::Stt100
            | Self::PvAbsenceTitre
            | Self::PvTitreInvalide
            | Self::PvRefusControle
            | Self::PvAutre => CategoryGroup::ProcesVerbaux,

            Self::BordStt50
            | Self::BordStt100
            | Self::BordRnv
            | Self::BordTitreTiers
            | Self::BordDocNaissance
            | Self::BordAutre => CategoryGroup::TarifsBord,
        }
    }

    /// Human-readable (French) label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stt50 | Self::BordStt50 => "STT 50",
            Self::Stt100 | Self::BordStt100 => "STT 100",
            Self::Rnv | Self::BordRnv => "RNV",
            Self::TitreTiers | Self::BordTitreTiers => "Titre tiers",
            Self::DocNaissance | Self::BordDocNaissance => "Doc. naissance",
            Self::AutreTarif | Self::BordAutre => "Autre tarif",
            Self::PvAbsenceTitre => "Absence de titre",
            Self::PvTitreInvalide => "Titre invalide",
            Self::PvRefusControle => "Refus de contrôle",
            Self::PvAutre => "Autre PV",
        }
    }

    /// Whether records carry a monetary amount for this category.
    ///
    /// Onboard sales are counted only.
    #[must_use]
    pub const fn tracks_amount(self) -> bool {
        !matches!(self.group(), CategoryGroup::TarifsBord)
    }

    /// Unit price used to impute a missing amount from the count.
    ///
    /// Only the fixed-price categories have one; every other category is
    /// reported with its stored amount as-is.
    #[must_use]
    pub const fn fallback_unit_price(self) -> Option<f64> {
        match self {
            Self::Stt50 => Some(50.0),
            Self::Stt100 | Self::PvAbsenceTitre | Self::PvTitreInvalide | Self::PvRefusControle => {
                Some(100.0)
            }
            _ => None,
        }
    }

    /// Returns all categories belonging to the given group, in report order.
    #[must_use]
    pub fn for_group(group: CategoryGroup) -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|category| category.group() == group)
            .collect()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Stt50,
            Self::Rnv,
            Self::TitreTiers,
            Self::DocNaissance,
            Self::AutreTarif,
            Self::Stt100,
            Self::PvAbsenceTitre,
            Self::PvTitreInvalide,
            Self::PvRefusControle,
            Self::PvAutre,
            Self::BordStt50,
            Self::BordStt100,
            Self::BordRnv,
            Self::BordTitreTiers,
            Self::BordDocNaissance,
            Self::BordAutre,
        ]
    }
}

/// One logged fare-control event.
///
/// Counters missing from the wire format deserialize as 0 and amounts
/// missing (or `null`) deserialize as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct InspectionRecord {
    /// Backend identifier.
    pub id: String,
    /// Calendar date of the inspection.
    pub control_date: NaiveDate,
    /// Time of day the inspection started.
    #[serde(with = "hhmm")]
    pub control_time: NaiveTime,
    /// Kind of place the inspection took place in.
    pub location_type: LocationType,
    /// Free-text location (station name, line, ...).
    pub location: String,
    /// Train number, for onboard inspections.
    #[serde(default)]
    pub train_number: Option<String>,
    /// Train origin.
    #[serde(default)]
    pub origin: Option<String>,
    /// Train destination.
    #[serde(default)]
    pub destination: Option<String>,
    /// Platform number, for platform inspections.
    #[serde(default)]
    pub platform_number: Option<String>,
    /// Name of the agent who logged the inspection.
    #[serde(default)]
    pub agent_name: Option<String>,

    /// Passengers checked.
    #[serde(default)]
    pub nb_passagers: u32,
    /// Passengers found compliant.
    #[serde(default)]
    pub nb_en_regle: u32,

    /// Total on-the-spot regularizations.
    #[serde(default)]
    pub tarifs_controle: u32,
    #[serde(default)]
    pub stt_50: u32,
    #[serde(default)]
    pub stt_50_amount: Option<f64>,
    #[serde(default)]
    pub rnv: u32,
    #[serde(default)]
    pub rnv_amount: Option<f64>,
    #[serde(default)]
    pub titre_tiers: u32,
    #[serde(default)]
    pub titre_tiers_amount: Option<f64>,
    #[serde(default)]
    pub doc_naissance: u32,
    #[serde(default)]
    pub doc_naissance_amount: Option<f64>,
    #[serde(default)]
    pub autre_tarif: u32,
    #[serde(default)]
    pub autre_tarif_amount: Option<f64>,

    /// Total citations.
    #[serde(default)]
    pub pv: u32,
    #[serde(default)]
    pub stt_100: u32,
    #[serde(default)]
    pub stt_100_amount: Option<f64>,
    #[serde(default)]
    pub pv_absence_titre: u32,
    #[serde(default)]
    pub pv_absence_titre_amount: Option<f64>,
    #[serde(default)]
    pub pv_titre_invalide: u32,
    #[serde(default)]
    pub pv_titre_invalide_amount: Option<f64>,
    #[serde(default)]
    pub pv_refus_controle: u32,
    #[serde(default)]
    pub pv_refus_controle_amount: Option<f64>,
    #[serde(default)]
    pub pv_autre: u32,
    #[serde(default)]
    pub pv_autre_amount: Option<f64>,

    #[serde(default)]
    pub tarif_bord_stt_50: u32,
    #[serde(default)]
    pub tarif_bord_stt_100: u32,
    #[serde(default)]
    pub tarif_bord_rnv: u32,
    #[serde(default)]
    pub tarif_bord_titre_tiers: u32,
    #[serde(default)]
    pub tarif_bord_doc_naissance: u32,
    #[serde(default)]
    pub tarif_bord_autre: u32,

    /// Identity checks that came back clean.
    #[serde(default)]
    pub ri_positive: u32,
    /// Identity checks that failed.
    #[serde(default)]
    pub ri_negative: u32,

    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl InspectionRecord {
    /// Canonical fraud count: regularizations plus citations.
    ///
    /// This is the definition every aggregate figure uses.
    #[must_use]
    pub const fn fraud_count(&self) -> u64 {
        self.tarifs_controle as u64 + self.pv as u64
    }

    /// Identity-inclusive fraud count: regularizations, citations and
    /// failed identity checks.
    ///
    /// Used by the per-record history views only. Never substitute it for
    /// [`Self::fraud_count`] in aggregates.
    #[must_use]
    pub const fn fraud_count_with_identity_failures(&self) -> u64 {
        self.fraud_count() + self.ri_negative as u64
    }

    /// Count stored for the given category.
    #[must_use]
    pub const fn count(&self, category: Category) -> u32 {
        match category {
            Category::Stt50 => self.stt_50,
            Category::Rnv => self.rnv,
            Category::TitreTiers => self.titre_tiers,
            Category::DocNaissance => self.doc_naissance,
            Category::AutreTarif => self.autre_tarif,
            Category::Stt100 => self.stt_100,
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

    /// Amount stored for the given category.
    ///
    /// Non-finite stored values are treated as absent so they can never leak
    /// into a total. Categories that do not track amounts always return
    /// `None`.
    #[must_use]
    pub fn amount(&self, category: Category) -> Option<f64> {
        let raw = match category {
            Category::Stt50 => self.stt_50_amount,
            Category::Rnv => self.rnv_amount,
            Category::TitreTiers => self.titre_tiers_amount,
            Category::DocNaissance => self.doc_naissance_amount,
            Category::AutreTarif => self.autre_tarif_amount,
            Category::Stt100 => self.stt_100_amount,
            Category::PvAbsenceTitre => self.pv_absence_titre_amount,
            Category::PvTitreInvalide => self.pv_titre_invalide_amount,
            Category::PvRefusControle => self.pv_refus_controle_amount,
            Category::PvAutre => self.pv_autre_amount,
            Category::BordStt50
            | Category::BordStt100
            | Category::BordRnv
            | Category::BordTitreTiers
            | Category::BordDocNaissance
            | Category::BordAutre => None,
        };
        raw.filter(|amount| amount.is_finite())
    }

    /// Short label for the place the inspection happened, e.g.
    /// `"Train 4512 (Lyon → Paris)"` or `"Quai 3 - Lyon Part-Dieu"`.
    #[must_use]
    pub fn place_label(&self) -> String {
        match self.location_type {
            LocationType::Train => {
                let number = self.train_number.as_deref().unwrap_or("?");
                match (self.origin.as_deref(), self.destination.as_deref()) {
                    (Some(from), Some(to)) => format!("Train {number} ({from} → {to})"),
                    _ => format!("Train {number}"),
                }
            }
            LocationType::Platform => self.platform_number.as_deref().map_or_else(
                || self.location.clone(),
                |platform| format!("Quai {platform} - {}", self.location),
            ),
            LocationType::Station => self.location.clone(),
        }
    }
}

/// Serde adapter accepting `HH:MM` as well as `HH:MM:SS` times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> serde_json::Value {
        serde_json::json!({
            "id": "r1",
            "control_date": "2025-03-14",
            "control_time": "08:45",
            "location_type": "train",
            "location": "Lyon",
            "train_number": "4512",
            "nb_passagers": 100,
            "nb_en_regle": 90,
            "tarifs_controle": 5,
            "stt_50": 3,
            "stt_50_amount": null,
            "pv": 5,
            "ri_negative": 2
        })
    }

    #[test]
    fn category_group_consistency() {
        for group in CategoryGroup::all() {
            for category in Category::for_group(*group) {
                assert_eq!(category.group(), *group);
            }
        }
        let total: usize = CategoryGroup::all()
            .iter()
            .map(|g| Category::for_group(*g).len())
            .sum();
        assert_eq!(total, Category::all().len());
    }

    #[test]
    fn only_fixed_price_categories_have_fallback_prices() {
        assert_eq!(Category::Stt50.fallback_unit_price(), Some(50.0));
        assert_eq!(Category::Stt100.fallback_unit_price(), Some(100.0));
        assert_eq!(Category::PvRefusControle.fallback_unit_price(), Some(100.0));
        assert_eq!(Category::PvAutre.fallback_unit_price(), None);
        assert_eq!(Category::Rnv.fallback_unit_price(), None);
        assert_eq!(Category::BordStt50.fallback_unit_price(), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let record: InspectionRecord = serde_json::from_value(minimal_json()).unwrap();
        assert_eq!(record.control_time, NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        assert_eq!(record.rnv, 0);
        assert_eq!(record.stt_50_amount, None);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn two_fraud_counts_stay_distinct() {
        let record: InspectionRecord = serde_json::from_value(minimal_json()).unwrap();
        assert_eq!(record.fraud_count(), 10);
        assert_eq!(record.fraud_count_with_identity_failures(), 12);
    }

    #[test]
    fn non_finite_amounts_read_as_absent() {
        let mut record: InspectionRecord = serde_json::from_value(minimal_json()).unwrap();
        record.rnv_amount = Some(f64::NAN);
        record.pv_autre_amount = Some(f64::INFINITY);
        record.titre_tiers_amount = Some(12.5);
        assert_eq!(record.amount(Category::Rnv), None);
        assert_eq!(record.amount(Category::PvAutre), None);
        assert_eq!(record.amount(Category::TitreTiers), Some(12.5));
        assert_eq!(record.amount(Category::BordRnv), None);
    }

    #[test]
    fn place_label_for_train() {
        let mut record: InspectionRecord = serde_json::from_value(minimal_json()).unwrap();
        assert_eq!(record.place_label(), "Train 4512");
        record.origin = Some("Lyon".to_string());
        record.destination = Some("Paris".to_string());
        assert_eq!(record.place_label(), "Train 4512 (Lyon → Paris)");
    }

    #[test]
    fn location_type_parses_from_str() {
        assert_eq!("platform".parse::<LocationType>().unwrap(), LocationType::Platform);
        assert_eq!(LocationType::Station.as_ref(), "station");
    }
}
