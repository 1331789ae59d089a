#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fixed-width plain-text reports.
//!
//! The body is meant for a mail client: every line fits in [`WIDTH`]
//! columns, labels are left-aligned and figures right-aligned.

use fare_control_inspection_models::CategoryGroup;
use fare_control_report::format::{
    format_amount, format_count, format_date, format_rate, format_time, format_timestamp,
};
use fare_control_report::{ReportError, ReportPayload, UNCLASSIFIED_LABEL};
use fare_control_thresholds::ThresholdConfig;

/// Line width in columns.
pub const WIDTH: usize = 42;

/// Display precision of rates in text reports.
pub const RATE_DECIMALS: usize = 1;

/// A message ready to hand to a mail client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub subject: String,
    pub body: String,
}

fn rule(c: char) -> String {
    c.to_string().repeat(WIDTH)
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn centered(text: &str) -> String {
    let text = truncate(text, WIDTH);
    let pad = (WIDTH - text.chars().count()) / 2;
    format!("{}{text}", " ".repeat(pad))
}

/// `label` padded on the right, `value` flush with the right edge.
fn line(label: &str, value: &str) -> String {
    let value = truncate(value, WIDTH);
    let value_len = value.chars().count();
    let label_room = WIDTH.saturating_sub(value_len + 1);
    let label = truncate(label, label_room);
    let pad = WIDTH - value_len - label.chars().count();
    format!("{label}{}{value}", " ".repeat(pad))
}

fn block_title(out: &mut Vec<String>, title: &str) {
    out.push(String::new());
    out.push(truncate(&title.to_uppercase(), WIDTH));
    out.push(rule('-'));
}

fn category_blocks(out: &mut Vec<String>, payload: &ReportPayload) {
    for group in CategoryGroup::all() {
        let total = payload.group_total(*group);
        if total == 0 {
            continue;
        }
        block_title(out, &format!("{} ({total})", group.label()));
        for category in payload.visible_lines(*group) {
            let value = category.amount.map_or_else(
                || format_count(category.count),
                |amount| format!("{} | {}", category.count, format_amount(amount)),
            );
            out.push(line(category.category.label(), &value));
        }
        let unclassified = payload.unclassified_count(*group);
        if unclassified > 0 {
            out.push(line(UNCLASSIFIED_LABEL, &format_count(unclassified)));
        }
        if let Some(breakdown) = payload.stats().breakdown(*group)
            && *group != CategoryGroup::TarifsBord
        {
            out.push(line("Total", &format_amount(breakdown.total_amount)));
        }
    }
}

/// Renders the report body.
#[must_use]
pub fn render_text(payload: &ReportPayload, thresholds: &ThresholdConfig) -> String {
    let s = &payload.stats().summary;
    let mut out = vec![rule('='), centered(payload.title())];
    out.push(centered(payload.date_range_label()));
    if let Some(location) = payload.location_label() {
        out.push(centered(location));
    }
    out.push(rule('='));

    block_title(&mut out, "Chiffres clés");
    out.push(line("Contrôles", &format_count(s.record_count)));
    out.push(line("Voyageurs contrôlés", &format_count(s.total_passengers)));
    out.push(line("Voyageurs en règle", &format_count(s.total_en_regle)));
    out.push(line("Fraudes", &format_count(s.fraud_count)));
    out.push(line(
        "Taux de fraude",
        &format!(
            "{} ({})",
            format_rate(s.fraud_rate, RATE_DECIMALS),
            thresholds.classify(s.fraud_rate).label()
        ),
    ));
    out.push(line(
        "Montant total",
        &format_amount(payload.stats().amounts.total),
    ));

    category_blocks(&mut out, payload);

    block_title(&mut out, "Détail des contrôles");
    for row in payload.rows() {
        out.push(truncate(
            &format!(
                "{} {} {}",
                format_date(row.date),
                format_time(row.time),
                row.place_label
            ),
            WIDTH,
        ));
        out.push(line(
            "  Voyageurs / fraudes",
            &format!("{} / {}", row.passengers, row.fraud_count),
        ));
        out.push(line(
            "  Taux",
            &format_rate(row.fraud_rate, RATE_DECIMALS),
        ));
    }

    out.push(String::new());
    out.push(truncate(
        &format!("Généré le {}", format_timestamp(payload.generated_at())),
        WIDTH,
    ));
    out.push(rule('='));
    out.join("\n")
}

/// Builds the mail draft for `payload`.
///
/// # Errors
///
/// * [`ReportError::EmptyInput`] if the payload holds no record
pub fn mail_draft(
    payload: &ReportPayload,
    thresholds: &ThresholdConfig,
) -> Result<MailDraft, ReportError> {
    if payload.record_count() == 0 {
        return Err(ReportError::EmptyInput {
            what: "aucun contrôle à envoyer",
        });
    }

    let body = render_text(payload, thresholds);
    log::debug!("mail_draft: {} lines", body.lines().count());

    Ok(MailDraft {
        subject: format!("{} - {}", payload.title(), payload.date_range_label()),
        body,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fare_control_inspection_models::InspectionRecord;
    use serde_json::json;

    use super::*;

    fn record(id: &str, extra: &serde_json::Value) -> InspectionRecord {
        let mut value = json!({
            "id": id,
            "control_date": "2025-03-10",
            "control_time": "08:30",
            "location_type": "train",
            "location": "Lyon Part-Dieu",
            "train_number": "4512",
            "origin": "Lyon Part-Dieu",
            "destination": "Marseille Saint-Charles",
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    fn payload(records: &[InspectionRecord]) -> ReportPayload {
        ReportPayload::builder(records)
            .title("Bilan hebdomadaire de la lutte anti-fraude du secteur sud")
            .location("Région Provence-Alpes-Côte d'Azur")
            .generated_at(
                NaiveDate::from_ymd_opt(2025, 3, 14)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn lines_fit_width() {
        let records = vec![
            record("a", &json!({"nb_passagers": 100, "tarifs_controle": 5, "stt_50": 5, "pv": 5, "pv_refus_controle": 5, "pv_refus_controle_amount": 123_456.0})),
            record("b", &json!({"nb_passagers": 50})),
        ];
        let body = render_text(&payload(&records), &ThresholdConfig::default());
        for l in body.lines() {
            assert!(l.chars().count() <= WIDTH, "too wide: {l:?}");
        }
        assert_eq!(body.lines().next(), Some("=".repeat(WIDTH).as_str()));
        assert_eq!(body.lines().last(), Some("=".repeat(WIDTH).as_str()));
    }

    #[test]
    fn scenario_rate_and_omitted_pv_block() {
        let records = vec![
            record("a", &json!({"nb_passagers": 100, "nb_en_regle": 90, "tarifs_controle": 10, "stt_50": 10})),
            record("b", &json!({"nb_passagers": 50, "nb_en_regle": 50})),
        ];
        let body = render_text(&payload(&records), &ThresholdConfig::default());

        assert!(body.contains("6.7 % (Modéré)"));
        assert!(body.contains("TARIFS CONTRÔLE (10)"));
        assert!(!body.contains("PROCÈS-VERBAUX"));
        assert!(!body.contains("TARIFS BORD"));
        assert!(!body.contains("RNV"));
    }

    #[test]
    fn undetailed_pv_block_shows_remainder() {
        let records = vec![record(
            "s",
            &json!({"location_type": "station", "nb_passagers": 100, "pv": 5}),
        )];
        let body = render_text(&payload(&records), &ThresholdConfig::default());

        assert!(body.contains("PROCÈS-VERBAUX (5)"));
        assert!(body.lines().any(|l| l.starts_with("Non ventilé") && l.ends_with(" 5")));
    }

    #[test]
    fn counts_are_right_aligned() {
        let l = line("Contrôles", "12");
        assert_eq!(l.chars().count(), WIDTH);
        assert!(l.starts_with("Contrôles "));
        assert!(l.ends_with(" 12"));
    }

    #[test]
    fn mail_subject_uses_title_and_range() {
        let records = vec![record("a", &json!({"nb_passagers": 10}))];
        let draft = mail_draft(&payload(&records), &ThresholdConfig::default()).unwrap();
        assert_eq!(
            draft.subject,
            "Bilan hebdomadaire de la lutte anti-fraude du secteur sud - le 10/03/2025"
        );
        assert!(draft.body.contains("DÉTAIL DES CONTRÔLES"));
    }
}
