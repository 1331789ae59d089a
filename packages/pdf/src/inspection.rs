//! Inspection report document.

use fare_control_inspection_models::{CategoryGroup, LocationType};
use fare_control_report::{ReportPayload, UNCLASSIFIED_LABEL};
use fare_control_report::format::{
    format_amount, format_count, format_date, format_rate, format_time,
};
use fare_control_thresholds::ThresholdConfig;

use crate::layout::{
    BREAKDOWN_BREAK_AT, Block, DETAIL_BREAK_AT, DocumentHeader, Layout, Rendered,
    SUMMARY_BREAK_AT, draw_footer,
};
use crate::table::{Cell, Column, Table};
use crate::{PdfError, PdfOptions, footer_stamp, writer::to_pdf_bytes};

const RATE_DECIMALS: usize = 2;

fn rate_cell(rate: f64, thresholds: &ThresholdConfig) -> Cell {
    Cell::filled(
        format_rate(rate, RATE_DECIMALS),
        thresholds.classify(rate).rgb(),
    )
}

fn heading(text: &str, break_at: f32) -> Block {
    Block::Heading {
        text: text.to_string(),
        break_at,
    }
}

fn header(payload: &ReportPayload) -> DocumentHeader {
    let mut lines = vec![format!("Période : {}", payload.date_range_label())];
    if let Some(location) = payload.location_label() {
        lines.push(format!("Lieu : {location}"));
    }
    DocumentHeader {
        title: payload.title().to_string(),
        lines,
    }
}

fn summary(payload: &ReportPayload, thresholds: &ThresholdConfig) -> Block {
    let s = &payload.stats().summary;
    let kv = |label: &str, value: String| (label.to_string(), value, None);

    Block::KeyValues(vec![
        kv("Contrôles", format_count(s.record_count)),
        kv("Voyageurs contrôlés", format_count(s.total_passengers)),
        kv("Voyageurs en règle", format_count(s.total_en_regle)),
        kv("Fraudes constatées", format_count(s.fraud_count)),
        (
            "Taux de fraude".to_string(),
            format_rate(s.fraud_rate, RATE_DECIMALS),
            Some(thresholds.classify(s.fraud_rate).rgb()),
        ),
        kv("Tarifs contrôle", format_count(s.tarifs_controle)),
        kv("Procès-verbaux", format_count(s.pv)),
        kv(
            "Relevés d'identité (positifs / négatifs)",
            format!("{} / {}", s.ri_positive, s.ri_negative),
        ),
    ])
}

fn locations(payload: &ReportPayload, thresholds: &ThresholdConfig) -> Table {
    let mut table = Table::new(vec![
        Column::fixed("Lieu", 50.0),
        Column::fixed("Contrôles", 30.0).right(),
        Column::fixed("Voyageurs", 35.0).right(),
        Column::fixed("Fraudes", 30.0).right(),
        Column::fixed("Taux", 30.0).right(),
    ]);
    for location_type in LocationType::all() {
        if let Some(stats) = payload.stats().location(*location_type) {
            table.push_row(vec![
                location_type.label().into(),
                format_count(stats.record_count).into(),
                format_count(stats.passengers).into(),
                format_count(stats.fraud_count).into(),
                rate_cell(stats.fraud_rate, thresholds),
            ]);
        }
    }
    table
}

fn breakdown(payload: &ReportPayload, group: CategoryGroup) -> Table {
    let mut table = Table::new(vec![
        Column::fixed("Catégorie", 90.0),
        Column::fixed("Nombre", 30.0).right(),
        Column::fixed("Montant", 40.0).right(),
    ]);

    let lines = payload.visible_lines(group);
    let unclassified = payload.unclassified_count(group);
    if lines.is_empty() && unclassified == 0 {
        table.push_row(vec!["Aucun".into(), "".into(), "".into()]);
        return table;
    }

    for line in &lines {
        table.push_row(vec![
            line.category.label().into(),
            format_count(line.count).into(),
            line.amount.map_or_else(|| "-".to_string(), format_amount).into(),
        ]);
    }
    if unclassified > 0 {
        table.push_row(vec![
            UNCLASSIFIED_LABEL.into(),
            format_count(unclassified).into(),
            "-".into(),
        ]);
    }
    if let Some(total) = payload.stats().breakdown(group) {
        let amount = if group == CategoryGroup::TarifsBord {
            "-".to_string()
        } else {
            format_amount(total.total_amount)
        };
        table.push_row(vec![
            "Total".into(),
            format_count(payload.group_total(group)).into(),
            amount.into(),
        ]);
    }
    table
}

fn amounts(payload: &ReportPayload) -> Block {
    let a = &payload.stats().amounts;
    Block::KeyValues(vec![
        (
            "Tarifs contrôle".to_string(),
            format_amount(a.tarifs_controle),
            None,
        ),
        (
            "Procès-verbaux".to_string(),
            format_amount(a.proces_verbaux),
            None,
        ),
        ("Total".to_string(), format_amount(a.total), None),
    ])
}

fn trend(payload: &ReportPayload, thresholds: &ThresholdConfig) -> Option<Table> {
    let points = payload.trend()?;
    let mut table = Table::new(vec![
        Column::fixed("Semaine du", 35.0),
        Column::fixed("Contrôles", 30.0).right(),
        Column::fixed("Voyageurs", 35.0).right(),
        Column::fixed("Fraudes", 30.0).right(),
        Column::fixed("Taux", 30.0).right(),
    ]);
    for point in points {
        table.push_row(vec![
            format_date(point.week_start).into(),
            format_count(point.record_count).into(),
            format_count(point.passengers).into(),
            format_count(point.fraud_count).into(),
            rate_cell(point.fraud_rate, thresholds),
        ]);
    }
    Some(table)
}

fn detail(payload: &ReportPayload, thresholds: &ThresholdConfig) -> Table {
    let mut table = Table::new(vec![
        Column::fit("Date"),
        Column::fit("Heure"),
        Column::auto("Lieu"),
        Column::auto("Agent"),
        Column::fit("Voyageurs").right(),
        Column::fit("Fraudes").right(),
        Column::fit("Taux").right(),
    ]);
    for row in payload.rows() {
        table.push_row(vec![
            format_date(row.date).into(),
            format_time(row.time).into(),
            row.place_label.as_str().into(),
            row.agent_name.as_deref().unwrap_or("-").into(),
            format_count(row.passengers).into(),
            format_count(row.fraud_count).into(),
            rate_cell(row.fraud_rate, thresholds),
        ]);
    }
    table
}

/// Block list of an inspection document.
#[must_use]
pub fn blocks(
    payload: &ReportPayload,
    thresholds: &ThresholdConfig,
    include_stats: bool,
) -> Vec<Block> {
    let mut blocks = vec![
        heading("Synthèse", SUMMARY_BREAK_AT),
        summary(payload, thresholds),
    ];

    if include_stats {
        blocks.push(heading("Répartition par type de lieu", BREAKDOWN_BREAK_AT));
        blocks.push(Block::Table(locations(payload, thresholds)));

        for group in CategoryGroup::all() {
            blocks.push(heading(group.label(), BREAKDOWN_BREAK_AT));
            blocks.push(Block::Table(breakdown(payload, *group)));
        }

        blocks.push(heading("Montants", DETAIL_BREAK_AT));
        blocks.push(amounts(payload));
    }

    if let Some(table) = trend(payload, thresholds) {
        blocks.push(heading("Évolution hebdomadaire", DETAIL_BREAK_AT));
        blocks.push(Block::Table(table));
    }

    blocks.push(heading("Détail des contrôles", DETAIL_BREAK_AT));
    blocks.push(Block::Table(detail(payload, thresholds)));
    blocks
}

/// Lays the inspection document out without serialising it.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the payload holds no record
pub fn layout_inspection(
    payload: &ReportPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Rendered, PdfError> {
    if payload.record_count() == 0 {
        return Err(PdfError::EmptyInput("aucun contrôle à imprimer"));
    }

    let size = options
        .orientation
        .page_size(payload.record_count(), options.include_stats);
    log::debug!(
        "layout_inspection: {} records, landscape={}",
        payload.record_count(),
        size.is_landscape()
    );

    let stamp = footer_stamp(payload.generated_at());
    let layout = Layout::new(
        size,
        header(payload),
        blocks(payload, thresholds, options.include_stats),
    );
    Ok(layout.run(|canvas, page| draw_footer(canvas, page, &stamp)))
}

/// Renders the inspection report to PDF bytes.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the payload holds no record
/// * [`PdfError::Serialize`] if the document fails to serialise
pub fn render_inspection(
    payload: &ReportPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Vec<u8>, PdfError> {
    let rendered = layout_inspection(payload, thresholds, options)?;
    to_pdf_bytes(&rendered.canvas, payload.title())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fare_control_inspection_models::InspectionRecord;
    use serde_json::json;

    use super::*;
    use crate::canvas::Page;
    use crate::{Orientation, canvas::PageSize};

    fn record(id: &str, extra: &serde_json::Value) -> InspectionRecord {
        let mut value = json!({
            "id": id,
            "control_date": "2025-03-10",
            "control_time": "08:30",
            "location_type": "train",
            "location": "Lyon",
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    fn payload(records: &[InspectionRecord]) -> ReportPayload {
        ReportPayload::builder(records)
            .title("Bilan")
            .generated_at(
                NaiveDate::from_ymd_opt(2025, 3, 14)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn all_text(pages: &[Page]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.texts().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn scenario_rate_is_printed() {
        let records = vec![
            record("a", &json!({"nb_passagers": 100, "nb_en_regle": 90, "tarifs_controle": 5, "pv": 5})),
            record("b", &json!({"nb_passagers": 50, "nb_en_regle": 50})),
        ];
        let rendered =
            layout_inspection(&payload(&records), &ThresholdConfig::default(), &PdfOptions::default())
                .unwrap();
        let texts = all_text(rendered.canvas.pages());
        assert!(texts.iter().any(|t| t == "6.67 %"));
        assert!(texts.iter().any(|t| t == "150"));
    }

    #[test]
    fn detail_rows_match_records() {
        let records = (0..40)
            .map(|i| record(&format!("r{i}"), &json!({"nb_passagers": 10, "pv": i % 3})))
            .collect::<Vec<_>>();
        let options = PdfOptions {
            orientation: Orientation::Auto,
            include_stats: true,
        };
        let rendered =
            layout_inspection(&payload(&records), &ThresholdConfig::default(), &options).unwrap();

        assert_eq!(rendered.canvas.size(), PageSize::LANDSCAPE);
        assert_eq!(rendered.table_rows.last(), Some(&40));
        assert!(rendered.canvas.page_count() > 1);

        let footers = all_text(rendered.canvas.pages())
            .into_iter()
            .filter(|t| t.starts_with("Page "))
            .count();
        assert_eq!(footers, rendered.canvas.page_count());
    }

    #[test]
    fn empty_groups_show_placeholder() {
        let records = vec![record("a", &json!({"nb_passagers": 10, "tarifs_controle": 1, "stt_50": 1}))];
        let options = PdfOptions {
            orientation: Orientation::Portrait,
            include_stats: true,
        };
        let rendered =
            layout_inspection(&payload(&records), &ThresholdConfig::default(), &options).unwrap();
        let texts = all_text(rendered.canvas.pages());

        assert!(texts.iter().any(|t| t == "Aucun"));
        assert!(texts.iter().any(|t| t == "50.00 €"));
        assert!(!texts.iter().any(|t| t == "Refus de contrôle"));
    }

    #[test]
    fn portrait_detail_keeps_figures_whole() {
        let long = json!({
            "origin": "Marseille Saint-Charles gare principale hall A",
            "destination": "Vintimille via Toulon, Cannes, Antibes et Nice-Ville",
            "agent_name": "Marie-Christine de La Tour d'Auvergne-Lauraguais",
        });
        let mut first = json!({"nb_passagers": 3, "pv": 2});
        let mut second = json!({"nb_passagers": 12345, "pv": 1});
        for extra in [&mut first, &mut second] {
            if let (Some(target), Some(long)) = (extra.as_object_mut(), long.as_object()) {
                target.extend(long.clone());
            }
        }
        let records = vec![record("a", &first), record("b", &second)];
        let options = PdfOptions {
            orientation: Orientation::Portrait,
            include_stats: false,
        };

        let rendered =
            layout_inspection(&payload(&records), &ThresholdConfig::default(), &options).unwrap();
        let texts = all_text(rendered.canvas.pages());

        assert_eq!(rendered.canvas.size(), PageSize::PORTRAIT);
        assert!(texts.iter().any(|t| t == "66.67 %"));
        assert!(texts.iter().any(|t| t == "12345"));
        assert!(texts.iter().any(|t| t == "Voyageurs"));
        assert_eq!(texts.iter().filter(|t| *t == "10/03/2025").count(), 2);
        assert!(texts.iter().any(|t| t.ends_with("..")));
    }

    #[test]
    fn undetailed_pv_gets_remainder_row() {
        let records = vec![record("a", &json!({"location_type": "station", "nb_passagers": 100, "pv": 5}))];
        let options = PdfOptions {
            orientation: Orientation::Portrait,
            include_stats: true,
        };
        let rendered =
            layout_inspection(&payload(&records), &ThresholdConfig::default(), &options).unwrap();
        let texts = all_text(rendered.canvas.pages());

        let remainder = texts.iter().position(|t| t == "Non ventilé").unwrap();
        assert_eq!(texts[remainder + 1], "5");
        let total = texts[remainder..].iter().position(|t| t == "Total").unwrap() + remainder;
        assert_eq!(texts[total + 1], "5");
    }

    #[test]
    fn serialises_to_pdf() {
        let records = vec![record("a", &json!({"nb_passagers": 10}))];
        let bytes =
            render_inspection(&payload(&records), &ThresholdConfig::default(), &PdfOptions::default())
                .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
