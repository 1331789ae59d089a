//! Embarkment mission documents.

use fare_control_report::format::{format_count, format_date, format_rate};
use fare_control_report::{EmbarkmentPayload, GroupedEmbarkmentPayload, MissionSection};
use fare_control_stats_models::EmbarkmentStats;
use fare_control_thresholds::ThresholdConfig;

use crate::layout::{
    Block, DETAIL_BREAK_AT, DocumentHeader, Layout, Rendered, SUMMARY_BREAK_AT, draw_footer,
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

fn stats_block(stats: &EmbarkmentStats, thresholds: &ThresholdConfig) -> Block {
    let kv = |label: &str, value: u64| (label.to_string(), format_count(value), None);
    Block::KeyValues(vec![
        kv("Trains", stats.train_count),
        kv("Voyageurs contrôlés", stats.controlled),
        kv("Refus d'embarquement", stats.refused),
        (
            "Taux de refus".to_string(),
            format_rate(stats.fraud_rate, RATE_DECIMALS),
            Some(thresholds.classify(stats.fraud_rate).rgb()),
        ),
        kv("Présence police", stats.police_presence_count),
        kv("Traversées de voies", stats.track_crossing_count),
        kv("Franchissements ligne de contrôle", stats.control_line_crossing_count),
    ])
}

fn trains_table(mission: &MissionSection, thresholds: &ThresholdConfig) -> Table {
    let mut table = Table::new(vec![
        Column::fixed("Train", 22.0),
        Column::auto("Destination"),
        Column::fixed("Contrôlés", 24.0).right(),
        Column::fixed("Refus", 20.0).right(),
        Column::fixed("Taux", 24.0).right(),
        Column::auto("Incidents"),
        Column::auto("Commentaire"),
    ]);
    for train in &mission.trains {
        let incidents = train.incidents();
        table.push_row(vec![
            train.train_number.as_str().into(),
            train.destination.as_deref().unwrap_or("-").into(),
            format_count(train.controlled).into(),
            format_count(train.refused).into(),
            rate_cell(train.fraud_rate, thresholds),
            if incidents.is_empty() {
                "-".into()
            } else {
                incidents.join(", ").into()
            },
            train.comment.as_deref().unwrap_or("").into(),
        ]);
    }
    table
}

fn mission_blocks(mission: &MissionSection, thresholds: &ThresholdConfig) -> Vec<Block> {
    let mut blocks = vec![
        Block::Heading {
            text: "Synthèse de la mission".to_string(),
            break_at: SUMMARY_BREAK_AT,
        },
        stats_block(&mission.stats, thresholds),
        Block::Heading {
            text: "Trains contrôlés".to_string(),
            break_at: DETAIL_BREAK_AT,
        },
        Block::Table(trains_table(mission, thresholds)),
    ];
    if let Some(comment) = mission.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        blocks.push(Block::Heading {
            text: "Commentaire".to_string(),
            break_at: DETAIL_BREAK_AT,
        });
        blocks.push(Block::Paragraph(comment.to_string()));
    }
    blocks
}

fn row_count(trains: usize) -> u64 {
    u64::try_from(trains).unwrap_or(u64::MAX)
}

/// Lays a single-mission document out.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the mission has no train
pub fn layout_embarkment(
    payload: &EmbarkmentPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Rendered, PdfError> {
    let mission = payload.mission();
    if mission.trains.is_empty() {
        return Err(PdfError::EmptyInput("aucun train dans la mission"));
    }

    let size = options
        .orientation
        .page_size(row_count(mission.trains.len()), options.include_stats);
    let header = DocumentHeader {
        title: payload.title().to_string(),
        lines: vec![
            format!("Gare : {}", mission.station),
            format!("Date : {}", format_date(mission.date)),
        ],
    };
    let stamp = footer_stamp(payload.generated_at());

    Ok(Layout::new(size, header, mission_blocks(mission, thresholds))
        .run(|canvas, page| draw_footer(canvas, page, &stamp)))
}

/// Renders a single mission to PDF bytes.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the mission has no train
/// * [`PdfError::Serialize`] if the document fails to serialise
pub fn render_embarkment(
    payload: &EmbarkmentPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Vec<u8>, PdfError> {
    let rendered = layout_embarkment(payload, thresholds, options)?;
    to_pdf_bytes(&rendered.canvas, payload.title())
}

fn cover_table(payload: &GroupedEmbarkmentPayload, thresholds: &ThresholdConfig) -> Table {
    let mut table = Table::new(vec![
        Column::fixed("Date", 26.0),
        Column::auto("Gare"),
        Column::fixed("Trains", 20.0).right(),
        Column::fixed("Contrôlés", 24.0).right(),
        Column::fixed("Refus", 20.0).right(),
        Column::fixed("Taux", 24.0).right(),
    ]);
    for mission in payload.missions() {
        table.push_row(vec![
            format_date(mission.date).into(),
            mission.station.as_str().into(),
            format_count(mission.stats.train_count).into(),
            format_count(mission.stats.controlled).into(),
            format_count(mission.stats.refused).into(),
            rate_cell(mission.stats.fraud_rate, thresholds),
        ]);
    }
    table
}

/// Lays the grouped document out: a cover page with global totals, then
/// each mission from a fresh page, in the payload's order.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the payload holds no mission
pub fn layout_grouped_embarkment(
    payload: &GroupedEmbarkmentPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Rendered, PdfError> {
    if payload.missions().is_empty() {
        return Err(PdfError::EmptyInput("aucune mission sélectionnée"));
    }

    let totals = payload.totals();
    let mut blocks = vec![
        Block::Heading {
            text: "Synthèse globale".to_string(),
            break_at: SUMMARY_BREAK_AT,
        },
        stats_block(totals, thresholds),
        Block::Heading {
            text: "Missions".to_string(),
            break_at: DETAIL_BREAK_AT,
        },
        Block::Table(cover_table(payload, thresholds)),
    ];

    for mission in payload.missions() {
        blocks.push(Block::PageBreak);
        blocks.push(Block::Heading {
            text: format!(
                "Mission du {} - {}",
                format_date(mission.date),
                mission.station
            ),
            break_at: SUMMARY_BREAK_AT,
        });
        blocks.extend(mission_blocks(mission, thresholds));
    }

    let widest = payload
        .missions()
        .iter()
        .map(|m| m.trains.len())
        .max()
        .unwrap_or(0);
    let size = options
        .orientation
        .page_size(row_count(widest), options.include_stats);
    let header = DocumentHeader {
        title: payload.title().to_string(),
        lines: vec![format!("{} missions", totals.mission_count)],
    };
    let stamp = footer_stamp(payload.generated_at());

    log::debug!(
        "layout_grouped_embarkment: {} missions",
        payload.missions().len()
    );

    Ok(Layout::new(size, header, blocks).run(|canvas, page| draw_footer(canvas, page, &stamp)))
}

/// Renders several missions into one PDF.
///
/// # Errors
///
/// * [`PdfError::EmptyInput`] if the payload holds no mission
/// * [`PdfError::Serialize`] if the document fails to serialise
pub fn render_grouped_embarkment(
    payload: &GroupedEmbarkmentPayload,
    thresholds: &ThresholdConfig,
    options: &PdfOptions,
) -> Result<Vec<u8>, PdfError> {
    let rendered = layout_grouped_embarkment(payload, thresholds, options)?;
    to_pdf_bytes(&rendered.canvas, payload.title())
}

#[cfg(test)]
mod tests {
    use fare_control_inspection_models::EmbarkmentMission;
    use serde_json::json;

    use super::*;

    fn mission(id: &str, station: &str, trains: &serde_json::Value) -> EmbarkmentMission {
        serde_json::from_value(json!({
            "id": id,
            "missionDate": "2025-03-10",
            "station": station,
            "trains": trains,
        }))
        .unwrap()
    }

    #[test]
    fn single_mission_shows_high_rate() {
        let m = mission(
            "m1",
            "Nice",
            &json!([{"trainNumber": "6101", "controlled": 40, "refused": 4}]),
        );
        let payload = EmbarkmentPayload::builder(&m).build().unwrap();
        let rendered =
            layout_embarkment(&payload, &ThresholdConfig::default(), &PdfOptions::default())
                .unwrap();

        let page = &rendered.canvas.pages()[0];
        assert!(page.texts().any(|t| t == "10.00 %"));
        let high = fare_control_thresholds::SeverityTier::High.rgb();
        assert!(page.ops.iter().any(|op| matches!(
            op,
            crate::canvas::DrawOp::FillRect { color, .. } if *color == high
        )));
    }

    #[test]
    fn grouped_document_keeps_caller_order() {
        let missions = vec![
            mission("2", "Toulon", &json!([{"trainNumber": "1", "controlled": 5}])),
            mission("1", "Antibes", &json!([{"trainNumber": "2", "controlled": 5}])),
        ];
        let payload = GroupedEmbarkmentPayload::builder(&missions)
            .build_grouped()
            .unwrap();
        let rendered =
            layout_grouped_embarkment(&payload, &ThresholdConfig::default(), &PdfOptions::default())
                .unwrap();

        let pages = rendered.canvas.pages();
        assert_eq!(pages.len(), 3);
        assert!(pages[1].texts().any(|t| t.ends_with("Toulon")));
        assert!(pages[2].texts().any(|t| t.ends_with("Antibes")));
        assert!(pages[0].texts().any(|t| t == "Synthèse globale"));
    }

    #[test]
    fn grouped_document_serialises() {
        let missions = vec![mission("1", "Nice", &json!([{"trainNumber": "1", "controlled": 5}]))];
        let payload = GroupedEmbarkmentPayload::builder(&missions)
            .build_grouped()
            .unwrap();
        let bytes =
            render_grouped_embarkment(&payload, &ThresholdConfig::default(), &PdfOptions::default())
                .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
