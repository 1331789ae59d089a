//! Embarkment mission page.

use fare_control_report::EmbarkmentPayload;
use fare_control_report::format::{format_count, format_date, format_rate, format_timestamp};
use fare_control_thresholds::ThresholdConfig;

use crate::{
    HtmlError, RATE_DECIMALS, footer, header, html_escape, kpi, num_cell, page, rate_cell,
    section, sortable_table, text_cell,
};

const TRAIN_COLUMNS: &[(&str, &str, bool)] = &[
    ("train", "Train", false),
    ("destination", "Destination", false),
    ("controlled", "Contrôlés", true),
    ("refused", "Refus", true),
    ("rate", "Taux de refus", true),
    ("incidents", "Incidents", false),
];

/// Renders one mission.
///
/// # Errors
///
/// * [`HtmlError::EmptyInput`] if the mission has no train
pub fn render_embarkment_html(
    payload: &EmbarkmentPayload,
    thresholds: &ThresholdConfig,
) -> Result<String, HtmlError> {
    let mission = payload.mission();
    if mission.trains.is_empty() {
        return Err(HtmlError::EmptyInput("aucun train dans la mission"));
    }
    let stats = payload.stats();
    let tier = thresholds.classify(stats.fraud_rate);

    let kpis = [
        kpi("Trains", &format_count(stats.train_count), None),
        kpi("Voyageurs contrôlés", &format_count(stats.controlled), None),
        kpi("Refus", &format_count(stats.refused), None),
        kpi(
            "Taux de refus",
            &format_rate(stats.fraud_rate, RATE_DECIMALS),
            Some(tier.hex().as_str()),
        ),
        kpi(
            "Trains avec incident",
            &format_count(stats.trains_with_incident),
            None,
        ),
    ]
    .join("\n");

    let rows = mission
        .trains
        .iter()
        .map(|train| {
            let incidents = train.incidents();
            [
                text_cell("train", &train.train_number),
                text_cell("destination", train.destination.as_deref().unwrap_or("-")),
                num_cell("controlled", train.controlled),
                num_cell("refused", train.refused),
                rate_cell("rate", train.fraud_rate, thresholds),
                text_cell(
                    "incidents",
                    &if incidents.is_empty() {
                        "-".to_string()
                    } else {
                        incidents.join(", ")
                    },
                ),
            ]
            .concat()
        })
        .collect::<Vec<_>>();

    let incidents = format!(
        r#"<table>
    <tbody>
        <tr><td>Présence police</td><td class="num">{}</td></tr>
        <tr><td>Traversées de voies</td><td class="num">{}</td></tr>
        <tr><td>Franchissements ligne de contrôle</td><td class="num">{}</td></tr>
    </tbody>
</table>"#,
        stats.police_presence_count, stats.track_crossing_count, stats.control_line_crossing_count
    );

    let mut comments = mission
        .comment
        .iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("<li><strong>Mission</strong> : {}</li>", html_escape(c)))
        .collect::<Vec<_>>();
    comments.extend(mission.trains.iter().filter_map(|train| {
        train
            .comment
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                format!(
                    "<li><strong>Train {}</strong> : {}</li>",
                    html_escape(&train.train_number),
                    html_escape(c)
                )
            })
    }));
    let comments = if comments.is_empty() {
        r#"<p class="card empty">Aucun</p>"#.to_string()
    } else {
        format!("<ul>{}</ul>", comments.join("\n"))
    };

    let meta = [
        format!("Gare : {}", mission.station),
        format!("Date : {}", format_date(mission.date)),
    ];
    let body = [
        header(payload.title(), &meta),
        format!(r#"<div class="kpis">{kpis}</div>"#),
        section(
            "trains",
            "Trains contrôlés",
            &sortable_table("trains-table", TRAIN_COLUMNS, &rows),
        ),
        section("incidents", "Incidents", &incidents),
        section("commentaires", "Commentaires", &comments),
        footer(&format!(
            "Généré le {}",
            format_timestamp(payload.generated_at())
        )),
    ]
    .join("\n");

    Ok(page(payload.title(), &body))
}

#[cfg(test)]
mod tests {
    use fare_control_inspection_models::EmbarkmentMission;
    use serde_json::json;

    use super::*;

    fn mission(trains: &serde_json::Value, comment: Option<&str>) -> EmbarkmentMission {
        serde_json::from_value(json!({
            "id": "m1",
            "missionDate": "2025-03-10",
            "station": "Nice",
            "trains": trains,
            "comment": comment,
        }))
        .unwrap()
    }

    #[test]
    fn high_rate_is_coloured() {
        let m = mission(
            &json!([{"trainNumber": "6101", "controlled": 40, "refused": 4, "trackCrossing": true}]),
            None,
        );
        let payload = EmbarkmentPayload::builder(&m).build().unwrap();
        let html = render_embarkment_html(&payload, &ThresholdConfig::default()).unwrap();

        assert!(html.contains("10.00 %"));
        assert!(html.contains("#ef4444"));
        assert!(html.contains("Traversée de voies"));
        assert!(html.contains(r#"<table id="trains-table">"#));
    }

    #[test]
    fn comments_are_escaped() {
        let m = mission(
            &json!([{"trainNumber": "1", "controlled": 3, "comment": "<b>retard</b>"}]),
            Some("R&D"),
        );
        let payload = EmbarkmentPayload::builder(&m).build().unwrap();
        let html = render_embarkment_html(&payload, &ThresholdConfig::default()).unwrap();

        assert!(html.contains("&lt;b&gt;retard&lt;/b&gt;"));
        assert!(html.contains("R&amp;D"));
    }
}
