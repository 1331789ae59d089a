//! Inspection report page.

use std::collections::BTreeMap;

use fare_control_inspection_models::{CategoryGroup, LocationType};
use fare_control_report::format::{
    format_amount, format_count, format_date, format_rate, format_time, format_timestamp,
};
use fare_control_report::{RecordRow, ReportPayload, UNCLASSIFIED_LABEL};
use fare_control_stats_models::{TrendPoint, rate_percent};
use fare_control_thresholds::ThresholdConfig;

use crate::{
    HtmlError, RATE_DECIMALS, footer, header, html_escape, kpi, num_cell, page, rate_cell,
    section, sortable_table, text_cell,
};

/// Smallest bar height, in percent of the chart, so zero weeks stay visible.
pub const BAR_FLOOR_PERCENT: f64 = 4.0;

const MOST_SENSITIVE_LIMIT: usize = 10;

/// DOM id of the `index`-th record row.
fn row_anchor(index: usize) -> String {
    format!("row-{index}")
}

/// Bar height in percent of the chart for `value` against the series max.
#[must_use]
pub fn bar_height(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() || !value.is_finite() {
        return BAR_FLOOR_PERCENT;
    }
    (value / max * 100.0).clamp(BAR_FLOOR_PERCENT, 100.0)
}

fn kpis(payload: &ReportPayload, thresholds: &ThresholdConfig) -> String {
    let s = &payload.stats().summary;
    let tier = thresholds.classify(s.fraud_rate);
    [
        kpi("Contrôles", &format_count(s.record_count), None),
        kpi("Voyageurs contrôlés", &format_count(s.total_passengers), None),
        kpi("Fraudes", &format_count(s.fraud_count), None),
        kpi(
            "Taux de fraude",
            &format_rate(s.fraud_rate, RATE_DECIMALS),
            Some(tier.hex().as_str()),
        ),
        kpi("Procès-verbaux", &format_count(s.pv), None),
        kpi(
            "Montant total",
            &format_amount(payload.stats().amounts.total),
            None,
        ),
    ]
    .join("\n")
}

struct TrainTotals {
    controls: u64,
    passengers: u64,
    fraud: u64,
    first_row: usize,
}

fn train_navigation(rows: &[RecordRow], thresholds: &ThresholdConfig) -> Option<String> {
    let mut trains: BTreeMap<&str, TrainTotals> = BTreeMap::new();
    for (index, row) in rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.location_type == LocationType::Train)
    {
        let Some(number) = row.train_number.as_deref() else {
            continue;
        };
        let totals = trains.entry(number).or_insert_with(|| TrainTotals {
            controls: 0,
            passengers: 0,
            fraud: 0,
            first_row: index,
        });
        totals.controls += 1;
        totals.passengers += row.passengers;
        totals.fraud += row.fraud_count;
    }
    if trains.is_empty() {
        return None;
    }

    let links = trains
        .iter()
        .map(|(number, t)| {
            let rate = rate_percent(t.fraud, t.passengers);
            let tier = thresholds.classify(rate);
            format!(
                r##"<a href="#{anchor}" style="border-left: 4px solid {hex}">Train {number} <small>{controls} contrôle(s), {rate}</small></a>"##,
                anchor = row_anchor(t.first_row),
                hex = tier.hex(),
                number = html_escape(number),
                controls = t.controls,
                rate = html_escape(&format_rate(rate, RATE_DECIMALS)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!(r#"<nav class="nav">{links}</nav>"#))
}

fn trend_chart(points: &[TrendPoint], thresholds: &ThresholdConfig) -> String {
    if points.is_empty() {
        return r#"<p class="card empty">Aucun</p>"#.to_string();
    }
    let max = points.iter().map(|p| p.fraud_rate).fold(0.0, f64::max);
    let bars = points
        .iter()
        .map(|p| {
            let tier = thresholds.classify(p.fraud_rate);
            format!(
                r#"<div class="bar-wrap" title="Semaine du {week} : {rate}"><div class="bar" style="height: {height:.1}%; background: {hex}"></div><span class="label">{week}</span></div>"#,
                week = format_date(p.week_start),
                rate = html_escape(&format_rate(p.fraud_rate, RATE_DECIMALS)),
                height = bar_height(p.fraud_rate, max),
                hex = tier.hex(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(r#"<div class="chart">{bars}</div>"#)
}

fn most_sensitive(payload: &ReportPayload, thresholds: &ThresholdConfig) -> String {
    let rows = payload.most_sensitive(MOST_SENSITIVE_LIMIT);
    if rows.is_empty() {
        return r#"<p class="card empty">Aucun</p>"#.to_string();
    }
    let items = rows
        .iter()
        .map(|(index, row)| {
            let tier = thresholds.classify(row.fraud_rate);
            format!(
                r##"<li><a href="#{anchor}">{date} {time} - {place}</a> <span class="badge tier" style="background: {hex}">{rate}</span> <small>{fraud} fraude(s) / {passengers} voyageurs</small></li>"##,
                anchor = row_anchor(*index),
                date = format_date(row.date),
                time = format_time(row.time),
                place = html_escape(&row.place_label),
                hex = tier.hex(),
                rate = html_escape(&format_rate(row.fraud_rate, RATE_DECIMALS)),
                fraud = row.fraud_count,
                passengers = row.passengers,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("<ol>{items}</ol>")
}

fn category_cards(payload: &ReportPayload) -> String {
    CategoryGroup::all()
        .iter()
        .map(|group| {
            let lines = payload.visible_lines(*group);
            let unclassified = payload.unclassified_count(*group);
            let cards = if lines.is_empty() && unclassified == 0 {
                r#"<div class="card empty">Aucun</div>"#.to_string()
            } else {
                let mut cards = lines
                    .iter()
                    .map(|line| {
                        let amount = line
                            .amount
                            .map(|a| format!("<div>{}</div>", html_escape(&format_amount(a))))
                            .unwrap_or_default();
                        format!(
                            r#"<div class="card"><div>{}</div><div class="count">{}</div>{amount}</div>"#,
                            html_escape(line.category.label()),
                            line.count
                        )
                    })
                    .collect::<String>();
                if unclassified > 0 {
                    cards.push_str(&format!(
                        r#"<div class="card"><div>{}</div><div class="count">{unclassified}</div></div>"#,
                        html_escape(UNCLASSIFIED_LABEL)
                    ));
                }
                cards
            };
            format!(
                r#"<h3>{} ({})</h3>
<div class="cards">{cards}</div>"#,
                html_escape(group.label()),
                payload.group_total(*group)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn synthesis(payload: &ReportPayload) -> String {
    let stats = payload.stats();
    let s = &stats.summary;
    let rows = [
        (
            "Tarifs contrôle",
            format_count(s.tarifs_controle),
            format_amount(stats.amounts.tarifs_controle),
        ),
        (
            "Procès-verbaux",
            format_count(s.pv),
            format_amount(stats.amounts.proces_verbaux),
        ),
        (
            "Tarifs bord",
            format_count(payload.group_total(CategoryGroup::TarifsBord)),
            "-".to_string(),
        ),
        (
            "Relevés d'identité positifs",
            format_count(s.ri_positive),
            "-".to_string(),
        ),
        (
            "Relevés d'identité négatifs",
            format_count(s.ri_negative),
            "-".to_string(),
        ),
        (
            "Total",
            format_count(s.fraud_count),
            format_amount(stats.amounts.total),
        ),
    ]
    .iter()
    .map(|(label, count, amount)| {
        format!(
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            html_escape(label),
            html_escape(count),
            html_escape(amount)
        )
    })
    .collect::<String>();

    format!(
        r#"<table>
    <thead><tr><th>Poste</th><th class="num">Nombre</th><th class="num">Montant</th></tr></thead>
    <tbody>{rows}</tbody>
</table>"#
    )
}

const RECORD_COLUMNS: &[(&str, &str, bool)] = &[
    ("date", "Date", false),
    ("time", "Heure", false),
    ("type", "Type", false),
    ("place", "Lieu", false),
    ("agent", "Agent", false),
    ("passengers", "Voyageurs", true),
    ("en_regle", "En règle", true),
    ("tarifs", "Tarifs contrôle", true),
    ("pv", "PV", true),
    ("ri", "RI négatifs", true),
    ("fraud", "Fraudes", true),
    ("rate", "Taux", true),
];

fn record_table(rows: &[RecordRow], thresholds: &ThresholdConfig) -> String {
    let rendered = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            format!(
                r#"<td data-column="date" data-sort="{date_key}" id="{anchor}">{date}</td><td data-column="time" data-sort="{time_key}">{time}</td>{kind}{place}{agent}{passengers}{en_regle}{tarifs}{pv}{ri}{fraud}{rate}"#,
                date_key = row.date.format("%Y%m%d"),
                anchor = row_anchor(index),
                date = format_date(row.date),
                time_key = row.time.format("%H%M"),
                time = format_time(row.time),
                kind = text_cell("type", row.location_type.label()),
                place = text_cell("place", &row.place_label),
                agent = text_cell("agent", row.agent_name.as_deref().unwrap_or("-")),
                passengers = num_cell("passengers", row.passengers),
                en_regle = num_cell("en_regle", row.en_regle),
                tarifs = num_cell("tarifs", row.tarifs_controle),
                pv = num_cell("pv", row.pv),
                ri = num_cell("ri", row.ri_negative),
                fraud = num_cell("fraud", row.fraud_count),
                rate = rate_cell("rate", row.fraud_rate, thresholds),
            )
        })
        .collect::<Vec<_>>();
    sortable_table("records", RECORD_COLUMNS, &rendered)
}

/// Renders the inspection report.
///
/// # Errors
///
/// * [`HtmlError::EmptyInput`] if the payload holds no record
pub fn render_inspection_html(
    payload: &ReportPayload,
    thresholds: &ThresholdConfig,
) -> Result<String, HtmlError> {
    if payload.record_count() == 0 {
        return Err(HtmlError::EmptyInput("aucun contrôle à afficher"));
    }

    let mut meta = vec![format!("Période : {}", payload.date_range_label())];
    if let Some(location) = payload.location_label() {
        meta.push(format!("Lieu : {location}"));
    }
    let stamp = format!("Généré le {}", format_timestamp(payload.generated_at()));

    let mut sections = vec![format!(
        r#"<div class="kpis">{}</div>"#,
        kpis(payload, thresholds)
    )];
    if let Some(nav) = train_navigation(payload.rows(), thresholds) {
        sections.push(section("trains", "Navigation par train", &nav));
    }
    if let Some(points) = payload.trend() {
        sections.push(section(
            "evolution",
            "Évolution de la fraude",
            &trend_chart(points, thresholds),
        ));
    }
    sections.push(section(
        "sensibles",
        "Contrôles les plus sensibles",
        &most_sensitive(payload, thresholds),
    ));
    sections.push(section(
        "categories",
        "Détail par catégorie",
        &category_cards(payload),
    ));
    sections.push(section("synthese", "Synthèse", &synthesis(payload)));
    sections.push(section(
        "controles",
        "Tous les contrôles",
        &record_table(payload.rows(), thresholds),
    ));
    sections.push(footer(&stamp));

    let body = format!(
        "{}\n{}",
        header(payload.title(), &meta),
        sections.join("\n")
    );

    log::debug!(
        "render_inspection_html: {} records, {} bytes",
        payload.record_count(),
        body.len()
    );

    Ok(page(payload.title(), &body))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fare_control_inspection_models::InspectionRecord;
    use serde_json::json;

    use super::*;

    fn record(id: &str, date: &str, extra: &serde_json::Value) -> InspectionRecord {
        let mut value = json!({
            "id": id,
            "control_date": date,
            "control_time": "08:30",
            "location_type": "train",
            "location": "Lyon",
            "train_number": "4512",
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    fn payload(records: &[InspectionRecord]) -> ReportPayload {
        ReportPayload::builder(records)
            .title("Bilan <mars>")
            .with_weekly_trend(true)
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
    fn bar_height_has_floor() {
        assert!((bar_height(0.0, 10.0) - BAR_FLOOR_PERCENT).abs() < f64::EPSILON);
        assert!((bar_height(10.0, 10.0) - 100.0).abs() < f64::EPSILON);
        assert!((bar_height(5.0, 10.0) - 50.0).abs() < f64::EPSILON);
        assert!((bar_height(3.0, 0.0) - BAR_FLOOR_PERCENT).abs() < f64::EPSILON);
    }

    #[test]
    fn scenario_rate_and_placeholder() {
        let records = vec![
            record("a", "2025-03-10", &json!({"nb_passagers": 100, "nb_en_regle": 90, "tarifs_controle": 5, "stt_50": 5, "pv": 5, "pv_absence_titre": 5})),
            record("b", "2025-03-11", &json!({"nb_passagers": 50, "nb_en_regle": 50})),
        ];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();

        assert!(html.contains("6.67 %"));
        assert!(html.contains(r#"<div class="card empty">Aucun</div>"#));
        assert!(html.contains("Bilan &lt;mars&gt;"));
        assert!(!html.contains("Bilan <mars>"));
        assert!(html.contains(r##"href="#row-0""##));
    }

    #[test]
    fn group_heading_matches_kpi_total() {
        let records = vec![record(
            "s",
            "2025-03-10",
            &json!({"location_type": "station", "nb_passagers": 100, "pv": 5}),
        )];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();

        assert!(html.contains(r#"<h3>Procès-verbaux</h3><div class="value">5</div>"#));
        assert!(html.contains(
            r#"<h3>Procès-verbaux (5)</h3>
<div class="cards"><div class="card"><div>Non ventilé</div><div class="count">5</div></div></div>"#
        ));
        assert!(!html.contains("Procès-verbaux (0)"));
    }

    #[test]
    fn duplicate_ids_get_distinct_anchors() {
        let records = vec![
            record("dup", "2025-03-10", &json!({"nb_passagers": 10, "pv": 1})),
            record("dup", "2025-03-10", &json!({"nb_passagers": 10, "pv": 2})),
        ];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();

        assert_eq!(html.matches(r#"id="row-0""#).count(), 1);
        assert_eq!(html.matches(r#"id="row-1""#).count(), 1);
        assert!(html.contains(r##"<li><a href="#row-1">"##));
    }

    #[test]
    fn escapes_user_text() {
        let records = vec![record(
            "x",
            "2025-03-10",
            &json!({"nb_passagers": 1, "agent_name": "<img src=x onerror=alert(1)>"}),
        )];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn chart_has_one_bar_per_week() {
        let records = vec![
            record("a", "2025-03-10", &json!({"nb_passagers": 10, "pv": 1})),
            record("b", "2025-03-18", &json!({"nb_passagers": 10})),
        ];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();
        assert_eq!(html.matches(r#"class="bar-wrap""#).count(), 2);
        assert!(html.contains("height: 4.0%"));
    }

    #[test]
    fn record_table_is_sortable() {
        let records = vec![record("a", "2025-03-10", &json!({"nb_passagers": 10}))];
        let html = render_inspection_html(&payload(&records), &ThresholdConfig::default()).unwrap();
        assert!(html.contains(r#"<table id="records">"#));
        assert!(html.contains(r#"data-column="date" data-sort="20250310""#));
        assert_eq!(html.matches("<tbody>").count(), 2);
    }
}
