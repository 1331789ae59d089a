#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Self-contained interactive HTML reports.
//!
//! The output embeds its stylesheet and script and loads nothing from the
//! network. Sections collapse on click, table columns can be hidden, and
//! sortable headers compare numerically when both cells parse as numbers.

mod assets;
pub mod embarkment;
pub mod inspection;

use fare_control_report::format::format_rate;
use fare_control_thresholds::ThresholdConfig;

pub use embarkment::render_embarkment_html;
pub use inspection::render_inspection_html;

/// Display precision of rates in HTML reports.
pub const RATE_DECIMALS: usize = 2;

/// Errors that can occur while producing an HTML report.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    /// Nothing to render.
    #[error("Aucune donnée à exporter : {0}")]
    EmptyInput(&'static str),
}

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        title = html_escape(title),
        css = assets::CSS,
        js = assets::JS,
    )
}

fn header(title: &str, meta: &[String]) -> String {
    let meta = meta
        .iter()
        .map(|line| format!(r#"<div class="meta">{}</div>"#, html_escape(line)))
        .collect::<String>();
    format!(
        r"<header>
    <h1>{}</h1>
    {meta}
</header>",
        html_escape(title)
    )
}

fn kpi(label: &str, value: &str, color: Option<&str>) -> String {
    let style = color.map_or_else(String::new, |c| format!(r#" style="border-left-color: {c}""#));
    format!(
        r#"<div class="kpi"{style}><h3>{}</h3><div class="value">{}</div></div>"#,
        html_escape(label),
        html_escape(value)
    )
}

fn section(id: &str, title: &str, body: &str) -> String {
    format!(
        r#"<section class="section" id="{id}">
    <h2>{}</h2>
    <div class="body">
{body}
    </div>
</section>"#,
        html_escape(title)
    )
}

/// Rate cell filled with its tier colour.
fn rate_cell(column: &str, rate: f64, thresholds: &ThresholdConfig) -> String {
    let tier = thresholds.classify(rate);
    format!(
        r#"<td class="num tier" data-column="{column}" data-sort="{sort}" style="background: {hex}" title="{label}">{text}</td>"#,
        sort = sort_key(rate),
        hex = tier.hex(),
        label = tier.label(),
        text = html_escape(&format_rate(rate, RATE_DECIMALS)),
    )
}

fn sort_key(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        "0".to_string()
    }
}

fn text_cell(column: &str, text: &str) -> String {
    format!(
        r#"<td data-column="{column}">{}</td>"#,
        html_escape(text)
    )
}

fn num_cell(column: &str, value: u64) -> String {
    format!(r#"<td class="num" data-column="{column}" data-sort="{value}">{value}</td>"#)
}

/// Sortable table with a column toggle bar.
///
/// `columns` are `(key, label, numeric)`; each row is pre-rendered `<td>`
/// markup whose cells carry matching `data-column` keys.
fn sortable_table(id: &str, columns: &[(&str, &str, bool)], rows: &[String]) -> String {
    let toggles = columns
        .iter()
        .map(|(key, label, _)| {
            format!(
                r#"<label><input type="checkbox" checked data-table="{id}" data-column="{key}"> {}</label>"#,
                html_escape(label)
            )
        })
        .collect::<String>();
    let headers = columns
        .iter()
        .map(|(key, label, numeric)| {
            let class = if *numeric { "sortable num" } else { "sortable" };
            format!(
                r#"<th class="{class}" data-column="{key}">{}</th>"#,
                html_escape(label)
            )
        })
        .collect::<String>();
    let body = rows
        .iter()
        .map(|cells| format!("<tr>{cells}</tr>\n"))
        .collect::<String>();

    format!(
        r#"<div class="column-toggles">{toggles}</div>
<table id="{id}">
    <thead><tr>{headers}</tr></thead>
    <tbody>
{body}    </tbody>
</table>"#
    )
}

fn footer(stamp: &str) -> String {
    format!("<footer>{}</footer>", html_escape(stamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn rate_cell_carries_tier_colour() {
        let cell = rate_cell("rate", 12.0, &ThresholdConfig::default());
        assert!(cell.contains("#ef4444"));
        assert!(cell.contains("12.00 %"));
        assert!(cell.contains(r#"data-sort="12""#));
    }

    #[test]
    fn sortable_table_has_toggles_and_headers() {
        let html = sortable_table(
            "t",
            &[("a", "Alpha", false), ("b", "Beta", true)],
            &[format!("{}{}", text_cell("a", "x"), num_cell("b", 3))],
        );
        assert!(html.contains(r#"data-table="t" data-column="b""#));
        assert!(html.contains(r#"<th class="sortable num" data-column="b">Beta</th>"#));
        assert!(html.contains(r#"data-sort="3""#));
    }
}
