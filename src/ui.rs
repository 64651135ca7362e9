use crate::errors::RENDER_FALLBACK;
use crate::events::ThemeMode;
use crate::materialize::display_date;
use crate::metrics::MetricKind;
use crate::models::{HeatmapCell, HeatmapDataset, HeatmapResponse};
use crate::state::HostView;
use std::fmt::Write;

const CELL_SIZE: usize = 12;
const GUTTER: usize = 4;

pub fn render_index(heatmap: &HeatmapResponse, host: &HostView) -> String {
    let charts: String = heatmap
        .datasets
        .iter()
        .map(|dataset| render_dataset(dataset, heatmap.weeks))
        .collect();

    page(host)
        .replace("{{START}}", &display_date(heatmap.window.start()))
        .replace("{{END}}", &display_date(heatmap.window.end()))
        .replace("{{CHARTS}}", &charts)
}

pub fn render_fallback(host: &HostView) -> String {
    page(host)
        .replace("{{START}}", "")
        .replace("{{END}}", "")
        .replace(
            "{{CHARTS}}",
            &format!(r#"<div role="alert" class="fallback">{RENDER_FALLBACK}</div>"#),
        )
}

fn page(host: &HostView) -> String {
    let mut classes = vec![match host.theme {
        ThemeMode::Dark => "dark",
        ThemeMode::Light => "light",
    }];
    if host.sidebar_visible {
        classes.push("with-sidebar");
    }
    if !host.visible {
        classes.push("hidden");
    }
    INDEX_HTML.replace("{{BODY_CLASS}}", &classes.join(" "))
}

fn render_dataset(dataset: &HeatmapDataset, weeks: usize) -> String {
    let pitch = CELL_SIZE + GUTTER;
    let width = weeks * pitch;
    let height = 7 * pitch;

    let mut svg = String::new();
    for (index, cell) in dataset.cells.iter().enumerate() {
        let x = (index / 7) * pitch;
        let y = (index % 7) * pitch;
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y}" width="{CELL_SIZE}" height="{CELL_SIZE}" rx="3" "#
        );
        let _ = write!(
            svg,
            r#"class="{class}" data-target="{target}"><title>{tip}</title></rect>"#,
            class = cell_class(cell),
            target = escape(&cell.display_name),
            tip = escape(&tooltip(&dataset.kind, cell)),
        );
    }

    format!(
        r#"<section class="chart">
  <h3>{title}</h3>
  <svg width="{width}" height="{height}" viewBox="0 0 {width} {height}">{svg}</svg>
  <div class="total">Total {label}: <span>{total}</span></div>
</section>
"#,
        title = escape(&dataset.display_name),
        label = escape(&dataset.metric_key),
        total = format_total(dataset.total),
    )
}

fn cell_class(cell: &HeatmapCell) -> String {
    let mut class = format!("color-github-{}", cell.bucket);
    if cell.is_today {
        class.push_str(" today");
    }
    if cell.is_current_day {
        class.push_str(" active");
    }
    class
}

pub fn tooltip(kind: &MetricKind, cell: &HeatmapCell) -> String {
    match kind {
        MetricKind::BlockCount => {
            let count = if cell.value == 0.0 {
                "No".to_string()
            } else {
                format_total(cell.value)
            };
            format!("{count} journal blocks on {}", cell.display_name)
        }
        MetricKind::Property(key) => format!(
            "{} {key} on {}",
            format_total(cell.value),
            cell.display_name
        ),
    }
}

/// Thousands-grouped number with at most three fractional digits.
pub fn format_total(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, digit) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Journal Heatmap</title>
  <style>
    :root {
      --ink: #24292f;
      --card: #ffffff;
      --empty: #ebedf0;
      --c1: #9be9a8;
      --c2: #40c463;
      --c3: #30a14e;
      --c4: #216e39;
    }

    body.dark {
      --ink: #c9d1d9;
      --card: #0d1117;
      --empty: #161b22;
      --c1: #0e4429;
      --c2: #006d32;
      --c3: #26a641;
      --c4: #39d353;
    }

    body {
      margin: 0;
      padding: 24px;
      font-family: system-ui, sans-serif;
      background: var(--card);
      color: var(--ink);
    }

    body.hidden main {
      display: none;
    }

    body.with-sidebar main {
      margin-right: 320px;
    }

    .range {
      font-size: 12px;
      margin-bottom: 8px;
    }

    .range form {
      display: inline;
    }

    .range button {
      border: none;
      border-radius: 4px;
      margin: 0 4px;
      padding: 2px 6px;
      cursor: pointer;
      background: var(--empty);
      color: var(--ink);
    }

    .chart {
      margin-bottom: 32px;
    }

    .chart h3 {
      font-size: 14px;
      margin: 0 0 8px;
      opacity: 0.8;
      text-transform: capitalize;
    }

    .total {
      font-size: 12px;
      margin-top: 4px;
    }

    .total span {
      font-weight: 600;
    }

    rect {
      cursor: pointer;
    }

    .color-github-0 { fill: var(--empty); }
    .color-github-1 { fill: var(--c1); }
    .color-github-2 { fill: var(--c2); }
    .color-github-3 { fill: var(--c3); }
    .color-github-4 { fill: var(--c4); }

    rect.today {
      stroke: var(--ink);
      stroke-width: 1;
    }

    rect.active {
      stroke: #f78166;
      stroke-width: 2;
    }

    .fallback {
      color: #cf222e;
      font-weight: 600;
    }
  </style>
</head>
<body class="{{BODY_CLASS}}">
  <main>
    <div class="range">
      From
      <form method="post" action="/window/prev"><button type="submit">{{START}}</button></form>
      to
      <form method="post" action="/window/next"><button type="submit">{{END}}</button></form>
    </div>
    {{CHARTS}}
  </main>
  <script>
    document.querySelectorAll("rect[data-target]").forEach((cell) => {
      cell.addEventListener("click", () => {
        const target = cell.getAttribute("data-target");
        window.parent.postMessage({ type: "navigate", page: target }, "*");
      });
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BLOCK_COUNT_KEY;
    use chrono::NaiveDate;

    fn cell(value: f64, name: &str) -> HeatmapCell {
        HeatmapCell {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value,
            bucket: 1,
            is_current_day: true,
            is_today: false,
            display_name: name.to_string(),
        }
    }

    #[test]
    fn formats_totals_with_grouping() {
        assert_eq!(format_total(0.0), "0");
        assert_eq!(format_total(999.0), "999");
        assert_eq!(format_total(1234.5), "1,234.5");
        assert_eq!(format_total(1234567.0), "1,234,567");
        assert_eq!(format_total(-4200.25), "-4,200.25");
        assert_eq!(format_total(0.12345), "0.123");
    }

    #[test]
    fn tooltips_name_metric_and_day() {
        let mood = MetricKind::Property("mood".to_string());
        assert_eq!(
            tooltip(&MetricKind::BlockCount, &cell(0.0, "Jan 2, 2024")),
            "No journal blocks on Jan 2, 2024"
        );
        assert_eq!(
            tooltip(&MetricKind::BlockCount, &cell(3.0, "Jan 2nd, 2024")),
            "3 journal blocks on Jan 2nd, 2024"
        );
        assert_eq!(tooltip(&mood, &cell(4.5, "Jan 2nd, 2024")), "4.5 mood on Jan 2nd, 2024");
    }

    #[test]
    fn tooltip_follows_kind_not_key_text() {
        let shadowed = MetricKind::Property(BLOCK_COUNT_KEY.to_string());
        assert_eq!(
            tooltip(&shadowed, &cell(0.0, "Jan 2, 2024")),
            "0 blockcount on Jan 2, 2024"
        );

        let dataset = HeatmapDataset {
            metric_key: BLOCK_COUNT_KEY.to_string(),
            kind: MetricKind::BlockCount,
            display_name: "Blocks".to_string(),
            total: 2.0,
            cells: vec![cell(2.0, "Jan 2nd, 2024")],
        };
        let html = render_dataset(&dataset, 1);
        assert!(html.contains("<title>2 journal blocks on Jan 2nd, 2024</title>"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn renders_cells_with_classes() {
        let dataset = HeatmapDataset {
            metric_key: "mood".to_string(),
            kind: MetricKind::Property("mood".to_string()),
            display_name: "Mood".to_string(),
            total: 4.5,
            cells: vec![cell(4.5, "Jan 2nd, 2024")],
        };
        let html = render_dataset(&dataset, 1);
        assert!(html.contains(r#"class="color-github-1 active""#));
        assert!(html.contains(r#"data-target="Jan 2nd, 2024""#));
        assert!(html.contains("Total mood: <span>4.5</span>"));
    }

    #[test]
    fn fallback_page_shows_message() {
        let html = render_fallback(&HostView::default());
        assert!(html.contains(RENDER_FALLBACK));
        assert!(html.contains(r#"<body class="light">"#));
    }
}
