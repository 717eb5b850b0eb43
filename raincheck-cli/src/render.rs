//! Terminal rendering of a dashboard snapshot.

use std::fmt::Write;

use raincheck_core::{ChartKind, Snapshot};

const NOW_MARKER: &str = "now";

pub fn print_json(snapshot: &Snapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// The whole dashboard as text: header, current conditions, hourly chart and
/// the provider comparison.
pub fn dashboard(snapshot: &Snapshot, chart: ChartKind) -> String {
    let mut out = String::new();
    let current = &snapshot.current;

    let _ = writeln!(
        out,
        "{}  (updated {})",
        snapshot.place.label(),
        snapshot.local_time.format("%H:%M")
    );
    let _ = writeln!(
        out,
        "  {:.0}°C  {} [{}]  wind {} km/h  rain 1h {} mm",
        current.temperature.round(),
        snapshot.condition.description(),
        snapshot.condition.icon(),
        current.wind_speed,
        snapshot.rain_now,
    );
    out.push('\n');

    out.push_str(&hourly_chart(snapshot, chart));
    out.push('\n');
    out.push_str(&comparison_table(snapshot));
    out
}

/// One row per hour of the window; the row holding "now" is marked.
pub fn hourly_chart(snapshot: &Snapshot, chart: ChartKind) -> String {
    let window = &snapshot.window;
    let datasets = window.dataset(chart);
    let mut out = String::new();

    if datasets.is_empty() {
        out.push_str("  (no hourly data for this chart)\n");
        return out;
    }

    let heading: Vec<String> =
        datasets.iter().map(|d| format!("{} ({})", d.metric, d.unit)).collect();
    let _ = writeln!(out, "  {:>6}  {}", "hour", heading.join("  "));

    for (j, label) in window.labels.iter().enumerate() {
        let is_now = j == window.relative_now_index;
        let cells: Vec<String> = datasets
            .iter()
            .map(|d| {
                let width = d.metric.as_str().len() + d.unit.len() + 3;
                format!("{:>width$}", format_value(d.values[j]))
            })
            .collect();

        let marker = if is_now { '>' } else { ' ' };
        let _ = write!(out, "{marker} {label:>6}  {}", cells.join("  "));
        if is_now {
            let _ = write!(out, "  <- {NOW_MARKER}");
        }
        out.push('\n');
    }

    if !window.now_pinpointed {
        out.push_str("  (current hour not found in forecast; marker is approximate)\n");
    }
    out
}

pub fn comparison_table(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if snapshot.comparison.is_empty() {
        out.push_str("Rain today: unavailable\n");
        return out;
    }

    out.push_str("Rain today\n");
    for estimate in &snapshot.comparison {
        let _ = writeln!(
            out,
            "  {:<12} {:>6} mm  {}",
            estimate.provider_name,
            estimate.rain_text(),
            estimate.note
        );
    }
    out
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "-".to_string(),
    }
}
