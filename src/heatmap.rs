use crate::materialize::materialize;
use crate::metrics::{MetricSettings, build_datasets};
use crate::models::HeatmapResponse;
use crate::session::Snapshot;
use chrono::{Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Materialize a fetched snapshot and derive one bucketed dataset per metric.
pub fn build_heatmap(
    snapshot: &Snapshot,
    settings: &MetricSettings,
    current_day: Option<NaiveDate>,
    today: NaiveDate,
) -> HeatmapResponse {
    let activities = materialize(&snapshot.records, &snapshot.window, current_day);
    let datasets = build_datasets(&activities, settings);
    HeatmapResponse::new(snapshot.window, today, &datasets)
}
