use crate::metrics::MetricKind;
use crate::scale::Scale;
use crate::window::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One journal day that has at least one non-empty block, as returned by the
/// query collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDayRecord {
    pub day_key: u32,
    pub entry_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    pub item_count: u64,
}

/// Dense, gap-filled per-day activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityDatum {
    pub date: NaiveDate,
    pub display_name: String,
    pub count: u64,
    pub is_current_day: bool,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub is_current_day: bool,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDataset {
    pub metric_key: String,
    #[serde(skip)]
    pub kind: MetricKind,
    pub display_name: String,
    pub series: Vec<MetricPoint>,
    pub total: f64,
    pub scale: Scale,
}

impl MetricDataset {
    pub fn bucket(&self, value: f64) -> u8 {
        self.scale.bucket(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub value: f64,
    pub bucket: u8,
    pub is_current_day: bool,
    pub is_today: bool,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapDataset {
    pub metric_key: String,
    #[serde(skip)]
    pub kind: MetricKind,
    pub display_name: String,
    pub total: f64,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    pub window: DateWindow,
    pub today: NaiveDate,
    pub weeks: usize,
    pub datasets: Vec<HeatmapDataset>,
}

impl HeatmapResponse {
    pub fn new(window: DateWindow, today: NaiveDate, datasets: &[MetricDataset]) -> Self {
        let datasets = datasets
            .iter()
            .map(|dataset| HeatmapDataset {
                metric_key: dataset.metric_key.clone(),
                kind: dataset.kind.clone(),
                display_name: dataset.display_name.clone(),
                total: dataset.total,
                cells: dataset
                    .series
                    .iter()
                    .map(|point| HeatmapCell {
                        date: point.date,
                        value: point.value,
                        bucket: dataset.bucket(point.value),
                        is_current_day: point.is_current_day,
                        is_today: point.date == today,
                        display_name: point.display_name.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            window,
            today,
            weeks: window.len_days().div_ceil(7),
            datasets,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentDayRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub properties: String,
    #[serde(default)]
    pub display_names: String,
}
