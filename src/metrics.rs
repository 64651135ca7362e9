use crate::models::{ActivityDatum, MetricDataset, MetricPoint};
use crate::scale::Scale;

/// Reserved metric key for the number of non-empty blocks per day.
pub const BLOCK_COUNT_KEY: &str = "blockcount";
pub const BLOCK_COUNT_LABEL: &str = "Daily Blocks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricKind {
    BlockCount,
    Property(String),
}

impl MetricKind {
    pub fn from_key(key: &str) -> Self {
        if key == BLOCK_COUNT_KEY {
            Self::BlockCount
        } else {
            Self::Property(key.to_string())
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::BlockCount => BLOCK_COUNT_KEY,
            Self::Property(key) => key,
        }
    }

    fn value_of(&self, datum: &ActivityDatum) -> f64 {
        match self {
            Self::BlockCount => datum.count as f64,
            Self::Property(key) => datum
                .properties
                .get(key)
                .map(|raw| parse_metric_value(raw))
                .unwrap_or(0.0),
        }
    }

    fn scale_for(&self, series: &[MetricPoint]) -> Scale {
        match self {
            Self::BlockCount => Scale::Fixed,
            Self::Property(_) => Scale::dynamic(series.iter().map(|point| point.value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub kind: MetricKind,
    pub display_name: String,
}

/// Metric keys and their display names, paired by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSettings {
    pub metric_keys: Vec<String>,
    pub display_names: Vec<String>,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            metric_keys: vec![BLOCK_COUNT_KEY.to_string()],
            display_names: vec![BLOCK_COUNT_LABEL.to_string()],
        }
    }
}

impl MetricSettings {
    /// Parse the two comma-separated lists supplied by the host. An empty key
    /// list falls back to the built-in block count.
    pub fn from_lists(metric_keys: &str, display_names: &str) -> Self {
        let mut keys = split_list(metric_keys);
        if keys.is_empty() {
            keys.push(BLOCK_COUNT_KEY.to_string());
        }
        Self {
            metric_keys: keys,
            display_names: split_list(display_names),
        }
    }

    pub fn specs(&self) -> Vec<MetricSpec> {
        self.metric_keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let kind = MetricKind::from_key(key);
                let display_name = match (self.display_names.get(index), &kind) {
                    (Some(name), _) => name.clone(),
                    (None, MetricKind::BlockCount) => BLOCK_COUNT_LABEL.to_string(),
                    (None, MetricKind::Property(key)) => key.clone(),
                };
                MetricSpec { kind, display_name }
            })
            .collect()
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// One dataset per configured metric, in configuration order.
pub fn build_datasets(
    activities: &[ActivityDatum],
    settings: &MetricSettings,
) -> Vec<MetricDataset> {
    settings
        .specs()
        .into_iter()
        .map(|spec| build_dataset(activities, spec))
        .collect()
}

fn build_dataset(activities: &[ActivityDatum], spec: MetricSpec) -> MetricDataset {
    let series: Vec<MetricPoint> = activities
        .iter()
        .map(|datum| MetricPoint {
            date: datum.date,
            value: spec.kind.value_of(datum),
            is_current_day: datum.is_current_day,
            display_name: datum.display_name.clone(),
        })
        .collect();
    let total = series.iter().map(|point| point.value).sum();
    let scale = spec.kind.scale_for(&series);

    MetricDataset {
        metric_key: spec.kind.key().to_string(),
        kind: spec.kind,
        display_name: spec.display_name,
        series,
        total,
        scale,
    }
}

/// Leading-prefix float parse: `"4.5h"` reads as 4.5. Anything without a
/// numeric prefix, or non-finite, reads as 0.
pub fn parse_metric_value(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digit_at = |index: usize| bytes.get(index).is_some_and(u8::is_ascii_digit);

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while digit_at(end) {
        end += 1;
        digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while digit_at(end) {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        if digit_at(exponent_end) {
            while digit_at(exponent_end) {
                exponent_end += 1;
            }
            end = exponent_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::models::RawDayRecord;
    use crate::window::DateWindow;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datum(count: u64, properties: &[(&str, &str)]) -> ActivityDatum {
        ActivityDatum {
            date: date(2024, 1, 1),
            display_name: "Jan 1st, 2024".to_string(),
            count,
            is_current_day: false,
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn end_to_end_week_scenario() {
        let raw = vec![
            RawDayRecord {
                day_key: 20240102,
                entry_name: "Jan 2nd, 2024".to_string(),
                properties: BTreeMap::new(),
                item_count: 3,
            },
            RawDayRecord {
                day_key: 20240105,
                entry_name: "Jan 5th, 2024".to_string(),
                properties: BTreeMap::from([("mood".to_string(), "4.5".to_string())]),
                item_count: 7,
            },
        ];
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 7)).unwrap();
        let activities = materialize(&raw, &window, None);
        assert_eq!(activities.len(), 7);

        let settings = MetricSettings::from_lists("blockcount, mood", "");
        let datasets = build_datasets(&activities, &settings);
        assert_eq!(datasets.len(), 2);

        let blocks = &datasets[0];
        let values: Vec<f64> = blocks.series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 3.0, 0.0, 0.0, 7.0, 0.0, 0.0]);
        assert_eq!(blocks.total, 10.0);
        assert_eq!(blocks.scale, Scale::Fixed);
        assert_eq!(blocks.display_name, BLOCK_COUNT_LABEL);

        let mood = &datasets[1];
        let values: Vec<f64> = mood.series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 0.0, 0.0, 0.0, 4.5, 0.0, 0.0]);
        assert_eq!(mood.total, 4.5);
        assert_eq!(mood.bucket(4.5), 1);
        assert_eq!(mood.bucket(0.0), 0);
    }

    #[test]
    fn missing_or_malformed_property_reads_as_zero() {
        let activities = vec![
            datum(2, &[]),
            datum(2, &[("hours", "lots")]),
            datum(2, &[("hours", "2.5")]),
        ];
        let settings = MetricSettings::from_lists("hours", "Hours");
        let datasets = build_datasets(&activities, &settings);
        let values: Vec<f64> = datasets[0].series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 0.0, 2.5]);
        assert_eq!(datasets[0].total, 2.5);
    }

    #[test]
    fn display_names_fall_back_to_metric_key() {
        let settings = MetricSettings::from_lists("water, exercise", "Water");
        let specs = settings.specs();
        assert_eq!(specs[0].display_name, "Water");
        assert_eq!(specs[1].display_name, "exercise");
        assert_eq!(specs[1].kind, MetricKind::Property("exercise".to_string()));

        let builtin = MetricSettings::from_lists("mood,blockcount", "Mood");
        assert_eq!(builtin.specs()[1].display_name, BLOCK_COUNT_LABEL);
        assert_eq!(builtin.specs()[1].kind, MetricKind::BlockCount);
    }

    #[test]
    fn lists_are_trimmed_and_filtered() {
        let settings = MetricSettings::from_lists(" a, ,b ,, ", " A ,,");
        assert_eq!(settings.metric_keys, vec!["a", "b"]);
        assert_eq!(settings.display_names, vec!["A"]);
        assert_eq!(
            MetricSettings::from_lists(" , ", ""),
            MetricSettings {
                metric_keys: vec![BLOCK_COUNT_KEY.to_string()],
                display_names: Vec::new(),
            }
        );
    }

    #[test]
    fn datasets_keep_configured_order() {
        let activities = vec![datum(1, &[("b", "1")])];
        let settings = MetricSettings::from_lists("b,blockcount,a", "");
        let keys: Vec<_> = build_datasets(&activities, &settings)
            .into_iter()
            .map(|d| d.metric_key)
            .collect();
        assert_eq!(keys, vec!["b", "blockcount", "a"]);
    }

    #[test]
    fn datasets_carry_resolved_kind() {
        let activities = vec![datum(1, &[])];
        let settings = MetricSettings::from_lists("blockcount,mood", "");
        let kinds: Vec<_> = build_datasets(&activities, &settings)
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![MetricKind::BlockCount, MetricKind::Property("mood".to_string())]
        );
    }

    #[test]
    fn parses_numeric_prefixes() {
        assert_eq!(parse_metric_value("4.5"), 4.5);
        assert_eq!(parse_metric_value("  8h"), 8.0);
        assert_eq!(parse_metric_value("-2"), -2.0);
        assert_eq!(parse_metric_value(".5l"), 0.5);
        assert_eq!(parse_metric_value("1e3"), 1000.0);
        assert_eq!(parse_metric_value("2e"), 2.0);
        assert_eq!(parse_metric_value("abc"), 0.0);
        assert_eq!(parse_metric_value("."), 0.0);
        assert_eq!(parse_metric_value(""), 0.0);
        assert_eq!(parse_metric_value("1e999"), 0.0);
    }
}
