use crate::metrics::{BLOCK_COUNT_KEY, BLOCK_COUNT_LABEL, MetricSettings};
use crate::window::WeekStart;
use std::{env, path::PathBuf, str::FromStr};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/journal.json";
pub const DEFAULT_SPAN_WEEKS: u32 = 25;
pub const DEFAULT_STEP_WEEKS: u32 = 12;
/// Upper bound for both span and step; ten years of weeks.
pub const MAX_WINDOW_WEEKS: u32 = 520;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub span_weeks: u32,
    pub step_weeks: u32,
    pub week_start: WeekStart,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            span_weeks: DEFAULT_SPAN_WEEKS,
            step_weeks: DEFAULT_STEP_WEEKS,
            week_start: WeekStart::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub metrics: MetricSettings,
    pub window: WindowConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let properties =
            lookup("HEATMAP_PROPERTIES").unwrap_or_else(|| BLOCK_COUNT_KEY.to_string());
        let display_names =
            lookup("HEATMAP_DISPLAY_NAMES").unwrap_or_else(|| BLOCK_COUNT_LABEL.to_string());

        let week_start = match lookup("HEATMAP_WEEK_START") {
            Some(value) => WeekStart::parse(&value).unwrap_or_else(|| {
                warn!(%value, "unknown HEATMAP_WEEK_START, using default");
                WeekStart::default()
            }),
            None => WeekStart::default(),
        };

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            metrics: MetricSettings::from_lists(&properties, &display_names),
            window: WindowConfig {
                span_weeks: parse_weeks(&lookup, "HEATMAP_SPAN_WEEKS", DEFAULT_SPAN_WEEKS),
                step_weeks: parse_weeks(&lookup, "HEATMAP_STEP_WEEKS", DEFAULT_STEP_WEEKS),
                week_start,
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, %value, "invalid value, using default");
            default
        }),
        None => default,
    }
}

fn parse_weeks<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    let weeks = parse_or(lookup, key, default);
    if (1..=MAX_WINDOW_WEEKS).contains(&weeks) {
        weeks
    } else {
        warn!(key, weeks, max = MAX_WINDOW_WEEKS, "week count out of range, using default");
        default
    }
}
