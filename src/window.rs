use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// First day of the week used everywhere dates are bucketed into weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Some(Self::Sunday),
            "monday" | "mon" => Some(Self::Monday),
            _ => None,
        }
    }

    /// Saturates at `NaiveDate::MIN` for the first partial week of the calendar.
    pub fn start_of_week(self, date: NaiveDate) -> NaiveDate {
        self.checked_start_of_week(date).unwrap_or(NaiveDate::MIN)
    }

    /// Saturates at `NaiveDate::MAX` for the last partial week of the calendar.
    pub fn end_of_week(self, date: NaiveDate) -> NaiveDate {
        self.checked_start_of_week(date)
            .and_then(|start| start.checked_add_signed(Duration::days(6)))
            .unwrap_or(NaiveDate::MAX)
    }

    fn checked_start_of_week(self, date: NaiveDate) -> Option<NaiveDate> {
        let offset = match self {
            Self::Sunday => date.weekday().num_days_from_sunday(),
            Self::Monday => date.weekday().num_days_from_monday(),
        };
        date.checked_sub_signed(Duration::days(offset as i64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    Backward,
    Forward,
}

/// Inclusive, day-granular range of dates shown by the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Explicit window; `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Window ending on the last day of the week containing `today` and
    /// starting on the first day of the week `span_weeks` weeks earlier.
    /// A span reaching past the calendar start is cut at `NaiveDate::MIN`.
    pub fn initial(today: NaiveDate, span_weeks: u32, week_start: WeekStart) -> Self {
        let end = week_start.end_of_week(today);
        Self::ending_at(end, span_weeks, week_start).unwrap_or(Self {
            start: NaiveDate::MIN,
            end,
        })
    }

    /// Shift `end` by `step_weeks` and re-derive `start` from the new end.
    /// Paging past either end of the calendar leaves the window unchanged.
    pub fn page(
        &self,
        direction: PageDirection,
        step_weeks: u32,
        span_weeks: u32,
        week_start: WeekStart,
    ) -> Self {
        let step = Duration::weeks(step_weeks as i64);
        let end = match direction {
            PageDirection::Backward => self.end.checked_sub_signed(step),
            PageDirection::Forward => self.end.checked_add_signed(step),
        };
        match end.and_then(|end| Self::ending_at(end, span_weeks, week_start)) {
            Some(window) => window,
            None => {
                warn!(?direction, end = %self.end, "page leaves the calendar range");
                *self
            }
        }
    }

    fn ending_at(end: NaiveDate, span_weeks: u32, week_start: WeekStart) -> Option<Self> {
        let span_start = end.checked_sub_signed(Duration::weeks(span_weeks as i64))?;
        let start = week_start.checked_start_of_week(span_start)?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both bounds included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }

    /// Bounds encoded as comparable `YYYYMMDD` keys for the query collaborator.
    pub fn day_keys(&self) -> (u32, u32) {
        (day_key(self.start), day_key(self.end))
    }
}

/// `YYYYMMDD` key; dates before year 0 collapse to 0.
pub fn day_key(date: NaiveDate) -> u32 {
    let key = i64::from(date.year()) * 10_000 + i64::from(date.month() * 100 + date.day());
    key.clamp(0, i64::from(u32::MAX)) as u32
}

pub fn parse_day_key(key: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt((key / 10_000) as i32, (key / 100) % 100, key % 100)
}
