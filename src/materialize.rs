use crate::models::{ActivityDatum, RawDayRecord};
use crate::window::{DateWindow, parse_day_key};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, hash_map::Entry};
use tracing::{debug, warn};

/// Expand sparse per-day records into one datum per calendar day of `window`.
///
/// When several records share a day, the first one seen wins. Records outside
/// the window, or with an invalid day key, are dropped.
pub fn materialize(
    raw: &[RawDayRecord],
    window: &DateWindow,
    current_day: Option<NaiveDate>,
) -> Vec<ActivityDatum> {
    let mut lookup: HashMap<NaiveDate, &RawDayRecord> = HashMap::with_capacity(raw.len());
    for record in raw {
        let Some(date) = parse_day_key(record.day_key) else {
            warn!(day_key = record.day_key, "dropping record with invalid day key");
            continue;
        };
        if !window.contains(date) {
            debug!(%date, "dropping record outside window");
            continue;
        }
        match lookup.entry(date) {
            Entry::Occupied(_) => {
                debug!(%date, entry = %record.entry_name, "ignoring duplicate day record");
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    let active = current_day.filter(|day| window.contains(*day));

    window
        .dates()
        .map(|date| {
            let is_current_day = active == Some(date);
            match lookup.get(&date) {
                Some(record) => ActivityDatum {
                    date,
                    display_name: record.entry_name.clone(),
                    count: record.item_count,
                    is_current_day,
                    properties: record.properties.clone(),
                },
                None => ActivityDatum {
                    date,
                    display_name: display_date(date),
                    count: 0,
                    is_current_day,
                    properties: BTreeMap::new(),
                },
            }
        })
        .collect()
}

/// Human-readable label for days without a journal entry, e.g. `Jan 2, 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
