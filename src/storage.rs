use crate::errors::AppError;
use crate::models::RawDayRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JournalData {
    #[serde(default)]
    pub pages: Vec<JournalPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalPage {
    pub journal_day: u32,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub blocks: Vec<String>,
}

impl JournalPage {
    fn non_blank_blocks(&self) -> u64 {
        self.blocks.iter().filter(|block| !block.trim().is_empty()).count() as u64
    }

    fn string_properties(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect()
    }
}

/// File-backed journal, re-read on every query.
#[derive(Debug, Clone)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is an empty journal; any other read or parse failure is
    /// an error.
    pub async fn load(&self) -> Result<JournalData, AppError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                error!(path = %self.path.display(), "failed to parse journal file: {err}");
                AppError::from(err)
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "journal file missing, treating as empty");
                Ok(JournalData::default())
            }
            Err(err) => {
                error!(path = %self.path.display(), "failed to read journal file: {err}");
                Err(AppError::from(err))
            }
        }
    }

    pub async fn query(&self, start_key: u32, end_key: u32) -> Result<Vec<RawDayRecord>, AppError> {
        let data = self.load().await?;
        Ok(query_pages(&data, start_key, end_key))
    }
}

/// Journal days within `[start_key, end_key]` that have non-blank content.
pub fn query_pages(data: &JournalData, start_key: u32, end_key: u32) -> Vec<RawDayRecord> {
    data.pages
        .iter()
        .filter(|page| (start_key..=end_key).contains(&page.journal_day))
        .filter_map(|page| {
            let item_count = page.non_blank_blocks();
            (item_count > 0).then(|| RawDayRecord {
                day_key: page.journal_day,
                entry_name: page.name.clone(),
                properties: page.string_properties(),
                item_count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(day: u32, blocks: &[&str]) -> JournalPage {
        JournalPage {
            journal_day: day,
            name: format!("page-{day}"),
            properties: BTreeMap::new(),
            blocks: blocks.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("journal_heatmap_{tag}_{pid}_{nanos}.json"))
    }

    #[test]
    fn query_filters_range_and_blank_pages() {
        let data = JournalData {
            pages: vec![
                page(20231231, &["outside"]),
                page(20240101, &["one", "  ", "two"]),
                page(20240102, &["", "   "]),
                page(20240107, &["last"]),
                page(20240108, &["outside"]),
            ],
        };
        let records = query_pages(&data, 20240101, 20240107);
        let keys: Vec<_> = records.iter().map(|r| (r.day_key, r.item_count)).collect();
        assert_eq!(keys, vec![(20240101, 2), (20240107, 1)]);
    }

    #[test]
    fn properties_are_stringified() {
        let mut p = page(20240105, &["x"]);
        p.properties.insert("mood".into(), serde_json::json!(4.5));
        p.properties.insert("note".into(), serde_json::json!("good"));
        p.properties.insert("empty".into(), Value::Null);
        let records = query_pages(&JournalData { pages: vec![p] }, 0, u32::MAX);
        let props = &records[0].properties;
        assert_eq!(props.get("mood").map(String::as_str), Some("4.5"));
        assert_eq!(props.get("note").map(String::as_str), Some("good"));
        assert!(!props.contains_key("empty"));
    }

    #[tokio::test]
    async fn missing_file_is_empty_journal() {
        let store = JournalStore::new(temp_path("missing"));
        let records = store.query(0, u32::MAX).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn reads_journal_file() {
        let path = temp_path("read");
        let body = r#"{"pages":[
            {"journal_day":20240102,"name":"Jan 2nd, 2024","blocks":["a","b","c"]}
        ]}"#;
        fs::write(&path, body).await.unwrap();

        let store = JournalStore::new(path.clone());
        let records = store.query(20240101, 20240107).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry_name, "Jan 2nd, 2024");
        assert_eq!(records[0].item_count, 3);

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();
        let store = JournalStore::new(path.clone());
        assert!(store.query(0, u32::MAX).await.is_err());
        let _ = fs::remove_file(&path).await;
    }
}
