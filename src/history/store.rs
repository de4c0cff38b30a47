//! JSON-file backed scan history.
//!
//! The whole history is rewritten on every change. Entries are kept newest
//! first and trimmed to a fixed limit.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::price::Verdict;

/// One checked price tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub bgn_price: f64,
    pub eur_price: f64,
    pub is_correct: bool,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl HistoryItem {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bgn_price: verdict.bgn_price,
            eur_price: verdict.eur_price,
            is_correct: verdict.is_correct,
            timestamp: verdict.timestamp,
            location: None,
            confidence: Some(verdict.confidence),
            raw_text: Some(verdict.raw_text.clone()),
        }
    }
}

/// Which entries to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Correct,
    Incorrect,
}

impl HistoryFilter {
    pub fn matches(&self, item: &HistoryItem) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Correct => item.is_correct,
            HistoryFilter::Incorrect => !item.is_correct,
        }
    }
}

pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(path: PathBuf, limit: usize) -> Self {
        Self { path, limit }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all entries, newest first.
    ///
    /// A missing file is an empty history. An unreadable one is logged and treated as empty.
    pub fn load(&self) -> Vec<HistoryItem> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.read_items() {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to load history: {:#}", e);
                Vec::new()
            }
        }
    }

    fn read_items(&self) -> Result<Vec<HistoryItem>> {
        let contents = fs::read_to_string(&self.path)
            .context(format!("Failed to read history file: {}", self.path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse history JSON")
    }

    fn save(&self, items: &[HistoryItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create history directory")?;
        }
        let json = serde_json::to_string_pretty(items).context("Failed to serialize history")?;
        fs::write(&self.path, json)
            .context(format!("Failed to write history file: {}", self.path.display()))
    }

    /// Prepends an entry and drops the oldest beyond the limit.
    pub fn add(&self, item: HistoryItem) -> Result<()> {
        let mut items = self.load();
        debug!("Adding history item {}", item.id);
        items.insert(0, item);
        items.truncate(self.limit);
        self.save(&items)
    }

    /// Removes the entry with the given id. Returns false when no entry matched.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut items = self.load();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.save(&items)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .context(format!("Failed to remove history file: {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn filter(&self, filter: HistoryFilter) -> Vec<HistoryItem> {
        self.load()
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_item(id: &str, is_correct: bool) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            bgn_price: 12.5,
            eur_price: if is_correct { 6.39 } else { 6.49 },
            is_correct,
            timestamp: Local::now(),
            location: None,
            confidence: Some(80.0),
            raw_text: None,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 100);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_add_prepends() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 100);

        store.add(make_item("first", true)).unwrap();
        store.add(make_item("second", false)).unwrap();

        let items = store.load();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "second");
        assert_eq!(items[1].id, "first");
    }

    #[test]
    fn test_limit_drops_oldest() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 3);

        for i in 1..=5 {
            store.add(make_item(&format!("item{}", i), true)).unwrap();
        }

        let ids: Vec<String> = store.load().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["item5", "item4", "item3"]);
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 100);
        store.add(make_item("a", true)).unwrap();
        store.add(make_item("b", true)).unwrap();

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("missing").unwrap());
        let items = store.load();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "b");
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 100);
        store.add(make_item("a", true)).unwrap();

        store.clear().unwrap();
        assert!(store.load().is_empty());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_filter() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"), 100);
        store.add(make_item("ok", true)).unwrap();
        store.add(make_item("bad", false)).unwrap();

        assert_eq!(store.filter(HistoryFilter::All).len(), 2);
        let correct = store.filter(HistoryFilter::Correct);
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].id, "ok");
        assert_eq!(store.filter(HistoryFilter::Incorrect)[0].id, "bad");
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "[{broken").unwrap();

        let store = HistoryStore::new(path, 100);
        assert!(store.load().is_empty());
        // Adding replaces the corrupt content
        store.add(make_item("fresh", true)).unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new(path.clone(), 100);
        store.add(make_item("a", true)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"bgnPrice\": 12.5"));
        assert!(content.contains("\"isCorrect\": true"));
        assert!(!content.contains("rawText"));
    }
}
