//! Recency-ordered search history.
//!
//! Entries are kept most recent first and are unique by normalized query
//! (trimmed, lowercased). Re-recording a query moves it to the front with a
//! fresh id and timestamp. Once the cap is reached the entry recorded least
//! recently is evicted.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::DEFAULT_HISTORY_CAP;
use crate::model::SearchHistory;

#[derive(Debug, Clone)]
pub struct SearchHistoryTracker {
    entries: Vec<SearchHistory>,
    cap: usize,
}

impl Default for SearchHistoryTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl SearchHistoryTracker {
    /// A cap of zero is raised to one.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Rebuild from a saved list (any order), re-applying dedupe and the cap.
    pub fn from_entries(cap: usize, mut entries: Vec<SearchHistory>) -> Self {
        let mut tracker = Self::new(cap);
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        for entry in entries {
            let key = normalize_query(&entry.query);
            if key.is_empty() || tracker.position_of(&key).is_some() {
                continue;
            }
            if tracker.entries.len() == tracker.cap {
                break;
            }
            tracker.entries.push(entry);
        }
        tracker
    }

    pub fn record(&mut self, query: &str) -> Option<SearchHistory> {
        self.record_at(query, Utc::now())
    }

    /// Returns `None` for blank queries, which are never recorded.
    pub fn record_at(&mut self, query: &str, timestamp: DateTime<Utc>) -> Option<SearchHistory> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(idx) = self.position_of(&normalize_query(trimmed)) {
            let old = self.entries.remove(idx);
            debug!("[history] moving {:?} to front (was #{})", old.query, idx);
        }

        let entry = SearchHistory {
            id: fresh_id(),
            query: trimmed.to_string(),
            timestamp,
        };
        self.entries.insert(0, entry.clone());

        if self.entries.len() > self.cap {
            if let Some(evicted) = self.entries.pop() {
                debug!("[history] cap {} reached, evicted {:?}", self.cap, evicted.query);
            }
        }
        Some(entry)
    }

    /// Most recent first.
    pub fn list(&self) -> &[SearchHistory] {
        &self.entries
    }

    /// Removing an unknown id is a no-op; returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    fn position_of(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| normalize_query(&e.query) == key)
    }
}

/// Dedupe key: surrounding whitespace and case are ignored.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn fresh_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
