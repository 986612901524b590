//! Learned error-signature and service frequency tables

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

const MAX_SIGNATURE_CHARS: usize = 100;
const UNKNOWN_ERROR: &str = "unknown_error";

lazy_static! {
    static ref TIMESTAMP: Regex = Regex::new(
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?"
    )
    .unwrap();
    static ref UUID: Regex = Regex::new(
        r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b"
    )
    .unwrap();
    static ref NUMBER: Regex = Regex::new(r"\b\d+\b").unwrap();
}

/// Collapse a raw log message into a signature shared by near-duplicates.
///
/// Timestamps are replaced before UUIDs and UUIDs before bare numbers, since
/// both contain digit runs the number pass would otherwise split.
pub fn normalize_error_signature(message: &str) -> String {
    if message.trim().is_empty() {
        return UNKNOWN_ERROR.to_string();
    }

    let normalized = TIMESTAMP.replace_all(message, "[TIMESTAMP]");
    let normalized = UUID.replace_all(&normalized, "[UUID]");
    let normalized = NUMBER.replace_all(&normalized, "[NUMBER]");

    normalized.chars().take(MAX_SIGNATURE_CHARS).collect()
}

/// Insertion-ordered counter table.
///
/// Counts never decrease. With a capacity set, keys beyond it are ignored
/// while existing keys keep counting.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    capacity: Option<usize>,
}

impl FrequencyTable {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Returns false when a new key was dropped because the table is full
    pub fn increment(&mut self, key: &str) -> bool {
        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].1 += 1;
            return true;
        }
        if self.capacity.is_some_and(|cap| self.entries.len() >= cap) {
            return false;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), 1));
        true
    }

    pub fn get(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `n` keys in insertion order
    pub fn first_keys(&self, n: usize) -> Vec<String> {
        self.entries.iter().take(n).map(|(k, _)| k.clone()).collect()
    }

    /// Highest counts first; ties keep insertion order
    pub fn top_by_count(&self, n: usize) -> Vec<(String, u64)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }
}

/// Long-lived pattern counters; survive session resets
#[derive(Debug, Clone, Default)]
pub struct PatternStats {
    pub error_patterns: FrequencyTable,
    pub service_frequency: FrequencyTable,
}

impl PatternStats {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            error_patterns: FrequencyTable::new(capacity),
            service_frequency: FrequencyTable::new(capacity),
        }
    }
}
