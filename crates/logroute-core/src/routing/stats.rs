//! Per-provider performance statistics

use crate::provider::ProviderKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Running counters for one provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProviderStat {
    pub request_count: u64,
    pub error_count: u64,
    pub mean_latency_ms: f64,
}

impl ProviderStat {
    pub fn success_count(&self) -> u64 {
        self.request_count - self.error_count
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    fn record(&mut self, latency_ms: f64, is_error: bool) {
        self.request_count += 1;
        if is_error {
            self.error_count += 1;
        }
        self.mean_latency_ms += (latency_ms - self.mean_latency_ms) / self.request_count as f64;
    }
}

/// Shared tracker updated after every provider attempt.
///
/// Every known provider starts with zeroed counters so snapshots always
/// list all three.
pub struct StatsTracker {
    stats: Mutex<BTreeMap<ProviderKind, ProviderStat>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        let stats = ProviderKind::ALL
            .iter()
            .map(|kind| (*kind, ProviderStat::default()))
            .collect();
        Self {
            stats: Mutex::new(stats),
        }
    }

    /// Record one attempt, successful or not
    pub fn record(&self, provider: ProviderKind, latency: Duration, is_error: bool) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats
            .entry(provider)
            .or_default()
            .record(latency_ms, is_error);
    }

    pub fn get(&self, provider: ProviderKind) -> ProviderStat {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.get(&provider).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<ProviderKind, ProviderStat> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Total attempts across all providers
    pub fn total_requests(&self) -> u64 {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.values().map(|s| s.request_count).sum()
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
