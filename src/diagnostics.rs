//! In-memory diagnostics log for outbound API calls
//!
//! Backs the debug viewer: a bounded ring buffer of per-call records,
//! plus per-source statistics (success rate, latency percentiles)
//! derived from the same records. Process lifetime only; nothing is
//! persisted.

use crate::constants::MAX_DIAGNOSTIC_RECORDS;
use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Outcome of one recorded call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The call returned usable data
    Success,
    /// The call failed; the message is the rendered error
    Failure { message: String },
}

/// One outbound API call, as shown in the debug viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallRecord {
    pub id: Uuid,
    pub source: String,
    pub endpoint: String,
    #[serde(flatten)]
    pub outcome: CallOutcome,
    pub latency_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl ApiCallRecord {
    /// Whether the call succeeded
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success)
    }
}

/// Per-source request statistics
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub source: String,
    pub total_requests: u64,
    pub failed_requests: u64,
    /// Success rate, 0.0 to 1.0; 1.0 when nothing was recorded
    pub success_rate: f64,
    /// 50th percentile latency of successful calls, in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful calls, in milliseconds
    pub latency_p99_ms: f64,
}

/// Bounded log of outbound API calls
pub struct DiagnosticsLog {
    records: RwLock<VecDeque<ApiCallRecord>>,
    capacity: usize,
}

impl DiagnosticsLog {
    /// Creates a log with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_DIAGNOSTIC_RECORDS)
    }

    /// Creates a log bounded to `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.min(256))),
            capacity,
        }
    }

    /// Appends one record, evicting the oldest when full
    pub async fn record(
        &self,
        source: &str,
        endpoint: &str,
        outcome: CallOutcome,
        latency: Duration,
    ) {
        let record = ApiCallRecord {
            id: Uuid::new_v4(),
            source: source.to_string(),
            endpoint: endpoint.to_string(),
            outcome,
            latency_ms: latency.as_secs_f64() * 1000.0,
            timestamp: Utc::now(),
        };

        let mut records = self.records.write().await;
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Convenience: records the outcome of a fetch result
    pub async fn record_result<T>(
        &self,
        source: &str,
        endpoint: &str,
        result: &Result<T, FetchError>,
        latency: Duration,
    ) {
        let outcome = match result {
            Ok(_) => CallOutcome::Success,
            Err(e) => CallOutcome::Failure {
                message: e.to_string(),
            },
        };
        self.record(source, endpoint, outcome, latency).await;
    }

    /// The `n` most recent records, newest first
    pub async fn recent(&self, n: usize) -> Vec<ApiCallRecord> {
        let records = self.records.read().await;
        records.iter().rev().take(n).cloned().collect()
    }

    /// Every failed call still in the buffer, newest first
    pub async fn failures(&self) -> Vec<ApiCallRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .rev()
            .filter(|r| !r.succeeded())
            .cloned()
            .collect()
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the log is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drops every record
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Statistics for one source, computed over the buffered records
    pub async fn source_stats(&self, source: &str) -> SourceStats {
        let records = self.records.read().await;

        let mut total = 0u64;
        let mut failed = 0u64;
        let mut latencies: Vec<f64> = Vec::new();

        for record in records.iter().filter(|r| r.source == source) {
            total += 1;
            if record.succeeded() {
                latencies.push(record.latency_ms);
            } else {
                failed += 1;
            }
        }

        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if total > 0 {
            (total - failed) as f64 / total as f64
        } else {
            1.0
        };

        SourceStats {
            source: source.to_string(),
            total_requests: total,
            failed_requests: failed,
            success_rate,
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
        }
    }
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stats_reflect_recorded_outcomes() {
        let log = DiagnosticsLog::new();

        log.record("binance", "/ticker", CallOutcome::Success, Duration::from_millis(100))
            .await;
        log.record("binance", "/ticker", CallOutcome::Success, Duration::from_millis(200))
            .await;
        log.record(
            "binance",
            "/ticker",
            CallOutcome::Failure {
                message: "Request timeout".to_string(),
            },
            Duration::from_millis(150),
        )
        .await;

        let stats = log.source_stats("binance").await;
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.failed_requests, 1);
        assert!(stats.success_rate > 0.6 && stats.success_rate < 0.7);
    }

    #[tokio::test]
    async fn buffer_never_exceeds_capacity() {
        let log = DiagnosticsLog::with_capacity(5);

        for _ in 0..20 {
            log.record("m", "/x", CallOutcome::Success, Duration::from_millis(1))
                .await;
        }

        assert_eq!(log.len().await, 5);
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let log = DiagnosticsLog::new();
        log.record("a", "/1", CallOutcome::Success, Duration::ZERO).await;
        log.record("b", "/2", CallOutcome::Success, Duration::ZERO).await;

        let recent = log.recent(2).await;
        assert_eq!(recent[0].source, "b");
        assert_eq!(recent[1].source, "a");
    }

    #[tokio::test]
    async fn failures_filters_successes_out() {
        let log = DiagnosticsLog::new();
        log.record("a", "/1", CallOutcome::Success, Duration::ZERO).await;
        log.record(
            "b",
            "/2",
            CallOutcome::Failure {
                message: "HTTP 500: down".to_string(),
            },
            Duration::ZERO,
        )
        .await;

        let failures = log.failures().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].source, "b");
    }

    #[tokio::test]
    async fn untouched_source_reports_full_success() {
        let log = DiagnosticsLog::new();
        let stats = log.source_stats("nobody").await;
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.latency_p50_ms, 0.0);
    }

    #[test]
    fn percentile_of_sorted_values() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
    }
}
