// Docbench - Record and Document Store Latency Harness
//
// Copyright (c) 2025 Docbench contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metric accumulation and the JSON result document.
//!
//! A [`Reporter`] is created once per sweep and passed by reference to the
//! driver and every scenario. It appends one [`MetricPoint`] per timed batch
//! and writes the whole [`Report`] to disk when the sweep ends, or from
//! [`Reporter::fatal`] when it aborts. Metrics are append-only and keep call
//! order; the same `(id, iteration)` pair may appear more than once.
//!
//! # Output format
//!
//! ```json
//! {
//!   "ok": true,
//!   "fatalmsg": "",
//!   "metrics": [{"id": "memory.A", "provider": "memory", "iteration": 0, "value": 812.4}],
//!   "starttime": 1700000000,
//!   "endtime": 1700000042
//! }
//! ```

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error};

/// One completed timing observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Metric name, `<provider>.<scenario>`.
    pub id: String,
    /// Provider tag.
    pub provider: String,
    /// Run index the observation belongs to.
    pub iteration: usize,
    /// Elapsed time in microseconds.
    pub value: f64,
}

/// Complete result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// False once the sweep has aborted.
    pub ok: bool,
    /// Reason for the abort; empty on success.
    #[serde(rename = "fatalmsg")]
    pub fatal_message: String,
    /// Observations in recording order.
    pub metrics: Vec<MetricPoint>,
    /// Unix seconds at sweep start.
    #[serde(rename = "starttime")]
    pub start_time: i64,
    /// Unix seconds at the last write.
    #[serde(rename = "endtime")]
    pub end_time: i64,
}

impl Report {
    /// Creates a successful, empty report starting now.
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            ok: true,
            fatal_message: String::new(),
            metrics: Vec::new(),
            start_time: now,
            end_time: now,
        }
    }

    /// Reads a report previously written by [`Reporter::write_out`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BenchError::io_error(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates metrics for one sweep and persists them.
#[derive(Debug)]
pub struct Reporter {
    report: Report,
    path: PathBuf,
}

impl Reporter {
    /// Creates a reporter that writes to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            report: Report::new(),
            path: path.into(),
        }
    }

    /// Captures the current time. Has no effect on the report.
    #[inline(always)]
    pub fn start_timer(&self) -> Instant {
        Instant::now()
    }

    /// Appends one observation.
    pub fn record_metric(
        &mut self,
        id: impl Into<String>,
        provider: impl Into<String>,
        iteration: usize,
        value: f64,
    ) {
        self.report.metrics.push(MetricPoint {
            id: id.into(),
            provider: provider.into(),
            iteration,
            value,
        });
    }

    /// Records the microseconds elapsed since `since` and returns them.
    pub fn record_delta(
        &mut self,
        id: impl Into<String>,
        provider: impl Into<String>,
        iteration: usize,
        since: Instant,
    ) -> f64 {
        let micros = since.elapsed().as_secs_f64() * 1_000_000.0;
        self.record_metric(id, provider, iteration, micros);
        micros
    }

    /// Marks the sweep as failed and persists what has been collected.
    ///
    /// The caller decides how the process ends; this only records and writes.
    pub fn fatal(&mut self, message: impl Into<String>) -> Result<()> {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "benchmark aborted".to_string();
        }
        error!("fatal: {}", message);

        self.report.ok = false;
        self.report.fatal_message = message;
        self.write_out()
    }

    /// Stamps the end time and writes the report, replacing any previous file.
    pub fn write_out(&mut self) -> Result<()> {
        self.report.end_time = chrono::Utc::now().timestamp();
        let json = serde_json::to_string_pretty(&self.report)?;
        fs::write(&self.path, json).map_err(|e| BenchError::io_error(&self.path, e))?;
        debug!(
            "wrote {} metrics to {}",
            self.report.metrics.len(),
            self.path.display()
        );
        Ok(())
    }

    /// The accumulated report.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Observations recorded so far.
    pub fn metrics(&self) -> &[MetricPoint] {
        &self.report.metrics
    }

    /// Where the report is written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reporter_in(dir: &TempDir) -> Reporter {
        Reporter::new(dir.path().join("benchmarkresult.json"))
    }

    #[test]
    fn test_new_report_is_ok_and_empty() {
        let report = Report::new();
        assert!(report.ok);
        assert!(report.fatal_message.is_empty());
        assert!(report.metrics.is_empty());
        assert!(report.start_time > 0);
    }

    #[test]
    fn test_record_metric_appends_in_order() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        reporter.record_metric("memory.A", "memory", 0, 1.5);
        reporter.record_metric("memory.B", "memory", 0, 2.5);
        reporter.record_metric("memory.A", "memory", 0, 3.5);

        let ids: Vec<_> = reporter.metrics().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["memory.A", "memory.B", "memory.A"]);
        assert_eq!(reporter.metrics()[2].value, 3.5);
    }

    #[test]
    fn test_record_delta_is_small_and_non_negative() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        let start = reporter.start_timer();
        let value = reporter.record_delta("memory.noop", "memory", 4, start);

        assert!(value >= 0.0);
        assert!(value < 1_000_000.0);
        assert_eq!(reporter.metrics().len(), 1);
        assert_eq!(reporter.metrics()[0].iteration, 4);
        assert_eq!(reporter.metrics()[0].value, value);
    }

    #[test]
    fn test_write_out_json_shape() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        reporter.record_metric("memory.A", "memory", 0, 10.0);
        reporter.write_out().unwrap();

        let content = fs::read_to_string(reporter.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["fatalmsg"], "");
        assert_eq!(json["metrics"][0]["id"], "memory.A");
        assert_eq!(json["metrics"][0]["provider"], "memory");
        assert_eq!(json["metrics"][0]["iteration"], 0);
        assert_eq!(json["metrics"][0]["value"], 10.0);
        assert!(json["starttime"].is_i64());
        assert!(json["endtime"].as_i64() >= json["starttime"].as_i64());
    }

    #[test]
    fn test_write_out_repeatable() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        reporter.record_metric("a", "memory", 0, 1.0);
        reporter.write_out().unwrap();
        reporter.record_metric("b", "memory", 0, 2.0);
        reporter.write_out().unwrap();

        let loaded = Report::load(reporter.path()).unwrap();
        assert_eq!(loaded.metrics.len(), 2);
        assert_eq!(&loaded, reporter.report());
    }

    #[test]
    fn test_fatal_persists_partial_metrics() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        reporter.record_metric("memory.A", "memory", 0, 1.0);
        reporter.fatal("insert failed").unwrap();

        let loaded = Report::load(reporter.path()).unwrap();
        assert!(!loaded.ok);
        assert_eq!(loaded.fatal_message, "insert failed");
        assert_eq!(loaded.metrics.len(), 1);
    }

    #[test]
    fn test_fatal_message_never_empty() {
        let dir = TempDir::new().unwrap();
        let mut reporter = reporter_in(&dir);
        reporter.fatal("").unwrap();
        assert!(!reporter.report().fatal_message.is_empty());
    }

    #[test]
    fn test_write_out_reports_io_error() {
        let dir = TempDir::new().unwrap();
        let mut reporter = Reporter::new(dir.path().join("missing").join("out.json"));
        let err = reporter.write_out().unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
