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

//! Per-scenario latency statistics over a written report.

use crate::report::Report;
use serde::Serialize;

/// Descriptive statistics of one `(id, provider)` group.
///
/// Latencies are per operation: each metric value divided by the batch size,
/// in microseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    /// Metric id.
    pub id: String,
    /// Provider tag.
    pub provider: String,
    /// Number of observations.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; zero for a single observation.
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p99: f64,
    pub max: f64,
}

/// Groups `report.metrics` by `(id, provider)` in first-seen order.
///
/// A `batch_size` of zero is treated as one.
pub fn summarize(report: &Report, batch_size: usize) -> Vec<ScenarioSummary> {
    let divisor = batch_size.max(1) as f64;
    let mut groups: Vec<((&str, &str), Vec<f64>)> = Vec::new();

    for metric in &report.metrics {
        let key = (metric.id.as_str(), metric.provider.as_str());
        let value = metric.value / divisor;
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key, vec![value])),
        }
    }

    groups
        .into_iter()
        .map(|((id, provider), values)| describe(id, provider, values))
        .collect()
}

fn describe(id: &str, provider: &str, mut values: Vec<f64>) -> ScenarioSummary {
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = if count > 1 {
        let variance = values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    ScenarioSummary {
        id: id.to_string(),
        provider: provider.to_string(),
        count,
        mean,
        std_dev,
        min: values[0],
        p25: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        p75: percentile(&values, 0.75),
        p99: percentile(&values, 0.99),
        max: values[count - 1],
    }
}

/// Linearly interpolated percentile of non-empty, sorted `values`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
