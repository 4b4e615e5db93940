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

//! Centralized benchmark configuration.
//!
//! Every workload size derives from a single scaling factor: each scenario
//! runs a batch of `factor` operations and the sweep repeats `factor / 10`
//! times. Editing the factor scales precision and duration uniformly.

use crate::error::{BenchError, Result};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default scaling factor.
pub const FACTOR: usize = 1024;

/// Default report path, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "benchmarkresult.json";

/// Environment variable holding the backend connection address.
pub const SERVER_ENV: &str = "DOCBENCH_SERVER";

/// Benchmark configuration.
///
/// # Example
///
/// ```no_run
/// use docbench::config::BenchConfig;
///
/// let config = BenchConfig::from_env()
///     .with_factor(256)
///     .with_seed(7)
///     .with_output("out/result.json");
/// assert_eq!(config.runs(), 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Scaling factor for batch size and run count.
    pub factor: usize,
    /// Run count override; `factor / 10` when unset.
    pub runs: Option<usize>,
    /// Pinned random seed; wall-clock time when unset.
    pub seed: Option<u64>,
    /// Report output path.
    pub output: PathBuf,
    /// Backend connection address handed to providers.
    pub server: Option<String>,
}

impl BenchConfig {
    /// Creates the default configuration with the server address taken
    /// from [`SERVER_ENV`].
    pub fn from_env() -> Self {
        let server = std::env::var(SERVER_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty());
        Self {
            server,
            ..Self::default()
        }
    }

    /// Sets the scaling factor.
    pub fn with_factor(mut self, factor: usize) -> Self {
        self.factor = factor;
        self
    }

    /// Overrides the run count.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Pins the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the report output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the backend connection address.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Operations per scenario batch.
    pub fn batch_size(&self) -> usize {
        self.factor
    }

    /// Number of runs in the sweep.
    pub fn runs(&self) -> usize {
        self.runs.unwrap_or(self.factor / 10)
    }

    /// The pinned seed, or the current unix time in seconds.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
    }

    /// Rejects configurations that would measure nothing.
    pub fn validate(&self) -> Result<()> {
        if self.factor == 0 {
            return Err(BenchError::invalid_config("factor", "must be positive"));
        }
        if self.runs() == 0 {
            return Err(BenchError::invalid_config(
                "runs",
                format!(
                    "factor {} yields zero runs; use a factor of at least 10 or set runs",
                    self.factor
                ),
            ));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            factor: FACTOR,
            runs: None,
            seed: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            server: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.batch_size(), 1024);
        assert_eq!(config.runs(), 102);
        assert_eq!(config.output, PathBuf::from("benchmarkresult.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_quantities_follow_factor() {
        let config = BenchConfig::default().with_factor(16);
        assert_eq!(config.batch_size(), 16);
        assert_eq!(config.runs(), 1);
    }

    #[test]
    fn test_runs_override() {
        let config = BenchConfig::default().with_factor(4).with_runs(3);
        assert_eq!(config.runs(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_sweeps() {
        assert!(BenchConfig::default().with_factor(0).validate().is_err());
        let err = BenchConfig::default().with_factor(5).validate().unwrap_err();
        assert!(err.to_string().contains("zero runs"));
    }

    #[test]
    fn test_seed_resolution() {
        assert_eq!(BenchConfig::default().with_seed(99).resolve_seed(), 99);
        assert!(BenchConfig::default().resolve_seed() > 0);
    }

    #[test]
    fn test_builder_server() {
        let config = BenchConfig::default().with_server("db.local:27017");
        assert_eq!(config.server.as_deref(), Some("db.local:27017"));
    }
}
