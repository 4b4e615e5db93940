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

//! Benchmark driver: repeats the scenario catalogue against fresh providers.

use crate::config::BenchConfig;
use crate::error::Result;
use crate::report::Reporter;
use crate::scenarios::{self, RunContext};
use crate::store::Provider;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Runs the sweep described by a [`BenchConfig`].
///
/// Every random choice in a sweep flows from one seeded generator, so a
/// pinned seed reproduces the same keys, documents and predicates.
pub struct Driver {
    config: BenchConfig,
    seed: u64,
    rng: StdRng,
}

impl Driver {
    /// Validates the configuration and seeds the generator.
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.resolve_seed();
        Ok(Self {
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The seed the sweep was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The validated configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Runs every run of the sweep, each against a provider built by `connect`.
    ///
    /// The first error stops the sweep. Metrics recorded before it stay in
    /// `reporter`; persisting them is left to the caller.
    pub fn run<P, F>(&mut self, mut connect: F, reporter: &mut Reporter) -> Result<()>
    where
        P: Provider,
        F: FnMut() -> P,
    {
        let runs = self.config.runs();
        info!(
            "starting sweep: {} runs of {} operations per scenario, seed {}",
            runs,
            self.config.batch_size(),
            self.seed
        );

        for run in 0..runs {
            if run % 10 == 0 {
                info!("run {}", run);
            }
            let mut provider = connect();
            provider.initialize()?;
            self.run_once(&mut provider, run, reporter)?;
        }
        info!("sweep finished: {} runs, {} metrics", runs, reporter.metrics().len());
        Ok(())
    }

    /// Runs the whole catalogue once against an initialized provider.
    pub fn run_once<P>(&mut self, provider: &mut P, run: usize, reporter: &mut Reporter) -> Result<()>
    where
        P: Provider + ?Sized,
    {
        let tag = provider.name().to_string();
        debug!("run {} against {}", run, tag);

        let mut ctx = RunContext::new(tag, run, self.config.batch_size(), &mut self.rng);
        scenarios::record_insert(provider, &mut ctx, reporter)?;
        scenarios::document_suite(provider, &mut ctx, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::store::MemoryProvider;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let err = Driver::new(BenchConfig::default().with_factor(3)).err().unwrap();
        assert!(matches!(err, BenchError::InvalidConfig { .. }));
    }

    #[test]
    fn test_seed_is_pinned() {
        let driver = Driver::new(BenchConfig::default().with_seed(12)).unwrap();
        assert_eq!(driver.seed(), 12);
    }

    #[test]
    fn test_sweep_records_every_scenario_per_run() {
        let dir = TempDir::new().unwrap();
        let config = BenchConfig::default()
            .with_factor(8)
            .with_runs(2)
            .with_seed(1)
            .with_output(dir.path().join("out.json"));
        let mut reporter = Reporter::new(&config.output);
        let mut driver = Driver::new(config).unwrap();

        driver.run(MemoryProvider::new, &mut reporter).unwrap();

        let per_run = scenarios::Scenario::ALL.len();
        assert_eq!(reporter.metrics().len(), 2 * per_run);
        assert!(reporter.metrics()[..per_run].iter().all(|m| m.iteration == 0));
        assert!(reporter.metrics()[per_run..].iter().all(|m| m.iteration == 1));
        assert_eq!(reporter.metrics()[0].id, "memory.A");
        assert!(reporter.metrics().iter().all(|m| m.provider == "memory"));
    }
}
