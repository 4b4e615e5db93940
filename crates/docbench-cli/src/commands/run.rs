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

//! `docbench run`: the benchmark sweep.

use crate::cli::{ProviderKind, RunArgs};
use crate::error::CliError;
use colored::Colorize;
use docbench::{BenchConfig, Driver, MemoryProvider, Reporter};
use tracing::info;

/// Runs every selected provider and writes the report.
///
/// This is the single place an aborted sweep is reported: the reporter
/// records the failure and writes what it has, then the error is returned.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = config_from_args(&args);
    let mut reporter = Reporter::new(&config.output);
    let outcome = sweep(config, &args.providers, &mut reporter);
    finish(outcome, &mut reporter)
}

/// Writes the report for a finished sweep, or records the failure.
///
/// A report that cannot be written on success takes the same fatal path
/// as an aborted sweep.
fn finish(outcome: Result<(), CliError>, reporter: &mut Reporter) -> Result<(), CliError> {
    let outcome = outcome.and_then(|()| reporter.write_out().map_err(CliError::from));
    match outcome {
        Ok(()) => {
            info!("report written to {}", reporter.path().display());
            println!(
                "{} {} metrics written to {}",
                "✓".green().bold(),
                reporter.metrics().len(),
                reporter.path().display()
            );
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            reporter.fatal(message.as_str())?;
            Err(CliError::Aborted(message))
        }
    }
}

fn config_from_args(args: &RunArgs) -> BenchConfig {
    let mut config = BenchConfig::default()
        .with_factor(args.factor)
        .with_output(&args.output);
    if let Some(runs) = args.runs {
        config = config.with_runs(runs);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(server) = &args.server {
        config = config.with_server(server.as_str());
    }
    config
}

fn sweep(config: BenchConfig, providers: &[ProviderKind], reporter: &mut Reporter) -> Result<(), CliError> {
    let server = config.server.clone();
    let mut driver = Driver::new(config)?;

    for kind in providers {
        info!("benchmarking {}", kind);
        match kind {
            ProviderKind::Memory => driver.run(MemoryProvider::new, reporter)?,
            #[cfg(feature = "sqlite")]
            ProviderKind::Sqlite => {
                driver.run(|| docbench::SqliteProvider::new(server.clone()), reporter)?
            }
            #[cfg(not(feature = "sqlite"))]
            ProviderKind::Sqlite => {
                let _ = &server;
                return Err(CliError::UnsupportedProvider(kind.to_string()));
            }
        }
    }
    Ok(())
}
