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

//! `docbench summarize`: latency statistics from a written report.

use crate::error::CliError;
use colored::Colorize;
use docbench::summary::{summarize as summarize_report, ScenarioSummary};
use docbench::Report;
use std::path::Path;

/// Prints per-scenario statistics for the report at `file`.
///
/// Values are divided by `factor` to give per-operation microseconds. A
/// report that records an aborted sweep is still summarized, then fails the
/// command.
pub fn summarize(file: &Path, factor: usize, json: bool) -> Result<(), CliError> {
    let report = Report::load(file)?;
    let summaries = summarize_report(&report, factor);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_table(&summaries);
    }

    if !report.ok {
        eprintln!("{} {}", "Sweep failed:".red().bold(), report.fatal_message);
        return Err(CliError::FailedReport(report.fatal_message));
    }
    Ok(())
}

fn print_table(summaries: &[ScenarioSummary]) {
    let width = summaries
        .iter()
        .map(|s| s.id.len())
        .max()
        .unwrap_or(0)
        .max("scenario".len());

    println!(
        "{}",
        format!(
            "{:<width$} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "scenario", "runs", "mean", "std", "min", "median", "p99", "max",
        )
        .as_str()
        .bold()
    );
    for s in summaries {
        println!(
            "{:<width$} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.id, s.count, s.mean, s.std_dev, s.min, s.median, s.p99, s.max,
        );
    }
    println!("{}", "latencies in microseconds per operation".dimmed());
}
