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

//! Docbench Command Line Interface
//!
//! # Usage
//!
//! ```bash
//! # Benchmark the in-memory provider with the default factor
//! docbench run
//!
//! # Small, reproducible sweep over both providers
//! docbench run --provider memory,sqlite --factor 64 --seed 7
//!
//! # Per-operation statistics from the last report
//! docbench summarize benchmarkresult.json
//!
//! # Per-run progress and per-scenario timings
//! RUST_LOG=docbench=debug docbench run
//! ```

use clap::Parser;
use docbench_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Docbench - record and document store latency harness
#[derive(Parser)]
#[command(name = "docbench")]
#[command(author, version, about = "Docbench - record and document store latency harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docbench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
