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

//! Command-line argument definitions.

use crate::commands;
use crate::error::CliError;
use clap::{Args, Subcommand, ValueEnum};
use docbench::config::{DEFAULT_OUTPUT, FACTOR, SERVER_ENV};
use std::fmt;
use std::path::PathBuf;

/// Backends the binary can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// In-process maps, no I/O
    Memory,
    /// SQLite database; in-memory unless a server path is given
    Sqlite,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Memory => write!(f, "memory"),
            ProviderKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Arguments of `docbench run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Providers to benchmark, in order
    #[arg(
        short,
        long = "provider",
        value_enum,
        value_delimiter = ',',
        default_value = "memory"
    )]
    pub providers: Vec<ProviderKind>,

    /// Scaling factor: operations per scenario, and ten times the run count
    #[arg(short, long, default_value_t = FACTOR)]
    pub factor: usize,

    /// Override the run count derived from the factor
    #[arg(short, long)]
    pub runs: Option<usize>,

    /// Random seed; wall-clock time when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report output path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Backend connection address
    #[arg(long, env = SERVER_ENV)]
    pub server: Option<String>,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the benchmark sweep and write the JSON report
    Run(RunArgs),

    /// Print per-scenario latency statistics from a report
    Summarize {
        /// Report file
        #[arg(value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        file: PathBuf,

        /// Factor the report was produced with; values are divided by it
        #[arg(short, long, default_value_t = FACTOR)]
        factor: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the selected command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Run(args) => commands::run(args),
            Commands::Summarize { file, factor, json } => commands::summarize(&file, factor, json),
        }
    }
}
