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

//! Structured error types for the docbench CLI.

use docbench::BenchError;
use thiserror::Error;

/// Errors that end a CLI command with a failure exit code.
#[derive(Error, Debug)]
pub enum CliError {
    /// The harness failed outside of a sweep, e.g. loading a report.
    #[error(transparent)]
    Bench(#[from] BenchError),

    /// The sweep aborted. The report on disk carries the same message.
    #[error("benchmark aborted: {0}")]
    Aborted(String),

    /// The summarized report records an aborted sweep.
    #[error("report marks the sweep as failed: {0}")]
    FailedReport(String),

    /// The provider was not compiled into this binary.
    #[error("provider '{0}' is not available in this build")]
    UnsupportedProvider(String),

    /// Writing to stdout failed.
    #[error("output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
