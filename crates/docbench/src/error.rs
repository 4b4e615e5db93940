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

//! Error types for benchmark execution and reporting.
//!
//! Provider failures arrive as [`StoreError`] and are wrapped here together
//! with the conditions the harness itself can hit: an exhausted key space in
//! the string generator, an unusable configuration, or a report that cannot
//! be written. Every variant is fatal to the sweep; none is retried.

use crate::store::StoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that abort a benchmark sweep.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A provider failed to connect or to apply an operation.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A provider operation failed inside a timed scenario.
    #[error("scenario {scenario} failed: {source}")]
    Scenario {
        /// Metric id of the scenario, `<provider>.<name>`
        scenario: String,
        /// The provider failure
        #[source]
        source: StoreError,
    },

    /// The string generator cannot produce another unique string.
    ///
    /// Raised either up front, when the alphabet and length cannot hold the
    /// requested number of distinct strings, or after the per-string retry
    /// ceiling is hit.
    #[error(
        "cannot generate {requested} more unique strings of length {length} \
         from a {alphabet_len}-symbol alphabet"
    )]
    ExhaustedAlphabet {
        /// Number of symbols in the alphabet
        alphabet_len: usize,
        /// Requested string length
        length: usize,
        /// Number of unique strings requested
        requested: usize,
    },

    /// Invalid configuration parameter
    #[error("invalid configuration parameter '{parameter}': {reason}")]
    InvalidConfig {
        /// Parameter name
        parameter: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Report file could not be created or written.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Report could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BenchError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
