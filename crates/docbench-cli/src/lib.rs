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

//! Docbench CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **run**: run the benchmark sweep against one or more providers and
//!   write `benchmarkresult.json`
//! - **summarize**: print per-scenario latency statistics from a report
//!
//! # Exit status
//!
//! Both commands exit non-zero when the sweep they run or read aborted. An
//! aborted `run` still writes its report, with `ok` set to `false`.

pub mod cli;
pub mod commands;
pub mod error;

pub use error::CliError;
