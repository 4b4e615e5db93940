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

//! Docbench Latency Harness
//!
//! Repeatable latency measurements for storage backends that offer a
//! keyed-record interface and a schema-less document interface.
//!
//! ## Features
//!
//! - **Unique string generation**: collision-free random keys and values
//! - **Provider traits**: one contract for every backend under test
//! - **Scenario catalogue**: record inserts plus document reads, merges and
//!   deletes by uuid, predicate and glob
//! - **JSON reporting**: one result document per sweep, written on success
//!   and on abort
//!
//! ## Usage
//!
//! ```no_run
//! use docbench::{BenchConfig, Driver, MemoryProvider, Reporter};
//!
//! # fn main() -> docbench::Result<()> {
//! let config = BenchConfig::from_env().with_factor(128).with_seed(7);
//! let mut reporter = Reporter::new(&config.output);
//! let mut driver = Driver::new(config)?;
//! match driver.run(MemoryProvider::new, &mut reporter) {
//!     Ok(()) => reporter.write_out()?,
//!     Err(e) => reporter.fatal(e.to_string())?,
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod keygen;
pub mod report;
pub mod scenarios;
pub mod store;
pub mod summary;
pub mod types;

pub use config::BenchConfig;
pub use driver::Driver;
pub use error::{BenchError, Result};
pub use keygen::StringGenerator;
pub use report::{MetricPoint, Report, Reporter};
pub use store::{Backend, DocumentStore, MemoryProvider, Provider, RecordStore, StoreError};
#[cfg(feature = "sqlite")]
pub use store::SqliteProvider;
pub use types::{AllocationSet, Document, Record, VerifyingKey};
