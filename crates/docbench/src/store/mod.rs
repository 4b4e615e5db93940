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

//! Provider capability traits.
//!
//! The driver talks to backends exclusively through these traits and never
//! inspects which backend it holds.
//!
//! - [`Backend`]: connection setup shared by both capabilities
//! - [`RecordStore`]: keyed records and allocation sets
//! - [`DocumentStore`]: schema-less documents addressed by uuid, predicate
//!   or glob
//!
//! Mutations either apply fully or return an error; there is no partial
//! success at this layer.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryProvider;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProvider;

use crate::types::{AllocationSet, Document, Record, VerifyingKey};
use regex::Regex;
use thiserror::Error;

/// Result type for provider operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by providers.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or initialized.
    #[error("connection error: {0}")]
    Connection(String),

    /// The addressed record, set or document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write was rejected, for example on a duplicate key.
    #[error("insert error: {0}")]
    Insert(String),

    /// Any other failed read, update or delete.
    #[error("operation error: {0}")]
    Operation(String),

    /// A glob did not compile as a regular expression.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// SQLite driver error.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Connection lifecycle shared by both capabilities.
pub trait Backend {
    /// Short name used as the metric provider tag.
    fn name(&self) -> &str;

    /// Connects and prepares a fresh, empty store.
    fn initialize(&mut self) -> StoreResult<()>;
}

/// Keyed-record capability.
pub trait RecordStore: Backend {
    /// Fetches the record stored under `key`.
    fn get_record(&self, key: &str) -> StoreResult<Record>;

    /// Stores a record. Keys are unique.
    fn insert_record(&mut self, record: Record) -> StoreResult<()>;

    /// Keys exactly one segment below `prefix`.
    ///
    /// For `/foo/bar/` this yields `/foo/bar/baz` but not `/foo/bar/baz/box`.
    fn get_keys_under_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Sum of `size` over records charged to `allocation_set_id`.
    fn sum_size(&self, allocation_set_id: i64) -> StoreResult<i64>;

    /// Registers an allocation set.
    fn create_allocation_set(&mut self, set: AllocationSet) -> StoreResult<()>;

    /// Looks up the set id owned by `owner`.
    fn get_allocation_set_id(&self, owner: &VerifyingKey) -> StoreResult<i64>;
}

/// Schema-less document capability.
///
/// Globs are anchored regular expressions: `a.*` matches `abc` but not `cab`.
pub trait DocumentStore: Backend {
    // Reads

    /// Fetches the document with the given uuid.
    fn get_by_id(&self, uuid: &str) -> StoreResult<Document>;

    /// Documents containing every pair of `predicate`.
    fn get_where(&self, predicate: &Document) -> StoreResult<Vec<Document>>;

    /// Distinct values stored under `key` across all documents.
    fn get_unique_values(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Documents whose value under `key` matches `pattern`.
    fn get_where_value_glob(&self, key: &str, pattern: &str) -> StoreResult<Vec<Document>>;

    /// Distinct keys, across all documents, matching `pattern`.
    fn get_keys_glob(&self, pattern: &str) -> StoreResult<Vec<String>>;

    // Writes

    /// Inserts documents. Every document needs a unique uuid.
    fn insert(&mut self, docs: &[Document]) -> StoreResult<()>;

    /// Merges `kv` into the document with the given uuid.
    fn set_kv_by_id(&mut self, kv: &Document, uuid: &str) -> StoreResult<()>;

    /// Merges `kv` into every document matching `predicate`.
    fn set_kv_where(&mut self, kv: &Document, predicate: &Document) -> StoreResult<()>;

    /// Merges `kv` into every document whose value under `key` matches `pattern`.
    fn set_kv_value_glob(&mut self, kv: &Document, key: &str, pattern: &str) -> StoreResult<()>;

    // Deletes

    /// Removes `keys` from the document with the given uuid.
    fn delete_keys_by_id(&mut self, keys: &[String], uuid: &str) -> StoreResult<()>;

    /// Removes `keys` from every document matching `predicate`.
    fn delete_keys_where(&mut self, keys: &[String], predicate: &Document) -> StoreResult<()>;

    /// Removes keys matching `pattern` from the document with the given uuid.
    fn delete_keys_glob_by_id(&mut self, pattern: &str, uuid: &str) -> StoreResult<()>;

    /// Removes keys matching `pattern` from every document matching `predicate`.
    fn delete_keys_glob_where(&mut self, pattern: &str, predicate: &Document) -> StoreResult<()>;
}

/// A backend offering both capabilities.
pub trait Provider: RecordStore + DocumentStore {}

impl<T: RecordStore + DocumentStore> Provider for T {}

/// Compiles `pattern` as an anchored regular expression.
pub fn compile_glob(pattern: &str) -> StoreResult<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| StoreError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Returns true if `key` sits exactly one segment below `prefix`.
pub(crate) fn is_direct_child(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Rejects writes that would change a document's identity.
pub(crate) fn check_no_uuid(kv: &Document) -> StoreResult<()> {
    if kv.get(Document::UUID_KEY).is_some() {
        return Err(StoreError::Operation(
            "the uuid of a stored document cannot be changed".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_is_anchored() {
        let re = compile_glob("a.*").unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("cab"));

        let re = compile_glob("b").unwrap();
        assert!(re.is_match("b"));
        assert!(!re.is_match("abc"));
    }

    #[test]
    fn test_glob_alternation_stays_anchored() {
        let re = compile_glob("x|y").unwrap();
        assert!(re.is_match("x"));
        assert!(!re.is_match("xy"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = compile_glob("(unclosed").unwrap_err();
        assert!(matches!(err, StoreError::InvalidPattern { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_is_direct_child() {
        assert!(is_direct_child("/foo/bar/baz", "/foo/bar/"));
        assert!(!is_direct_child("/foo/bar/baz/box", "/foo/bar/"));
        assert!(!is_direct_child("/foo/bar/", "/foo/bar/"));
        assert!(!is_direct_child("/other/baz", "/foo/bar/"));
    }

    #[test]
    fn test_check_no_uuid() {
        let ok: Document = [("a", "1")].into_iter().collect();
        assert!(check_no_uuid(&ok).is_ok());
        assert!(check_no_uuid(&Document::with_uuid("u")).is_err());
    }
}
