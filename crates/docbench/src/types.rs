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

//! Data model shared by the driver and the providers.
//!
//! - [`Record`]: a keyed record addressed by a slash-delimited path
//! - [`AllocationSet`]: a grouping of records for size accounting
//! - [`Document`]: a schema-less list of key/value pairs carrying a `uuid`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Length of a [`VerifyingKey`] in bytes.
pub const VERIFYING_KEY_LEN: usize = 32;

/// A 32-byte public key identifying the owner of an allocation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifyingKey(pub [u8; VERIFYING_KEY_LEN]);

impl VerifyingKey {
    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; VERIFYING_KEY_LEN]> for VerifyingKey {
    fn from(bytes: [u8; VERIFYING_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A stored item addressed by a hierarchical key such as `/foo/bar/1/2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Slash-delimited key, unique within a store.
    pub key: String,
    /// Numeric id of the allocation set the record is charged to.
    pub allocation_set_id: i64,
    /// Owner identifier.
    pub owner: i64,
    /// Accounted size in bytes.
    pub size: i64,
    /// Opaque payload.
    pub value: Vec<u8>,
}

/// A grouping identifier for records.
///
/// Records reference a set by `id` only; nothing at this layer checks that
/// the set exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSet {
    pub owner: VerifyingKey,
    pub id: i64,
}

/// A schema-less record: an ordered list of key/value string pairs.
///
/// Keys are expected to be unique. Nothing deduplicates them, so a document
/// built from malformed input may carry the same key twice. The reserved
/// [`Document::UUID_KEY`] entry holds the document's global identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    entries: Vec<(String, String)>,
}

impl Document {
    /// Reserved key carrying the document identifier.
    pub const UUID_KEY: &'static str = "uuid";

    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document whose first entry is its `uuid`.
    pub fn with_uuid(uuid: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.push(Self::UUID_KEY, uuid);
        doc
    }

    /// Appends a pair without checking for an existing key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Overwrites the value of `key` in place, or appends the pair.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.push(key, value),
        }
    }

    /// Removes every entry with the given key, returning the first value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let mut removed = None;
        self.entries.retain(|(k, v)| {
            if k == key {
                if removed.is_none() {
                    removed = Some(v.clone());
                }
                false
            } else {
                true
            }
        });
        removed
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    /// Value of the first entry with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The document identifier, if present.
    pub fn uuid(&self) -> Option<&str> {
        self.get(Self::UUID_KEY)
    }

    /// Entry at `index` in insertion order.
    pub fn entry(&self, index: usize) -> Option<(&str, &str)> {
        self.entries
            .get(index)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when every pair of `predicate` is present in `self`.
    ///
    /// An empty predicate matches every document.
    pub fn matches(&self, predicate: &Document) -> bool {
        predicate
            .iter()
            .all(|(pk, pv)| self.iter().any(|(k, v)| k == pk && v == pv))
    }

    /// Set equality of entries, ignoring order.
    pub fn same_entries(&self, other: &Document) -> bool {
        let mine: HashSet<(&str, &str)> = self.iter().collect();
        let theirs: HashSet<(&str, &str)> = other.iter().collect();
        mine == theirs
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::with_uuid("u-1");
        doc.push("color", "red");
        doc.push("shape", "square");
        doc
    }

    #[test]
    fn test_uuid_and_get() {
        let doc = sample();
        assert_eq!(doc.uuid(), Some("u-1"));
        assert_eq!(doc.get("shape"), Some("square"));
        assert_eq!(doc.get("missing"), None);
        assert_eq!(doc.entry(0), Some(("uuid", "u-1")));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut doc = sample();
        doc.set("color", "blue");
        doc.set("size", "xl");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.entry(1), Some(("color", "blue")));
        assert_eq!(doc.entry(3), Some(("size", "xl")));
    }

    #[test]
    fn test_remove_all_duplicates() {
        let mut doc = sample();
        doc.push("color", "green");
        assert_eq!(doc.remove("color"), Some("red".to_string()));
        assert_eq!(doc.get("color"), None);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_matches() {
        let doc = sample();
        let hit: Document = [("color", "red")].into_iter().collect();
        let miss: Document = [("color", "red"), ("shape", "circle")].into_iter().collect();
        assert!(doc.matches(&hit));
        assert!(!doc.matches(&miss));
        assert!(doc.matches(&Document::new()));
    }

    #[test]
    fn test_same_entries_ignores_order() {
        let doc = sample();
        let shuffled: Document = [("shape", "square"), ("uuid", "u-1"), ("color", "red")]
            .into_iter()
            .collect();
        assert!(doc.same_entries(&shuffled));
        assert_ne!(doc, shuffled);
    }

    #[test]
    fn test_verifying_key_display() {
        let mut bytes = [0u8; VERIFYING_KEY_LEN];
        bytes[0] = 0xab;
        let key = VerifyingKey::from(bytes);
        let hex = key.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab00"));
    }
}
