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

//! Property-based tests for string generation, documents and providers.

use docbench::keygen::DEFAULT_ALPHABET;
use docbench::store::{Backend, DocumentStore};
use docbench::{BenchError, Document, MemoryProvider, StringGenerator};
use proptest::prelude::*;
use std::collections::HashSet;

/// Small documents with distinct keys and no uuid.
fn arb_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-z]{1,6}", "[A-Za-z0-9]{0,8}", 0..6)
        .prop_map(|m| m.into_iter().filter(|(k, _)| k != "uuid").collect())
}

/// Inserts one document into a fresh store and reads it back by uuid.
fn assert_roundtrip<S: DocumentStore>(
    mut store: S,
    pairs: &[(String, String)],
    id: &str,
) -> Result<(), TestCaseError> {
    let mut doc = Document::with_uuid(id);
    for (k, v) in pairs {
        doc.push(k.as_str(), v.as_str());
    }

    store.initialize().unwrap();
    store.insert(std::slice::from_ref(&doc)).unwrap();

    let loaded = store.get_by_id(id).unwrap();
    prop_assert!(loaded.same_entries(&doc));
    prop_assert_eq!(loaded.uuid(), Some(id));
    prop_assert_eq!(loaded.len(), pairs.len() + 1);
    Ok(())
}

proptest! {
    /// Property: every string is unique, has the requested length and only
    /// uses alphabet symbols
    #[test]
    fn prop_generated_strings_unique(seed in any::<u64>(), count in 0usize..200, length in 1usize..6) {
        // Stay within the key space: 64 symbols at length 1 hold only 64 strings.
        let count = count.min(DEFAULT_ALPHABET.len().pow(length as u32));
        let mut generator = StringGenerator::from_seed(DEFAULT_ALPHABET, seed).unwrap();
        let strings = generator.generate_n(count, length).unwrap();

        let distinct: HashSet<_> = strings.iter().collect();
        prop_assert_eq!(distinct.len(), count);
        for s in &strings {
            prop_assert_eq!(s.chars().count(), length);
            prop_assert!(s.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
            prop_assert!(generator.is_used(s));
        }
        prop_assert_eq!(generator.used_count(), count);
    }

    /// Property: the full key space can be drained, and one more request fails
    #[test]
    fn prop_small_space_exhausts_cleanly(seed in any::<u64>(), symbols in 1usize..4, length in 1usize..3) {
        let alphabet: String = "xyz".chars().take(symbols).collect();
        let capacity = symbols.pow(length as u32);
        let mut generator = StringGenerator::from_seed(&alphabet, seed).unwrap();

        let all = generator.generate_n(capacity, length).unwrap();
        prop_assert_eq!(all.iter().collect::<HashSet<_>>().len(), capacity);

        let next = generator.random_string(length);
        let exhausted = matches!(next, Err(BenchError::ExhaustedAlphabet { .. }));
        prop_assert!(exhausted);
    }

    /// Property: a stored document reads back with the same pairs
    #[test]
    fn prop_document_roundtrip_memory(pairs in arb_pairs(), id in "[a-f0-9]{8}") {
        assert_roundtrip(MemoryProvider::new(), &pairs, &id)?;
    }

    /// Property: a document always matches a predicate built from its own pairs
    #[test]
    fn prop_document_matches_own_subset(pairs in arb_pairs(), take in 0usize..6) {
        let doc: Document = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let predicate: Document = pairs
            .iter()
            .take(take)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        prop_assert!(doc.matches(&predicate));
    }
}

#[cfg(feature = "sqlite")]
proptest! {
    /// Property: the exploded sqlite layout reads back the same pairs
    #[test]
    fn prop_document_roundtrip_sqlite(pairs in arb_pairs(), id in "[a-f0-9]{8}") {
        assert_roundtrip(docbench::SqliteProvider::new(None), &pairs, &id)?;
    }
}
