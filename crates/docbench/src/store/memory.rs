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

//! In-memory provider.
//!
//! Keeps records in an ordered map and documents in insertion order with a
//! uuid index. It needs no external service, which makes it the default
//! backend for smoke runs and the reference behavior in tests.

use super::{
    check_no_uuid, compile_glob, is_direct_child, Backend, DocumentStore, RecordStore,
    StoreError, StoreResult,
};
use crate::types::{AllocationSet, Document, Record, VerifyingKey};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Provider backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    records: BTreeMap<String, Record>,
    allocation_sets: HashMap<VerifyingKey, i64>,
    documents: Vec<Document>,
    by_uuid: HashMap<String, usize>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn index_of(&self, uuid: &str) -> StoreResult<usize> {
        self.by_uuid
            .get(uuid)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("document {}", uuid)))
    }

    fn indices_where(&self, predicate: &Document) -> Vec<usize> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.matches(predicate))
            .map(|(i, _)| i)
            .collect()
    }

    fn indices_value_glob(&self, key: &str, re: &Regex) -> Vec<usize> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.get(key).is_some_and(|v| re.is_match(v)))
            .map(|(i, _)| i)
            .collect()
    }

    fn merge(&mut self, indices: &[usize], kv: &Document) {
        for &i in indices {
            let doc = &mut self.documents[i];
            for (k, v) in kv.iter() {
                doc.set(k, v);
            }
        }
    }

    fn strip_keys(&mut self, indices: &[usize], keys: &[String]) {
        for &i in indices {
            self.documents[i]
                .retain(|k, _| k == Document::UUID_KEY || !keys.iter().any(|d| d == k));
        }
    }

    fn strip_glob(&mut self, indices: &[usize], re: &Regex) {
        for &i in indices {
            self.documents[i].retain(|k, _| k == Document::UUID_KEY || !re.is_match(k));
        }
    }
}

impl Backend for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn initialize(&mut self) -> StoreResult<()> {
        self.records.clear();
        self.allocation_sets.clear();
        self.documents.clear();
        self.by_uuid.clear();
        Ok(())
    }
}

impl RecordStore for MemoryProvider {
    fn get_record(&self, key: &str) -> StoreResult<Record> {
        self.records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("record {}", key)))
    }

    fn insert_record(&mut self, record: Record) -> StoreResult<()> {
        if self.records.contains_key(&record.key) {
            return Err(StoreError::Insert(format!(
                "duplicate record key {}",
                record.key
            )));
        }
        self.records.insert(record.key.clone(), record);
        Ok(())
    }

    fn get_keys_under_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .records
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| is_direct_child(key, prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn sum_size(&self, allocation_set_id: i64) -> StoreResult<i64> {
        Ok(self
            .records
            .values()
            .filter(|r| r.allocation_set_id == allocation_set_id)
            .map(|r| r.size)
            .sum())
    }

    fn create_allocation_set(&mut self, set: AllocationSet) -> StoreResult<()> {
        if self.allocation_sets.contains_key(&set.owner) {
            return Err(StoreError::Insert(format!(
                "allocation set already exists for owner {}",
                set.owner
            )));
        }
        self.allocation_sets.insert(set.owner, set.id);
        Ok(())
    }

    fn get_allocation_set_id(&self, owner: &VerifyingKey) -> StoreResult<i64> {
        self.allocation_sets
            .get(owner)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("allocation set for owner {}", owner)))
    }
}

impl DocumentStore for MemoryProvider {
    fn get_by_id(&self, uuid: &str) -> StoreResult<Document> {
        let i = self.index_of(uuid)?;
        Ok(self.documents[i].clone())
    }

    fn get_where(&self, predicate: &Document) -> StoreResult<Vec<Document>> {
        Ok(self
            .indices_where(predicate)
            .into_iter()
            .map(|i| self.documents[i].clone())
            .collect())
    }

    fn get_unique_values(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .documents
            .iter()
            .filter_map(|doc| doc.get(key))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect())
    }

    fn get_where_value_glob(&self, key: &str, pattern: &str) -> StoreResult<Vec<Document>> {
        let re = compile_glob(pattern)?;
        Ok(self
            .indices_value_glob(key, &re)
            .into_iter()
            .map(|i| self.documents[i].clone())
            .collect())
    }

    fn get_keys_glob(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let re = compile_glob(pattern)?;
        let mut seen = HashSet::new();
        Ok(self
            .documents
            .iter()
            .flat_map(|doc| doc.keys())
            .filter(|k| re.is_match(k) && seen.insert(*k))
            .map(str::to_string)
            .collect())
    }

    fn insert(&mut self, docs: &[Document]) -> StoreResult<()> {
        // Validate the whole batch first so a rejected insert stores nothing.
        let mut batch = HashSet::new();
        for doc in docs {
            let uuid = doc
                .uuid()
                .ok_or_else(|| StoreError::Insert("document has no uuid".to_string()))?;
            if self.by_uuid.contains_key(uuid) || !batch.insert(uuid) {
                return Err(StoreError::Insert(format!("duplicate document uuid {}", uuid)));
            }
        }

        for doc in docs {
            if let Some(uuid) = doc.uuid() {
                self.by_uuid.insert(uuid.to_string(), self.documents.len());
            }
            self.documents.push(doc.clone());
        }
        Ok(())
    }

    fn set_kv_by_id(&mut self, kv: &Document, uuid: &str) -> StoreResult<()> {
        check_no_uuid(kv)?;
        let i = self.index_of(uuid)?;
        self.merge(&[i], kv);
        Ok(())
    }

    fn set_kv_where(&mut self, kv: &Document, predicate: &Document) -> StoreResult<()> {
        check_no_uuid(kv)?;
        let indices = self.indices_where(predicate);
        self.merge(&indices, kv);
        Ok(())
    }

    fn set_kv_value_glob(&mut self, kv: &Document, key: &str, pattern: &str) -> StoreResult<()> {
        check_no_uuid(kv)?;
        let re = compile_glob(pattern)?;
        let indices = self.indices_value_glob(key, &re);
        self.merge(&indices, kv);
        Ok(())
    }

    fn delete_keys_by_id(&mut self, keys: &[String], uuid: &str) -> StoreResult<()> {
        let i = self.index_of(uuid)?;
        self.strip_keys(&[i], keys);
        Ok(())
    }

    fn delete_keys_where(&mut self, keys: &[String], predicate: &Document) -> StoreResult<()> {
        let indices = self.indices_where(predicate);
        self.strip_keys(&indices, keys);
        Ok(())
    }

    fn delete_keys_glob_by_id(&mut self, pattern: &str, uuid: &str) -> StoreResult<()> {
        let re = compile_glob(pattern)?;
        let i = self.index_of(uuid)?;
        self.strip_glob(&[i], &re);
        Ok(())
    }

    fn delete_keys_glob_where(&mut self, pattern: &str, predicate: &Document) -> StoreResult<()> {
        let re = compile_glob(pattern)?;
        let indices = self.indices_where(predicate);
        self.strip_glob(&indices, &re);
        Ok(())
    }
}
