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

//! The fixed scenario catalogue.
//!
//! Each scenario builds `batch_size` synthetic operations, then times the
//! loop that hands them to the provider one at a time and records a single
//! metric for the whole batch. Dividing the value by the batch size gives
//! per-operation latency.
//!
//! Destructive document scenarios consume top-level keys from a shrinking
//! [`KeyPool`], so later scenarios in the same run operate on keys no
//! earlier scenario has deleted.

use crate::error::{BenchError, Result};
use crate::keygen::{StringGenerator, DEFAULT_ALPHABET};
use crate::report::Reporter;
use crate::store::{DocumentStore, RecordStore, StoreResult};
use crate::types::{Document, Record};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

/// Top-level keys per synthetic document.
pub const TOP_LEVEL_KEYS: usize = 10;

/// Length of generated keys and values.
pub const STRING_LENGTH: usize = 10;

/// Named, timed units of work, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    RecordInsert,
    DocumentInsert,
    GetById,
    GetWhereSingle,
    GetWhereMany,
    GetUniqueValues,
    GetValueGlob,
    GetKeyGlob,
    SetById,
    SetWhere,
    SetValueGlob,
    DeleteKeysById,
    DeleteKeysWhere,
    DeleteGlobById,
    DeleteGlobWhere,
}

impl Scenario {
    /// Every scenario, in execution order.
    pub const ALL: [Scenario; 15] = [
        Scenario::RecordInsert,
        Scenario::DocumentInsert,
        Scenario::GetById,
        Scenario::GetWhereSingle,
        Scenario::GetWhereMany,
        Scenario::GetUniqueValues,
        Scenario::GetValueGlob,
        Scenario::GetKeyGlob,
        Scenario::SetById,
        Scenario::SetWhere,
        Scenario::SetValueGlob,
        Scenario::DeleteKeysById,
        Scenario::DeleteKeysWhere,
        Scenario::DeleteGlobById,
        Scenario::DeleteGlobWhere,
    ];

    /// Metric name suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::RecordInsert => "A",
            Scenario::DocumentInsert => "insert_document",
            Scenario::GetById => "get_by_id",
            Scenario::GetWhereSingle => "get_where_single",
            Scenario::GetWhereMany => "get_where_many",
            Scenario::GetUniqueValues => "get_unique_values",
            Scenario::GetValueGlob => "get_value_glob",
            Scenario::GetKeyGlob => "get_key_glob",
            Scenario::SetById => "set_by_id",
            Scenario::SetWhere => "set_where",
            Scenario::SetValueGlob => "set_value_glob",
            Scenario::DeleteKeysById => "delete_keys_by_id",
            Scenario::DeleteKeysWhere => "delete_keys_where",
            Scenario::DeleteGlobById => "delete_glob_by_id",
            Scenario::DeleteGlobWhere => "delete_glob_where",
        }
    }
}

/// Per-run state shared by every scenario of one run.
pub struct RunContext<'a> {
    tag: String,
    run: usize,
    batch_size: usize,
    rng: &'a mut StdRng,
}

impl<'a> RunContext<'a> {
    /// Context for run `run` of the provider tagged `tag`.
    pub fn new(tag: impl Into<String>, run: usize, batch_size: usize, rng: &'a mut StdRng) -> Self {
        Self {
            tag: tag.into(),
            run,
            batch_size,
            rng,
        }
    }

    /// Provider tag attached to every metric.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run index.
    pub fn run(&self) -> usize {
        self.run
    }

    /// Operations per scenario.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `<tag>.<scenario>`.
    pub fn metric_id(&self, scenario: Scenario) -> String {
        format!("{}.{}", self.tag, scenario.as_str())
    }

    fn pick(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// Times `op` over every item and records one metric for the batch.
    ///
    /// A failing item aborts the batch before anything is recorded.
    fn time_batch<I, F>(
        &self,
        reporter: &mut Reporter,
        scenario: Scenario,
        items: I,
        mut op: F,
    ) -> Result<()>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> StoreResult<()>,
    {
        let id = self.metric_id(scenario);
        let start = reporter.start_timer();
        for item in items {
            op(item).map_err(|source| BenchError::Scenario {
                scenario: id.clone(),
                source,
            })?;
        }
        let micros = reporter.record_delta(id.as_str(), self.tag.as_str(), self.run, start);
        debug!("run {} {}: {:.1}us", self.run, id, micros);
        Ok(())
    }
}

/// Inserts `batch_size` keyed records under `/foo/bar/<run>/...`.
pub fn record_insert<S>(store: &mut S, ctx: &mut RunContext<'_>, reporter: &mut Reporter) -> Result<()>
where
    S: RecordStore + ?Sized,
{
    let records: Vec<Record> = (0..ctx.batch_size)
        .map(|i| Record {
            key: record_key(ctx.run, i),
            allocation_set_id: (i % 100) as i64,
            owner: ctx.rng.gen::<i64>() & i64::MAX,
            size: 0,
            value: Vec::new(),
        })
        .collect();

    ctx.time_batch(reporter, Scenario::RecordInsert, records, |record| {
        store.insert_record(record)
    })
}

/// Hierarchical key for record `i` of run `run`.
pub fn record_key(run: usize, i: usize) -> String {
    format!("/foo/bar/{}/{}/{}/{}", run, i % 100, i % 10, i)
}

/// Top-level keys still available to destructive scenarios.
#[derive(Debug, Clone)]
pub struct KeyPool {
    keys: Vec<String>,
    consumed: usize,
}

impl KeyPool {
    /// Pool holding every key, none consumed.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys, consumed: 0 }
    }

    /// Keys not yet consumed.
    pub fn available(&self) -> &[String] {
        &self.keys[self.consumed..]
    }

    /// Consumes the next `n` keys.
    pub fn take(&mut self, n: usize) -> Result<Vec<String>> {
        if n > self.available().len() {
            return Err(BenchError::invalid_config(
                "top_level_keys",
                format!("need {} more keys, {} left", n, self.available().len()),
            ));
        }
        let taken = self.available()[..n].to_vec();
        self.consumed += n;
        Ok(taken)
    }
}

/// Synthetic documents for one run of the document scenarios.
#[derive(Debug, Clone)]
pub struct DocumentWorkload {
    /// Top-level keys shared by every document.
    pub keys: Vec<String>,
    /// Candidate values for those keys.
    pub values: Vec<String>,
    /// Documents, each carrying a uuid and every top-level key.
    pub docs: Vec<Document>,
}

impl DocumentWorkload {
    /// Builds `ctx.batch_size()` documents from fresh keys and values.
    pub fn generate(ctx: &mut RunContext<'_>, strings: &mut StringGenerator) -> Result<Self> {
        let keys = strings.generate_n(TOP_LEVEL_KEYS, STRING_LENGTH)?;
        let values = strings.generate_n(TOP_LEVEL_KEYS, STRING_LENGTH)?;

        let mut docs = Vec::with_capacity(ctx.batch_size);
        for _ in 0..ctx.batch_size {
            let uuid = uuid::Builder::from_random_bytes(ctx.rng.gen()).into_uuid();
            let mut doc = Document::with_uuid(uuid.to_string());
            for key in &keys {
                let value = &values[ctx.pick(values.len())];
                doc.push(key.as_str(), value.as_str());
            }
            docs.push(doc);
        }

        Ok(Self { keys, values, docs })
    }
}

/// Single-pair predicate `{key: doc[key]}`.
fn predicate_for(doc: &Document, key: &str) -> Document {
    let mut predicate = Document::new();
    predicate.push(key, doc.get(key).unwrap_or_default());
    predicate
}

/// Anchored glob on the first symbol of `s`.
fn first_symbol_glob(s: &str) -> String {
    let first: String = s.chars().take(1).collect();
    format!("{}.*", regex::escape(&first))
}

/// Glob matching `key` and nothing else of the same length.
fn consumed_key_glob(key: &str) -> String {
    format!("{}.*", regex::escape(key))
}

fn random_kv(strings: &mut StringGenerator) -> Result<Document> {
    let mut kv = Document::new();
    kv.push(
        strings.random_string(STRING_LENGTH)?,
        strings.random_string(STRING_LENGTH)?,
    );
    Ok(kv)
}

/// Runs every document scenario in catalogue order against a fresh store.
pub fn document_suite<S>(store: &mut S, ctx: &mut RunContext<'_>, reporter: &mut Reporter) -> Result<()>
where
    S: DocumentStore + ?Sized,
{
    let mut strings = StringGenerator::from_seed(DEFAULT_ALPHABET, ctx.rng.gen())?;
    let workload = DocumentWorkload::generate(ctx, &mut strings)?;
    let docs = &workload.docs;
    let mut pool = KeyPool::new(workload.keys.clone());

    ctx.time_batch(reporter, Scenario::DocumentInsert, docs, |doc| {
        store.insert(std::slice::from_ref(doc))
    })?;

    let uuids: Vec<&str> = docs.iter().map(|d| d.uuid().unwrap_or_default()).collect();

    ctx.time_batch(reporter, Scenario::GetById, &uuids, |uuid| {
        store.get_by_id(uuid).map(drop)
    })?;

    ctx.time_batch(reporter, Scenario::GetWhereSingle, docs, |doc| {
        store.get_where(doc).map(drop)
    })?;

    let keys = pool.available().to_vec();

    let predicates: Vec<Document> = docs
        .iter()
        .map(|doc| predicate_for(doc, &keys[ctx.pick(keys.len())]))
        .collect();
    ctx.time_batch(reporter, Scenario::GetWhereMany, &predicates, |p| {
        store.get_where(p).map(drop)
    })?;

    let unique_keys: Vec<&str> = (0..docs.len())
        .map(|_| keys[ctx.pick(keys.len())].as_str())
        .collect();
    ctx.time_batch(reporter, Scenario::GetUniqueValues, &unique_keys, |key| {
        store.get_unique_values(key).map(drop)
    })?;

    let value_globs: Vec<(&str, String)> = docs
        .iter()
        .map(|doc| {
            let key = keys[ctx.pick(keys.len())].as_str();
            (key, first_symbol_glob(doc.get(key).unwrap_or_default()))
        })
        .collect();
    ctx.time_batch(reporter, Scenario::GetValueGlob, &value_globs, |(key, glob)| {
        store.get_where_value_glob(key, glob).map(drop)
    })?;

    let key_globs: Vec<String> = (0..docs.len())
        .map(|_| first_symbol_glob(&keys[ctx.pick(keys.len())]))
        .collect();
    ctx.time_batch(reporter, Scenario::GetKeyGlob, &key_globs, |glob| {
        store.get_keys_glob(glob).map(drop)
    })?;

    let mut sets = Vec::with_capacity(docs.len());
    for doc in docs {
        sets.push((random_kv(&mut strings)?, doc.uuid().unwrap_or_default()));
    }
    ctx.time_batch(reporter, Scenario::SetById, &sets, |(kv, uuid)| {
        store.set_kv_by_id(kv, uuid)
    })?;

    let mut sets = Vec::with_capacity(docs.len());
    for doc in docs {
        let key = &keys[ctx.pick(keys.len())];
        sets.push((random_kv(&mut strings)?, predicate_for(doc, key)));
    }
    ctx.time_batch(reporter, Scenario::SetWhere, &sets, |(kv, predicate)| {
        store.set_kv_where(kv, predicate)
    })?;

    let mut sets = Vec::with_capacity(docs.len());
    for doc in docs {
        let key = keys[ctx.pick(keys.len())].as_str();
        let glob = first_symbol_glob(doc.get(key).unwrap_or_default());
        sets.push((random_kv(&mut strings)?, key, glob));
    }
    ctx.time_batch(reporter, Scenario::SetValueGlob, &sets, |(kv, key, glob)| {
        store.set_kv_value_glob(kv, key, glob)
    })?;

    let doomed = pool.take(2)?;
    ctx.time_batch(reporter, Scenario::DeleteKeysById, &uuids, |uuid| {
        store.delete_keys_by_id(&doomed, uuid)
    })?;

    let doomed = pool.take(2)?;
    let predicates = predicates_from_pool(docs, &pool, ctx)?;
    ctx.time_batch(reporter, Scenario::DeleteKeysWhere, &predicates, |p| {
        store.delete_keys_where(&doomed, p)
    })?;

    let glob = consumed_key_glob(&pool.take(1)?[0]);
    ctx.time_batch(reporter, Scenario::DeleteGlobById, &uuids, |uuid| {
        store.delete_keys_glob_by_id(&glob, uuid)
    })?;

    let glob = consumed_key_glob(&pool.take(1)?[0]);
    let predicates = predicates_from_pool(docs, &pool, ctx)?;
    ctx.time_batch(reporter, Scenario::DeleteGlobWhere, &predicates, |p| {
        store.delete_keys_glob_where(&glob, p)
    })
}

/// One predicate per document on a key that is still in the pool.
fn predicates_from_pool(
    docs: &[Document],
    pool: &KeyPool,
    ctx: &mut RunContext<'_>,
) -> Result<Vec<Document>> {
    let keys = pool.available();
    if keys.is_empty() {
        return Err(BenchError::invalid_config(
            "top_level_keys",
            "no keys left for predicates",
        ));
    }
    Ok(docs
        .iter()
        .map(|doc| predicate_for(doc, &keys[ctx.pick(keys.len())]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_record_key_layout() {
        assert_eq!(record_key(3, 0), "/foo/bar/3/0/0/0");
        assert_eq!(record_key(0, 123), "/foo/bar/0/23/3/123");
    }

    #[test]
    fn test_scenario_names_unique() {
        let mut names: Vec<_> = Scenario::ALL.iter().map(|s| s.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Scenario::ALL.len());
        assert_eq!(Scenario::RecordInsert.as_str(), "A");
    }

    #[test]
    fn test_key_pool_shrinks_disjointly() {
        let keys: Vec<String> = (0..5).map(|i| format!("k{}", i)).collect();
        let mut pool = KeyPool::new(keys);
        let first = pool.take(2).unwrap();
        let second = pool.take(2).unwrap();
        assert_eq!(first, vec!["k0", "k1"]);
        assert_eq!(second, vec!["k2", "k3"]);
        assert_eq!(pool.available(), &["k4".to_string()]);
        assert!(pool.take(2).is_err());
        assert_eq!(pool.available().len(), 1);
    }

    #[test]
    fn test_workload_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = RunContext::new("memory", 0, 8, &mut rng);
        let mut strings = StringGenerator::from_seed(DEFAULT_ALPHABET, 2).unwrap();
        let workload = DocumentWorkload::generate(&mut ctx, &mut strings).unwrap();

        assert_eq!(workload.keys.len(), TOP_LEVEL_KEYS);
        assert_eq!(workload.docs.len(), 8);
        for doc in &workload.docs {
            assert_eq!(doc.len(), TOP_LEVEL_KEYS + 1);
            assert_eq!(doc.entry(0).map(|(k, _)| k), Some("uuid"));
            for key in &workload.keys {
                assert!(workload.values.iter().any(|v| Some(v.as_str()) == doc.get(key)));
            }
        }
        let mut uuids: Vec<_> = workload.docs.iter().filter_map(|d| d.uuid()).collect();
        uuids.sort();
        uuids.dedup();
        assert_eq!(uuids.len(), 8);
    }

    #[test]
    fn test_workload_reproducible_with_seed() {
        let generate = || {
            let mut rng = StdRng::seed_from_u64(77);
            let mut ctx = RunContext::new("memory", 0, 4, &mut rng);
            let mut strings = StringGenerator::from_seed(DEFAULT_ALPHABET, 78).unwrap();
            DocumentWorkload::generate(&mut ctx, &mut strings).unwrap().docs
        };
        assert_eq!(generate(), generate());
    }

    #[test]
    fn test_globs() {
        assert_eq!(first_symbol_glob("abc"), "a.*");
        assert_eq!(first_symbol_glob("-x"), r"\-.*");
        assert_eq!(consumed_key_glob("a_b"), "a_b.*");
    }
}
