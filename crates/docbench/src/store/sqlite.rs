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

//! SQLite provider with an exploded document layout.
//!
//! Every document key/value pair is stored as its own row in `pairs`, linked
//! to its document by `docid` (the document's uuid). Indexing `key` and
//! `docid` separately lets predicate, glob and unique-value queries use an
//! index on either side of a pair. Glob matching runs in Rust with the
//! anchored regex from [`compile_glob`], after SQL narrows the candidates.
//!
//! Configuration: the connection address is the database path, `:memory:`
//! when none is given. [`Backend::initialize`] drops and recreates every
//! table, so each run starts from an empty store.

use super::{
    check_no_uuid, compile_glob, is_direct_child, Backend, DocumentStore, RecordStore,
    StoreError, StoreResult,
};
use crate::types::{AllocationSet, Document, Record, VerifyingKey};
use regex::Regex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::collections::HashSet;

/// Address used when no connection address is configured.
pub const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = "
    DROP TABLE IF EXISTS records;
    DROP TABLE IF EXISTS allocation_sets;
    DROP TABLE IF EXISTS pairs;
    DROP TABLE IF EXISTS documents;

    CREATE TABLE records (
        key      TEXT    PRIMARY KEY,
        allocset INTEGER NOT NULL,
        owner    INTEGER NOT NULL,
        size     INTEGER NOT NULL,
        value    BLOB    NOT NULL
    );
    CREATE INDEX idx_records_allocset ON records(allocset);

    CREATE TABLE allocation_sets (
        owner BLOB    PRIMARY KEY,
        id    INTEGER NOT NULL
    );

    CREATE TABLE documents (
        docid TEXT PRIMARY KEY
    );
    CREATE TABLE pairs (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        docid TEXT NOT NULL,
        key   TEXT NOT NULL,
        value TEXT NOT NULL
    );
    CREATE INDEX idx_pairs_key   ON pairs(key);
    CREATE INDEX idx_pairs_docid ON pairs(docid);
";

/// Provider backed by a SQLite database.
pub struct SqliteProvider {
    address: String,
    conn: Option<Connection>,
}

impl SqliteProvider {
    /// Creates a provider for `address`; nothing is opened until
    /// [`Backend::initialize`].
    pub fn new(address: Option<String>) -> Self {
        Self {
            address: address.unwrap_or_else(|| IN_MEMORY.to_string()),
            conn: None,
        }
    }

    /// The database path this provider connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::Connection("provider is not initialized".to_string()))
    }

    fn conn_mut(&mut self) -> StoreResult<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| StoreError::Connection("provider is not initialized".to_string()))
    }

    /// Applies `apply` to each document selected by `select`, in one transaction.
    fn update_each<S, A>(&mut self, select: S, mut apply: A) -> StoreResult<()>
    where
        S: FnOnce(&Connection) -> StoreResult<Vec<String>>,
        A: FnMut(&Connection, &str) -> StoreResult<()>,
    {
        let tx = self.conn_mut()?.transaction()?;
        let conn: &Connection = &tx;
        for docid in select(conn)? {
            apply(conn, &docid)?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Maps unique-constraint violations to [`StoreError::Insert`].
fn insert_error(err: rusqlite::Error, what: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Insert(format!("duplicate {}", what))
        }
        other => StoreError::Sqlite(other),
    }
}

fn document_exists(conn: &Connection, docid: &str) -> StoreResult<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM documents WHERE docid = ?1",
            params![docid],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn require_document(conn: &Connection, docid: &str) -> StoreResult<Vec<String>> {
    if !document_exists(conn, docid)? {
        return Err(StoreError::NotFound(format!("document {}", docid)));
    }
    Ok(vec![docid.to_string()])
}

fn load_document(conn: &Connection, docid: &str) -> StoreResult<Document> {
    let mut stmt = conn.prepare_cached("SELECT key, value FROM pairs WHERE docid = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![docid], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut doc = Document::new();
    for row in rows {
        let (key, value) = row?;
        doc.push(key, value);
    }
    Ok(doc)
}

fn all_docids(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT docid FROM documents ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Documents containing every pair of `predicate`.
///
/// The first pair narrows candidates through the key index; the rest are
/// checked on the loaded document.
fn docids_where(conn: &Connection, predicate: &Document) -> StoreResult<Vec<String>> {
    let Some((key, value)) = predicate.entry(0) else {
        return all_docids(conn);
    };

    let mut stmt = conn.prepare_cached(
        "SELECT docid FROM pairs WHERE key = ?1 AND value = ?2 GROUP BY docid ORDER BY MIN(id)",
    )?;
    let candidates = stmt
        .query_map(params![key, value], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if predicate.len() == 1 {
        return Ok(candidates);
    }

    let mut matched = Vec::new();
    for docid in candidates {
        if load_document(conn, &docid)?.matches(predicate) {
            matched.push(docid);
        }
    }
    Ok(matched)
}

fn docids_value_glob(conn: &Connection, key: &str, re: &Regex) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT docid, value FROM pairs WHERE key = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![key], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for row in rows {
        let (docid, value) = row?;
        if re.is_match(&value) && seen.insert(docid.clone()) {
            matched.push(docid);
        }
    }
    Ok(matched)
}

fn load_all(conn: &Connection, docids: &[String]) -> StoreResult<Vec<Document>> {
    docids.iter().map(|id| load_document(conn, id)).collect()
}

fn merge_pairs(conn: &Connection, docid: &str, kv: &Document) -> StoreResult<()> {
    let mut update =
        conn.prepare_cached("UPDATE pairs SET value = ?3 WHERE docid = ?1 AND key = ?2")?;
    let mut insert =
        conn.prepare_cached("INSERT INTO pairs (docid, key, value) VALUES (?1, ?2, ?3)")?;
    for (key, value) in kv.iter() {
        if update.execute(params![docid, key, value])? == 0 {
            insert.execute(params![docid, key, value])?;
        }
    }
    Ok(())
}

fn remove_keys(conn: &Connection, docid: &str, keys: &[String]) -> StoreResult<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM pairs WHERE docid = ?1 AND key = ?2")?;
    for key in keys.iter().filter(|k| k.as_str() != Document::UUID_KEY) {
        stmt.execute(params![docid, key])?;
    }
    Ok(())
}

fn remove_glob(conn: &Connection, docid: &str, re: &Regex) -> StoreResult<()> {
    let doomed: Vec<i64> = {
        let mut stmt = conn.prepare_cached("SELECT id, key FROM pairs WHERE docid = ?1")?;
        let rows = stmt.query_map(params![docid], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut ids = Vec::new();
        for row in rows {
            let (id, key) = row?;
            if key != Document::UUID_KEY && re.is_match(&key) {
                ids.push(id);
            }
        }
        ids
    };

    let mut stmt = conn.prepare_cached("DELETE FROM pairs WHERE id = ?1")?;
    for id in doomed {
        stmt.execute(params![id])?;
    }
    Ok(())
}

impl Backend for SqliteProvider {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn initialize(&mut self) -> StoreResult<()> {
        if self.conn.is_none() {
            let conn = Connection::open(&self.address).map_err(|e| {
                StoreError::Connection(format!("could not open {}: {}", self.address, e))
            })?;
            self.conn = Some(conn);
        }
        self.conn()?
            .execute_batch(SCHEMA)
            .map_err(|e| StoreError::Connection(format!("could not create schema: {}", e)))
    }
}

impl RecordStore for SqliteProvider {
    fn get_record(&self, key: &str) -> StoreResult<Record> {
        self.conn()?
            .query_row(
                "SELECT key, allocset, owner, size, value FROM records WHERE key = ?1",
                params![key],
                |row| {
                    Ok(Record {
                        key: row.get(0)?,
                        allocation_set_id: row.get(1)?,
                        owner: row.get(2)?,
                        size: row.get(3)?,
                        value: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("record {}", key)))
    }

    fn insert_record(&mut self, record: Record) -> StoreResult<()> {
        self.conn()?
            .prepare_cached(
                "INSERT INTO records (key, allocset, owner, size, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                record.key,
                record.allocation_set_id,
                record.owner,
                record.size,
                record.value
            ])
            .map_err(|e| insert_error(e, &format!("record key {}", record.key)))?;
        Ok(())
    }

    fn get_keys_under_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT key FROM records WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            let key = row?;
            if is_direct_child(&key, prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn sum_size(&self, allocation_set_id: i64) -> StoreResult<i64> {
        Ok(self.conn()?.query_row(
            "SELECT COALESCE(SUM(size), 0) FROM records WHERE allocset = ?1",
            params![allocation_set_id],
            |row| row.get(0),
        )?)
    }

    fn create_allocation_set(&mut self, set: AllocationSet) -> StoreResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO allocation_sets (owner, id) VALUES (?1, ?2)",
                params![set.owner.as_bytes(), set.id],
            )
            .map_err(|e| insert_error(e, &format!("allocation set owner {}", set.owner)))?;
        Ok(())
    }

    fn get_allocation_set_id(&self, owner: &VerifyingKey) -> StoreResult<i64> {
        self.conn()?
            .query_row(
                "SELECT id FROM allocation_sets WHERE owner = ?1",
                params![owner.as_bytes()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("allocation set for owner {}", owner)))
    }
}

impl DocumentStore for SqliteProvider {
    fn get_by_id(&self, uuid: &str) -> StoreResult<Document> {
        let conn = self.conn()?;
        require_document(conn, uuid)?;
        load_document(conn, uuid)
    }

    fn get_where(&self, predicate: &Document) -> StoreResult<Vec<Document>> {
        let conn = self.conn()?;
        load_all(conn, &docids_where(conn, predicate)?)
    }

    fn get_unique_values(&self, key: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT value FROM pairs WHERE key = ?1 GROUP BY value ORDER BY MIN(id)",
        )?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn get_where_value_glob(&self, key: &str, pattern: &str) -> StoreResult<Vec<Document>> {
        let re = compile_glob(pattern)?;
        let conn = self.conn()?;
        load_all(conn, &docids_value_glob(conn, key, &re)?)
    }

    fn get_keys_glob(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let re = compile_glob(pattern)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT key FROM pairs GROUP BY key ORDER BY MIN(id)")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            let key = row?;
            if re.is_match(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn insert(&mut self, docs: &[Document]) -> StoreResult<()> {
        let tx = self.conn_mut()?.transaction()?;
        {
            let mut add_doc = tx.prepare_cached("INSERT INTO documents (docid) VALUES (?1)")?;
            let mut add_pair =
                tx.prepare_cached("INSERT INTO pairs (docid, key, value) VALUES (?1, ?2, ?3)")?;
            for doc in docs {
                let uuid = doc
                    .uuid()
                    .ok_or_else(|| StoreError::Insert("document has no uuid".to_string()))?;
                add_doc
                    .execute(params![uuid])
                    .map_err(|e| insert_error(e, &format!("document uuid {}", uuid)))?;
                for (key, value) in doc.iter() {
                    add_pair.execute(params![uuid, key, value])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn set_kv_by_id(&mut self, kv: &Document, uuid: &str) -> StoreResult<()> {
        check_no_uuid(kv)?;
        self.update_each(
            |conn| require_document(conn, uuid),
            |conn, docid| merge_pairs(conn, docid, kv),
        )
    }

    fn set_kv_where(&mut self, kv: &Document, predicate: &Document) -> StoreResult<()> {
        check_no_uuid(kv)?;
        self.update_each(
            |conn| docids_where(conn, predicate),
            |conn, docid| merge_pairs(conn, docid, kv),
        )
    }

    fn set_kv_value_glob(&mut self, kv: &Document, key: &str, pattern: &str) -> StoreResult<()> {
        check_no_uuid(kv)?;
        let re = compile_glob(pattern)?;
        self.update_each(
            |conn| docids_value_glob(conn, key, &re),
            |conn, docid| merge_pairs(conn, docid, kv),
        )
    }

    fn delete_keys_by_id(&mut self, keys: &[String], uuid: &str) -> StoreResult<()> {
        self.update_each(
            |conn| require_document(conn, uuid),
            |conn, docid| remove_keys(conn, docid, keys),
        )
    }

    fn delete_keys_where(&mut self, keys: &[String], predicate: &Document) -> StoreResult<()> {
        self.update_each(
            |conn| docids_where(conn, predicate),
            |conn, docid| remove_keys(conn, docid, keys),
        )
    }

    fn delete_keys_glob_by_id(&mut self, pattern: &str, uuid: &str) -> StoreResult<()> {
        let re = compile_glob(pattern)?;
        self.update_each(
            |conn| require_document(conn, uuid),
            |conn, docid| remove_glob(conn, docid, &re),
        )
    }

    fn delete_keys_glob_where(&mut self, pattern: &str, predicate: &Document) -> StoreResult<()> {
        let re = compile_glob(pattern)?;
        self.update_each(
            |conn| docids_where(conn, predicate),
            |conn, docid| remove_glob(conn, docid, &re),
        )
    }
}
