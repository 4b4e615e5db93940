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

//! String generator and in-memory provider micro-benchmarks.
//!
//! Run with `cargo bench --package docbench --bench keygen`.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use docbench::keygen::DEFAULT_ALPHABET;
use docbench::store::{Backend, DocumentStore};
use docbench::{Document, MemoryProvider, StringGenerator};

fn bench_random_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_string");

    for length in [4usize, 10, 32] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            b.iter_batched(
                || StringGenerator::from_seed(DEFAULT_ALPHABET, 7).expect("valid alphabet"),
                |mut generator| black_box(generator.random_string(length).expect("space left")),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_generate_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_n");

    for count in [16usize, 256, 1024] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut generator =
                    StringGenerator::from_seed(DEFAULT_ALPHABET, 7).expect("valid alphabet");
                black_box(generator.generate_n(count, 10).expect("space left"))
            });
        });
    }

    group.finish();
}

fn bench_memory_get_where(c: &mut Criterion) {
    let mut generator = StringGenerator::from_seed(DEFAULT_ALPHABET, 11).expect("valid alphabet");
    let keys = generator.generate_n(10, 10).expect("space left");
    let values = generator.generate_n(10, 10).expect("space left");

    let mut store = MemoryProvider::new();
    store.initialize().expect("fresh store");
    let docs: Vec<Document> = (0..1024)
        .map(|i| {
            let mut doc = Document::with_uuid(format!("doc-{}", i));
            for (j, key) in keys.iter().enumerate() {
                doc.push(key.as_str(), values[(i + j) % values.len()].as_str());
            }
            doc
        })
        .collect();
    store.insert(&docs).expect("unique uuids");

    let mut predicate = Document::new();
    predicate.push(keys[0].as_str(), values[0].as_str());

    c.bench_function("memory_get_where_1024", |b| {
        b.iter(|| black_box(store.get_where(&predicate).expect("query")))
    });
}

criterion_group!(
    benches,
    bench_random_string,
    bench_generate_n,
    bench_memory_get_where
);
criterion_main!(benches);
